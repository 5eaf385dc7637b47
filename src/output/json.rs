use crate::model::ScanReport;
use anyhow::Result;

/// One report renders as an object, any other count as an array.
pub fn reports_to_json(reports: &[ScanReport]) -> Result<String> {
    let json = match reports {
        [single] => serde_json::to_string_pretty(single)?,
        _ => serde_json::to_string_pretty(reports)?,
    };
    Ok(json)
}

pub fn print_json(reports: &[ScanReport]) -> Result<()> {
    let json = reports_to_json(reports)?;
    println!("{}", json);
    Ok(())
}
