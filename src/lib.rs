pub mod config;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod logging;
pub mod model;
pub mod output;
pub mod scan;
pub mod sink;

pub use config::Config;
pub use error::{FetchError, ParseError, RuleError, ScanError, ValidationError};
pub use extract::{
    extract_packages_from_command, extract_text_segments, is_valid_name, is_valid_version,
    parse_json_dependencies, Catalog,
};
pub use fetch::{rewrite_github_blob, FetchedPage, Fetcher, HttpFetcher};
pub use model::{ContentClass, Dependency, ManagerType, ScanReport, Summary};
pub use scan::{CancelHandle, CancelSignal, Scanner};
pub use sink::{LogSink, MemorySink, ScanEvent, TracingSink};
