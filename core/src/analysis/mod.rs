pub mod category;
pub mod report;

pub use category::ErrorCategory;
pub use report::{parse_response, AnalysisReport, AnalysisVerdict, UNCERTAIN_BELOW};
