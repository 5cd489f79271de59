mod catalog;
mod http;
mod local;
mod traits;

pub use catalog::LabCatalog;
pub use http::HttpService;
pub use local::LocalService;
pub use traits::{GeneratedReport, LabHtml, LabService, ServiceError};

/// Response headers carrying report metadata alongside the PDF body.
pub mod headers {
    pub const REPORT_ID: &str = "x-report-id";
    pub const REPORT_CREATED_AT: &str = "x-report-created-at";
    pub const REPORT_PLACEHOLDER: &str = "x-report-placeholder";
}

/// File name offered to browsers for a downloaded report.
pub const REPORT_FILENAME: &str = "lab_report.pdf";
