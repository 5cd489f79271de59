pub mod error;
pub mod lab;
pub mod latex;
pub mod report;
pub mod table;

pub use error::LabdeskError;
pub use lab::{Lab, LabId};
pub use report::ReportSubmission;
pub use table::{Cell, MeasurementTable};
