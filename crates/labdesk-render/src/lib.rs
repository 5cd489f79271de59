//! The document pipeline: LaTeX instructions to HTML, report templates to PDF.
//!
//! Typesetting and conversion are delegated to external tools (`pandoc`,
//! `tectonic`); this crate prepares their inputs, runs them with timeouts and
//! decides what to hand back when they fail.

pub mod builder;
pub mod config;
pub mod doctor;
pub mod error;
pub mod html;
pub mod pdf;
pub mod template;
pub mod tool;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

pub use builder::{BuiltReport, ReportBuilder};
pub use config::PipelineConfig;
pub use error::RenderError;
pub use html::{ConvertedHtml, HtmlConverter};
pub use pdf::{CompiledPdf, PdfCompiler, PLACEHOLDER_PDF};
pub use template::ReportTemplate;

/// Both halves of the pipeline, built from one configuration.
pub struct Pipeline {
    pub html: HtmlConverter,
    pub reports: ReportBuilder,
}

impl Pipeline {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            html: HtmlConverter::new(config),
            reports: ReportBuilder::new(config),
        }
    }
}
