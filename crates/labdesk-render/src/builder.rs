use bytes::Bytes;
use labdesk_core::{LabId, ReportSubmission};
use tracing::debug;

use crate::{PdfCompiler, PipelineConfig, RenderError, ReportTemplate};

/// A filled-in report: the LaTeX that was compiled and the resulting PDF.
#[derive(Debug, Clone)]
pub struct BuiltReport {
    pub tex: String,
    pub pdf: Bytes,
    pub placeholder: bool,
}

pub struct ReportBuilder {
    compiler: PdfCompiler,
}

impl ReportBuilder {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            compiler: PdfCompiler::new(config),
        }
    }

    /// Render `template_source` with the submission and compile it.
    ///
    /// Each build gets its own scratch directory, so concurrent builds of the
    /// same lab never see each other's files.
    pub async fn build(
        &self,
        lab_id: &LabId,
        template_source: &str,
        submission: &ReportSubmission,
    ) -> Result<BuiltReport, RenderError> {
        let tex = ReportTemplate::parse(template_source)?.render(submission)?;

        let build_dir = tempfile::Builder::new()
            .prefix("labdesk-build-")
            .tempdir()?;
        let tex_path = build_dir.path().join(format!("{lab_id}_report.tex"));
        tokio::fs::write(&tex_path, &tex).await?;
        debug!(lab = %lab_id, dir = %build_dir.path().display(), "building report");

        let pdf = self.compiler.compile(&tex_path, build_dir.path()).await?;
        Ok(BuiltReport {
            tex,
            pdf: pdf.bytes,
            placeholder: pdf.placeholder,
        })
    }
}
