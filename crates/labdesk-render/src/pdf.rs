use std::path::Path;
use std::time::Duration;

use bytes::Bytes;
use tracing::{info, warn};

use crate::tool::{self, ToolCommand};
use crate::{PipelineConfig, RenderError};

/// Served in place of a real report when the compiler is unavailable.
pub const PLACEHOLDER_PDF: &[u8] =
    b"%PDF-1.4\n% placeholder PDF generated because tectonic is missing.\n";

#[derive(Debug, Clone)]
pub struct CompiledPdf {
    pub bytes: Bytes,
    pub placeholder: bool,
}

#[derive(Debug, Clone)]
pub struct PdfCompiler {
    tectonic: String,
    timeout: Duration,
    placeholder: bool,
}

impl PdfCompiler {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            tectonic: config.tectonic.clone(),
            timeout: config.compile_timeout,
            placeholder: config.placeholder_pdf,
        }
    }

    /// Compile `tex_path` into `outdir/<stem>.pdf` and read the result back.
    pub async fn compile(&self, tex_path: &Path, outdir: &Path) -> Result<CompiledPdf, RenderError> {
        match self.run_tectonic(tex_path, outdir).await {
            Ok(bytes) => Ok(CompiledPdf {
                bytes,
                placeholder: false,
            }),
            Err(e) if self.placeholder => {
                warn!("PDF compilation failed, serving placeholder: {e}");
                Ok(CompiledPdf {
                    bytes: Bytes::from_static(PLACEHOLDER_PDF),
                    placeholder: true,
                })
            }
            Err(e) => Err(e),
        }
    }

    async fn run_tectonic(&self, tex_path: &Path, outdir: &Path) -> Result<Bytes, RenderError> {
        let cmd = ToolCommand::new(&self.tectonic, self.timeout)
            .arg(tex_path)
            .arg("--outdir")
            .arg(outdir)
            .current_dir(outdir);
        let output = tool::run(&cmd).await?;

        let pdf_path = outdir.join(tex_path.with_extension("pdf").file_name().unwrap_or_default());
        let data = tokio::fs::read(&pdf_path).await?;
        info!(
            pdf = %pdf_path.display(),
            bytes = data.len(),
            elapsed_ms = output.elapsed.as_millis() as u64,
            "compiled report"
        );
        Ok(Bytes::from(data))
    }
}
