use std::time::Duration;

/// Which converter binaries to run and how long to give them.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// LaTeX to HTML converter, a name on `PATH` or an absolute path.
    pub pandoc: String,
    /// LaTeX to PDF compiler, a name on `PATH` or an absolute path.
    pub tectonic: String,
    pub convert_timeout: Duration,
    pub compile_timeout: Duration,
    /// Serve a stub PDF instead of an error when compilation fails.
    pub placeholder_pdf: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            pandoc: "pandoc".into(),
            tectonic: "tectonic".into(),
            convert_timeout: Duration::from_secs(30),
            compile_timeout: Duration::from_secs(120),
            placeholder_pdf: true,
        }
    }
}
