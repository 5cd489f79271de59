use std::path::PathBuf;

use serde::Serialize;

use crate::PipelineConfig;

/// Where (if anywhere) a configured converter was found.
#[derive(Debug, Clone, Serialize)]
pub struct ToolStatus {
    pub name: &'static str,
    pub program: String,
    pub path: Option<PathBuf>,
}

impl ToolStatus {
    pub fn found(&self) -> bool {
        self.path.is_some()
    }
}

pub fn check_tools(config: &PipelineConfig) -> Vec<ToolStatus> {
    [("pandoc", &config.pandoc), ("tectonic", &config.tectonic)]
        .into_iter()
        .map(|(name, program)| ToolStatus {
            name,
            program: program.clone(),
            path: which::which(program).ok(),
        })
        .collect()
}
