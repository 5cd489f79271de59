use thiserror::Error;

use crate::tool::ToolError;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Tool(#[from] ToolError),

    #[error("template error: {0}")]
    Template(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0} produced output that is not valid UTF-8")]
    InvalidOutput(String),
}

impl From<tera::Error> for RenderError {
    fn from(e: tera::Error) -> Self {
        // tera nests the useful detail (line, variable name) in the source chain
        let mut msg = e.to_string();
        let mut source = std::error::Error::source(&e);
        while let Some(inner) = source {
            msg.push_str(": ");
            msg.push_str(&inner.to_string());
            source = inner.source();
        }
        RenderError::Template(msg)
    }
}
