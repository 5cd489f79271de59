use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use clap::builder::BoolishValueParser;
use clap::{Parser, Subcommand};
use labdesk_render::PipelineConfig;
use labdesk_store::StoreConfig;

#[derive(Debug, Parser)]
#[command(name = "labdesk-server", about = "Serves lab instructions and builds lab reports")]
pub struct ServerConfig {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Address to listen on
    #[arg(long, env = "LABDESK_BIND", default_value = "127.0.0.1")]
    pub bind: IpAddr,

    /// Port to listen on
    #[arg(long, env = "LABDESK_PORT", default_value = "5001")]
    pub port: u16,

    /// Directory holding one sub-directory per lab
    #[arg(long, env = "LABDESK_LABS_DIR", default_value = "labs")]
    pub labs_dir: PathBuf,

    /// Where generated reports are kept (defaults to the XDG data dir)
    #[arg(long, env = "LABDESK_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// LaTeX to HTML converter
    #[arg(long, env = "LABDESK_PANDOC", default_value = "pandoc")]
    pub pandoc: String,

    /// LaTeX to PDF compiler
    #[arg(long, env = "LABDESK_TECTONIC", default_value = "tectonic")]
    pub tectonic: String,

    /// Timeout for converting instructions to HTML (seconds)
    #[arg(long, env = "LABDESK_CONVERT_TIMEOUT", default_value = "30")]
    pub convert_timeout: u64,

    /// Timeout for compiling a report (seconds)
    #[arg(long, env = "LABDESK_COMPILE_TIMEOUT", default_value = "120")]
    pub compile_timeout: u64,

    /// Fail report requests when compilation fails instead of serving a placeholder PDF
    #[arg(long, env = "LABDESK_STRICT_PDF", value_parser = BoolishValueParser::new())]
    pub strict_pdf: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Check that the external converters can be found
    Doctor,
}

impl ServerConfig {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }

    pub fn pipeline(&self) -> PipelineConfig {
        PipelineConfig {
            pandoc: self.pandoc.clone(),
            tectonic: self.tectonic.clone(),
            convert_timeout: Duration::from_secs(self.convert_timeout),
            compile_timeout: Duration::from_secs(self.compile_timeout),
            placeholder_pdf: !self.strict_pdf,
        }
    }

    pub fn store(&self) -> StoreConfig {
        StoreConfig {
            local_data_dir: self
                .data_dir
                .as_ref()
                .map(|d| d.to_string_lossy().into_owned()),
        }
    }
}
