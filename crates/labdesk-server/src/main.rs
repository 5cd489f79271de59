use anyhow::Result;
use clap::Parser;
use labdesk_render::doctor::check_tools;
use labdesk_render::Pipeline;
use labdesk_server::config::{Commands, ServerConfig};
use labdesk_service::{LabCatalog, LocalService};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServerConfig::parse();
    let pipeline = config.pipeline();
    let tools = check_tools(&pipeline);

    match config.command {
        Some(Commands::Doctor) => {
            let mut missing = 0;
            for tool in &tools {
                match &tool.path {
                    Some(path) => println!("{:<10} {}", tool.name, path.display()),
                    None => {
                        missing += 1;
                        println!("{:<10} not found ({})", tool.name, tool.program);
                    }
                }
            }
            if missing > 0 {
                anyhow::bail!("{missing} converter(s) missing");
            }
        }
        None => {
            for tool in tools.iter().filter(|t| !t.found()) {
                warn!(
                    tool = tool.name,
                    program = %tool.program,
                    "converter not found, requests that need it will degrade"
                );
            }

            let store = labdesk_store::create_store(&config.store())?;
            let catalog = LabCatalog::new(&config.labs_dir);
            info!("serving labs from {}", catalog.root().display());
            let service = LocalService::new(catalog, Pipeline::new(&pipeline), store);

            let addr = config.addr();
            let listener = TcpListener::bind(addr).await?;
            info!("labdesk-server listening on http://{addr}");

            labdesk_server::serve(listener, service).await?;
        }
    }

    Ok(())
}
