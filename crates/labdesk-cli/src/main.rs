use clap::Parser;
use labdesk_cli::cli::Cli;
use labdesk_service::HttpService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("labdesk_cli=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let service = HttpService::new(&cli.server);
    labdesk_cli::commands::run(&service, &cli.command, &mut std::io::stdout()).await
}
