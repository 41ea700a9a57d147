use anyhow::Result;
use clap::Parser;
use delivery_fee::{config::Settings, server};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[derive(Parser)]
#[command(
    about = env!("CARGO_PKG_DESCRIPTION"),
    author = env!("CARGO_PKG_AUTHORS"),
    version = env!("CARGO_PKG_VERSION")
)]
pub struct Args {
    #[arg(
        long,
        help = "(Optional) Sets the configuration file path.",
        required = false
    )]
    pub config: Option<String>,

    #[arg(
        long,
        help = "(Optional) Overrides the configured listen host.",
        required = false
    )]
    pub host: Option<String>,

    #[arg(
        long,
        help = "(Optional) Overrides the configured listen port.",
        required = false
    )]
    pub port: Option<u16>,

    #[arg(
        long,
        help = "Sets the log level when RUST_LOG is unset.",
        default_value = "info"
    )]
    pub log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_tracing(&args.log_level);

    info!("Starting");

    let mut settings = Settings::load(&args.config)?;

    if let Some(host) = args.host {
        settings.server.host = host;
    }
    if let Some(port) = args.port {
        settings.server.port = port;
    }

    server::serve(&settings.server, settings.pricing).await?;

    info!("Stopped");

    Ok(())
}
