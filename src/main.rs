use clap::Parser;
use tracing_subscriber::EnvFilter;

use hue_gateway::config::GatewayConfig;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = GatewayConfig::parse();
    if let Err(err) = hue_gateway::run(config).await {
        tracing::error!(%err, "gateway exited with error");
        std::process::exit(1);
    }
}
