use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(
    name = "hue-gateway",
    version,
    about = "Local REST gateway for a Philips Hue bridge"
)]
pub struct GatewayConfig {
    /// Bridge host (IP, or IP:PORT for non-standard setups)
    #[arg(long, env = "HUE_BRIDGE_HOST")]
    pub bridge_host: String,

    /// Path to the bridge auth file storing the registered application key
    #[arg(long, env = "HUE_AUTH_FILE", default_value = "hue_auth.json")]
    pub auth_file: PathBuf,

    /// Directory where graph documents are stored
    #[arg(long, env = "HUE_GRAPH_ROOT", default_value = "graphs")]
    pub graph_root: PathBuf,

    /// Address to serve the REST API on
    #[arg(long, env = "HUE_LISTEN_ADDR", default_value = "0.0.0.0:5000")]
    pub listen_addr: SocketAddr,

    /// Bridge request timeout in seconds
    #[arg(long, default_value_t = 10)]
    pub bridge_timeout_secs: u64,
}
