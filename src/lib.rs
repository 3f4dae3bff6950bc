pub mod bridge;
pub mod config;
pub mod error;
pub mod gateway;
pub mod graph;
pub mod http;
pub mod models;

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use bridge::hue::HueBridgeClient;
use bridge::session::{BridgeConnectionState, BridgeSession};
use config::GatewayConfig;
use error::GatewayError;
use gateway::GatewayService;
use graph::store::GraphStore;

pub async fn run(config: GatewayConfig) -> Result<(), GatewayError> {
    let client = Arc::new(HueBridgeClient::new(
        &config.bridge_host,
        config.auth_file.clone(),
        Duration::from_secs(config.bridge_timeout_secs),
    )?);
    let session = Arc::new(BridgeSession::new(client));

    // One connect attempt at startup. The server starts either way; a
    // client can retry through POST /api/bridge/connect after pressing
    // the link button.
    let report = session.connect().await;
    if report.state != BridgeConnectionState::Connected {
        warn!(
            state = %report.state,
            "bridge not connected; press the link button and POST /api/bridge/connect"
        );
    }

    let store = Arc::new(GraphStore::new(config.graph_root.clone())?);
    let service = Arc::new(GatewayService::new(session, store));

    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    info!(addr = %config.listen_addr, "serving gateway API");
    axum::serve(listener, http::router(service)).await?;
    Ok(())
}
