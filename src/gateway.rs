use std::collections::HashMap;
use std::sync::Arc;

use crate::bridge::session::{BridgeConnectionState, BridgeSession, ConnectReport};
use crate::error::GatewayError;
use crate::graph::store::{GraphStore, DEFAULT_GRAPH_NAME};
use crate::models::light::{LightStateRequest, LightSummary};

/// Façade over the bridge session and the graph store. Validates request
/// shape, delegates, and owns no state of its own.
pub struct GatewayService {
    session: Arc<BridgeSession>,
    store: Arc<GraphStore>,
}

impl GatewayService {
    pub fn new(session: Arc<BridgeSession>, store: Arc<GraphStore>) -> Self {
        Self { session, store }
    }

    pub async fn set_light_state(
        &self,
        light_id: u32,
        request: &LightStateRequest,
    ) -> Result<(), GatewayError> {
        self.session.set_light(light_id, request).await
    }

    pub async fn list_lights(
        &self,
    ) -> Result<HashMap<String, LightSummary>, GatewayError> {
        let lights = self.session.list_lights().await?;
        Ok(lights
            .into_iter()
            .map(|light| (light.name.clone(), light))
            .collect())
    }

    pub async fn save_graph(
        &self,
        name: Option<&str>,
        content: String,
    ) -> Result<(), GatewayError> {
        self.store
            .write(name.unwrap_or(DEFAULT_GRAPH_NAME), content)
            .await
    }

    pub async fn load_graph(&self, name: Option<&str>) -> Result<String, GatewayError> {
        self.store.read(name.unwrap_or(DEFAULT_GRAPH_NAME)).await
    }

    pub async fn bridge_status(&self) -> BridgeConnectionState {
        self.session.state().await
    }

    pub async fn connect_bridge(&self) -> ConnectReport {
        self.session.connect().await
    }
}
