use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::client::{BridgeClient, ConnectOutcome, LightCommand};
use crate::error::GatewayError;
use crate::models::light::LightSummary;

/// Bridge error type for "link button not pressed".
const ERR_LINK_BUTTON: i64 = 101;
/// Bridge error type for "unauthorized user" (stale or revoked app key).
const ERR_UNAUTHORIZED: i64 = 1;

const DEVICE_TYPE: &str = "hue-gateway#rust";

/// Contents of the auth file persisting the registered application key,
/// so pairing survives restarts.
#[derive(Debug, Serialize, Deserialize)]
struct AuthFile {
    username: String,
}

/// Client for the Hue bridge's local REST protocol.
pub struct HueBridgeClient {
    client: reqwest::Client,
    base_url: String,
    auth_file: PathBuf,
    app_key: RwLock<Option<String>>,
}

fn build_http_client(timeout: Duration) -> Result<reqwest::Client, GatewayError> {
    Ok(reqwest::Client::builder().timeout(timeout).build()?)
}

/// The bridge reports failures as an array of `{"error": {...}}` entries.
fn first_wire_error(response: &serde_json::Value) -> Option<(i64, String)> {
    let entries = response.as_array()?;
    for entry in entries {
        if let Some(err) = entry.get("error") {
            let kind = err.get("type").and_then(|v| v.as_i64()).unwrap_or(0);
            let description = err
                .get("description")
                .and_then(|v| v.as_str())
                .unwrap_or("unknown bridge error")
                .to_string();
            return Some((kind, description));
        }
    }
    None
}

impl HueBridgeClient {
    pub fn new(
        host: &str,
        auth_file: PathBuf,
        timeout: Duration,
    ) -> Result<Self, GatewayError> {
        Ok(Self {
            client: build_http_client(timeout)?,
            base_url: format!("http://{host}"),
            auth_file,
            app_key: RwLock::new(None),
        })
    }

    async fn load_stored_key(&self) -> Option<String> {
        if let Some(key) = self.app_key.read().await.clone() {
            return Some(key);
        }
        let raw = tokio::fs::read_to_string(&self.auth_file).await.ok()?;
        let parsed: AuthFile = serde_json::from_str(&raw).ok()?;
        Some(parsed.username)
    }

    async fn store_key(&self, key: &str) -> Result<(), GatewayError> {
        let contents = serde_json::to_string_pretty(&AuthFile {
            username: key.to_string(),
        })?;
        tokio::fs::write(&self.auth_file, contents).await?;
        *self.app_key.write().await = Some(key.to_string());
        Ok(())
    }

    /// Check whether a stored key is still accepted by the bridge.
    async fn verify_key(&self, key: &str) -> Result<bool, GatewayError> {
        let url = format!("{}/api/{key}/lights", self.base_url);
        let response: serde_json::Value = self.client.get(&url).send().await?.json().await?;
        match first_wire_error(&response) {
            Some((ERR_UNAUTHORIZED, _)) => Ok(false),
            Some((kind, description)) => Err(GatewayError::device(format!(
                "bridge error {kind}: {description}"
            ))),
            None => Ok(true),
        }
    }

    /// Register a new application key (`POST /api`). The bridge refuses
    /// with error type 101 until the link button is pressed.
    async fn register(&self) -> Result<ConnectOutcome, GatewayError> {
        let url = format!("{}/api", self.base_url);
        let response: serde_json::Value = self
            .client
            .post(&url)
            .json(&json!({ "devicetype": DEVICE_TYPE }))
            .send()
            .await?
            .json()
            .await?;

        if let Some((kind, description)) = first_wire_error(&response) {
            if kind == ERR_LINK_BUTTON {
                info!("bridge requires link-button pairing");
                return Ok(ConnectOutcome::PairingRequired);
            }
            return Err(GatewayError::device(format!(
                "bridge error {kind}: {description}"
            )));
        }

        let key = response
            .as_array()
            .and_then(|entries| entries.first())
            .and_then(|entry| entry.get("success"))
            .and_then(|s| s.get("username"))
            .and_then(|v| v.as_str())
            .ok_or_else(|| GatewayError::device("registration returned no application key"))?
            .to_string();

        self.store_key(&key).await?;
        info!("registered new application key with bridge");
        Ok(ConnectOutcome::Authorized)
    }

    async fn current_key(&self) -> Result<String, GatewayError> {
        self.app_key
            .read()
            .await
            .clone()
            .ok_or_else(|| GatewayError::device("no application key; bridge not connected"))
    }
}

#[async_trait]
impl BridgeClient for HueBridgeClient {
    async fn connect(&self) -> Result<ConnectOutcome, GatewayError> {
        if let Some(key) = self.load_stored_key().await {
            if self.verify_key(&key).await? {
                *self.app_key.write().await = Some(key);
                return Ok(ConnectOutcome::Authorized);
            }
            warn!("stored application key rejected by bridge, re-registering");
        }
        self.register().await
    }

    async fn set_attribute(
        &self,
        light_id: u32,
        command: LightCommand,
    ) -> Result<(), GatewayError> {
        let key = self.current_key().await?;
        let url = format!("{}/api/{key}/lights/{light_id}/state", self.base_url);
        let body = json!({ command.attribute(): command.wire_value() });
        debug!(light_id, attribute = command.attribute(), "sending light command");

        let response: serde_json::Value =
            self.client.put(&url).json(&body).send().await?.json().await?;
        if let Some((kind, description)) = first_wire_error(&response) {
            return Err(GatewayError::device(format!(
                "bridge error {kind}: {description}"
            )));
        }
        Ok(())
    }

    async fn list_lights(&self) -> Result<Vec<LightSummary>, GatewayError> {
        let key = self.current_key().await?;
        let url = format!("{}/api/{key}/lights", self.base_url);
        let response: serde_json::Value = self.client.get(&url).send().await?.json().await?;

        if let Some((kind, description)) = first_wire_error(&response) {
            return Err(GatewayError::device(format!(
                "bridge error {kind}: {description}"
            )));
        }

        let map = response
            .as_object()
            .ok_or_else(|| GatewayError::device("unexpected lights payload from bridge"))?;

        let mut lights = Vec::with_capacity(map.len());
        for (id, light) in map {
            let Ok(id) = id.parse::<u32>() else {
                continue;
            };
            let name = light
                .get("name")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string();
            let on = light
                .get("state")
                .and_then(|s| s.get("on"))
                .and_then(|v| v.as_bool())
                .unwrap_or(false);
            lights.push(LightSummary { id, name, on });
        }
        lights.sort_by_key(|l| l.id);
        Ok(lights)
    }
}
