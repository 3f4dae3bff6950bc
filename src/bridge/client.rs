use async_trait::async_trait;

use crate::error::GatewayError;
use crate::models::light::LightSummary;

/// Outcome of a connect attempt that reached the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectOutcome {
    Authorized,
    /// The bridge requires the physical link button before it will
    /// authorize this application.
    PairingRequired,
}

/// One native-domain command for a single light attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightCommand {
    On(bool),
    Bri(u8),
    Hue(u16),
    Sat(u8),
}

impl LightCommand {
    /// Attribute name in the bridge's wire protocol.
    pub fn attribute(&self) -> &'static str {
        match self {
            LightCommand::On(_) => "on",
            LightCommand::Bri(_) => "bri",
            LightCommand::Hue(_) => "hue",
            LightCommand::Sat(_) => "sat",
        }
    }

    pub fn wire_value(&self) -> serde_json::Value {
        match self {
            LightCommand::On(b) => serde_json::json!(b),
            LightCommand::Bri(v) => serde_json::json!(v),
            LightCommand::Hue(v) => serde_json::json!(v),
            LightCommand::Sat(v) => serde_json::json!(v),
        }
    }
}

/// Capability interface over the physical bridge. The session depends on
/// this seam; tests substitute a scripted implementation.
#[async_trait]
pub trait BridgeClient: Send + Sync {
    /// Establish and authorize the connection. A reachable bridge that
    /// refuses authorization is `PairingRequired`, not an error; transport
    /// failures are errors.
    async fn connect(&self) -> Result<ConnectOutcome, GatewayError>;

    /// Send one attribute command to one light. Requires a prior
    /// successful `connect`.
    async fn set_attribute(&self, light_id: u32, command: LightCommand)
        -> Result<(), GatewayError>;

    /// Enumerate the bridge's lights. Zero lights is an empty vec.
    async fn list_lights(&self) -> Result<Vec<LightSummary>, GatewayError>;
}
