use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};

use super::client::{BridgeClient, ConnectOutcome, LightCommand};
use super::translate;
use crate::error::GatewayError;
use crate::models::light::{LightStateRequest, LightSummary};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BridgeConnectionState {
    Unconfigured,
    PairingRequired,
    Connected,
    Unreachable,
}

impl fmt::Display for BridgeConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BridgeConnectionState::Unconfigured => "unconfigured",
            BridgeConnectionState::PairingRequired => "pairing_required",
            BridgeConnectionState::Connected => "connected",
            BridgeConnectionState::Unreachable => "unreachable",
        };
        f.write_str(name)
    }
}

/// Result of a connect attempt: the state it left the session in, plus an
/// optional diagnostic. Connect never propagates transport errors.
#[derive(Debug, Clone, Serialize)]
pub struct ConnectReport {
    pub state: BridgeConnectionState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Owns the single long-lived connection to one bridge. Light-control
/// requests never trigger connects; transitions happen only through
/// `connect()` (at startup or on demand).
pub struct BridgeSession {
    client: Arc<dyn BridgeClient>,
    state: RwLock<BridgeConnectionState>,
    // Single connect-in-flight: concurrent connect() calls collapse into
    // one attempt, late callers observe the winner's resulting state.
    connect_gate: Mutex<()>,
}

impl BridgeSession {
    pub fn new(client: Arc<dyn BridgeClient>) -> Self {
        Self {
            client,
            state: RwLock::new(BridgeConnectionState::Unconfigured),
            connect_gate: Mutex::new(()),
        }
    }

    pub async fn state(&self) -> BridgeConnectionState {
        *self.state.read().await
    }

    pub async fn connect(&self) -> ConnectReport {
        let _guard = match self.connect_gate.try_lock() {
            Ok(guard) => guard,
            Err(_) => {
                // Another connect is in flight; wait for it and report
                // the state it produced.
                let _observed = self.connect_gate.lock().await;
                return ConnectReport {
                    state: *self.state.read().await,
                    detail: None,
                };
            }
        };

        let (state, detail) = match self.client.connect().await {
            Ok(ConnectOutcome::Authorized) => (BridgeConnectionState::Connected, None),
            Ok(ConnectOutcome::PairingRequired) => {
                (BridgeConnectionState::PairingRequired, None)
            }
            Err(err) => (BridgeConnectionState::Unreachable, Some(err.to_string())),
        };

        *self.state.write().await = state;
        match &detail {
            None => info!(%state, "bridge connect attempt finished"),
            Some(detail) => warn!(%state, detail, "bridge connect attempt failed"),
        }
        ConnectReport { state, detail }
    }

    async fn require_connected(&self) -> Result<(), GatewayError> {
        let state = *self.state.read().await;
        if state == BridgeConnectionState::Connected {
            Ok(())
        } else {
            Err(GatewayError::BridgeNotReady { state })
        }
    }

    /// Apply a normalized state update to one light. `on` is applied before
    /// brightness and color because the device treats `on` as a
    /// precondition for visible brightness/color effects. Each field is an
    /// independent command; a failed field does not roll back or stop the
    /// others, and failures are reported per field.
    pub async fn set_light(
        &self,
        light_id: u32,
        request: &LightStateRequest,
    ) -> Result<(), GatewayError> {
        self.require_connected().await?;

        // Translate everything up front so an out-of-range field is
        // rejected before any command reaches the device.
        let mut commands = Vec::new();
        if let Some(on) = request.on {
            commands.push(LightCommand::On(on));
        }
        if let Some(percent) = request.bri {
            commands.push(LightCommand::Bri(translate::to_native_brightness(percent)?));
        }
        if let Some(color) = request.color {
            commands.push(LightCommand::Hue(translate::to_native_hue(color.h)?));
            commands.push(LightCommand::Sat(translate::to_native_saturation(color.s)?));
        }

        let mut failures = Vec::new();
        for command in commands {
            if let Err(err) = self.client.set_attribute(light_id, command).await {
                // A transient command failure is reported to the caller
                // but does not demote the session state.
                warn!(light_id, attribute = command.attribute(), %err, "light command failed");
                failures.push(format!("{}: {err}", command.attribute()));
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(GatewayError::device(failures.join("; ")))
        }
    }

    pub async fn list_lights(&self) -> Result<Vec<LightSummary>, GatewayError> {
        self.require_connected().await?;
        self.client.list_lights().await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::models::light::ColorRequest;

    #[derive(Debug, Clone, Copy)]
    enum ScriptedConnect {
        Authorized,
        PairingRequired,
        NetworkError,
    }

    struct ScriptedClient {
        connect_result: ScriptedConnect,
        connect_delay: Duration,
        connect_calls: AtomicUsize,
        commands: std::sync::Mutex<Vec<(u32, LightCommand)>>,
        failing_attribute: Option<&'static str>,
        lights: Vec<LightSummary>,
    }

    impl ScriptedClient {
        fn new(connect_result: ScriptedConnect) -> Self {
            Self {
                connect_result,
                connect_delay: Duration::ZERO,
                connect_calls: AtomicUsize::new(0),
                commands: std::sync::Mutex::new(Vec::new()),
                failing_attribute: None,
                lights: Vec::new(),
            }
        }

        fn sent(&self) -> Vec<(u32, LightCommand)> {
            self.commands.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl BridgeClient for ScriptedClient {
        async fn connect(&self) -> Result<ConnectOutcome, GatewayError> {
            self.connect_calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.connect_delay).await;
            match self.connect_result {
                ScriptedConnect::Authorized => Ok(ConnectOutcome::Authorized),
                ScriptedConnect::PairingRequired => Ok(ConnectOutcome::PairingRequired),
                ScriptedConnect::NetworkError => {
                    Err(GatewayError::device("connection refused"))
                }
            }
        }

        async fn set_attribute(
            &self,
            light_id: u32,
            command: LightCommand,
        ) -> Result<(), GatewayError> {
            if self.failing_attribute == Some(command.attribute()) {
                return Err(GatewayError::device("light unreachable"));
            }
            self.commands.lock().unwrap().push((light_id, command));
            Ok(())
        }

        async fn list_lights(&self) -> Result<Vec<LightSummary>, GatewayError> {
            Ok(self.lights.clone())
        }
    }

    async fn connected_session(client: Arc<ScriptedClient>) -> BridgeSession {
        let session = BridgeSession::new(client);
        assert_eq!(
            session.connect().await.state,
            BridgeConnectionState::Connected
        );
        session
    }

    #[tokio::test]
    async fn test_starts_unconfigured() {
        let session = BridgeSession::new(Arc::new(ScriptedClient::new(
            ScriptedConnect::Authorized,
        )));
        assert_eq!(session.state().await, BridgeConnectionState::Unconfigured);
    }

    #[tokio::test]
    async fn test_connect_transitions() {
        for (script, expected) in [
            (ScriptedConnect::Authorized, BridgeConnectionState::Connected),
            (
                ScriptedConnect::PairingRequired,
                BridgeConnectionState::PairingRequired,
            ),
            (
                ScriptedConnect::NetworkError,
                BridgeConnectionState::Unreachable,
            ),
        ] {
            let session = BridgeSession::new(Arc::new(ScriptedClient::new(script)));
            let report = session.connect().await;
            assert_eq!(report.state, expected);
            assert_eq!(session.state().await, expected);
        }
    }

    #[tokio::test]
    async fn test_unreachable_report_carries_diagnostic() {
        let session = BridgeSession::new(Arc::new(ScriptedClient::new(
            ScriptedConnect::NetworkError,
        )));
        let report = session.connect().await;
        assert!(report.detail.unwrap().contains("connection refused"));
    }

    #[tokio::test]
    async fn test_set_light_fails_fast_when_not_connected() {
        let client = Arc::new(ScriptedClient::new(ScriptedConnect::Authorized));
        let session = BridgeSession::new(client.clone());

        let request = LightStateRequest {
            on: Some(true),
            ..Default::default()
        };
        let err = session.set_light(1, &request).await.unwrap_err();
        assert!(matches!(
            err,
            GatewayError::BridgeNotReady {
                state: BridgeConnectionState::Unconfigured
            }
        ));
        // Device client must not have been invoked at all.
        assert!(client.sent().is_empty());
    }

    #[tokio::test]
    async fn test_on_applied_before_brightness() {
        let client = Arc::new(ScriptedClient::new(ScriptedConnect::Authorized));
        let session = connected_session(client.clone()).await;

        let request = LightStateRequest {
            on: Some(true),
            bri: Some(50.0),
            color: None,
        };
        session.set_light(3, &request).await.unwrap();

        assert_eq!(
            client.sent(),
            vec![(3, LightCommand::On(true)), (3, LightCommand::Bri(127))]
        );
    }

    #[tokio::test]
    async fn test_color_translates_hue_and_saturation() {
        let client = Arc::new(ScriptedClient::new(ScriptedConnect::Authorized));
        let session = connected_session(client.clone()).await;

        let request = LightStateRequest {
            on: None,
            bri: None,
            color: Some(ColorRequest { h: 180.0, s: 0.5 }),
        };
        session.set_light(7, &request).await.unwrap();

        assert_eq!(
            client.sent(),
            vec![(7, LightCommand::Hue(32768)), (7, LightCommand::Sat(127))]
        );
    }

    #[tokio::test]
    async fn test_out_of_range_rejected_before_any_command() {
        let client = Arc::new(ScriptedClient::new(ScriptedConnect::Authorized));
        let session = connected_session(client.clone()).await;

        let request = LightStateRequest {
            on: Some(true),
            bri: Some(150.0),
            color: None,
        };
        let err = session.set_light(1, &request).await.unwrap_err();
        assert!(matches!(err, GatewayError::InvalidValue(_)));
        assert!(client.sent().is_empty());
    }

    #[tokio::test]
    async fn test_partial_failure_reported_per_field() {
        let mut scripted = ScriptedClient::new(ScriptedConnect::Authorized);
        scripted.failing_attribute = Some("bri");
        let client = Arc::new(scripted);
        let session = connected_session(client.clone()).await;

        let request = LightStateRequest {
            on: Some(true),
            bri: Some(50.0),
            color: Some(ColorRequest { h: 0.0, s: 1.0 }),
        };
        let err = session.set_light(2, &request).await.unwrap_err();
        assert!(matches!(err, GatewayError::Device { .. }));
        assert!(err.to_string().contains("bri"));

        // The failed field does not stop the rest, and the session does
        // not demote to Unreachable on a transient command failure.
        assert_eq!(
            client.sent(),
            vec![
                (2, LightCommand::On(true)),
                (2, LightCommand::Hue(0)),
                (2, LightCommand::Sat(254)),
            ]
        );
        assert_eq!(session.state().await, BridgeConnectionState::Connected);
    }

    #[tokio::test]
    async fn test_empty_request_is_a_noop() {
        let client = Arc::new(ScriptedClient::new(ScriptedConnect::Authorized));
        let session = connected_session(client.clone()).await;

        session
            .set_light(1, &LightStateRequest::default())
            .await
            .unwrap();
        assert!(client.sent().is_empty());
    }

    #[tokio::test]
    async fn test_list_lights_requires_connected() {
        let session = BridgeSession::new(Arc::new(ScriptedClient::new(
            ScriptedConnect::Authorized,
        )));
        let err = session.list_lights().await.unwrap_err();
        assert!(matches!(err, GatewayError::BridgeNotReady { .. }));
    }

    #[tokio::test]
    async fn test_zero_lights_is_empty_not_error() {
        let client = Arc::new(ScriptedClient::new(ScriptedConnect::Authorized));
        let session = connected_session(client.clone()).await;
        assert!(session.list_lights().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_connects_collapse_into_one_attempt() {
        let mut scripted = ScriptedClient::new(ScriptedConnect::Authorized);
        scripted.connect_delay = Duration::from_millis(50);
        let client = Arc::new(scripted);
        let session = Arc::new(BridgeSession::new(client.clone()));

        let first = tokio::spawn({
            let session = session.clone();
            async move { session.connect().await }
        });
        // Give the first call time to take the gate.
        tokio::time::sleep(Duration::from_millis(10)).await;
        let second = session.connect().await;
        let first = first.await.unwrap();

        assert_eq!(first.state, BridgeConnectionState::Connected);
        assert_eq!(second.state, BridgeConnectionState::Connected);
        assert_eq!(client.connect_calls.load(Ordering::SeqCst), 1);
    }
}
