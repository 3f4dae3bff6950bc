use axum::http::StatusCode;

use crate::bridge::session::BridgeConnectionState;

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("{0}")]
    InvalidValue(String),

    #[error("Bridge not ready (state: {state})")]
    BridgeNotReady { state: BridgeConnectionState },

    #[error("Device error: {message}")]
    Device { message: String },

    #[error("Graph document not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl GatewayError {
    pub fn invalid_value(message: impl Into<String>) -> Self {
        GatewayError::InvalidValue(message.into())
    }

    pub fn device(message: impl Into<String>) -> Self {
        GatewayError::Device {
            message: message.into(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::InvalidValue(_) => StatusCode::BAD_REQUEST,
            GatewayError::BridgeNotReady { .. } => StatusCode::SERVICE_UNAVAILABLE,
            GatewayError::Device { .. } | GatewayError::Http(_) => StatusCode::BAD_GATEWAY,
            GatewayError::NotFound(_) => StatusCode::NOT_FOUND,
            GatewayError::Json(_) | GatewayError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_type(&self) -> &'static str {
        match self {
            GatewayError::InvalidValue(_) => "invalid_value",
            GatewayError::BridgeNotReady { .. } => "bridge_not_ready",
            GatewayError::Device { .. } => "device",
            GatewayError::NotFound(_) => "not_found",
            GatewayError::Http(_) => "http",
            GatewayError::Json(_) => "json",
            GatewayError::Io(_) => "io",
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        let mut obj = serde_json::json!({
            "success": false,
            "error_type": self.error_type(),
            "error": self.to_string(),
        });
        // BridgeNotReady carries the state so the caller can decide
        // whether to prompt for link-button pairing.
        if let GatewayError::BridgeNotReady { state } = self {
            obj["bridge_state"] = serde_json::json!(state);
        }
        obj
    }
}
