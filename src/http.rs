//! Thin route layer over the gateway façade. No business logic here:
//! handlers extract, delegate, and wrap results in the uniform
//! success/error envelope.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tower_http::cors::CorsLayer;

use crate::error::GatewayError;
use crate::gateway::GatewayService;
use crate::models::light::LightStateRequest;

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self.to_json())).into_response()
    }
}

pub fn router(service: Arc<GatewayService>) -> Router {
    Router::new()
        .route("/api/light/:id/state", post(set_light_state))
        .route("/api/lights", get(list_lights))
        .route("/api/graph", post(save_default_graph).get(load_default_graph))
        .route("/api/graph/:name", post(save_graph).get(load_graph))
        .route("/api/bridge", get(bridge_status))
        .route("/api/bridge/connect", post(connect_bridge))
        // The caller is a browser UI served from another local origin.
        .layer(CorsLayer::permissive())
        .with_state(service)
}

async fn set_light_state(
    State(service): State<Arc<GatewayService>>,
    Path(light_id): Path<u32>,
    Json(request): Json<LightStateRequest>,
) -> Result<Json<serde_json::Value>, GatewayError> {
    service.set_light_state(light_id, &request).await?;
    Ok(Json(json!({ "success": true })))
}

async fn list_lights(
    State(service): State<Arc<GatewayService>>,
) -> Result<Json<serde_json::Value>, GatewayError> {
    let lights = service.list_lights().await?;
    Ok(Json(json!({ "success": true, "lights": lights })))
}

async fn save_graph(
    State(service): State<Arc<GatewayService>>,
    Path(name): Path<String>,
    content: String,
) -> Result<Json<serde_json::Value>, GatewayError> {
    service.save_graph(Some(&name), content).await?;
    Ok(Json(json!({ "success": true })))
}

async fn load_graph(
    State(service): State<Arc<GatewayService>>,
    Path(name): Path<String>,
) -> Result<Json<serde_json::Value>, GatewayError> {
    let content = service.load_graph(Some(&name)).await?;
    Ok(Json(json!({ "success": true, "content": content })))
}

async fn save_default_graph(
    State(service): State<Arc<GatewayService>>,
    content: String,
) -> Result<Json<serde_json::Value>, GatewayError> {
    service.save_graph(None, content).await?;
    Ok(Json(json!({ "success": true })))
}

async fn load_default_graph(
    State(service): State<Arc<GatewayService>>,
) -> Result<Json<serde_json::Value>, GatewayError> {
    let content = service.load_graph(None).await?;
    Ok(Json(json!({ "success": true, "content": content })))
}

async fn bridge_status(State(service): State<Arc<GatewayService>>) -> Json<serde_json::Value> {
    Json(json!({ "success": true, "bridge_state": service.bridge_status().await }))
}

async fn connect_bridge(State(service): State<Arc<GatewayService>>) -> Json<serde_json::Value> {
    let report = service.connect_bridge().await;
    Json(json!({
        "success": report.state == crate::bridge::session::BridgeConnectionState::Connected,
        "report": report,
    }))
}
