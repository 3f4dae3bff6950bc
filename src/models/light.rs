use serde::{Deserialize, Serialize};

/// Normalized light-state update. Absent fields are no-ops, not resets.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LightStateRequest {
    pub on: Option<bool>,
    /// Brightness percentage, 0-100
    pub bri: Option<f64>,
    pub color: Option<ColorRequest>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ColorRequest {
    /// Hue in degrees, 0 inclusive to 360 exclusive
    pub h: f64,
    /// Saturation fraction, 0-1
    pub s: f64,
}

impl LightStateRequest {
    pub fn is_empty(&self) -> bool {
        self.on.is_none() && self.bri.is_none() && self.color.is_none()
    }
}

/// Read-only snapshot of one light, fetched fresh per query.
#[derive(Debug, Clone, Serialize)]
pub struct LightSummary {
    pub id: u32,
    pub name: String,
    pub on: bool,
}
