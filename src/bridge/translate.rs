//! Pure mappings from normalized request values to the bridge's native
//! integer domains. Out-of-range input is rejected, never clamped.

use crate::error::GatewayError;

pub const NATIVE_BRI_MAX: u16 = 254;
pub const NATIVE_HUE_MAX: u16 = 65535;
pub const NATIVE_SAT_MAX: u16 = 254;

/// Map a brightness percentage (0-100) into the bridge's 0-254 domain.
pub fn to_native_brightness(percent: f64) -> Result<u8, GatewayError> {
    if !percent.is_finite() || !(0.0..=100.0).contains(&percent) {
        return Err(GatewayError::invalid_value(format!(
            "brightness must be in [0, 100], got {percent}"
        )));
    }
    Ok((percent * f64::from(NATIVE_BRI_MAX) / 100.0).round() as u8)
}

/// Map hue degrees (0 inclusive to 360 exclusive) into 0-65535.
pub fn to_native_hue(degrees: f64) -> Result<u16, GatewayError> {
    if !degrees.is_finite() || !(0.0..360.0).contains(&degrees) {
        return Err(GatewayError::invalid_value(format!(
            "hue must be in [0, 360), got {degrees}"
        )));
    }
    Ok((degrees * f64::from(NATIVE_HUE_MAX) / 360.0).round() as u16)
}

/// Map a saturation fraction (0-1) into 0-254.
pub fn to_native_saturation(fraction: f64) -> Result<u8, GatewayError> {
    if !fraction.is_finite() || !(0.0..=1.0).contains(&fraction) {
        return Err(GatewayError::invalid_value(format!(
            "saturation must be in [0, 1], got {fraction}"
        )));
    }
    Ok((fraction * f64::from(NATIVE_SAT_MAX)).round() as u8)
}
