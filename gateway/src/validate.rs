//! Boundary validation for incoming requests.
//!
//! Malformed input is rejected here with field-level detail and never
//! reaches the scoring core. Enum membership is enforced earlier by
//! serde deserialization.

use thiserror::Error;

use crate::routes::{LocationUpdateRequest, SafetyScoreRequest};

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("{field}: value {value} out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("{0}: required field missing or empty")]
    Missing(&'static str),
}

pub type Result<T> = std::result::Result<T, ValidationError>;

fn check_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<()> {
    if value.is_nan() || value < min || value > max {
        return Err(ValidationError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
    Ok(())
}

fn check_coordinates(lat_field: &'static str, lat: f64, lon_field: &'static str, lon: f64) -> Result<()> {
    check_range(lat_field, lat, -90.0, 90.0)?;
    check_range(lon_field, lon, -180.0, 180.0)
}

fn check_percentage(field: &'static str, value: Option<f64>) -> Result<()> {
    match value {
        Some(v) => check_range(field, v, 0.0, 100.0),
        None => Ok(()),
    }
}

pub fn validate_location_update(req: &LocationUpdateRequest) -> Result<()> {
    if req.tourist_id.trim().is_empty() {
        return Err(ValidationError::Missing("tourist_id"));
    }

    check_coordinates(
        "position.latitude",
        req.position.latitude,
        "position.longitude",
        req.position.longitude,
    )?;

    if let Some(accuracy) = req.position.accuracy_m {
        check_range("position.accuracy_m", accuracy, 0.0, f64::MAX)?;
    }
    if let Some(heading) = req.position.heading_deg {
        check_range("position.heading_deg", heading, 0.0, 360.0)?;
    }
    if let Some(speed) = req.position.speed_ms {
        check_range("position.speed_ms", speed, 0.0, f64::MAX)?;
    }

    Ok(())
}

pub fn validate_score_request(req: &SafetyScoreRequest) -> Result<()> {
    if req.tourist_id.trim().is_empty() {
        return Err(ValidationError::Missing("tourist_id"));
    }

    if let Some(location) = &req.location_data {
        if let Some(pos) = &location.position {
            check_coordinates(
                "location_data.position.latitude",
                pos.latitude,
                "location_data.position.longitude",
                pos.longitude,
            )?;
        }
        if let Some(hour) = location.hour_of_day {
            check_range("location_data.hour_of_day", hour as f64, 0.0, 23.0)?;
        }
    }

    if let Some(behavior) = &req.behavior_data {
        check_percentage("behavior_data.check_in_frequency", behavior.check_in_frequency)?;
        check_percentage("behavior_data.route_adherence", behavior.route_adherence)?;
        check_percentage(
            "behavior_data.safety_feature_usage",
            behavior.safety_feature_usage,
        )?;
        if let Some(minutes) = behavior.response_time_min {
            check_range("behavior_data.response_time_min", minutes, 0.0, f64::MAX)?;
        }
    }

    Ok(())
}
