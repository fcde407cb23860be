//! API route handlers for location tracking and safety scoring.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use geofence::{evaluate_position, GeoPoint, GeofenceEvaluation, GeofenceZone};
use safety_scoring::{
    behavior_subscore, composite_score, detect_anomalies, incident_subscore, location_subscore,
    risk_subscore, AnomalyReport, BehaviorInputs, CompositeResult, IncidentInputs, LocationInputs,
    PositionSample, RiskInputs, SubscoreSet,
};

use crate::validate::{self, ValidationError};
use crate::AppState;

/// Raw position block of a device report.
#[derive(Debug, Clone, Deserialize)]
pub struct PositionReport {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub accuracy_m: Option<f64>,
    #[serde(default)]
    pub altitude_m: Option<f64>,
    #[serde(default)]
    pub heading_deg: Option<f64>,
    #[serde(default)]
    pub speed_ms: Option<f64>,
    pub timestamp: DateTime<Utc>,
}

/// Device metadata accompanying a report. Stored on the record only;
/// it does not influence scoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceInfo {
    #[serde(default)]
    pub device_id: Option<String>,
    #[serde(default)]
    pub battery_pct: Option<f64>,
    #[serde(default)]
    pub network_type: Option<String>,
}

/// Tracking context for a report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingContext {
    #[serde(default)]
    pub activity_type: Option<String>,
    #[serde(default)]
    pub update_frequency_sec: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct LocationUpdateRequest {
    pub tourist_id: String,
    pub position: PositionReport,
    #[serde(default)]
    pub device: Option<DeviceInfo>,
    #[serde(default)]
    pub context: Option<TrackingContext>,
}

/// Stored/returned result of one location update.
#[derive(Debug, Serialize)]
pub struct LocationRecord {
    pub record_id: Uuid,
    pub tourist_id: String,
    pub position: PositionSample,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device: Option<DeviceInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<TrackingContext>,
    pub geofence: GeofenceEvaluation,
    pub anomalies: AnomalyReport,
    pub safety: CompositeResult,
}

/// Optional location section of a safety-score recompute.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LocationSection {
    #[serde(default)]
    pub accuracy_m: Option<f64>,
    #[serde(default)]
    pub hour_of_day: Option<u8>,
    #[serde(default)]
    pub position: Option<GeoPoint>,
}

#[derive(Debug, Deserialize)]
pub struct SafetyScoreRequest {
    pub tourist_id: String,
    #[serde(default)]
    pub location_data: Option<LocationSection>,
    #[serde(default)]
    pub behavior_data: Option<BehaviorInputs>,
    #[serde(default)]
    pub risk_factors: Option<RiskInputs>,
    #[serde(default)]
    pub incident_history: Option<IncidentInputs>,
}

/// Validation failures map to 422 with field-level detail.
#[derive(Debug)]
pub struct ApiError(ValidationError);

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({
            "error": "validation_failed",
            "detail": self.0.to_string(),
        }));
        (StatusCode::UNPROCESSABLE_ENTITY, body).into_response()
    }
}

/// POST /api/v1/location/update
///
/// Evaluates geofence membership and movement anomalies for the new
/// sample, computes the composite safety score, and appends the sample
/// to the tourist's bounded history window. The history mutex is held
/// across the read-and-append cycle so concurrent reports for one
/// tourist serialize cleanly.
pub async fn update_location(
    State(state): State<AppState>,
    Json(req): Json<LocationUpdateRequest>,
) -> Result<Json<LocationRecord>, ApiError> {
    validate::validate_location_update(&req)?;

    let sample = PositionSample {
        tourist_id: req.tourist_id.clone(),
        latitude: req.position.latitude,
        longitude: req.position.longitude,
        accuracy_m: req.position.accuracy_m,
        altitude_m: req.position.altitude_m,
        heading_deg: req.position.heading_deg,
        speed_ms: req.position.speed_ms,
        timestamp: req.position.timestamp,
    };

    let position = GeoPoint {
        latitude: sample.latitude,
        longitude: sample.longitude,
    };
    let geofence = evaluate_position(&position, state.zones.all());

    let entry = state.history.entry(&req.tourist_id).await;
    let mut history = entry.lock().await;

    let prior = history.snapshot();
    let anomalies = detect_anomalies(&sample, &prior);

    let location_inputs = LocationInputs {
        accuracy_m: sample.accuracy_m,
        hour_of_day: Some(sample.timestamp.hour() as u8),
    };
    let subscores = SubscoreSet {
        location: location_subscore(&location_inputs, &geofence),
        behavior: behavior_subscore(&BehaviorInputs::default()),
        risk: risk_subscore(&RiskInputs::default()),
        incident: incident_subscore(&IncidentInputs::default()),
    };
    let safety = composite_score(subscores, &geofence);

    history.push(sample.clone());
    drop(history);

    tracing::info!(
        "Location update for {}: score {:.0}, {} alerts, {} anomalies",
        req.tourist_id,
        safety.composite_score,
        safety.alerts.len(),
        anomalies.findings.len()
    );

    Ok(Json(LocationRecord {
        record_id: Uuid::new_v4(),
        tourist_id: req.tourist_id,
        position: sample,
        device: req.device,
        context: req.context,
        geofence,
        anomalies,
        safety,
    }))
}

/// POST /api/v1/safety-score
///
/// Recomputes the composite score from whatever sections the caller
/// supplies; absent sections fall back to their subscore bases.
pub async fn compute_safety_score(
    State(state): State<AppState>,
    Json(req): Json<SafetyScoreRequest>,
) -> Result<Json<CompositeResult>, ApiError> {
    validate::validate_score_request(&req)?;

    let location = req.location_data.unwrap_or_default();
    let geofence = match &location.position {
        Some(pos) => evaluate_position(pos, state.zones.all()),
        None => GeofenceEvaluation::none(),
    };

    let location_inputs = LocationInputs {
        accuracy_m: location.accuracy_m,
        hour_of_day: location.hour_of_day,
    };
    let subscores = SubscoreSet {
        location: location_subscore(&location_inputs, &geofence),
        behavior: behavior_subscore(&req.behavior_data.unwrap_or_default()),
        risk: risk_subscore(&req.risk_factors.unwrap_or_default()),
        incident: incident_subscore(&req.incident_history.unwrap_or_default()),
    };

    let result = composite_score(subscores, &geofence);

    tracing::debug!(
        "Score recompute for {}: {:.0} ({:?})",
        req.tourist_id,
        result.composite_score,
        result.risk_level
    );

    Ok(Json(result))
}

/// GET /api/v1/zones
pub async fn list_zones(State(state): State<AppState>) -> Json<Vec<GeofenceZone>> {
    Json(state.zones.all().to_vec())
}
