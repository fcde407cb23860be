//! Alert Generation
//!
//! Threshold-triggered alert descriptors derived from the composite
//! score, the individual subscores, and geofence violations. Purely
//! derived and stateless: every evaluation produces a fresh, complete
//! alert set, and deduplication across evaluations is the consumer's
//! responsibility.

use geofence::GeofenceEvaluation;
use serde::{Deserialize, Serialize};

use crate::composite::SubscoreSet;
use crate::Severity;

/// Composite below this is a critical alert.
pub const CRITICAL_SCORE_THRESHOLD: f64 = 40.0;
/// Composite below this (and at or above critical) is a low-score alert.
pub const LOW_SCORE_THRESHOLD: f64 = 60.0;
/// Location subscore alert threshold.
pub const LOCATION_RISK_THRESHOLD: f64 = 40.0;
/// Behavior subscore alert threshold.
pub const BEHAVIOR_ALERT_THRESHOLD: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    CriticalSafetyScore,
    LowSafetyScore,
    LocationRisk,
    BehaviorAlert,
    GeofenceViolation,
}

/// One emitted alert descriptor. This crate only emits these; delivery
/// is an external concern.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub kind: AlertKind,
    pub severity: Severity,
    pub message: String,
    pub action_required: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<String>,
}

/// Alerts derived from the composite score and individual subscores.
pub fn score_alerts(composite: f64, subscores: &SubscoreSet) -> Vec<Alert> {
    let mut alerts = Vec::new();

    if composite < CRITICAL_SCORE_THRESHOLD {
        alerts.push(Alert {
            kind: AlertKind::CriticalSafetyScore,
            severity: Severity::High,
            message: format!("Safety score critically low ({composite:.0}/100)"),
            action_required: true,
            actions: vec![
                "Dispatch nearest response unit".to_string(),
                "Call the tourist immediately".to_string(),
                "Notify registered emergency contacts".to_string(),
            ],
        });
    } else if composite < LOW_SCORE_THRESHOLD {
        alerts.push(Alert {
            kind: AlertKind::LowSafetyScore,
            severity: Severity::Medium,
            message: format!("Safety score below normal range ({composite:.0}/100)"),
            action_required: false,
            actions: Vec::new(),
        });
    }

    if subscores.location.score < LOCATION_RISK_THRESHOLD {
        alerts.push(Alert {
            kind: AlertKind::LocationRisk,
            severity: Severity::Medium,
            message: format!(
                "Current location conditions are unfavorable (score {:.0}/100)",
                subscores.location.score
            ),
            action_required: false,
            actions: Vec::new(),
        });
    }

    if subscores.behavior.score < BEHAVIOR_ALERT_THRESHOLD {
        alerts.push(Alert {
            kind: AlertKind::BehaviorAlert,
            severity: Severity::Low,
            message: format!(
                "Check-in behavior needs attention (score {:.0}/100)",
                subscores.behavior.score
            ),
            action_required: false,
            actions: Vec::new(),
        });
    }

    alerts
}

/// One high-severity alert per geofence violation, carrying the zone's
/// entry message.
pub fn geofence_violation_alerts(geofence: &GeofenceEvaluation) -> Vec<Alert> {
    geofence
        .violations
        .iter()
        .map(|zone| Alert {
            kind: AlertKind::GeofenceViolation,
            severity: Severity::High,
            message: zone.entry_message.clone(),
            action_required: true,
            actions: Vec::new(),
        })
        .collect()
}
