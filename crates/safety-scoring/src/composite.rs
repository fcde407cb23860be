//! Composite Scorer
//!
//! Combines the four subscores with fixed weights into one rounded
//! 0-100 composite score, derives the risk tier, and assembles the
//! capped recommendation list plus the alert set for this evaluation.

use geofence::GeofenceEvaluation;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::alerts::{self, Alert};
use crate::subscores::Subscore;

/// Composite weights. Sum = 1.0 exactly.
pub const W_LOCATION: f64 = 0.25;
pub const W_BEHAVIOR: f64 = 0.35;
pub const W_RISK: f64 = 0.25;
pub const W_INCIDENT: f64 = 0.15;

/// Maximum number of recommendations returned per evaluation.
pub const MAX_RECOMMENDATIONS: usize = 5;

/// Subscores below this threshold earn a targeted recommendation.
const WEAK_SUBSCORE_THRESHOLD: f64 = 60.0;

/// Risk tier derived from the composite score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

impl RiskTier {
    pub fn from_score(score: f64) -> Self {
        if score < 40.0 {
            RiskTier::High
        } else if score < 70.0 {
            RiskTier::Medium
        } else {
            RiskTier::Low
        }
    }
}

/// The four component scores for one evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscoreSet {
    pub location: Subscore,
    pub behavior: Subscore,
    pub risk: Subscore,
    pub incident: Subscore,
}

/// Weighted contribution of each subscore to the composite.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WeightedContributions {
    pub location: f64,
    pub behavior: f64,
    pub risk: f64,
    pub incident: f64,
}

/// Full result of one composite evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompositeResult {
    /// Rounded composite score in [0, 100].
    pub composite_score: f64,
    pub risk_level: RiskTier,
    pub subscores: SubscoreSet,
    pub weighted: WeightedContributions,
    /// At most five entries, highest priority first.
    pub recommendations: Vec<String>,
    /// Fresh alert set for this instant; no cross-call dedup.
    pub alerts: Vec<Alert>,
}

/// Combine subscores into the composite result. Geofence violations
/// from the evaluation are merged into the alert list.
pub fn composite_score(subscores: SubscoreSet, geofence: &GeofenceEvaluation) -> CompositeResult {
    let weighted = WeightedContributions {
        location: W_LOCATION * subscores.location.score,
        behavior: W_BEHAVIOR * subscores.behavior.score,
        risk: W_RISK * subscores.risk.score,
        incident: W_INCIDENT * subscores.incident.score,
    };

    let composite =
        (weighted.location + weighted.behavior + weighted.risk + weighted.incident).round();
    let risk_level = RiskTier::from_score(composite);

    let recommendations = build_recommendations(composite, &subscores);

    let mut alert_list = alerts::score_alerts(composite, &subscores);
    alert_list.extend(alerts::geofence_violation_alerts(geofence));

    debug!(
        "Composite {:.0} ({:?}): L={:.1} B={:.1} R={:.1} I={:.1}, {} alerts",
        composite,
        risk_level,
        subscores.location.score,
        subscores.behavior.score,
        subscores.risk.score,
        subscores.incident.score,
        alert_list.len()
    );

    CompositeResult {
        composite_score: composite,
        risk_level,
        subscores,
        weighted,
        recommendations,
        alerts: alert_list,
    }
}

/// Tiered generic recommendations first, then one targeted entry per
/// weak subscore in fixed order, truncated to the cap.
fn build_recommendations(composite: f64, subscores: &SubscoreSet) -> Vec<String> {
    let mut recs: Vec<String> = if composite < 50.0 {
        vec![
            "Contact the tourist helpline and share your live location".to_string(),
            "Move to the nearest verified safe zone".to_string(),
            "Stay with your group and avoid isolated areas".to_string(),
        ]
    } else if composite < 70.0 {
        vec![
            "Check in through the app more frequently".to_string(),
            "Prefer well-lit, populated routes".to_string(),
            "Keep your emergency contacts up to date".to_string(),
        ]
    } else {
        vec![
            "Keep following your planned route".to_string(),
            "Continue regular check-ins".to_string(),
        ]
    };

    if subscores.location.score < WEAK_SUBSCORE_THRESHOLD {
        recs.push("Enable high-accuracy GPS and stay within monitored zones".to_string());
    }
    if subscores.behavior.score < WEAK_SUBSCORE_THRESHOLD {
        recs.push("Respond promptly to check-in prompts".to_string());
    }
    if subscores.risk.score < WEAK_SUBSCORE_THRESHOLD {
        recs.push("Avoid travel after dark and use registered transport".to_string());
    }
    if subscores.incident.score < WEAK_SUBSCORE_THRESHOLD {
        recs.push("Review recent incidents with your tour coordinator".to_string());
    }

    recs.truncate(MAX_RECOMMENDATIONS);
    recs
}
