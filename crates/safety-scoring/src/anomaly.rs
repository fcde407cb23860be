//! Movement Anomaly Detection
//!
//! Screens a new position report against the tourist's recent history
//! for three independent patterns, evaluated in fixed order:
//!
//! 1. Sudden location jump: > 5 km covered in under 5 minutes (+30 risk)
//! 2. Prolonged inactivity: < 50 m of movement over 2+ hours (+15 risk)
//! 3. Erratic movement: step-distance variance over the last four
//!    points above 10,000,000 m² (+20 risk)
//!
//! Rules are not mutually exclusive; contributions are additive and the
//! aggregate risk is clamped to [0, 100]. The movement pattern is
//! overwritten by each rule that fires, so the last firing rule wins.
//! A rule with insufficient history is skipped, never an error.

use chrono::{DateTime, Utc};
use geofence::haversine_m;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::Severity;

/// Jump rule: distance threshold (m) and time window (minutes).
pub const JUMP_DISTANCE_M: f64 = 5_000.0;
pub const JUMP_WINDOW_MIN: f64 = 5.0;
/// Jump rule risk contribution.
pub const JUMP_RISK: f64 = 30.0;

/// Inactivity rule: movement ceiling (m) and minimum elapsed (hours).
pub const INACTIVITY_DISTANCE_M: f64 = 50.0;
pub const INACTIVITY_HOURS: f64 = 2.0;
/// Inactivity rule risk contribution.
pub const INACTIVITY_RISK: f64 = 15.0;

/// Erratic rule: variance threshold over the three most recent step
/// distances, in squared meters.
pub const ERRATIC_VARIANCE_M2: f64 = 10_000_000.0;
/// Erratic rule risk contribution.
pub const ERRATIC_RISK: f64 = 20.0;
/// Prior samples required before the erratic rule applies.
pub const ERRATIC_MIN_PRIOR: usize = 3;

/// One device position report. Created per report, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PositionSample {
    pub tourist_id: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accuracy_m: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub altitude_m: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heading_deg: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed_ms: Option<f64>,
    pub timestamp: DateTime<Utc>,
}

impl PositionSample {
    /// Great-circle distance to another sample in meters.
    pub fn distance_m(&self, other: &PositionSample) -> f64 {
        haversine_m(self.latitude, self.longitude, other.latitude, other.longitude)
    }

    /// Elapsed time since another (earlier) sample, in whole-seconds
    /// precision expressed as fractional minutes.
    pub fn minutes_since(&self, other: &PositionSample) -> f64 {
        (self.timestamp - other.timestamp).num_seconds() as f64 / 60.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    SuddenLocationJump,
    ProlongedInactivity,
    ErraticMovement,
}

/// Observed movement pattern for the evaluation instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementPattern {
    Normal,
    Anomalous,
    Stationary,
    Erratic,
}

/// One detected anomaly with its numeric evidence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnomalyFinding {
    pub kind: AnomalyKind,
    pub severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_m: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elapsed_min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variance_m2: Option<f64>,
}

/// Aggregate result of one anomaly screening pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnomalyReport {
    pub findings: Vec<AnomalyFinding>,
    /// Aggregate risk contribution in [0, 100].
    pub anomaly_risk: f64,
    pub movement_pattern: MovementPattern,
}

impl AnomalyReport {
    /// Report for a sample with no usable history.
    pub fn normal() -> Self {
        Self {
            findings: Vec::new(),
            anomaly_risk: 0.0,
            movement_pattern: MovementPattern::Normal,
        }
    }
}

/// Screen `current` against `prior` (oldest first, `current` excluded).
pub fn detect_anomalies(current: &PositionSample, prior: &[PositionSample]) -> AnomalyReport {
    let mut report = AnomalyReport::normal();

    let previous = match prior.last() {
        Some(p) => p,
        None => return report,
    };

    let step_m = current.distance_m(previous);
    let elapsed_min = current.minutes_since(previous);

    // Rule 1: sudden location jump. An out-of-order report yields a
    // negative elapsed time; that is stale data, not a jump.
    if step_m > JUMP_DISTANCE_M && (0.0..JUMP_WINDOW_MIN).contains(&elapsed_min) {
        report.findings.push(AnomalyFinding {
            kind: AnomalyKind::SuddenLocationJump,
            severity: Severity::High,
            distance_m: Some(step_m),
            elapsed_min: Some(elapsed_min),
            variance_m2: None,
        });
        report.anomaly_risk += JUMP_RISK;
        report.movement_pattern = MovementPattern::Anomalous;
    }

    // Rule 2: prolonged inactivity
    if step_m < INACTIVITY_DISTANCE_M && elapsed_min > INACTIVITY_HOURS * 60.0 {
        report.findings.push(AnomalyFinding {
            kind: AnomalyKind::ProlongedInactivity,
            severity: Severity::Low,
            distance_m: Some(step_m),
            elapsed_min: Some(elapsed_min),
            variance_m2: None,
        });
        report.anomaly_risk += INACTIVITY_RISK;
        report.movement_pattern = MovementPattern::Stationary;
    }

    // Rule 3: erratic movement over the last four points
    if prior.len() >= ERRATIC_MIN_PRIOR {
        let tail = &prior[prior.len() - ERRATIC_MIN_PRIOR..];
        let mut steps = Vec::with_capacity(ERRATIC_MIN_PRIOR);
        for pair in tail.windows(2) {
            steps.push(pair[1].distance_m(&pair[0]));
        }
        steps.push(current.distance_m(&tail[ERRATIC_MIN_PRIOR - 1]));

        let variance = step_variance(&steps);
        if variance > ERRATIC_VARIANCE_M2 {
            report.findings.push(AnomalyFinding {
                kind: AnomalyKind::ErraticMovement,
                severity: Severity::Medium,
                distance_m: None,
                elapsed_min: None,
                variance_m2: Some(variance),
            });
            report.anomaly_risk += ERRATIC_RISK;
            report.movement_pattern = MovementPattern::Erratic;
        }
    }

    report.anomaly_risk = crate::clamp_score(report.anomaly_risk);

    if !report.findings.is_empty() {
        debug!(
            "Anomaly screen for {}: {} findings, risk {:.1}, pattern {:?}",
            current.tourist_id,
            report.findings.len(),
            report.anomaly_risk,
            report.movement_pattern
        );
    }

    report
}

/// Population variance of step distances. Empty input yields 0.
fn step_variance(steps: &[f64]) -> f64 {
    if steps.is_empty() {
        return 0.0;
    }
    let mean = steps.iter().sum::<f64>() / steps.len() as f64;
    steps.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / steps.len() as f64
}
