//! Safety Scoring Library
//!
//! Turns positional and behavioral signals for one tourist into a
//! bounded composite safety score, a risk tier, and actionable alerts.
//!
//! # Scoring Model (4-factor weighted composite)
//!
//! ```text
//! Composite = round(w_L·Location + w_B·Behavior + w_R·Risk + w_I·Incident)
//! ```
//!
//! | Subscore | Weight | Base | Signals |
//! |----------|--------|------|---------|
//! | Location | 0.25   | 70   | GPS accuracy, hour of day, geofence membership |
//! | Behavior | 0.35   | 80   | Check-ins, route adherence, feature usage, responsiveness |
//! | Risk     | 0.25   | 80   | Time of day, weather, crime rate, density, group, transport |
//! | Incident | 0.15   | 85   | Major/minor incidents, false alarms, recovery streak |
//!
//! Every subscore and the composite are clamped to [0, 100]. Every
//! evaluation is a pure function of its inputs: wall-clock time and the
//! local hour are passed in explicitly by the caller.

pub mod alerts;
pub mod anomaly;
pub mod composite;
pub mod subscores;

use serde::{Deserialize, Serialize};

pub use alerts::{Alert, AlertKind};
pub use anomaly::{
    detect_anomalies, AnomalyFinding, AnomalyKind, AnomalyReport, MovementPattern, PositionSample,
};
pub use composite::{composite_score, CompositeResult, RiskTier, SubscoreSet, WeightedContributions};
pub use subscores::{
    behavior_subscore, incident_subscore, location_subscore, risk_subscore, BehaviorInputs,
    CrimeRate, Factor, FactorName, IncidentInputs, LocationInputs, RiskInputs, Subscore,
    TimeOfDay, TouristDensity, Transportation, Weather,
};

/// Alert and anomaly severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// Clamp a running score into the representable [0, 100] band.
pub(crate) fn clamp_score(score: f64) -> f64 {
    score.clamp(0.0, 100.0)
}
