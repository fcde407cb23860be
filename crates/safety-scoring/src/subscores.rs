//! Subscore Calculators
//!
//! Four independent pure functions, one per signal family. Each starts
//! from a base score, applies a sequence of named additive adjustments,
//! and clamps the result to [0, 100]. Missing optional inputs simply
//! contribute nothing; no adjustment means no factor entry either, so
//! the factor list is an exact explanation of how the score was reached.

use geofence::GeofenceEvaluation;
use serde::{Deserialize, Serialize};

use crate::clamp_score;

pub const LOCATION_BASE: f64 = 70.0;
pub const BEHAVIOR_BASE: f64 = 80.0;
pub const RISK_BASE: f64 = 80.0;
pub const INCIDENT_BASE: f64 = 85.0;

/// Closed vocabulary of scoring factors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactorName {
    GpsAccuracy,
    HourOfDay,
    SafeZonePresence,
    UnsafeZonePresence,
    CheckInFrequency,
    RouteAdherence,
    SafetyFeatureUsage,
    ResponseTime,
    FalseAlarms,
    EmergencyContactUpdates,
    TimeOfDay,
    Weather,
    CrimeRate,
    TouristDensity,
    GroupSize,
    LocalGuide,
    Transportation,
    MajorIncidents,
    MinorIncidents,
    ResolvedIncidents,
    DaysSinceLastIncident,
}

/// One applied adjustment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Factor {
    pub name: FactorName,
    pub delta: f64,
}

/// A 0-100 component score with its explanation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscore {
    pub score: f64,
    pub factors: Vec<Factor>,
}

/// Accumulates named adjustments over a base, clamping at the end.
struct ScoreBuilder {
    score: f64,
    factors: Vec<Factor>,
}

impl ScoreBuilder {
    fn new(base: f64) -> Self {
        Self {
            score: base,
            factors: Vec::new(),
        }
    }

    fn apply(&mut self, name: FactorName, delta: f64) {
        self.score += delta;
        self.factors.push(Factor { name, delta });
    }

    fn finish(self) -> Subscore {
        Subscore {
            score: clamp_score(self.score),
            factors: self.factors,
        }
    }
}

/// Location subscore inputs. The geofence evaluation is passed
/// separately because it is shared with the alert generator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocationInputs {
    /// Reported GPS accuracy in meters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accuracy_m: Option<f64>,
    /// Local hour of day in [0, 23], supplied by the caller.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hour_of_day: Option<u8>,
}

/// Location subscore: base 70, adjusted for GPS fix quality, local
/// hour, and geofence membership.
pub fn location_subscore(inputs: &LocationInputs, geofence: &GeofenceEvaluation) -> Subscore {
    let mut b = ScoreBuilder::new(LOCATION_BASE);

    if let Some(accuracy) = inputs.accuracy_m {
        if accuracy < 10.0 {
            b.apply(FactorName::GpsAccuracy, 10.0);
        } else if accuracy > 100.0 {
            b.apply(FactorName::GpsAccuracy, -5.0);
        }
    }

    if let Some(hour) = inputs.hour_of_day {
        let delta = match hour {
            6..=18 => 15.0,
            19..=21 => 5.0,
            _ => -10.0,
        };
        b.apply(FactorName::HourOfDay, delta);
    }

    if geofence.in_safe_zone() {
        b.apply(FactorName::SafeZonePresence, 20.0);
    } else if geofence.in_any_zone() {
        b.apply(FactorName::UnsafeZonePresence, -10.0);
    }

    b.finish()
}

/// Behavior subscore inputs. Frequency/adherence/usage are 0-100 scales.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BehaviorInputs {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_in_frequency: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route_adherence: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub safety_feature_usage: Option<f64>,
    /// Average response time to check-in prompts, in minutes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time_min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub false_alarm_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emergency_contact_updates: Option<u32>,
}

/// Behavior subscore: base 80. The three percentage signals are
/// centered so a 50% reading contributes zero.
pub fn behavior_subscore(inputs: &BehaviorInputs) -> Subscore {
    let mut b = ScoreBuilder::new(BEHAVIOR_BASE);

    if let Some(freq) = inputs.check_in_frequency {
        b.apply(FactorName::CheckInFrequency, (freq / 100.0) * 25.0 - 12.5);
    }

    if let Some(adherence) = inputs.route_adherence {
        b.apply(FactorName::RouteAdherence, (adherence / 100.0) * 15.0 - 7.5);
    }

    if let Some(usage) = inputs.safety_feature_usage {
        b.apply(FactorName::SafetyFeatureUsage, (usage / 100.0) * 10.0 - 5.0);
    }

    if let Some(minutes) = inputs.response_time_min {
        let delta = if minutes <= 5.0 {
            10.0
        } else if minutes <= 15.0 {
            5.0
        } else {
            -10.0
        };
        b.apply(FactorName::ResponseTime, delta);
    }

    if let Some(count) = inputs.false_alarm_count {
        if count > 0 {
            b.apply(FactorName::FalseAlarms, -5.0 * count as f64);
        }
    }

    if let Some(count) = inputs.emergency_contact_updates {
        if count > 0 {
            b.apply(
                FactorName::EmergencyContactUpdates,
                (2.0 * count as f64).min(10.0),
            );
        }
    }

    b.finish()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeOfDay {
    Day,
    Evening,
    Night,
    Dawn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Weather {
    Clear,
    Rain,
    Storm,
    Fog,
    Extreme,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrimeRate {
    VeryLow,
    Low,
    Medium,
    High,
    VeryHigh,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TouristDensity {
    VeryLow,
    Low,
    Medium,
    High,
    VeryHigh,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transportation {
    PrivateVehicle,
    Taxi,
    PublicTransport,
    Bike,
    Walking,
}

/// Environmental risk-context inputs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RiskInputs {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_of_day: Option<TimeOfDay>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weather: Option<Weather>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crime_rate: Option<CrimeRate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tourist_density: Option<TouristDensity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_guide: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transportation: Option<Transportation>,
}

/// Risk-context subscore: base 80, categorical offsets per signal.
pub fn risk_subscore(inputs: &RiskInputs) -> Subscore {
    let mut b = ScoreBuilder::new(RISK_BASE);

    if let Some(tod) = inputs.time_of_day {
        let delta = match tod {
            TimeOfDay::Day => 15.0,
            TimeOfDay::Evening => 5.0,
            TimeOfDay::Night => -15.0,
            TimeOfDay::Dawn => -5.0,
        };
        b.apply(FactorName::TimeOfDay, delta);
    }

    if let Some(weather) = inputs.weather {
        let delta = match weather {
            Weather::Clear => 10.0,
            Weather::Rain => -5.0,
            Weather::Storm => -20.0,
            Weather::Fog => -10.0,
            Weather::Extreme => -25.0,
        };
        b.apply(FactorName::Weather, delta);
    }

    if let Some(crime) = inputs.crime_rate {
        let delta = match crime {
            CrimeRate::VeryLow => 20.0,
            CrimeRate::Low => 10.0,
            CrimeRate::Medium => 0.0,
            CrimeRate::High => -15.0,
            CrimeRate::VeryHigh => -30.0,
        };
        b.apply(FactorName::CrimeRate, delta);
    }

    if let Some(density) = inputs.tourist_density {
        let delta = match density {
            TouristDensity::VeryHigh => 15.0,
            TouristDensity::High => 10.0,
            TouristDensity::Medium => 5.0,
            TouristDensity::Low => -5.0,
            TouristDensity::VeryLow => -15.0,
        };
        b.apply(FactorName::TouristDensity, delta);
    }

    if let Some(size) = inputs.group_size {
        let delta = match size {
            0 => -15.0,
            2..=4 => 10.0,
            n if n > 4 => 5.0,
            _ => 0.0, // solo-but-tracked traveler, neutral
        };
        if delta != 0.0 {
            b.apply(FactorName::GroupSize, delta);
        }
    }

    if inputs.local_guide == Some(true) {
        b.apply(FactorName::LocalGuide, 15.0);
    }

    if let Some(transport) = inputs.transportation {
        let delta = match transport {
            Transportation::PrivateVehicle => 10.0,
            Transportation::Taxi => 8.0,
            Transportation::PublicTransport => 5.0,
            Transportation::Bike => -5.0,
            Transportation::Walking => -10.0,
        };
        b.apply(FactorName::Transportation, delta);
    }

    b.finish()
}

/// Incident-history inputs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IncidentInputs {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub major_incidents: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minor_incidents: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub false_alarms: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_incidents: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_since_last_incident: Option<u32>,
}

/// Incident-history subscore: base 85. Minor-incident, false-alarm and
/// resolution adjustments are capped; major incidents are not.
pub fn incident_subscore(inputs: &IncidentInputs) -> Subscore {
    let mut b = ScoreBuilder::new(INCIDENT_BASE);

    if let Some(count) = inputs.major_incidents {
        if count > 0 {
            b.apply(FactorName::MajorIncidents, -25.0 * count as f64);
        }
    }

    if let Some(count) = inputs.minor_incidents {
        if count > 0 {
            b.apply(FactorName::MinorIncidents, (-10.0 * count as f64).max(-30.0));
        }
    }

    if let Some(count) = inputs.false_alarms {
        if count > 0 {
            b.apply(FactorName::FalseAlarms, (-5.0 * count as f64).max(-20.0));
        }
    }

    if let Some(count) = inputs.resolved_incidents {
        if count > 0 {
            b.apply(FactorName::ResolvedIncidents, (5.0 * count as f64).min(15.0));
        }
    }

    if let Some(days) = inputs.days_since_last_incident {
        let delta = if days >= 30 {
            15.0
        } else if days >= 7 {
            8.0
        } else if days >= 1 {
            3.0
        } else {
            0.0
        };
        if delta != 0.0 {
            b.apply(FactorName::DaysSinceLastIncident, delta);
        }
    }

    b.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use geofence::{evaluate_position, GeoPoint, GeofenceZone, RiskLevel, ZoneKind};

    fn safe_zone_eval() -> GeofenceEvaluation {
        let zone = GeofenceZone {
            id: "S1".to_string(),
            name: "Safe".to_string(),
            kind: ZoneKind::SafeZone,
            center: GeoPoint {
                latitude: 26.9124,
                longitude: 75.7873,
            },
            radius_m: 500.0,
            risk_level: RiskLevel::Low,
            entry_message: "entry".to_string(),
            exit_message: "exit".to_string(),
        };
        evaluate_position(
            &GeoPoint {
                latitude: 26.9124,
                longitude: 75.7873,
            },
            &[zone],
        )
    }

    #[test]
    fn test_location_fixture_clamps_at_100() {
        // accuracy 5 m, hour 12, inside a safe zone: 70+10+15+20 = 115 -> 100
        let inputs = LocationInputs {
            accuracy_m: Some(5.0),
            hour_of_day: Some(12),
        };
        let sub = location_subscore(&inputs, &safe_zone_eval());
        assert_eq!(sub.score, 100.0);
        assert_eq!(sub.factors.len(), 3);
        let total: f64 = sub.factors.iter().map(|f| f.delta).sum();
        assert_eq!(total, 45.0);
    }

    #[test]
    fn test_location_no_inputs_is_base() {
        let sub = location_subscore(&LocationInputs::default(), &GeofenceEvaluation::none());
        assert_eq!(sub.score, LOCATION_BASE);
        assert!(sub.factors.is_empty());
    }

    #[test]
    fn test_location_night_outside_zones() {
        let inputs = LocationInputs {
            accuracy_m: Some(150.0),
            hour_of_day: Some(23),
        };
        let sub = location_subscore(&inputs, &GeofenceEvaluation::none());
        // 70 - 5 - 10
        assert_eq!(sub.score, 55.0);
    }

    #[test]
    fn test_location_non_safe_zone_penalty() {
        let zone = GeofenceZone {
            id: "R1".to_string(),
            name: "Market".to_string(),
            kind: ZoneKind::RiskZone,
            center: GeoPoint {
                latitude: 26.9124,
                longitude: 75.7873,
            },
            radius_m: 500.0,
            risk_level: RiskLevel::High,
            entry_message: "entry".to_string(),
            exit_message: "exit".to_string(),
        };
        let eval = evaluate_position(
            &GeoPoint {
                latitude: 26.9124,
                longitude: 75.7873,
            },
            &[zone],
        );
        let sub = location_subscore(&LocationInputs::default(), &eval);
        assert_eq!(sub.score, 60.0);
        assert_eq!(sub.factors[0].name, FactorName::UnsafeZonePresence);
    }

    #[test]
    fn test_behavior_defaults_to_base() {
        let sub = behavior_subscore(&BehaviorInputs::default());
        assert_eq!(sub.score, BEHAVIOR_BASE);
        assert!(sub.factors.is_empty());
    }

    #[test]
    fn test_behavior_centered_percentages() {
        // 50% on every percentage signal contributes zero net.
        let inputs = BehaviorInputs {
            check_in_frequency: Some(50.0),
            route_adherence: Some(50.0),
            safety_feature_usage: Some(50.0),
            ..Default::default()
        };
        let sub = behavior_subscore(&inputs);
        assert_eq!(sub.score, BEHAVIOR_BASE);
        assert_eq!(sub.factors.len(), 3);
    }

    #[test]
    fn test_behavior_response_time_bands() {
        for (minutes, expected) in [(3.0, 10.0), (5.0, 10.0), (12.0, 5.0), (15.0, 5.0), (40.0, -10.0)] {
            let inputs = BehaviorInputs {
                response_time_min: Some(minutes),
                ..Default::default()
            };
            let sub = behavior_subscore(&inputs);
            assert_eq!(sub.score, BEHAVIOR_BASE + expected, "minutes={minutes}");
        }
    }

    #[test]
    fn test_behavior_contact_updates_capped() {
        let inputs = BehaviorInputs {
            emergency_contact_updates: Some(20),
            ..Default::default()
        };
        let sub = behavior_subscore(&inputs);
        assert_eq!(sub.score, BEHAVIOR_BASE + 10.0);
    }

    #[test]
    fn test_risk_best_and_worst_case_clamped() {
        let best = RiskInputs {
            time_of_day: Some(TimeOfDay::Day),
            weather: Some(Weather::Clear),
            crime_rate: Some(CrimeRate::VeryLow),
            tourist_density: Some(TouristDensity::VeryHigh),
            group_size: Some(3),
            local_guide: Some(true),
            transportation: Some(Transportation::PrivateVehicle),
        };
        assert_eq!(risk_subscore(&best).score, 100.0);

        let worst = RiskInputs {
            time_of_day: Some(TimeOfDay::Night),
            weather: Some(Weather::Extreme),
            crime_rate: Some(CrimeRate::VeryHigh),
            tourist_density: Some(TouristDensity::VeryLow),
            group_size: Some(0),
            local_guide: Some(false),
            transportation: Some(Transportation::Walking),
        };
        // 80 - 15 - 25 - 30 - 15 - 15 - 10 = -30 -> 0
        assert_eq!(risk_subscore(&worst).score, 0.0);
    }

    #[test]
    fn test_risk_group_size_bands() {
        for (size, expected) in [(0, -15.0), (1, 0.0), (2, 10.0), (4, 10.0), (7, 5.0)] {
            let inputs = RiskInputs {
                group_size: Some(size),
                ..Default::default()
            };
            assert_eq!(risk_subscore(&inputs).score, RISK_BASE + expected, "size={size}");
        }
    }

    #[test]
    fn test_incident_minor_cap() {
        // 10 minor incidents cap at -30, not -100.
        let inputs = IncidentInputs {
            minor_incidents: Some(10),
            ..Default::default()
        };
        let sub = incident_subscore(&inputs);
        assert_eq!(sub.score, INCIDENT_BASE - 30.0);
        assert_eq!(sub.factors[0].delta, -30.0);
    }

    #[test]
    fn test_incident_major_uncapped_but_score_clamped() {
        let inputs = IncidentInputs {
            major_incidents: Some(5),
            ..Default::default()
        };
        let sub = incident_subscore(&inputs);
        assert_eq!(sub.factors[0].delta, -125.0);
        assert_eq!(sub.score, 0.0);
    }

    #[test]
    fn test_incident_recovery_bands() {
        for (days, expected) in [(0, 0.0), (1, 3.0), (7, 8.0), (29, 8.0), (30, 15.0), (365, 15.0)] {
            let inputs = IncidentInputs {
                days_since_last_incident: Some(days),
                ..Default::default()
            };
            assert_eq!(
                incident_subscore(&inputs).score,
                INCIDENT_BASE + expected,
                "days={days}"
            );
        }
    }

    #[test]
    fn test_incident_caps_combined() {
        let inputs = IncidentInputs {
            minor_incidents: Some(4),
            false_alarms: Some(6),
            resolved_incidents: Some(5),
            days_since_last_incident: Some(45),
            ..Default::default()
        };
        // 85 - 30 - 20 + 15 + 15 = 65
        assert_eq!(incident_subscore(&inputs).score, 65.0);
    }
}
