//! Geofence Library
//!
//! Circular zone catalog with deterministic Haversine containment.
//! Membership is a pure function of geometry: a position is inside a
//! zone when its great-circle distance to the zone center is less than
//! or equal to the zone radius (boundary inclusive).

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use thiserror::Error;
use tracing::debug;

/// Earth mean radius in meters (spherical model).
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

#[derive(Error, Debug)]
pub enum GeofenceError {
    #[error("Zone not found: {0}")]
    ZoneNotFound(String),
    #[error("Duplicate zone id: {0}")]
    DuplicateZone(String),
}

pub type Result<T> = std::result::Result<T, GeofenceError>;

/// Zone classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneKind {
    SafeZone,
    Restricted,
    Medical,
    RiskZone,
    Transport,
}

/// Low/medium/high risk classification, shared by zones and score tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// A named circular geofence zone. Immutable reference data owned by
/// the catalog collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeofenceZone {
    pub id: String,
    pub name: String,
    pub kind: ZoneKind,
    pub center: GeoPoint,
    pub radius_m: f64,
    pub risk_level: RiskLevel,
    pub entry_message: String,
    pub exit_message: String,
}

impl GeofenceZone {
    /// Boundary-inclusive containment test.
    pub fn contains(&self, position: &GeoPoint) -> bool {
        haversine_m(
            position.latitude,
            position.longitude,
            self.center.latitude,
            self.center.longitude,
        ) <= self.radius_m
    }

    /// A zone counts as a violation when it is restricted outright or
    /// carries a high risk classification.
    pub fn is_violation(&self) -> bool {
        self.kind == ZoneKind::Restricted || self.risk_level == RiskLevel::High
    }
}

/// Result of evaluating one position against the zone catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeofenceEvaluation {
    /// All zones containing the position.
    pub inside: Vec<GeofenceZone>,
    /// Containing zones with kind = safe_zone.
    pub safe_zones: Vec<GeofenceZone>,
    /// Containing zones that are restricted or high-risk.
    pub violations: Vec<GeofenceZone>,
}

impl GeofenceEvaluation {
    pub fn in_safe_zone(&self) -> bool {
        !self.safe_zones.is_empty()
    }

    pub fn in_any_zone(&self) -> bool {
        !self.inside.is_empty()
    }

    /// Empty evaluation, used when no position data accompanies a
    /// score request.
    pub fn none() -> Self {
        Self {
            inside: Vec::new(),
            safe_zones: Vec::new(),
            violations: Vec::new(),
        }
    }
}

/// Evaluate a position against the full zone catalog.
pub fn evaluate_position(position: &GeoPoint, zones: &[GeofenceZone]) -> GeofenceEvaluation {
    let inside: Vec<GeofenceZone> = zones
        .iter()
        .filter(|z| z.contains(position))
        .cloned()
        .collect();

    let safe_zones: Vec<GeofenceZone> = inside
        .iter()
        .filter(|z| z.kind == ZoneKind::SafeZone)
        .cloned()
        .collect();

    let violations: Vec<GeofenceZone> = inside
        .iter()
        .filter(|z| z.is_violation())
        .cloned()
        .collect();

    debug!(
        "Geofence eval at ({:.5}, {:.5}): {} inside, {} safe, {} violations",
        position.latitude,
        position.longitude,
        inside.len(),
        safe_zones.len(),
        violations.len()
    );

    GeofenceEvaluation {
        inside,
        safe_zones,
        violations,
    }
}

/// Haversine great-circle distance between two points in meters.
pub fn haversine_m(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1 * PI / 180.0;
    let lat2_rad = lat2 * PI / 180.0;
    let dlat = (lat2 - lat1) * PI / 180.0;
    let dlon = (lon2 - lon1) * PI / 180.0;

    let a = (dlat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

/// In-memory zone catalog.
///
/// In production this would load from config/database; the registry
/// ships with a seed catalog for the pilot deployment city.
pub struct ZoneRegistry {
    zones: Vec<GeofenceZone>,
}

impl ZoneRegistry {
    pub fn new() -> Self {
        Self { zones: Vec::new() }
    }

    pub fn with_default_zones() -> Self {
        let mut registry = Self::new();
        registry.load_default_zones();
        registry
    }

    fn load_default_zones(&mut self) {
        let seed: Vec<(&str, &str, ZoneKind, f64, f64, f64, RiskLevel)> = vec![
            ("ZN-001", "Amber Fort Visitor Area", ZoneKind::SafeZone, 26.9855, 75.8513, 800.0, RiskLevel::Low),
            ("ZN-002", "City Palace Plaza", ZoneKind::SafeZone, 26.9258, 75.8237, 500.0, RiskLevel::Low),
            ("ZN-003", "SMS Hospital", ZoneKind::Medical, 26.9066, 75.8130, 300.0, RiskLevel::Low),
            ("ZN-004", "Old City Night Market", ZoneKind::RiskZone, 26.9239, 75.8267, 600.0, RiskLevel::High),
            ("ZN-005", "Cantonment Perimeter", ZoneKind::Restricted, 26.8880, 75.7780, 1200.0, RiskLevel::Medium),
            ("ZN-006", "Central Bus Terminal", ZoneKind::Transport, 26.9210, 75.7890, 400.0, RiskLevel::Medium),
        ];

        for (id, name, kind, lat, lon, radius, risk) in seed {
            self.zones.push(GeofenceZone {
                id: id.to_string(),
                name: name.to_string(),
                kind,
                center: GeoPoint {
                    latitude: lat,
                    longitude: lon,
                },
                radius_m: radius,
                risk_level: risk,
                entry_message: match kind {
                    ZoneKind::SafeZone => format!("You have entered {name}, a monitored safe area."),
                    ZoneKind::Restricted => format!("{name} is a restricted area. Leave immediately."),
                    ZoneKind::Medical => format!("Medical facility nearby: {name}."),
                    ZoneKind::RiskZone => format!("Caution: {name} is a high-risk area after dark."),
                    ZoneKind::Transport => format!("You are at {name}. Keep belongings secure."),
                },
                exit_message: format!("You have left {name}."),
            });
        }
    }

    pub fn all(&self) -> &[GeofenceZone] {
        &self.zones
    }

    pub fn get(&self, id: &str) -> Result<&GeofenceZone> {
        self.zones
            .iter()
            .find(|z| z.id == id)
            .ok_or_else(|| GeofenceError::ZoneNotFound(id.to_string()))
    }

    pub fn insert(&mut self, zone: GeofenceZone) -> Result<()> {
        if self.zones.iter().any(|z| z.id == zone.id) {
            return Err(GeofenceError::DuplicateZone(zone.id));
        }
        self.zones.push(zone);
        Ok(())
    }
}

impl Default for ZoneRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zone(kind: ZoneKind, risk: RiskLevel, radius_m: f64) -> GeofenceZone {
        GeofenceZone {
            id: "Z1".to_string(),
            name: "Test Zone".to_string(),
            kind,
            center: GeoPoint {
                latitude: 26.9124,
                longitude: 75.7873,
            },
            radius_m,
            risk_level: risk,
            entry_message: "entry".to_string(),
            exit_message: "exit".to_string(),
        }
    }

    #[test]
    fn test_haversine_known_distance() {
        // NYC to London: ~5,570 km
        let dist = haversine_m(40.7128, -74.0060, 51.5074, -0.1278);
        assert!((dist - 5_570_000.0).abs() < 50_000.0);

        // Same point: 0 m
        let dist = haversine_m(26.9, 75.8, 26.9, 75.8);
        assert!(dist.abs() < 0.001);
    }

    #[test]
    fn test_containment_is_boundary_inclusive() {
        // Walk ~500 m due north of the center, measure the exact
        // Haversine distance, and make that the zone radius: the point
        // then sits precisely on the boundary.
        let mut z = zone(ZoneKind::SafeZone, RiskLevel::Low, 0.0);
        let dlat = 500.0 / (EARTH_RADIUS_M * PI / 180.0);
        let on_boundary = GeoPoint {
            latitude: z.center.latitude + dlat,
            longitude: z.center.longitude,
        };
        z.radius_m = haversine_m(
            on_boundary.latitude,
            on_boundary.longitude,
            z.center.latitude,
            z.center.longitude,
        );
        assert!((z.radius_m - 500.0).abs() < 1.0, "setup drift: {}", z.radius_m);
        assert!(z.contains(&on_boundary), "point at exactly radius_m is inside");

        let outside = GeoPoint {
            latitude: z.center.latitude + dlat * 1.01,
            longitude: z.center.longitude,
        };
        assert!(!z.contains(&outside));
    }

    #[test]
    fn test_evaluation_partitions_zones() {
        let center = GeoPoint {
            latitude: 26.9124,
            longitude: 75.7873,
        };
        let mut safe = zone(ZoneKind::SafeZone, RiskLevel::Low, 1000.0);
        safe.id = "S".to_string();
        let mut restricted = zone(ZoneKind::Restricted, RiskLevel::Medium, 1000.0);
        restricted.id = "R".to_string();
        let mut high_risk = zone(ZoneKind::RiskZone, RiskLevel::High, 1000.0);
        high_risk.id = "H".to_string();
        let mut transport = zone(ZoneKind::Transport, RiskLevel::Low, 1000.0);
        transport.id = "T".to_string();

        let eval = evaluate_position(&center, &[safe, restricted, high_risk, transport]);

        assert_eq!(eval.inside.len(), 4);
        assert_eq!(eval.safe_zones.len(), 1);
        assert_eq!(eval.safe_zones[0].id, "S");
        // Restricted kind and high risk level both violate
        assert_eq!(eval.violations.len(), 2);
        assert!(eval.in_safe_zone());
    }

    #[test]
    fn test_evaluation_is_deterministic() {
        let registry = ZoneRegistry::with_default_zones();
        let pos = GeoPoint {
            latitude: 26.9258,
            longitude: 75.8237,
        };
        let a = evaluate_position(&pos, registry.all());
        let b = evaluate_position(&pos, registry.all());
        assert_eq!(a.inside.len(), b.inside.len());
        assert_eq!(a.violations.len(), b.violations.len());
    }

    #[test]
    fn test_registry_lookup() {
        let registry = ZoneRegistry::with_default_zones();
        assert!(registry.get("ZN-001").is_ok());
        assert!(matches!(
            registry.get("ZN-999"),
            Err(GeofenceError::ZoneNotFound(_))
        ));
    }

    #[test]
    fn test_registry_rejects_duplicate_ids() {
        let mut registry = ZoneRegistry::with_default_zones();
        let dup = registry.get("ZN-001").unwrap().clone();
        assert!(matches!(
            registry.insert(dup),
            Err(GeofenceError::DuplicateZone(_))
        ));
    }
}
