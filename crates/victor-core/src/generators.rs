//! # Sample Data Generators
//!
//! Uniform random draws on fixed ranges for the hologram view, threat scans
//! and the simulated device (location, battery, signal).
//!
//! ## Hologram Layout
//! ```text
//!                 ring stabilizer i (0..8)
//!                 x = cos(θ)·3, z = sin(θ)·3, y = sin(i·1.5)·2
//!
//!                    ○ 2
//!              ○ 3        ○ 1
//!                   ◎ core          core → 3 cyan links into the ring
//!              ○ 4        ○ 0       ring → at most 1 link, green or red
//!              ○ 5  ○ 6  ○ 7
//! ```
//!
//! Every generator takes `&mut impl Rng` so tests can pass a seeded
//! `StdRng` and production passes `rand::thread_rng()`.

use std::f64::consts::PI;

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Serialize, Serializer};
use ts_rs::TS;

use crate::types::{GeoLocation, NewThreat, ThreatLog, ThreatSeverity, ThreatStatus};

pub const RING_SIZE: usize = 8;
pub const RING_RADIUS: f64 = 3.0;
pub const CORE_LINKS: usize = 3;

pub const COLOR_STABLE: &str = "#00ff00";
pub const COLOR_UNSTABLE: &str = "#ff0000";
pub const COLOR_CORE: &str = "#00ffff";

/// Chance that a scan cycle turns up a new threat.
pub const SCAN_HIT_PROBABILITY: f64 = 0.2;

pub const THREAT_TYPES: [&str; 5] = [
    "Code Clone",
    "Data Breach",
    "API Attack",
    "Identity Theft",
    "Network Intrusion",
];

pub const THREAT_LOCATIONS: [&str; 6] = [
    "GitHub",
    "Cloud Storage",
    "API Gateway",
    "Database",
    "Network",
    "Dark Web",
];

pub const THREAT_SOURCES: [&str; 5] = [
    "GitHub Monitor",
    "Cloud Security",
    "API Gateway",
    "Network Monitor",
    "Threat Intelligence",
];

/// Centre of simulated device positions (lower Manhattan).
pub const HOME_LAT: f64 = 40.7128;
pub const HOME_LNG: f64 = -74.0060;

// =============================================================================
// Hologram
// =============================================================================

/// Stabilizer identity: a ring index, or the central core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StabilizerId {
    Ring(usize),
    Core,
}

impl Serialize for StabilizerId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            StabilizerId::Ring(i) => serializer.serialize_u64(*i as u64),
            StabilizerId::Core => serializer.serialize_str("core"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct Connection {
    /// Ring index of the target stabilizer.
    pub to: usize,
    pub color: String,
    pub strength: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct Stabilizer {
    #[ts(type = "number | \"core\"")]
    pub id: StabilizerId,
    pub position: Position,
    pub phase: f64,
    pub connections: Vec<Connection>,
}

/// One frame of the hologram view.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct HologramSnapshot {
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    pub fitness: f64,
    pub sanctity: f64,
    pub stabilizers: Vec<Stabilizer>,
}

/// Generates a fresh hologram snapshot.
///
/// Ring stabilizers come first (ids `0..8`), the core is always last.
pub fn hologram_snapshot<R: Rng + ?Sized>(rng: &mut R, now: DateTime<Utc>) -> HologramSnapshot {
    let mut stabilizers: Vec<Stabilizer> = (0..RING_SIZE)
        .map(|i| {
            let angle = (i as f64 / RING_SIZE as f64) * PI * 2.0;
            Stabilizer {
                id: StabilizerId::Ring(i),
                position: Position {
                    x: angle.cos() * RING_RADIUS,
                    y: (i as f64 * 1.5).sin() * 2.0,
                    z: angle.sin() * RING_RADIUS,
                },
                phase: rng.gen(),
                connections: Vec::new(),
            }
        })
        .collect();

    for (i, stabilizer) in stabilizers.iter_mut().enumerate() {
        if !rng.gen_bool(0.5) {
            continue;
        }
        // A self-link is drawn but dropped, so fewer than half the ring ends up linked.
        let target = rng.gen_range(0..RING_SIZE);
        if target == i {
            continue;
        }
        let color = if rng.gen_bool(0.7) {
            COLOR_STABLE
        } else {
            COLOR_UNSTABLE
        };
        stabilizer.connections.push(Connection {
            to: target,
            color: color.to_string(),
            strength: rng.gen(),
        });
    }

    let core_connections = (0..CORE_LINKS)
        .map(|_| Connection {
            to: rng.gen_range(0..RING_SIZE),
            color: COLOR_CORE.to_string(),
            strength: rng.gen(),
        })
        .collect();

    stabilizers.push(Stabilizer {
        id: StabilizerId::Core,
        position: Position {
            x: 0.0,
            y: 0.0,
            z: 0.0,
        },
        phase: rng.gen(),
        connections: core_connections,
    });

    HologramSnapshot {
        timestamp: now.timestamp_millis(),
        fitness: rng.gen_range(0.75..0.95),
        sanctity: rng.gen_range(0.9..1.0),
        stabilizers,
    }
}

// =============================================================================
// Threat Scans
// =============================================================================

/// A generated threat plus the monitor that reported it.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectedThreat {
    pub threat: NewThreat,
    pub source: &'static str,
}

fn pick<'a, R: Rng + ?Sized>(rng: &mut R, items: &[&'a str]) -> &'a str {
    items.choose(rng).copied().unwrap_or_default()
}

/// Draws a random threat from the fixed type/location/source lists.
pub fn random_threat<R: Rng + ?Sized>(rng: &mut R) -> DetectedThreat {
    let threat_type = pick(rng, &THREAT_TYPES);
    let severity = ThreatSeverity::ALL
        .choose(rng)
        .copied()
        .unwrap_or(ThreatSeverity::Low);
    let location = pick(rng, &THREAT_LOCATIONS);
    let source = pick(rng, &THREAT_SOURCES);

    DetectedThreat {
        threat: NewThreat {
            threat_type: threat_type.to_string(),
            location: Some(location.to_string()),
            severity: Some(severity),
            status: Some(ThreatStatus::Detected),
            description: Some(format!(
                "{} detected in {}",
                threat_type,
                location.to_lowercase()
            )),
            confidence: Some(rng.gen_range(60..100)),
        },
        source,
    }
}

/// Runs one scan; returns a threat roughly one time in five.
pub fn scan_cycle<R: Rng + ?Sized>(rng: &mut R) -> Option<DetectedThreat> {
    if rng.gen_bool(SCAN_HIT_PROBABILITY) {
        Some(random_threat(rng))
    } else {
        None
    }
}

/// Aggregate threat level in [0, 1] over the active threats.
///
/// Each active threat adds `severity multiplier × confidence / 100`; a
/// threat without a confidence counts as fully confident.
pub fn threat_level(threats: &[ThreatLog]) -> f64 {
    let total: f64 = threats
        .iter()
        .filter(|t| t.status.is_active())
        .map(|t| {
            let confidence = t.confidence.unwrap_or(100) as f64;
            t.severity.multiplier() * confidence / 100.0
        })
        .sum();
    total.min(1.0)
}

// =============================================================================
// Device Location
// =============================================================================

/// Simulated GPS fix within roughly 500 m of [`HOME_LAT`]/[`HOME_LNG`].
pub fn mock_location<R: Rng + ?Sized>(rng: &mut R) -> GeoLocation {
    GeoLocation {
        lat: HOME_LAT + (rng.gen::<f64>() - 0.5) * 0.01,
        lng: HOME_LNG + (rng.gen::<f64>() - 0.5) * 0.01,
        accuracy: rng.gen_range(5..25) as f64,
    }
}

// =============================================================================
// Device Vitals
// =============================================================================

/// Simulated battery and signal readings, both percentages in [0, 100].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DeviceVitals {
    pub battery_level: f64,
    pub signal_strength: f64,
}

impl DeviceVitals {
    pub const INITIAL: DeviceVitals = DeviceVitals {
        battery_level: 85.0,
        signal_strength: 78.0,
    };

    /// One drift step: battery loses a point 30% of the time, signal moves
    /// by up to ±5.
    pub fn step<R: Rng + ?Sized>(self, rng: &mut R) -> DeviceVitals {
        let drain = if rng.gen_bool(0.3) { 1.0 } else { 0.0 };
        let wobble = (rng.gen::<f64>() - 0.5) * 10.0;
        DeviceVitals {
            battery_level: (self.battery_level - drain).clamp(0.0, 100.0),
            signal_strength: (self.signal_strength + wobble).clamp(0.0, 100.0),
        }
    }

    pub fn battery_status(&self) -> &'static str {
        if self.battery_level > 20.0 {
            "Good"
        } else {
            "Low"
        }
    }

    pub fn signal_quality(&self) -> &'static str {
        match self.signal_strength {
            s if s > 60.0 => "Strong",
            s if s > 30.0 => "Fair",
            _ => "Weak",
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn threat(severity: ThreatSeverity, status: ThreatStatus, confidence: Option<i64>) -> ThreatLog {
        ThreatLog {
            id: "t".to_string(),
            threat_type: "Code Clone".to_string(),
            location: None,
            severity,
            status,
            description: None,
            confidence,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_hologram_layout() {
        let mut rng = StdRng::seed_from_u64(7);
        let snapshot = hologram_snapshot(&mut rng, Utc::now());

        assert_eq!(snapshot.stabilizers.len(), RING_SIZE + 1);
        assert!((0.75..0.95).contains(&snapshot.fitness));
        assert!((0.9..1.0).contains(&snapshot.sanctity));

        let first = &snapshot.stabilizers[0];
        assert_eq!(first.id, StabilizerId::Ring(0));
        assert!((first.position.x - 3.0).abs() < 1e-9);
        assert!(first.position.z.abs() < 1e-9);

        let core = snapshot.stabilizers.last().unwrap();
        assert_eq!(core.id, StabilizerId::Core);
        assert_eq!(core.connections.len(), CORE_LINKS);
        assert!(core.connections.iter().all(|c| c.color == COLOR_CORE));
    }

    #[test]
    fn test_hologram_ring_links_never_self_and_at_most_one() {
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let snapshot = hologram_snapshot(&mut rng, Utc::now());
            for (i, s) in snapshot.stabilizers.iter().take(RING_SIZE).enumerate() {
                assert!(s.connections.len() <= 1);
                for c in &s.connections {
                    assert_ne!(c.to, i);
                    assert!(c.color == COLOR_STABLE || c.color == COLOR_UNSTABLE);
                    assert!((0.0..1.0).contains(&c.strength));
                }
            }
        }
    }

    #[test]
    fn test_stabilizer_id_serialization() {
        assert_eq!(
            serde_json::to_value(StabilizerId::Ring(4)).unwrap(),
            serde_json::json!(4)
        );
        assert_eq!(
            serde_json::to_value(StabilizerId::Core).unwrap(),
            serde_json::json!("core")
        );
    }

    #[test]
    fn test_random_threat_fields() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..100 {
            let detected = random_threat(&mut rng);
            let t = &detected.threat;
            assert!(THREAT_TYPES.contains(&t.threat_type.as_str()));
            assert!(THREAT_SOURCES.contains(&detected.source));
            let location = t.location.as_deref().unwrap();
            assert!(THREAT_LOCATIONS.contains(&location));
            assert_eq!(
                t.description.as_deref().unwrap(),
                format!("{} detected in {}", t.threat_type, location.to_lowercase())
            );
            assert!((60..100).contains(&t.confidence.unwrap()));
            assert_eq!(t.status, Some(ThreatStatus::Detected));
        }
    }

    #[test]
    fn test_scan_cycle_hit_rate() {
        let mut rng = StdRng::seed_from_u64(1);
        let hits = (0..10_000).filter(|_| scan_cycle(&mut rng).is_some()).count();
        assert!((1_500..2_500).contains(&hits), "hits = {hits}");
    }

    #[test]
    fn test_threat_level() {
        assert_eq!(threat_level(&[]), 0.0);

        let level = threat_level(&[
            threat(ThreatSeverity::Medium, ThreatStatus::Detected, Some(50)),
            threat(ThreatSeverity::Low, ThreatStatus::Monitoring, None),
        ]);
        assert!((level - 0.25).abs() < 1e-9);

        // Neutralized threats do not count.
        let level = threat_level(&[threat(
            ThreatSeverity::Critical,
            ThreatStatus::Neutralized,
            Some(100),
        )]);
        assert_eq!(level, 0.0);
    }

    #[test]
    fn test_threat_level_is_capped() {
        let many: Vec<_> = (0..5)
            .map(|_| threat(ThreatSeverity::Critical, ThreatStatus::Detected, Some(90)))
            .collect();
        assert_eq!(threat_level(&many), 1.0);
    }

    #[test]
    fn test_mock_location_stays_near_home() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..100 {
            let loc = mock_location(&mut rng);
            assert!((loc.lat - HOME_LAT).abs() <= 0.005);
            assert!((loc.lng - HOME_LNG).abs() <= 0.005);
            assert!((5.0..25.0).contains(&loc.accuracy));
        }
    }

    #[test]
    fn test_device_vitals_drift_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut vitals = DeviceVitals::INITIAL;
        for _ in 0..1000 {
            let next = vitals.step(&mut rng);
            assert!(vitals.battery_level - next.battery_level <= 1.0);
            assert!(next.battery_level <= vitals.battery_level);
            assert!((next.signal_strength - vitals.signal_strength).abs() <= 5.0);
            assert!((0.0..=100.0).contains(&next.signal_strength));
            vitals = next;
        }
        assert!(vitals.battery_level >= 0.0);
    }

    #[test]
    fn test_device_vitals_labels() {
        let low = DeviceVitals {
            battery_level: 20.0,
            signal_strength: 31.0,
        };
        assert_eq!(low.battery_status(), "Low");
        assert_eq!(low.signal_quality(), "Fair");
        assert_eq!(DeviceVitals::INITIAL.battery_status(), "Good");
        assert_eq!(DeviceVitals::INITIAL.signal_quality(), "Strong");
    }
}
