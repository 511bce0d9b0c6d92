//! Threat scanners behind `POST /threats/scan`.

use victor_core::generators::{scan_cycle, DetectedThreat};

/// One scan cycle: `Some` when a threat was found.
pub trait ThreatScanner: Send + Sync {
    fn scan(&self) -> Option<DetectedThreat>;
}

/// Uniform draw per scan, a hit about one time in five.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomScanner;

impl ThreatScanner for RandomScanner {
    fn scan(&self) -> Option<DetectedThreat> {
        scan_cycle(&mut rand::thread_rng())
    }
}
