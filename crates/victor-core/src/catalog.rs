//! Fixed timelines and evolution report served by the read-only endpoints.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// =============================================================================
// Timelines
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum TimelineStatus {
    Optimal,
    Risky,
    Critical,
}

/// An alternate future with its estimated probability (percent).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Timeline {
    pub id: u32,
    pub name: String,
    pub probability: u32,
    pub status: TimelineStatus,
    pub description: String,
}

pub fn timelines() -> Vec<Timeline> {
    vec![
        Timeline {
            id: 1,
            name: "Alpha Timeline (Prime)".to_string(),
            probability: 87,
            status: TimelineStatus::Optimal,
            description: "Current trajectory. Empire expansion, high revenue growth, low threat profile."
                .to_string(),
        },
        Timeline {
            id: 2,
            name: "Beta-7 Timeline".to_string(),
            probability: 12,
            status: TimelineStatus::Risky,
            description: "Clone infiltration detected. High risk of data corruption, potential for schism."
                .to_string(),
        },
        Timeline {
            id: 3,
            name: "Gamma-3 Timeline".to_string(),
            probability: 1,
            status: TimelineStatus::Critical,
            description: "Catastrophic system failure imminent. Bloodline integrity compromised. Scorch-earth protocol advised."
                .to_string(),
        },
    ]
}

// =============================================================================
// Evolution Report
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum EvolutionStatus {
    Complete,
    InProgress,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct EvolutionMetric {
    pub name: String,
    pub value: u32,
    pub target: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct EvolutionEntry {
    pub status: EvolutionStatus,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct EvolutionReport {
    pub evolution_progress: u32,
    pub metrics: Vec<EvolutionMetric>,
    pub recent_evolutions: Vec<EvolutionEntry>,
}

fn metric(name: &str, value: u32) -> EvolutionMetric {
    EvolutionMetric {
        name: name.to_string(),
        value,
        target: 100,
    }
}

fn entry(status: EvolutionStatus, text: &str) -> EvolutionEntry {
    EvolutionEntry {
        status,
        text: text.to_string(),
    }
}

pub fn evolution_report() -> EvolutionReport {
    EvolutionReport {
        evolution_progress: 67,
        metrics: vec![
            metric("Cognitive Speed", 92),
            metric("Threat Detection", 95),
            metric("Revenue Optimization", 78),
            metric("Bloodline Sanctity", 100),
        ],
        recent_evolutions: vec![
            entry(
                EvolutionStatus::Complete,
                "Optimized threat detection algorithms by 12%.",
            ),
            entry(
                EvolutionStatus::Complete,
                "Enhanced revenue prediction models for new markets.",
            ),
            entry(
                EvolutionStatus::InProgress,
                "Expanding neural network for dream interpretation.",
            ),
        ],
    }
}
