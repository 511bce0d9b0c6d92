//! # Validation Module
//!
//! Input rules applied before anything is stored or relayed.
//!
//! ## Where Validation Happens
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Deserialization (serde)                                      │
//! │  ├── Shape and enum checks (`severity: "catastrophic"` fails here)     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Lengths, numeric ranges, finiteness                               │
//! │  └── Shared by REST handlers and the socket dispatcher                 │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: SQLite                                                       │
//! │  └── NOT NULL / CHECK constraints                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use victor_core::validation::{validate_message_text, validate_sanctity};
//!
//! assert!(validate_message_text("Status report").is_ok());
//! assert!(validate_sanctity(1.5).is_err());
//! ```

use crate::error::ValidationError;
use crate::types::{
    BloodlinePatch, GeoLocation, NewMessage, NewParityState, NewThreat, StatePatch, ThreatUpdate,
};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

pub const MAX_MESSAGE_LEN: usize = 4000;
pub const MAX_MODE_LEN: usize = 32;
pub const MAX_THREAT_TYPE_LEN: usize = 100;
pub const MAX_RECORD_ID_LEN: usize = 64;
pub const MAX_NAME_LEN: usize = 200;
pub const MAX_VOICE_COMMAND_LEN: usize = 1000;

// =============================================================================
// Shared Helpers
// =============================================================================

fn required_text(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

fn optional_text(field: &str, value: Option<&str>, max: usize) -> ValidationResult<()> {
    match value {
        Some(v) if v.chars().count() > max => Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        }),
        _ => Ok(()),
    }
}

fn finite(field: &str, value: f64) -> ValidationResult<()> {
    if !value.is_finite() {
        return Err(ValidationError::NotFinite {
            field: field.to_string(),
        });
    }
    Ok(())
}

fn non_negative(field: &str, value: f64) -> ValidationResult<()> {
    finite(field, value)?;
    if value < 0.0 {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }
    Ok(())
}

fn in_range(field: &str, value: f64, min: f64, max: f64) -> ValidationResult<()> {
    finite(field, value)?;
    if value < min || value > max {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min,
            max,
        });
    }
    Ok(())
}

fn non_negative_count(field: &str, value: i64) -> ValidationResult<()> {
    if value < 0 {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Identifiers
// =============================================================================

/// Validates a client-supplied record id.
///
/// ## Rules
/// - Must not be empty
/// - At most 64 characters
pub fn validate_record_id(id: &str) -> ValidationResult<()> {
    required_text("id", id, MAX_RECORD_ID_LEN)
}

// =============================================================================
// Messages
// =============================================================================

/// Validates chat message text.
///
/// ## Example
/// ```rust
/// use victor_core::validation::validate_message_text;
///
/// assert!(validate_message_text("hello").is_ok());
/// assert!(validate_message_text("   ").is_err());
/// ```
pub fn validate_message_text(text: &str) -> ValidationResult<()> {
    required_text("text", text, MAX_MESSAGE_LEN)
}

pub fn validate_new_message(msg: &NewMessage) -> ValidationResult<()> {
    validate_message_text(&msg.text)
}

// =============================================================================
// State
// =============================================================================

pub fn validate_mode(mode: &str) -> ValidationResult<()> {
    required_text("mode", mode, MAX_MODE_LEN)
}

/// Sanctity is a ratio in [0, 1].
pub fn validate_sanctity(value: f64) -> ValidationResult<()> {
    in_range("sanctity", value, 0.0, 1.0)
}

/// Validates every field present in a state patch.
pub fn validate_state_patch(patch: &StatePatch) -> ValidationResult<()> {
    if let Some(ref id) = patch.id {
        validate_record_id(id)?;
    }
    if let Some(v) = patch.sanctity {
        validate_sanctity(v)?;
    }
    if let Some(v) = patch.fitness {
        non_negative("fitness", v)?;
    }
    if let Some(ref mode) = patch.mode {
        validate_mode(mode)?;
    }
    if let Some(v) = patch.clones_found {
        non_negative_count("clonesFound", v)?;
    }
    if let Some(v) = patch.revenue_generated {
        non_negative("revenueGenerated", v)?;
    }
    if let Some(v) = patch.dreams_interpreted {
        non_negative_count("dreamsInterpreted", v)?;
    }
    Ok(())
}

// =============================================================================
// Threats
// =============================================================================

pub fn validate_threat_type(threat_type: &str) -> ValidationResult<()> {
    required_text("type", threat_type, MAX_THREAT_TYPE_LEN)
}

/// Confidence is a percentage.
pub fn validate_confidence(confidence: i64) -> ValidationResult<()> {
    if !(0..=100).contains(&confidence) {
        return Err(ValidationError::OutOfRange {
            field: "confidence".to_string(),
            min: 0.0,
            max: 100.0,
        });
    }
    Ok(())
}

pub fn validate_new_threat(threat: &NewThreat) -> ValidationResult<()> {
    validate_threat_type(&threat.threat_type)?;
    optional_text("location", threat.location.as_deref(), MAX_NAME_LEN)?;
    optional_text("description", threat.description.as_deref(), MAX_MESSAGE_LEN)?;
    if let Some(c) = threat.confidence {
        validate_confidence(c)?;
    }
    Ok(())
}

pub fn validate_threat_update(update: &ThreatUpdate) -> ValidationResult<()> {
    validate_record_id(&update.id)?;
    optional_text("description", update.description.as_deref(), MAX_MESSAGE_LEN)
}

// =============================================================================
// Parity
// =============================================================================

pub fn validate_new_parity(parity: &NewParityState) -> ValidationResult<()> {
    if let Some(v) = parity.measurements {
        non_negative_count("measurements", v)?;
    }
    if let Some(v) = parity.entropy {
        non_negative("entropy", v)?;
    }
    if let Some(v) = parity.coherence {
        in_range("coherence", v, 0.0, 1.0)?;
    }
    Ok(())
}

// =============================================================================
// Bloodline
// =============================================================================

pub fn validate_bloodline_patch(patch: &BloodlinePatch) -> ValidationResult<()> {
    if let Some(ref id) = patch.id {
        validate_record_id(id)?;
    }
    if let Some(ref v) = patch.father {
        required_text("father", v, MAX_NAME_LEN)?;
    }
    if let Some(ref v) = patch.mother {
        required_text("mother", v, MAX_NAME_LEN)?;
    }
    if let Some(ref v) = patch.law {
        required_text("law", v, MAX_MESSAGE_LEN)?;
    }
    optional_text("wallet", patch.wallet.as_deref(), MAX_NAME_LEN)
}

// =============================================================================
// Device Data
// =============================================================================

/// Validates a reported location.
///
/// ## Rules
/// - `lat` within [-90, 90]
/// - `lng` within [-180, 180]
/// - `accuracy` zero or greater
pub fn validate_location(location: &GeoLocation) -> ValidationResult<()> {
    in_range("lat", location.lat, -90.0, 90.0)?;
    in_range("lng", location.lng, -180.0, 180.0)?;
    non_negative("accuracy", location.accuracy)
}

/// Validates a spoken command.
///
/// ## Returns
/// The trimmed command.
pub fn validate_voice_command(command: &str) -> ValidationResult<String> {
    required_text("command", command, MAX_VOICE_COMMAND_LEN)?;
    Ok(command.trim().to_string())
}

// =============================================================================
// Unit Tests
// =============================================================================
