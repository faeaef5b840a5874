//! Error types for the room fire simulation
//!
//! The simulation core has no fatal runtime errors. Configuration problems are
//! caught when a [`FireSimulation`](crate::FireSimulation) is constructed, and
//! spawn rejections are recovered locally by the spread loop (skip, reschedule,
//! back off). Only explicit external spawns surface a [`SpawnRejection`].

use std::fmt;

/// Configuration precondition violations detected at construction time.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// No room bounds were configured
    MissingRoomBounds,
    /// Room bounds exist but enclose no usable area
    DegenerateRoom(String),
    /// A numeric parameter is out of its legal range
    InvalidParameter {
        /// Dotted path of the offending field (e.g. `"thermal.max_temperature"`)
        name: &'static str,
        /// Description of the violated constraint
        message: String,
    },
}

impl ConfigError {
    /// Create error for a non-finite or non-positive `f32` value.
    pub fn not_positive(name: &'static str, value: f32) -> Self {
        Self::InvalidParameter {
            name,
            message: format!("must be finite and positive, got {value}"),
        }
    }

    /// Create error for a probability outside `[0, 1]`.
    pub fn not_probability(name: &'static str, value: f32) -> Self {
        Self::InvalidParameter {
            name,
            message: format!("must be within [0, 1], got {value}"),
        }
    }

    /// Create error with a custom constraint message.
    pub fn invalid(name: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingRoomBounds => write!(f, "No room bounds configured"),
            ConfigError::DegenerateRoom(msg) => write!(f, "Degenerate room bounds: {msg}"),
            ConfigError::InvalidParameter { name, message } => {
                write!(f, "Invalid parameter {name}: {message}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Reasons a fire could not be placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnRejection {
    /// Candidate lies outside the room bounds
    OutsideRoom,
    /// Another active fire is closer than the minimum separation
    TooClose,
    /// The population cap is reached
    CapacityExceeded,
    /// The spreading parent is unknown or no longer burning
    ParentNotBurning,
    /// The spreading parent is being put out and no longer spreads
    ParentExtinguishing,
    /// The session has already ended
    SessionOver,
}

impl fmt::Display for SpawnRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpawnRejection::OutsideRoom => write!(f, "position outside room bounds"),
            SpawnRejection::TooClose => write!(f, "position too close to an active fire"),
            SpawnRejection::CapacityExceeded => write!(f, "fire population cap reached"),
            SpawnRejection::ParentNotBurning => write!(f, "parent fire is not burning"),
            SpawnRejection::ParentExtinguishing => write!(f, "parent fire is being put out"),
            SpawnRejection::SessionOver => write!(f, "session has ended"),
        }
    }
}

impl std::error::Error for SpawnRejection {}
