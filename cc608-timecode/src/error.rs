//! Error types for timecode parsing and arithmetic.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during timecode operations.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum TimecodeError {
    /// The timecode string did not match `HH:MM:SS:FF` / `HH:MM:SS;FF`.
    #[error("Invalid timecode format: {0}")]
    InvalidFormat(String),

    /// A timecode component was out of range.
    #[error("Invalid {component} value {value} (max {max})")]
    InvalidComponent {
        /// Which component was invalid (e.g. "minutes").
        component: String,
        /// The offending value.
        value: i32,
        /// The maximum allowed value.
        max: i32,
    },
}

impl TimecodeError {
    /// Create an invalid format error.
    pub fn invalid_format(message: impl Into<String>) -> Self {
        Self::InvalidFormat(message.into())
    }

    /// Create an invalid component error.
    pub fn invalid_component(component: impl Into<String>, value: i32, max: i32) -> Self {
        Self::InvalidComponent {
            component: component.into(),
            value,
            max,
        }
    }
}

/// Result type for timecode operations.
pub type Result<T> = std::result::Result<T, TimecodeError>;
