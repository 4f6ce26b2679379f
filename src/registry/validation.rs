//! Shared validation helpers for facade operations.
//!
//! Centralizes the checks that can run synchronously, before a command is
//! queued, so all operations produce consistent error messages.

use crate::error::BridgeError;

/// Names (documents, objects, sketches) must be non-empty.
pub fn non_empty(value: &str, field: &str) -> Result<(), BridgeError> {
    if value.trim().is_empty() {
        return Err(BridgeError::Validation {
            message: format!("{field} must not be empty"),
        });
    }
    Ok(())
}

/// Validate that a dimension is finite and positive.
pub fn positive_finite(value: f64, field: &str) -> Result<(), BridgeError> {
    if !value.is_finite() {
        return Err(BridgeError::Validation {
            message: format!("{field} must be finite"),
        });
    }
    if value <= 0.0 {
        return Err(BridgeError::Validation {
            message: format!("{field} ({value}) must be positive"),
        });
    }
    Ok(())
}

/// Validate that a coordinate is finite.
pub fn finite(value: f64, field: &str) -> Result<(), BridgeError> {
    if !value.is_finite() {
        return Err(BridgeError::Validation {
            message: format!("{field} must be finite"),
        });
    }
    Ok(())
}
