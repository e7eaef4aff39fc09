//! Error types for Burning
//!
//! Quantity arithmetic is total and never fails. Errors only arise at the
//! configuration boundary, when a fuel table is loaded from outside.

use thiserror::Error;

/// Result type for Burning operations
pub type Result<T> = std::result::Result<T, BurningError>;

/// Burning error types
#[derive(Debug, Clone, Error)]
pub enum BurningError {
    // ========================================================================
    // Fuel Table Errors
    // ========================================================================

    /// Fuel table could not be parsed
    #[error("Failed to parse fuel table: {message}")]
    FuelTableParse { message: String },

    /// Fuel table could not be read
    #[error("Failed to read fuel table {path}: {message}")]
    FuelTableIo { path: String, message: String },

    /// A fuel table entry is unusable
    #[error("Invalid fuel {kind}: {reason}")]
    InvalidFuel { kind: String, reason: String },

    /// Fuel table contains no fuel at all
    #[error("Fuel table is empty")]
    EmptyFuelTable,

    // ========================================================================
    // Configuration Errors
    // ========================================================================

    /// Configuration value is malformed
    #[error("Invalid configuration {key}: {reason}")]
    InvalidConfig { key: String, reason: String },
}

impl BurningError {
    /// Create an invalid fuel error
    pub fn invalid_fuel(kind: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidFuel {
            kind: kind.into(),
            reason: reason.into(),
        }
    }

    /// Get the error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::FuelTableParse { .. } => "FUEL_TABLE_PARSE",
            Self::FuelTableIo { .. } => "FUEL_TABLE_IO",
            Self::InvalidFuel { .. } => "INVALID_FUEL",
            Self::EmptyFuelTable => "EMPTY_FUEL_TABLE",
            Self::InvalidConfig { .. } => "INVALID_CONFIG",
        }
    }
}

impl From<serde_json::Error> for BurningError {
    fn from(err: serde_json::Error) -> Self {
        Self::FuelTableParse {
            message: err.to_string(),
        }
    }
}
