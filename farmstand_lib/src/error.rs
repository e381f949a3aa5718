//! Error types for the library layer.

use std::fmt;

/// Errors produced by the library layer, wrapping directory load errors
/// and adding configuration, serialization, and input validation failures.
#[derive(Debug)]
pub enum FarmstandError {
    /// The directory could not be loaded.
    Data(farmstand_data::Error),
    /// Settings could not be read or parsed.
    Config(crate::config::ConfigError),
    /// JSON serialization or deserialization failed.
    Serialization(serde_json::Error),
    /// User-provided input failed validation.
    InvalidInput(String),
}

impl fmt::Display for FarmstandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Data(e) => write!(f, "Data error: {}", e),
            Self::Config(e) => write!(f, "Config error: {}", e),
            Self::Serialization(e) => write!(f, "Serialization error: {}", e),
            Self::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
        }
    }
}

impl std::error::Error for FarmstandError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Data(e) => Some(e),
            Self::Config(e) => Some(e),
            Self::Serialization(e) => Some(e),
            Self::InvalidInput(_) => None,
        }
    }
}

impl From<farmstand_data::Error> for FarmstandError {
    fn from(e: farmstand_data::Error) -> Self {
        Self::Data(e)
    }
}

impl From<crate::config::ConfigError> for FarmstandError {
    fn from(e: crate::config::ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<serde_json::Error> for FarmstandError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e)
    }
}
