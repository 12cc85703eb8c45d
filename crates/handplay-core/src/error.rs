//! Error types for engine construction and configuration.
//!
//! Per-tick processing never fails; malformed input is skipped and logged.
//! These errors only surface while building a session or loading config.

/// Errors returned by engine construction, configuration and population.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Invalid configuration for `{field}`: {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Failed to serialize configuration: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Duplicate delivery zone id: {0}")]
    DuplicateZone(String),

    #[error("Duplicate dwell target id: {0}")]
    DuplicateTarget(String),

    #[error("Category has no delivery zone: {0}")]
    UnknownCategory(String),

    #[error("At least one delivery zone is required to spawn entities")]
    EmptyCategories,
}

impl EngineError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
