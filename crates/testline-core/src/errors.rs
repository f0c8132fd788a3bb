use std::path::PathBuf;
use thiserror::Error;

/// Rejected `record_measurement` call.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MeasurementError {
    #[error("measurement name is empty")]
    EmptyName,

    /// The name collides with a fixed outcome category in `stats`.
    #[error("measurement name '{0}' is reserved for an outcome category")]
    ReservedName(String),

    #[error("invalid measurement name '{name}': {reason}")]
    InvalidName { name: String, reason: &'static str },

    #[error("measurement '{name}' has a non-finite value")]
    NonFinite { name: String },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse YAML: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("unsupported config version {found} (supported: {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Failure while printing the end-of-run report.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),
}
