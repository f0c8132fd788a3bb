use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const SUPPORTED_CONFIG_VERSION: u32 = 1;

/// Indent width used by the end-of-run JSON block unless configured otherwise.
pub const DEFAULT_JSON_INDENT: usize = 4;

const MAX_JSON_INDENT: usize = 8;

/// Reporter settings, usually kept next to the suite as `testline.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReportConfig {
    pub version: u32,

    /// Append the first docstring line to console labels. When unset, the
    /// execution engine's own setting wins.
    #[serde(default)]
    pub descriptions: Option<bool>,

    #[serde(default = "default_json_indent")]
    pub json_indent: usize,

    /// Print the aggregate report after the error listing.
    #[serde(default = "default_true")]
    pub print_report: bool,
}

fn default_json_indent() -> usize {
    DEFAULT_JSON_INDENT
}

fn default_true() -> bool {
    true
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            version: SUPPORTED_CONFIG_VERSION,
            descriptions: None,
            json_indent: DEFAULT_JSON_INDENT,
            print_report: true,
        }
    }
}

impl ReportConfig {
    pub fn from_yaml_str(raw: &str) -> Result<Self, ConfigError> {
        let cfg: ReportConfig = serde_yaml::from_str(raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != SUPPORTED_CONFIG_VERSION {
            return Err(ConfigError::UnsupportedVersion {
                found: self.version,
                supported: SUPPORTED_CONFIG_VERSION,
            });
        }
        if self.json_indent == 0 || self.json_indent > MAX_JSON_INDENT {
            return Err(ConfigError::Invalid(format!(
                "json_indent must be between 1 and {}, got {}",
                MAX_JSON_INDENT, self.json_indent
            )));
        }
        Ok(())
    }
}

pub fn load_config(path: &Path) -> Result<ReportConfig, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let cfg = ReportConfig::from_yaml_str(&raw)?;
    tracing::debug!(path = %path.display(), "loaded report config");
    Ok(cfg)
}
