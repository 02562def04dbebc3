//! TOML configuration for registries and report books.
//!
//! ```toml
//! [registry]
//! capacity = 1024
//!
//! [oracle]
//! report_expiry_seconds = 300
//! max_oracles = 32
//! ```
//!
//! Every key is optional.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::oracle::{ReportBook, DEFAULT_REPORT_EXPIRY_SECONDS};
use crate::registry::{RegistryMetrics, RegistryOptions};

/// Parsed configuration file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct HintlistConfig {
    /// Registry limits.
    #[serde(default)]
    pub registry: RegistrySection,
    /// Report book settings.
    #[serde(default)]
    pub oracle: OracleSection,
}

/// `[registry]` table.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct RegistrySection {
    /// Maximum number of entries; unbounded when absent.
    pub capacity: Option<usize>,
}

/// `[oracle]` table.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct OracleSection {
    /// Seconds after which a report counts as expired.
    pub report_expiry_seconds: u64,
    /// Maximum number of reporting oracles; unbounded when absent.
    pub max_oracles: Option<usize>,
}

impl Default for OracleSection {
    fn default() -> Self {
        Self {
            report_expiry_seconds: DEFAULT_REPORT_EXPIRY_SECONDS,
            max_oracles: None,
        }
    }
}

impl HintlistConfig {
    /// Reads and parses the file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: Some(path.to_path_buf()),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Parses an in-memory document.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(contents).map_err(|source| ConfigError::Parse { path: None, source })?;
        config.validate()?;
        Ok(config)
    }

    /// Options for a general-purpose registry.
    pub fn registry_options(&self) -> RegistryOptions {
        let options = RegistryOptions::new();
        match self.registry.capacity {
            Some(capacity) => options.capacity(capacity),
            None => options,
        }
    }

    /// An empty report book configured from the `[oracle]` table.
    pub fn report_book(&self, metrics: Option<Arc<dyn RegistryMetrics>>) -> ReportBook {
        let mut options = RegistryOptions::new();
        if let Some(max) = self.oracle.max_oracles {
            options = options.capacity(max);
        }
        if let Some(metrics) = metrics {
            options = options.metrics(metrics);
        }
        ReportBook::new(options, self.oracle.report_expiry_seconds)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.registry.capacity == Some(0) {
            return Err(ConfigError::Invalid {
                field: "registry.capacity",
                reason: "must be at least 1",
            });
        }
        if self.oracle.max_oracles == Some(0) {
            return Err(ConfigError::Invalid {
                field: "oracle.max_oracles",
                reason: "must be at least 1",
            });
        }
        Ok(())
    }
}

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read config {path}: {source}")]
    Read {
        /// File that was requested.
        path: PathBuf,
        /// Underlying I/O failure.
        source: std::io::Error,
    },
    /// The document is not valid TOML for this schema.
    #[error("failed to parse config{}: {source}", path.as_ref().map(|p| format!(" {}", p.display())).unwrap_or_default())]
    Parse {
        /// File the document came from, if any.
        path: Option<PathBuf>,
        /// Underlying parse failure.
        source: toml::de::Error,
    },
    /// A value parsed but is out of range.
    #[error("invalid config value {field}: {reason}")]
    Invalid {
        /// Dotted key of the offending value.
        field: &'static str,
        /// What is wrong with it.
        reason: &'static str,
    },
}
