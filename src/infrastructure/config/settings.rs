//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all settings.
//! Configuration is loaded from a TOML file; the database location can be
//! overridden with the `BANKPEER_DATABASE` environment variable.
//!
//! # Example
//!
//! ```no_run
//! use bankpeer::infrastructure::config::settings::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("bankpeer.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::analysis::{AnalysisConfig, BatchConfig};
use super::logging::LoggingConfig;
use crate::application::batch::BatchSettings;
use crate::error::{ConfigError, Result};

/// Environment variable overriding [`Config::database`].
pub const DATABASE_ENV: &str = "BANKPEER_DATABASE";

/// Main application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// SQLite database path or URL.
    #[serde(default = "default_database_path")]
    pub database: String,

    /// Lock file guarding against concurrent runs. No locking when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lock_file: Option<PathBuf>,

    /// Where the run summary is written as JSON. Not written when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_file: Option<PathBuf>,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub analysis: AnalysisConfig,

    #[serde(default)]
    pub batch: BatchConfig,
}

fn default_database_path() -> String {
    "bankpeer.db".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: default_database_path(),
            lock_file: None,
            status_file: None,
            logging: LoggingConfig::default(),
            analysis: AnalysisConfig::default(),
            batch: BatchConfig::default(),
        }
    }
}

impl Config {
    /// Parse configuration from TOML content, applying environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or validation fails.
    #[allow(clippy::result_large_err)]
    pub fn parse_toml(content: &str) -> Result<Self> {
        Self::parse_toml_with_env(content, |key| std::env::var(key).ok())
    }

    /// Parse configuration using `env` to resolve overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or validation fails.
    #[allow(clippy::result_large_err)]
    pub fn parse_toml_with_env(content: &str, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;

        if let Some(database) = env(DATABASE_ENV).filter(|v| !v.trim().is_empty()) {
            config.database = database;
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The TOML content is malformed
    /// - Validation fails
    #[allow(clippy::result_large_err)]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Render the effective configuration as TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Initialize logging from the `[logging]` section.
    pub fn init_logging(&self) {
        self.logging.init();
    }

    /// Batch settings derived from the `[analysis]` and `[batch]` sections.
    #[must_use]
    pub fn batch_settings(&self, dry_run: bool) -> BatchSettings {
        BatchSettings {
            peer_count: self.analysis.peer_count,
            metrics: self.analysis.metrics.clone(),
            workers: self.batch.workers,
            empty_institutions: self.analysis.empty_institutions,
            cache_periods: self.batch.cache_periods,
            dry_run,
        }
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns the first invalid or missing field.
    #[allow(clippy::result_large_err)]
    pub fn validate(&self) -> Result<()> {
        if self.database.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "database" }.into());
        }
        if self.analysis.peer_count == 0 {
            return Err(ConfigError::InvalidValue {
                field: "peer_count",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if self.batch.workers == 0 {
            return Err(ConfigError::InvalidValue {
                field: "workers",
                reason: "must be greater than 0".to_string(),
            }
            .into());
        }
        if self.analysis.metrics.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "metrics",
                reason: "must list at least one metric".to_string(),
            }
            .into());
        }

        let mut seen = HashSet::new();
        if let Some(duplicate) = self.analysis.metrics.iter().find(|m| !seen.insert(**m)) {
            return Err(ConfigError::InvalidValue {
                field: "metrics",
                reason: format!("{duplicate} is listed more than once"),
            }
            .into());
        }

        match self.logging.format.as_str() {
            "pretty" | "json" => {}
            other => {
                return Err(ConfigError::InvalidValue {
                    field: "format",
                    reason: format!("unknown log format '{other}' (expected pretty or json)"),
                }
                .into());
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::batch::EmptyInstitutionPolicy;
    use crate::domain::Metric;
    use crate::error::Error;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn empty_file_uses_defaults() {
        let config = Config::parse_toml_with_env("", no_env).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.analysis.peer_count, 10);
        assert_eq!(config.analysis.metrics.len(), 13);
        assert_eq!(config.batch.workers, 10);
        assert!(config.batch.cache_periods);
    }

    #[test]
    fn parses_every_section() {
        let toml = r#"
database = "/data/peers.db"
lock_file = "/run/bankpeer.lock"
status_file = "/data/status.json"

[logging]
level = "debug"
format = "json"

[analysis]
peer_count = 5
size_metric = "totalDeposits"
metrics = ["roa", "efficiencyRatio"]
empty_institutions = "error"

[batch]
workers = 4
cache_periods = false
"#;
        let config = Config::parse_toml_with_env(toml, no_env).unwrap();
        assert_eq!(config.database, "/data/peers.db");
        assert_eq!(config.lock_file, Some(PathBuf::from("/run/bankpeer.lock")));
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.analysis.size_metric, Metric::TotalDeposits);
        assert_eq!(
            config.analysis.metrics,
            vec![Metric::Roa, Metric::EfficiencyRatio]
        );
        assert_eq!(config.analysis.empty_institutions, EmptyInstitutionPolicy::Error);

        let settings = config.batch_settings(true);
        assert_eq!(settings.peer_count, 5);
        assert_eq!(settings.workers, 4);
        assert!(!settings.cache_periods);
        assert!(settings.dry_run);
    }

    #[test]
    fn environment_overrides_database() {
        let config = Config::parse_toml_with_env("database = \"a.db\"", |key| {
            (key == DATABASE_ENV).then(|| "b.db".to_string())
        })
        .unwrap();
        assert_eq!(config.database, "b.db");
    }

    #[test]
    fn rejects_zero_peer_count() {
        let err = Config::parse_toml_with_env("[analysis]\npeer_count = 0", no_env).unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::InvalidValue {
                field: "peer_count",
                ..
            })
        ));
    }

    #[test]
    fn rejects_duplicate_metrics() {
        let err = Config::parse_toml_with_env("[analysis]\nmetrics = [\"roa\", \"roa\"]", no_env)
            .unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn rejects_unknown_metric_name() {
        let err = Config::parse_toml_with_env("[analysis]\nmetrics = [\"tier1\"]", no_env)
            .unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::Parse(_))));
    }

    #[test]
    fn rejects_empty_database() {
        let err = Config::parse_toml_with_env("database = \"\"", no_env).unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::MissingField { field: "database" })
        ));
    }

    #[test]
    fn default_config_round_trips_through_toml() {
        let rendered = Config::default().to_toml().unwrap();
        let parsed = Config::parse_toml_with_env(&rendered, no_env).unwrap();
        assert_eq!(parsed, Config::default());
    }
}
