//! Handler for the `config` command group.

use std::fs;
use std::path::Path;

use serde_json::json;

use crate::adapter::inbound::cli::diagnostic::ConfigDiagnostic;
use crate::adapter::inbound::cli::output;
use crate::error::{ConfigError, Result};
use crate::infrastructure::config::Config;

/// Default config template with documentation.
const CONFIG_TEMPLATE: &str = include_str!("../../../../config.toml.example");

/// Load a config file, rendering a source diagnostic on failure.
///
/// # Errors
/// Returns the underlying load error after reporting it.
pub fn load(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
    Config::parse_toml(&content).inspect_err(|e| report(e, &content))
}

fn report(error: &crate::error::Error, content: &str) {
    if output::is_json() {
        return;
    }
    if let Some(diagnostic) = ConfigDiagnostic::from_error(error, content) {
        eprintln!("{:?}", miette::Report::new(diagnostic));
    }
}

/// Execute `config init`.
pub fn execute_init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(ConfigError::InvalidValue {
            field: "config",
            reason: "file already exists (use --force to overwrite)".to_string(),
        }
        .into());
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    fs::write(path, CONFIG_TEMPLATE)?;

    if output::is_json() {
        output::json_output(json!({
            "command": "config.init",
            "path": path.display().to_string(),
        }));
        return Ok(());
    }

    output::section("Config Initialized");
    output::success("Created configuration file");
    output::field("Path", path.display());
    output::section("Next Steps");
    output::note(&format!("1. Edit {} with your settings", path.display()));
    output::note(&format!("2. Run: bankpeer import statements.json -c {}", path.display()));
    output::note(&format!("3. Run: bankpeer run -c {}", path.display()));
    Ok(())
}

/// Execute `config show`.
pub fn execute_show(path: &Path) -> Result<()> {
    let config = load(path)?;

    if output::is_json() {
        output::json_output(json!({
            "command": "config.show",
            "config": serde_json::to_value(&config)?,
        }));
        return Ok(());
    }

    output::section("Effective Configuration");
    output::field("Database", &config.database);
    output::field(
        "Lock file",
        config
            .lock_file
            .as_ref()
            .map_or_else(|| "(none)".to_string(), |p| p.display().to_string()),
    );
    output::field(
        "Status file",
        config
            .status_file
            .as_ref()
            .map_or_else(|| "(none)".to_string(), |p| p.display().to_string()),
    );

    output::section("Analysis");
    output::field("Peer count", config.analysis.peer_count);
    output::field("Size metric", config.analysis.size_metric);
    output::field("Metrics", config.analysis.metrics.len());
    if output::verbosity() > 0 {
        for metric in &config.analysis.metrics {
            output::note(&format!("- {metric}"));
        }
    }
    output::field(
        "Empty",
        match config.analysis.empty_institutions {
            crate::application::batch::EmptyInstitutionPolicy::Skip => "skip",
            crate::application::batch::EmptyInstitutionPolicy::Error => "error",
        },
    );

    output::section("Batch");
    output::field("Workers", config.batch.workers);
    output::field(
        "Cache",
        if config.batch.cache_periods {
            "enabled"
        } else {
            "disabled"
        },
    );

    output::section("Logging");
    output::field("Level", &config.logging.level);
    output::field("Format", &config.logging.format);
    Ok(())
}

/// Execute `config validate`.
pub fn execute_validate(path: &Path) -> Result<()> {
    let config = load(path)?;

    if output::is_json() {
        output::json_output(json!({
            "command": "config.validate",
            "valid": true,
            "path": path.display().to_string(),
        }));
        return Ok(());
    }

    output::success("Configuration is valid");
    output::field("Path", path.display());
    output::field("Metrics", config.analysis.metrics.len());
    Ok(())
}
