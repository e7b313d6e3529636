//! Handler for the `run` command.

use std::sync::Arc;

use serde_json::json;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::adapter::inbound::cli::command::RunArgs;
use crate::adapter::inbound::cli::{config, output};
use crate::adapter::outbound::sqlite::SqliteStore;
use crate::application::batch::{BatchOrchestrator, RunState, RunSummary};
use crate::domain::InstitutionId;
use crate::error::{Error, Result};
use crate::infrastructure::config::Config;
use crate::infrastructure::lock::RunLock;
use crate::infrastructure::status::{StatusConfig, StatusFile};

/// Execute the `run` command.
pub async fn execute(args: RunArgs, shutdown: watch::Receiver<bool>) -> Result<()> {
    let mut config = config::load(&args.config)?;
    apply_overrides(&mut config, &args);
    config.validate()?;

    init_logging(&config, args.log_level.as_deref());

    let _lock = config
        .lock_file
        .as_ref()
        .map(RunLock::acquire)
        .transpose()
        .inspect_err(stale_lock_hint)?;

    output::header(env!("CARGO_PKG_VERSION"));
    output::field("Database", &config.database);
    output::field("Peer count", config.analysis.peer_count);
    output::field("Workers", config.batch.workers);
    if args.dry_run {
        output::field("Mode", output::highlight("dry run"));
    }

    let store = Arc::new(SqliteStore::open(&config.database, config.analysis.size_metric)?);
    let orchestrator = BatchOrchestrator::new(Arc::clone(&store), config.batch_settings(args.dry_run))
        .with_shutdown(shutdown);

    let spinner = output::spinner("Analysing institutions...");
    let result = if args.institutions.is_empty() {
        orchestrator.run().await
    } else {
        let ids = args.institutions.iter().map(InstitutionId::new).collect();
        orchestrator.run_all(ids, config.analysis.peer_count).await
    };

    drop(orchestrator);
    match Arc::try_unwrap(store) {
        Ok(store) => store.close(),
        Err(_) => warn!("Store still shared after run; leaving pool to drop"),
    }

    let summary = match result {
        Ok(summary) => {
            spinner_finish(&spinner, &summary);
            summary
        }
        Err(e) => {
            output::spinner_fail(&spinner, "Run failed");
            return Err(e);
        }
    };

    if let Some(path) = &config.status_file {
        StatusFile::new(status_config(&config), &summary).write(path)?;
        info!(path = %path.display(), "Status file written");
    }

    report(&summary);
    Ok(())
}

fn apply_overrides(config: &mut Config, args: &RunArgs) {
    if let Some(database) = &args.database {
        config.database.clone_from(database);
    }
    if let Some(peer_count) = args.peer_count {
        config.analysis.peer_count = peer_count;
    }
    if let Some(workers) = args.workers {
        config.batch.workers = workers;
    }
}

/// A killed run leaves its lock behind; tell the operator which file to remove.
fn stale_lock_hint(err: &Error) {
    if let Error::AlreadyRunning { path } = err {
        if let Some(holder) = RunLock::holder(path) {
            output::note(&format!("Lock written by `{holder}` (pid, start time)"));
        }
        output::hint(&format!(
            "if no run is active, delete {} and retry",
            path.display()
        ));
    }
}

fn init_logging(config: &Config, level: Option<&str>) {
    let level = level.map(str::to_string).or_else(|| match output::verbosity() {
        0 => None,
        1 => Some("debug".to_string()),
        _ => Some("trace".to_string()),
    });

    match level {
        Some(level) => config.logging.with_level(level).init(),
        None => config.init_logging(),
    }
}

fn status_config(config: &Config) -> StatusConfig {
    StatusConfig {
        database: config.database.clone(),
        peer_count: config.analysis.peer_count,
        size_metric: config.analysis.size_metric,
        metrics: config.analysis.metrics.clone(),
        workers: config.batch.workers,
    }
}

fn spinner_finish(spinner: &indicatif::ProgressBar, summary: &RunSummary) {
    let message = format!(
        "Analysed {} of {} institutions",
        summary.processed, summary.total
    );
    if summary.errors > 0 || summary.state == RunState::Cancelled {
        output::spinner_fail(spinner, &message);
    } else {
        output::spinner_success(spinner, &message);
    }
}

fn report(summary: &RunSummary) {
    if output::is_json() {
        output::json_output(json!({
            "command": "run",
            "summary": summary,
        }));
        return;
    }

    output::section("Summary");
    output::field("Run", summary.run_id);
    output::field("Processed", output::positive(summary.processed));
    output::field(
        "Errors",
        if summary.errors > 0 {
            output::negative(summary.errors)
        } else {
            output::muted(summary.errors)
        },
    );
    output::field("Skipped", summary.skipped);
    output::field("Periods", summary.periods_written);
    if let Some(finished) = summary.finished_at {
        let elapsed = finished - summary.started_at;
        output::field("Elapsed", format!("{:.2}s", elapsed.num_milliseconds() as f64 / 1000.0));
    }

    if summary.state == RunState::Cancelled {
        output::warning(&format!(
            "Run cancelled; {} institutions were not started",
            summary.cancelled
        ));
    }

    if !summary.failures.is_empty() {
        output::section("Failures");
        for failure in &summary.failures {
            let at = failure
                .period
                .map_or_else(String::new, |p| format!(" at {p}"));
            output::error(&format!("{}{at}: {}", failure.institution, failure.reason));
        }
    }

    if summary.dry_run {
        output::hint("dry run: nothing was written");
    }
}
