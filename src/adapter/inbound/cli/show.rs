//! Handler for the `show` command.

use serde_json::json;
use tabled::{Table, Tabled};

use crate::adapter::inbound::cli::command::ShowArgs;
use crate::adapter::inbound::cli::{config, output};
use crate::adapter::outbound::sqlite::SqliteStore;
use crate::domain::{InstitutionId, PeerAnalysis, ReportingPeriod};
use crate::error::{Error, Result};
use crate::port::{StatementCatalog, StatementStore};

#[derive(Tabled)]
struct AnalysisRow {
    #[tabled(rename = "Metric")]
    metric: String,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Peer avg")]
    average: String,
    #[tabled(rename = "Rank")]
    rank: String,
    #[tabled(rename = "Pctl")]
    percentile: String,
}

fn format_value(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.4}"))
}

fn rows(analysis: &PeerAnalysis) -> Vec<AnalysisRow> {
    analysis
        .rankings
        .iter()
        .map(|(&metric, ranking)| AnalysisRow {
            metric: metric.label().to_string(),
            value: format_value(ranking.value),
            average: format_value(analysis.averages.get(metric)),
            rank: if ranking.is_ranked() {
                format!("{}/{}", ranking.rank, ranking.total)
            } else {
                "-".to_string()
            },
            percentile: ranking
                .percentile
                .map_or_else(|| "-".to_string(), |p| p.to_string()),
        })
        .collect()
}

/// Execute the `show` command.
pub async fn execute(args: ShowArgs) -> Result<()> {
    let config = config::load(&args.config)?;
    let store = SqliteStore::open(&config.database, config.analysis.size_metric)?;
    let id = InstitutionId::new(args.institution);

    let period = match args.period {
        Some(raw) => raw.parse::<ReportingPeriod>()?,
        None => store
            .periods_for_institution(&id)
            .await?
            .last()
            .copied()
            .ok_or_else(|| Error::NoStatements {
                institution: id.to_string(),
            })?,
    };

    let institution = store.institution(&id).await?;
    let analysis = store.peer_analysis(&id, period).await?;
    store.close();

    if output::is_json() {
        output::json_output(json!({
            "command": "show",
            "institution": id,
            "name": institution.as_ref().map(|i| i.name.as_str()),
            "period": period,
            "analysis": analysis,
        }));
        return Ok(());
    }

    output::header(env!("CARGO_PKG_VERSION"));
    output::field("Institution", &id);
    if let Some(institution) = &institution {
        output::field("Name", &institution.name);
    }
    output::field("Period", period);

    let Some(analysis) = analysis else {
        output::warning("No peer analysis stored for this period");
        output::hint(&format!(
            "run {} to compute it",
            output::highlight("bankpeer run")
        ));
        return Ok(());
    };

    output::section("Peer cohort");
    output::field("Larger", analysis.cohort.larger_count);
    output::field("Smaller", analysis.cohort.smaller_count);
    if output::verbosity() > 0 {
        let peers: Vec<_> = analysis.cohort.peer_ids.iter().map(InstitutionId::as_str).collect();
        output::field("Peers", peers.join(", "));
    }
    output::field("Generated", analysis.generated_at.to_rfc3339());

    output::section("Metrics");
    output::lines(&Table::new(rows(&analysis)).to_string());
    Ok(())
}
