//! Metric listing.

use serde_json::json;
use tabled::{Table, Tabled};

use crate::adapter::inbound::cli::output;
use crate::domain::{Direction, Metric};
use crate::error::Result;

#[derive(Tabled)]
struct MetricRow {
    #[tabled(rename = "Metric")]
    name: &'static str,
    #[tabled(rename = "Label")]
    label: &'static str,
    #[tabled(rename = "Better")]
    better: &'static str,
}

fn better(direction: Direction) -> &'static str {
    match direction {
        Direction::HigherIsBetter => "higher",
        Direction::LowerIsBetter => "lower",
    }
}

/// List tracked metrics.
pub fn list() -> Result<()> {
    if output::is_quiet() && !output::is_json() {
        return Ok(());
    }

    if output::is_json() {
        let metrics: Vec<_> = Metric::ALL
            .iter()
            .map(|m| {
                json!({
                    "name": m.as_str(),
                    "label": m.label(),
                    "direction": m.direction(),
                })
            })
            .collect();
        output::json_output(json!({
            "command": "metrics.list",
            "metrics": metrics,
        }));
        return Ok(());
    }

    output::header(env!("CARGO_PKG_VERSION"));
    output::section("Tracked metrics");

    let rows: Vec<MetricRow> = Metric::ALL
        .iter()
        .map(|m| MetricRow {
            name: m.as_str(),
            label: m.label(),
            better: better(m.direction()),
        })
        .collect();
    output::lines(&Table::new(rows).to_string());

    output::hint(&format!(
        "restrict a run with {}",
        output::highlight("[analysis] metrics = [\"roa\", \"efficiencyRatio\"]")
    ));

    Ok(())
}
