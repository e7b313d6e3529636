//! Run and per-institution outcome tracking.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::{InstitutionId, ReportingPeriod};

/// Lifecycle of one institution within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InstitutionState {
    Pending,
    InProgress,
    Completed,
    Failed,
    /// No reporting periods and the skip policy applies.
    Skipped,
}

/// Lifecycle of a whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    NotStarted,
    Running,
    Finished,
    /// Shutdown was requested before every institution was scheduled.
    Cancelled,
}

/// Final state of one institution after its worker let go of it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstitutionOutcome {
    pub institution: InstitutionId,
    pub state: InstitutionState,
    pub periods_written: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_period: Option<ReportingPeriod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl InstitutionOutcome {
    pub(crate) fn completed(institution: InstitutionId, periods_written: usize) -> Self {
        Self {
            institution,
            state: InstitutionState::Completed,
            periods_written,
            failed_period: None,
            error: None,
        }
    }

    pub(crate) fn skipped(institution: InstitutionId) -> Self {
        Self {
            institution,
            state: InstitutionState::Skipped,
            periods_written: 0,
            failed_period: None,
            error: None,
        }
    }

    pub(crate) fn failed(
        institution: InstitutionId,
        periods_written: usize,
        failed_period: Option<ReportingPeriod>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            institution,
            state: InstitutionState::Failed,
            periods_written,
            failed_period,
            error: Some(error.into()),
        }
    }
}

/// A failed institution as reported in the run summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailureRecord {
    pub institution: InstitutionId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<ReportingPeriod>,
    pub reason: String,
}

/// Aggregate result of one run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub state: RunState,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub dry_run: bool,
    /// Institutions queued for this run.
    pub total: usize,
    /// Institutions whose every period completed.
    pub processed: usize,
    /// Institutions that failed at some period.
    pub errors: usize,
    pub skipped: usize,
    /// Institutions never started because of shutdown.
    pub cancelled: usize,
    pub periods_written: usize,
    pub failures: Vec<FailureRecord>,
}

impl RunSummary {
    #[must_use]
    pub fn new(run_id: Uuid, started_at: DateTime<Utc>, total: usize, dry_run: bool) -> Self {
        Self {
            run_id,
            state: RunState::Running,
            started_at,
            finished_at: None,
            dry_run,
            total,
            processed: 0,
            errors: 0,
            skipped: 0,
            cancelled: 0,
            periods_written: 0,
            failures: Vec::new(),
        }
    }

    /// Fold one institution outcome into the totals.
    pub fn record(&mut self, outcome: InstitutionOutcome) {
        self.periods_written += outcome.periods_written;
        match outcome.state {
            InstitutionState::Completed => self.processed += 1,
            InstitutionState::Skipped => self.skipped += 1,
            InstitutionState::Failed => {
                self.errors += 1;
                self.failures.push(FailureRecord {
                    institution: outcome.institution,
                    period: outcome.failed_period,
                    reason: outcome.error.unwrap_or_default(),
                });
            }
            InstitutionState::Pending | InstitutionState::InProgress => self.cancelled += 1,
        }
    }

    /// Close the run.
    pub fn finish(&mut self, finished_at: DateTime<Utc>, cancelled: bool) {
        self.state = if cancelled {
            RunState::Cancelled
        } else {
            RunState::Finished
        };
        self.finished_at = Some(finished_at);
        self.failures
            .sort_by(|a, b| a.institution.cmp(&b.institution));
    }

    /// Institutions that reached a final state.
    #[must_use]
    pub fn accounted(&self) -> usize {
        self.processed + self.errors + self.skipped + self.cancelled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_tallies_each_state() {
        let mut summary = RunSummary::new(Uuid::new_v4(), Utc::now(), 4, false);
        summary.record(InstitutionOutcome::completed("a".into(), 3));
        summary.record(InstitutionOutcome::failed("b".into(), 1, None, "boom"));
        summary.record(InstitutionOutcome::skipped("c".into()));
        summary.record(InstitutionOutcome {
            institution: "d".into(),
            state: InstitutionState::Pending,
            periods_written: 0,
            failed_period: None,
            error: None,
        });
        summary.finish(Utc::now(), true);

        assert_eq!(summary.processed, 1);
        assert_eq!(summary.errors, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.cancelled, 1);
        assert_eq!(summary.periods_written, 4);
        assert_eq!(summary.accounted(), summary.total);
        assert_eq!(summary.state, RunState::Cancelled);
        assert_eq!(summary.failures[0].reason, "boom");
    }

    #[test]
    fn summary_serializes_snake_case_state() {
        let mut summary = RunSummary::new(Uuid::nil(), Utc::now(), 0, true);
        summary.finish(Utc::now(), false);
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["state"], "finished");
        assert_eq!(json["dry_run"], true);
    }
}
