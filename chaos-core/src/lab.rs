//! Experiment lifecycle simulator.
//!
//! A [`Lab`] owns the report history and the single in-flight experiment.
//! Triggering inserts an `In Progress` report at the head of the history;
//! after the configured delay the same id is replaced by a scored terminal
//! report. Only one experiment may be in flight: a second trigger is
//! rejected with [`Error::ExperimentInFlight`] until the first finalizes.

use crate::config::LabConfig;
use crate::error::{Error, Result};
use crate::narrative;
use crate::report::{seed_reports, ExperimentKind, Report, ReportStatus};
use crate::score::{ScoreSource, SeededScores};
use crate::store::ReportStore;
use chrono::{DateTime, Duration as ChronoDuration, SecondsFormat};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Id base used when the history is empty or the newest id has no numeric suffix.
pub const DEFAULT_ID_BASE: u64 = 73;
/// Date base used when the history is empty.
pub const DEFAULT_BASE_DATE: &str = "2025-06-24T18:30:00Z";

/// A triggered experiment whose report is still `In Progress`.
#[derive(Clone, Debug, PartialEq)]
pub struct PendingRun {
    pub kind: ExperimentKind,
    pub report: Report,
}

struct LabState {
    store: ReportStore,
    in_flight: Option<String>,
}

pub struct Lab {
    state: Mutex<LabState>,
    scores: Mutex<Box<dyn ScoreSource>>,
    config: LabConfig,
}

impl Lab {
    pub fn new(reports: Vec<Report>, config: LabConfig, scores: impl ScoreSource) -> Self {
        Self {
            state: Mutex::new(LabState {
                store: ReportStore::with_reports(reports),
                in_flight: None,
            }),
            scores: Mutex::new(Box::new(scores)),
            config,
        }
    }

    /// Lab seeded with the demo history and a score generator built from
    /// `config.score_seed`.
    pub fn demo(config: LabConfig) -> Self {
        let scores = match config.score_seed {
            Some(seed) => SeededScores::from_seed(seed),
            None => SeededScores::from_entropy(),
        };
        Self::new(seed_reports(), config, scores)
    }

    pub fn config(&self) -> &LabConfig {
        &self.config
    }

    pub fn reports(&self) -> Vec<Report> {
        self.lock_state().store.list_reports()
    }

    pub fn report(&self, id: &str) -> Option<Report> {
        self.lock_state().store.get(id).cloned()
    }

    pub fn is_running(&self) -> bool {
        self.lock_state().in_flight.is_some()
    }

    pub fn running_report_id(&self) -> Option<String> {
        self.lock_state().in_flight.clone()
    }

    /// Insert the pending report and mark it in flight.
    pub fn begin(&self, kind: ExperimentKind, name: &str) -> Result<PendingRun> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidInput("experiment name is required".into()));
        }

        let mut state = self.lock_state();
        if let Some(id) = &state.in_flight {
            warn!(running = %id, kind = %kind, "rejected trigger while an experiment is in flight");
            return Err(Error::ExperimentInFlight { id: id.clone() });
        }

        let newest = state.store.newest();
        let id = next_report_id(newest.map(|r| r.id.as_str()));
        let date = next_experiment_date(newest.map(|r| r.date.as_str()));
        let report = Report::pending(id.clone(), name, date);

        state.store.append_pending(report.clone());
        state.in_flight = Some(id.clone());
        info!(report_id = %id, kind = %kind, name, "experiment started");

        Ok(PendingRun { kind, report })
    }

    /// Wait out the simulated run, then score and finalize it.
    pub async fn complete(&self, run: PendingRun) -> Result<Report> {
        tokio::time::sleep(self.config.finalize_delay).await;
        self.finalize_now(run)
    }

    /// Score and finalize a pending run without waiting.
    pub fn finalize_now(&self, run: PendingRun) -> Result<Report> {
        let score = self
            .scores
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .next_score();
        let id = run.report.id.clone();
        let status = ReportStatus::from_score(score);
        let result = narrative::for_kind(run.kind).result(score, &run.report.date);

        let terminal = Report {
            status,
            resilience_score: score,
            result: Some(result),
            ..run.report
        };

        let mut state = self.lock_state();
        let finalized = state.store.finalize(&id, terminal);
        if state.in_flight.as_deref() == Some(id.as_str()) {
            state.in_flight = None;
        }
        drop(state);

        match &finalized {
            Ok(report) => info!(
                report_id = %report.id,
                score = report.resilience_score,
                status = %report.status,
                "experiment finalized"
            ),
            Err(err) => warn!(error = %err, "experiment finalization failed"),
        }
        finalized
    }

    /// Begin and complete in one call.
    pub async fn trigger(&self, kind: ExperimentKind, name: &str) -> Result<Report> {
        let run = self.begin(kind, name)?;
        self.complete(run).await
    }

    /// Begin now and finalize on a background task. Requires a tokio runtime.
    pub fn spawn(
        self: &Arc<Self>,
        kind: ExperimentKind,
        name: &str,
    ) -> Result<(Report, JoinHandle<Result<Report>>)> {
        let run = self.begin(kind, name)?;
        let pending = run.report.clone();
        let lab = Arc::clone(self);
        let handle = tokio::spawn(async move { lab.complete(run).await });
        Ok((pending, handle))
    }

    fn lock_state(&self) -> MutexGuard<'_, LabState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// `rep-NNN` following the newest id's numeric suffix.
pub fn next_report_id(newest_id: Option<&str>) -> String {
    let base = newest_id
        .and_then(|id| id.rsplit('-').next())
        .and_then(|suffix| suffix.parse::<u64>().ok())
        .unwrap_or(DEFAULT_ID_BASE);
    format!("rep-{:03}", base + 1)
}

/// Two hours after the newest report's date, as an RFC 3339 UTC string.
pub fn next_experiment_date(newest_date: Option<&str>) -> String {
    let base = newest_date
        .and_then(|d| DateTime::parse_from_rfc3339(d).ok())
        .or_else(|| DateTime::parse_from_rfc3339(DEFAULT_BASE_DATE).ok());
    match base {
        Some(base) => (base + ChronoDuration::hours(2))
            .naive_utc()
            .and_utc()
            .to_rfc3339_opts(SecondsFormat::Millis, true),
        None => DEFAULT_BASE_DATE.to_string(),
    }
}
