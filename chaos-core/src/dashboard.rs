use crate::report::{Report, ReportStatus};
use chrono::DateTime;
use serde::{Deserialize, Serialize};

/// Number of reports in the recent activity feed.
pub const RECENT_ACTIVITY: usize = 2;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScorePoint {
    /// `MM-DD` of the report date.
    pub date: String,
    pub score: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub total_reports: usize,
    pub completed: usize,
    pub action_required: usize,
    pub in_progress: usize,
    pub average_score: Option<f64>,
    pub score_trend: Vec<ScorePoint>,
    pub recent: Vec<Report>,
}

/// Summarize a newest-first report list.
pub fn summarize(reports: &[Report]) -> DashboardSummary {
    let count = |status: ReportStatus| reports.iter().filter(|r| r.status == status).count();
    let terminal = reports.iter().filter(|r| r.is_terminal()).collect::<Vec<_>>();

    let average_score = if terminal.is_empty() {
        None
    } else {
        let total: f64 = terminal.iter().map(|r| r.resilience_score).sum();
        Some((total / terminal.len() as f64 * 10.0).round() / 10.0)
    };

    let score_trend = terminal
        .iter()
        .rev()
        .map(|r| ScorePoint {
            date: month_day(&r.date),
            score: r.resilience_score,
        })
        .collect();

    DashboardSummary {
        total_reports: reports.len(),
        completed: count(ReportStatus::Completed),
        action_required: count(ReportStatus::ActionRequired),
        in_progress: count(ReportStatus::InProgress),
        average_score,
        score_trend,
        recent: reports.iter().take(RECENT_ACTIVITY).cloned().collect(),
    }
}

fn month_day(date: &str) -> String {
    DateTime::parse_from_rfc3339(date)
        .map(|d| d.format("%m-%d").to_string())
        .unwrap_or_else(|_| date.to_string())
}
