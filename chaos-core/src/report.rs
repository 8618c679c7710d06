use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Scores strictly below this mark a run as `Action Required`.
pub const ACTION_REQUIRED_BELOW: f64 = 7.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReportStatus {
    Completed,
    #[serde(rename = "Action Required")]
    ActionRequired,
    #[serde(rename = "In Progress")]
    InProgress,
}

impl ReportStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, ReportStatus::InProgress)
    }

    /// Terminal status for a finished run.
    pub fn from_score(score: f64) -> Self {
        if score < ACTION_REQUIRED_BELOW {
            ReportStatus::ActionRequired
        } else {
            ReportStatus::Completed
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ReportStatus::Completed => "Completed",
            ReportStatus::ActionRequired => "Action Required",
            ReportStatus::InProgress => "In Progress",
        }
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExperimentResult {
    pub target: String,
    pub action: String,
    pub outcome: String,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub id: String,
    pub name: String,
    pub date: String,
    pub status: ReportStatus,
    #[serde(rename = "resilienceScore")]
    pub resilience_score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<ExperimentResult>,
}

impl Report {
    pub fn pending(id: impl Into<String>, name: impl Into<String>, date: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            date: date.into(),
            status: ReportStatus::InProgress,
            resilience_score: 0.0,
            result: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperimentKind {
    PodCrash,
    Latency,
    Resource,
}

impl ExperimentKind {
    pub const ALL: [ExperimentKind; 3] = [
        ExperimentKind::PodCrash,
        ExperimentKind::Latency,
        ExperimentKind::Resource,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ExperimentKind::PodCrash => "pod_crash",
            ExperimentKind::Latency => "latency",
            ExperimentKind::Resource => "resource",
        }
    }

    /// Display name the experiments screen uses when triggering this kind.
    pub fn default_name(self) -> &'static str {
        match self {
            ExperimentKind::PodCrash => "Pod Crash Test - Web Server",
            ExperimentKind::Latency => "API Gateway Latency Injection",
            ExperimentKind::Resource => "Inventory Service CPU Exhaustion",
        }
    }
}

impl fmt::Display for ExperimentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExperimentKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pod_crash" => Ok(ExperimentKind::PodCrash),
            "latency" => Ok(ExperimentKind::Latency),
            "resource" => Ok(ExperimentKind::Resource),
            other => Err(Error::UnknownExperimentKind(other.to_string())),
        }
    }
}

/// Demo history the lab starts with, newest first.
pub fn seed_reports() -> Vec<Report> {
    vec![
        seeded(
            "rep-073",
            "Pod Deletion Test - Checkout Service",
            "2025-06-24T18:30:00Z",
            ReportStatus::Completed,
            7.5,
            "gke-us-central1-a/prod-cluster/checkout-service-pod-abc456",
            "pod_crash",
            "SUCCESS - Pod successfully terminated and a new instance was scheduled and became healthy.",
            "Sent SIGKILL to pod checkout-service-pod-abc456. A new pod was scheduled and passed readiness probes in 52 seconds.",
        ),
        seeded(
            "rep-072",
            "API Gateway Latency Injection Analysis",
            "2025-06-22T11:00:00Z",
            ReportStatus::Completed,
            9.1,
            "api-gateway",
            "latency_injection",
            "SUCCESS - System handled the 300ms injected latency while staying within SLOs.",
            "Injected 300ms latency to all outbound network traffic from the API gateway service for 5 minutes.",
        ),
        seeded(
            "rep-071",
            "Database Failover Test (Post-Patch)",
            "2025-06-20T09:15:00Z",
            ReportStatus::Completed,
            8.8,
            "prod-db-cluster",
            "database_failover",
            "SUCCESS - Primary database failed over to replica in 32 seconds with no data loss.",
            "Connection pool successfully re-established connections after failover.",
        ),
        seeded(
            "rep-070",
            "Database Failover Test (Pre-Patch)",
            "2025-06-18T14:05:00Z",
            ReportStatus::ActionRequired,
            6.4,
            "prod-db-cluster",
            "database_failover",
            "FAILURE - Failover took 3 minutes and resulted in brief data inconsistency.",
            "Applications experienced connection timeouts during the extended failover window.",
        ),
        seeded(
            "rep-069",
            "Full Platform Blackout Test",
            "2025-06-17T16:45:00Z",
            ReportStatus::Completed,
            8.9,
            "all-systems",
            "region_failure",
            "SUCCESS - All critical services recovered automatically in the failover region within 15 minutes.",
            "A full regional outage was triggered. DNS routing and data replication performed as expected.",
        ),
    ]
}

#[allow(clippy::too_many_arguments)]
fn seeded(
    id: &str,
    name: &str,
    date: &str,
    status: ReportStatus,
    score: f64,
    target: &str,
    action: &str,
    outcome: &str,
    details: &str,
) -> Report {
    Report {
        id: id.into(),
        name: name.into(),
        date: date.into(),
        status,
        resilience_score: score,
        result: Some(ExperimentResult {
            target: target.into(),
            action: action.into(),
            outcome: outcome.into(),
            timestamp: date.into(),
            details: Some(details.into()),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_uses_display_labels_on_the_wire() {
        let json = serde_json::to_string(&ReportStatus::ActionRequired).expect("json");
        assert_eq!(json, "\"Action Required\"");
        let parsed: ReportStatus = serde_json::from_str("\"In Progress\"").expect("parse");
        assert_eq!(parsed, ReportStatus::InProgress);
    }

    #[test]
    fn threshold_splits_terminal_status() {
        assert_eq!(ReportStatus::from_score(6.9), ReportStatus::ActionRequired);
        assert_eq!(ReportStatus::from_score(7.0), ReportStatus::Completed);
        assert_eq!(ReportStatus::from_score(10.0), ReportStatus::Completed);
    }

    #[test]
    fn pending_report_serializes_without_result() {
        let report = Report::pending("rep-074", "Pod Crash Test", "2025-06-24T20:30:00.000Z");
        let v = serde_json::to_value(&report).expect("json");
        assert_eq!(v["status"], "In Progress");
        assert_eq!(v["resilienceScore"], 0.0);
        assert!(v.get("result").is_none());
    }

    #[test]
    fn kind_parses_wire_names() {
        for kind in ExperimentKind::ALL {
            assert_eq!(kind.as_str().parse::<ExperimentKind>().expect("kind"), kind);
        }
        assert!("network_partition".parse::<ExperimentKind>().is_err());
    }

    #[test]
    fn seed_history_is_newest_first_with_unique_ids() {
        let reports = seed_reports();
        assert_eq!(reports.len(), 5);
        assert_eq!(reports[0].id, "rep-073");
        let mut ids = reports.iter().map(|r| r.id.clone()).collect::<Vec<_>>();
        ids.dedup();
        assert_eq!(ids.len(), 5);
        assert!(reports.windows(2).all(|w| w[0].date > w[1].date));
    }
}
