use crate::report::{ExperimentKind, ExperimentResult, Report, ReportStatus, ACTION_REQUIRED_BELOW};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Narrative {
    pub target: &'static str,
    pub action: &'static str,
    pub failure: &'static str,
    pub success: &'static str,
    pub details: &'static str,
}

impl Narrative {
    pub fn outcome(&self, score: f64) -> &'static str {
        if score < ACTION_REQUIRED_BELOW {
            self.failure
        } else {
            self.success
        }
    }

    pub fn result(&self, score: f64, timestamp: &str) -> ExperimentResult {
        ExperimentResult {
            target: self.target.to_string(),
            action: self.action.to_string(),
            outcome: self.outcome(score).to_string(),
            timestamp: timestamp.to_string(),
            details: Some(self.details.to_string()),
        }
    }
}

pub fn for_kind(kind: ExperimentKind) -> Narrative {
    match kind {
        ExperimentKind::PodCrash => Narrative {
            target: "gke-us-central1-a/prod-cluster/checkout-service-pod-xyz123",
            action: "pod_crash",
            failure: "FAILURE - Pod did not recover within the 5-minute SLA.",
            success: "SUCCESS - Pod successfully terminated and a new instance was scheduled and became healthy.",
            details: "Sent SIGKILL to pod checkout-service-pod-xyz123 in the default namespace. GKE controller manager detected the failure and initiated self-healing. A new pod was scheduled and passed readiness probes in 45 seconds.",
        },
        ExperimentKind::Latency => Narrative {
            target: "api-gateway",
            action: "latency_injection",
            failure: "DEGRADED - API p99 response times exceeded the 500ms SLO, peaking at 850ms.",
            success: "SUCCESS - System handled the 300ms injected latency while staying within SLOs.",
            details: "Injected 300ms latency to all outbound network traffic from the API gateway service for 5 minutes. Monitored p95 and p99 response times via integrated Prometheus metrics.",
        },
        ExperimentKind::Resource => Narrative {
            target: "inventory-service-deployment",
            action: "cpu_exhaustion",
            failure: "FAILURE - HPA failed to scale up the deployment in time, leading to request timeouts.",
            success: "SUCCESS - Kubernetes HPA correctly detected high CPU load and scaled the deployment from 3 to 5 replicas.",
            details: "Stressed CPU on all pods in the inventory-service deployment to 90% for 10 minutes. The Horizontal Pod Autoscaler (HPA) triggered a scale-up event after 60 seconds and added two new replicas to handle the load.",
        },
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScoreBand {
    High,
    Moderate,
    Low,
}

impl ScoreBand {
    pub fn of(score: f64) -> Self {
        if score > 8.5 {
            ScoreBand::High
        } else if score > 7.0 {
            ScoreBand::Moderate
        } else {
            ScoreBand::Low
        }
    }
}

pub fn summary(report: &Report) -> &'static str {
    if report.status == ReportStatus::ActionRequired {
        return "Anomalies were detected that require further investigation. Key metrics deviated beyond acceptable thresholds, suggesting a potential vulnerability.";
    }
    match ScoreBand::of(report.resilience_score) {
        ScoreBand::High => "The system performed exceptionally well, showing high resilience and recovering quickly from the injected fault without any significant degradation.",
        ScoreBand::Moderate => "The system performed within expected parameters and successfully recovered from the injected fault. Some minor performance degradation was observed but was within acceptable limits.",
        ScoreBand::Low => "The system struggled to handle the injected fault, showing significant performance degradation or recovery issues. This scenario highlights a potential area of weakness that needs to be addressed.",
    }
}

pub fn recommendation(report: &Report) -> String {
    if report.status == ReportStatus::ActionRequired {
        let target = report
            .result
            .as_ref()
            .map(|r| r.target.as_str())
            .unwrap_or("system");
        format!(
            "Based on the '{}' experiment, we recommend investigating the root cause of the detected anomalies. Review application logs and system metrics during the experiment timeframe for the target '{target}'. Consider increasing resource limits or implementing more robust failover mechanisms.",
            report.name
        )
    } else {
        format!(
            "The system behaved as expected during the '{}' experiment. No immediate action is required for this scenario. Continue running regular chaos experiments to ensure ongoing resilience.",
            report.name
        )
    }
}
