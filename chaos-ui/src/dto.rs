use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReportDto {
    pub id: String,
    pub name: String,
    pub date: String,
    pub status: String,
    #[serde(rename = "resilienceScore")]
    pub resilience_score: f64,
    #[serde(default)]
    pub result: Option<ResultDto>,
}

impl ReportDto {
    pub fn in_progress(&self) -> bool {
        self.status == "In Progress"
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResultDto {
    pub target: String,
    pub action: String,
    pub outcome: String,
    pub timestamp: String,
    #[serde(default)]
    pub details: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScorePointDto {
    pub date: String,
    pub score: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardDto {
    pub total_reports: usize,
    pub completed: usize,
    pub action_required: usize,
    pub in_progress: usize,
    pub average_score: Option<f64>,
    pub score_trend: Vec<ScorePointDto>,
    pub recent: Vec<ReportDto>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorkflowStepDto {
    pub id: String,
    pub name: String,
    pub kind: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowDto {
    pub name: String,
    pub steps: Vec<WorkflowStepDto>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IntegrationDto {
    pub id: String,
    pub name: String,
    pub description: String,
    pub connected: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToggleDto {
    pub integration: IntegrationDto,
    pub title: String,
    pub description: String,
}
