//! Ordered experiment sequence edited on the workflows screen.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    Latency,
    Verify,
    PodCrash,
    Cpu,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowStep {
    pub id: String,
    pub name: String,
    pub kind: StepKind,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workflow {
    pub name: String,
    pub steps: Vec<WorkflowStep>,
    /// Order at the last save; `None` until saved once.
    #[serde(skip)]
    saved: Option<Vec<String>>,
}

fn step(id: &str, name: &str, kind: StepKind) -> WorkflowStep {
    WorkflowStep {
        id: id.to_string(),
        name: name.to_string(),
        kind,
    }
}

impl Workflow {
    pub fn new(name: impl Into<String>, steps: Vec<WorkflowStep>) -> Self {
        Self {
            name: name.into(),
            steps,
            saved: None,
        }
    }

    /// The demo sequence the workflows screen opens with.
    pub fn weekend_peak() -> Self {
        Self::new(
            "Weekend Peak Workflow",
            vec![
                step("1", "Inject 100ms Latency", StepKind::Latency),
                step("2", "Verify Health Endpoints", StepKind::Verify),
                step("3", "Crash 1 Pod in Checkout Svc", StepKind::PodCrash),
                step("4", "Verify Pod Recovery (5 mins)", StepKind::Verify),
                step("5", "Spike CPU to 80%", StepKind::Cpu),
                step("6", "Verify HPA Scaling", StepKind::Verify),
            ],
        )
    }

    pub fn step_ids(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.id.as_str()).collect()
    }

    /// Move the step `active_id` into the position held by `over_id`,
    /// shifting the steps in between. Dropping a step on itself is a no-op.
    pub fn move_step(&mut self, active_id: &str, over_id: &str) -> Result<()> {
        let from = self.index_of(active_id)?;
        let to = self.index_of(over_id)?;
        if from != to {
            let moved = self.steps.remove(from);
            self.steps.insert(to, moved);
        }
        Ok(())
    }

    /// Record the current order as saved.
    pub fn save(&mut self) {
        self.saved = Some(self.step_ids().into_iter().map(str::to_string).collect());
    }

    pub fn is_saved(&self) -> bool {
        self.saved
            .as_ref()
            .is_some_and(|ids| ids.iter().map(String::as_str).eq(self.step_ids()))
    }

    fn index_of(&self, id: &str) -> Result<usize> {
        self.steps
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| Error::UnknownStep(id.to_string()))
    }
}
