//! Cloud integrations the workspace can be connected to.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// `(id, name, description)` for every known integration, in display order.
pub const CATALOG: [(&str, &str, &str); 4] = [
    ("gke", "Google Kubernetes Engine", "Orchestrate experiments on GKE clusters."),
    ("cloud-run", "Cloud Run", "Target serverless containers with fault injections."),
    ("bigquery", "BigQuery", "Use BQ as a data source for experiment analysis."),
    ("vertex-ai", "Vertex AI", "Leverage AI for experiment suggestions and analysis."),
];

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrationStatus {
    pub id: String,
    pub name: String,
    pub description: String,
    pub connected: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toggle {
    pub integration: IntegrationStatus,
    pub title: String,
    pub description: String,
}

#[derive(Clone, Debug, Default)]
pub struct Integrations {
    connected: Vec<String>,
}

impl Integrations {
    /// Every catalog entry connected, as the demo starts.
    pub fn all_connected() -> Self {
        Self {
            connected: CATALOG.iter().map(|(id, _, _)| id.to_string()).collect(),
        }
    }

    pub fn is_connected(&self, id: &str) -> bool {
        self.connected.iter().any(|c| c == id)
    }

    pub fn list(&self) -> Vec<IntegrationStatus> {
        CATALOG.iter().map(|entry| self.status(entry)).collect()
    }

    /// Flip the connection state of `id`.
    pub fn toggle(&mut self, id: &str) -> Result<Toggle> {
        let entry = CATALOG
            .iter()
            .find(|(known, _, _)| *known == id)
            .ok_or_else(|| Error::UnknownIntegration(id.to_string()))?;
        let name = entry.1;

        let (title, description) = if self.is_connected(id) {
            self.connected.retain(|c| c != id);
            ("Disconnected!", format!("Successfully disconnected from {name}."))
        } else {
            self.connected.push(id.to_string());
            ("Connected!", format!("Successfully integrated with {name}."))
        };

        Ok(Toggle {
            integration: self.status(entry),
            title: title.to_string(),
            description,
        })
    }

    fn status(&self, (id, name, description): &(&str, &str, &str)) -> IntegrationStatus {
        IntegrationStatus {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            connected: self.is_connected(id),
        }
    }
}
