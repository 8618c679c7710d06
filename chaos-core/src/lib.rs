pub mod config;
pub mod dashboard;
pub mod error;
pub mod export;
pub mod integrations;
pub mod lab;
pub mod llm;
pub mod narrative;
pub mod report;
pub mod score;
pub mod store;
pub mod workflow;

pub use error::{Error, Result};
pub use lab::{Lab, PendingRun};
pub use report::{ExperimentKind, ExperimentResult, Report, ReportStatus};
