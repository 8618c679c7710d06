use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("unknown experiment kind '{0}'")]
    UnknownExperimentKind(String),

    #[error("experiment {id} is still running")]
    ExperimentInFlight { id: String },

    #[error("report {0} not found")]
    ReportNotFound(String),

    #[error("report {0} has already been finalized")]
    AlreadyFinalized(String),

    #[error("report {0} is not ready for export")]
    ReportNotReady(String),

    #[error("could not generate document: {0}")]
    Export(String),

    #[error("suggestion service failed: {0}")]
    SuggestionService(String),

    #[error("suggestion reply rejected: {0}")]
    SuggestionSchema(String),

    #[error("unknown workflow step '{0}'")]
    UnknownStep(String),

    #[error("unknown integration '{0}'")]
    UnknownIntegration(String),

    #[error("configuration error: {0}")]
    Config(String),
}
