use chaos_core::config::{llm_config_from_env, LabConfig};
use chaos_core::export::ExportOptions;
use chaos_core::integrations::Integrations;
use chaos_core::llm::Suggester;
use chaos_core::workflow::Workflow;
use chaos_core::{Error, Lab, Result};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Everything a request handler may touch, passed explicitly to the router.
#[derive(Clone)]
pub struct AppState {
    pub lab: Arc<Lab>,
    /// `None` when no LLM key is configured.
    pub suggester: Option<Suggester>,
    pub export: ExportOptions,
    pub workflow: Arc<Mutex<Workflow>>,
    pub integrations: Arc<Mutex<Integrations>>,
}

impl AppState {
    pub fn new(lab: Lab, suggester: Option<Suggester>) -> Self {
        Self {
            lab: Arc::new(lab),
            suggester,
            export: ExportOptions::default(),
            workflow: Arc::new(Mutex::new(Workflow::weekend_peak())),
            integrations: Arc::new(Mutex::new(Integrations::all_connected())),
        }
    }

    pub fn suggester(&self) -> Result<&Suggester> {
        self.suggester.as_ref().ok_or_else(|| {
            Error::Config("The AI suggestion service is not configured.".into())
        })
    }

    pub fn workflow(&self) -> MutexGuard<'_, Workflow> {
        self.workflow.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn integrations(&self) -> MutexGuard<'_, Integrations> {
        self.integrations.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

pub fn build_state_from_env() -> AppState {
    let lab = Lab::demo(LabConfig::from_env());
    let suggester = llm_config_from_env().map(Suggester::from_config);
    AppState::new(lab, suggester)
}
