use crate::error::{Error, Result};
use chaos_contracts::{
    parse_suggest_output, suggest_output_schema, SuggestExperimentsInput, SuggestExperimentsOutput,
};
use futures::future::BoxFuture;
use rig::client::{completion::CompletionClient, ProviderClient};
use rig::completion::Prompt;
use rig::providers::openai;
use serde::{Deserialize, Serialize};
use std::future::IntoFuture;
use std::sync::Arc;
use tracing::{info, warn};

const PREAMBLE: &str = "You are an AI-powered chaos engineering expert.";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LlmConfig {
    pub provider: String,
    pub model: String,
    pub api_key_env: String,
    pub temperature: f64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "openai".into(),
            model: "gpt-4o-mini".into(),
            api_key_env: "OPENAI_API_KEY".into(),
            temperature: 0.2,
        }
    }
}

/// One prompt in, raw model text out.
pub trait CompletionBackend: Send + Sync + 'static {
    fn complete<'a>(
        &'a self,
        preamble: &'a str,
        prompt: &'a str,
    ) -> BoxFuture<'a, std::result::Result<String, String>>;
}

pub struct RigBackend {
    config: LlmConfig,
}

impl RigBackend {
    pub fn new(config: LlmConfig) -> Self {
        Self { config }
    }
}

impl CompletionBackend for RigBackend {
    fn complete<'a>(
        &'a self,
        preamble: &'a str,
        prompt: &'a str,
    ) -> BoxFuture<'a, std::result::Result<String, String>> {
        Box::pin(async move { run_prompt(&self.config, preamble, prompt).await })
    }
}

async fn run_prompt(
    config: &LlmConfig,
    preamble: &str,
    prompt: &str,
) -> std::result::Result<String, String> {
    if config.provider.to_lowercase() != "openai" {
        return Err(format!("unsupported llm provider '{}'", config.provider));
    }

    let client = if config.api_key_env == "OPENAI_API_KEY" {
        openai::Client::from_env()
    } else {
        let api_key = std::env::var(&config.api_key_env)
            .map_err(|_| format!("missing env var {}", config.api_key_env))?;
        openai::Client::new(&api_key).map_err(|e| format!("openai client error: {e}"))?
    };

    let agent = client
        .agent(&config.model)
        .preamble(preamble)
        .temperature(config.temperature)
        .build();

    let out: std::result::Result<String, _> = agent.prompt(prompt).into_future().await;
    out.map_err(|e| format!("llm prompt failed: {e}"))
}

/// Turns the two free-text fields of the suggestion form into a list of
/// experiments and a rationale. No retries; a reply that does not match the
/// output schema fails the whole call.
#[derive(Clone)]
pub struct Suggester {
    backend: Arc<dyn CompletionBackend>,
}

impl Suggester {
    pub fn new(backend: impl CompletionBackend) -> Self {
        Self {
            backend: Arc::new(backend),
        }
    }

    pub fn from_config(config: LlmConfig) -> Self {
        Self::new(RigBackend::new(config))
    }

    pub async fn suggest(&self, input: &SuggestExperimentsInput) -> Result<SuggestExperimentsOutput> {
        if input.historical_data.trim().is_empty() || input.system_behavior.trim().is_empty() {
            return Err(Error::InvalidInput(
                "historicalData and systemBehavior are required".into(),
            ));
        }

        let prompt = build_prompt(input)?;
        let raw = self
            .backend
            .complete(PREAMBLE, &prompt)
            .await
            .map_err(|e| {
                warn!(error = %e, "suggestion service call failed");
                Error::SuggestionService(e)
            })?;

        let output = parse_suggest_output(&raw).map_err(|e| {
            warn!(error = %e, "suggestion reply failed schema validation");
            Error::SuggestionSchema(e)
        })?;
        info!(experiments = output.experiments.len(), "suggestions generated");
        Ok(output)
    }
}

pub fn build_prompt(input: &SuggestExperimentsInput) -> Result<String> {
    let schema = serde_json::to_string_pretty(&suggest_output_schema())
        .map_err(|e| Error::SuggestionSchema(e.to_string()))?;
    Ok(format!(
        "Based on the historical data and system behavior provided, suggest a list of chaos \
         experiments to identify potential vulnerabilities.\n\n\
         Historical Data: {}\n\
         System Behavior: {}\n\n\
         Suggest a diverse set of experiments that cover different aspects of the system and \
         target potential weaknesses. Provide a rationale explaining why they are relevant to \
         the system behavior and historical data.\n\n\
         Return JSON only, matching this schema:\n{schema}",
        input.historical_data.trim(),
        input.system_behavior.trim(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct CannedBackend {
        reply: std::result::Result<String, String>,
        prompts: Arc<Mutex<Vec<String>>>,
    }

    impl CannedBackend {
        fn new(reply: std::result::Result<&str, &str>) -> (Self, Arc<Mutex<Vec<String>>>) {
            let prompts = Arc::new(Mutex::new(Vec::new()));
            (
                Self {
                    reply: reply.map(str::to_string).map_err(str::to_string),
                    prompts: Arc::clone(&prompts),
                },
                prompts,
            )
        }
    }

    impl CompletionBackend for CannedBackend {
        fn complete<'a>(
            &'a self,
            _preamble: &'a str,
            prompt: &'a str,
        ) -> BoxFuture<'a, std::result::Result<String, String>> {
            if let Ok(mut guard) = self.prompts.lock() {
                guard.push(prompt.to_string());
            }
            let reply = self.reply.clone();
            Box::pin(async move { reply })
        }
    }

    fn input() -> SuggestExperimentsInput {
        SuggestExperimentsInput {
            historical_data: "checkout p99 doubled during last two deploys".into(),
            system_behavior: "three replicas behind an envoy gateway".into(),
        }
    }

    #[tokio::test]
    async fn returns_parsed_reply_and_interpolates_both_fields() {
        let (backend, prompts) = CannedBackend::new(Ok(
            r#"{"experiments":["kill one checkout replica","add 200ms at the gateway"],"rationale":"deploys correlate with latency"}"#,
        ));
        let out = Suggester::new(backend).suggest(&input()).await.expect("suggest");
        assert_eq!(out.experiments.len(), 2);
        assert_eq!(out.rationale, "deploys correlate with latency");

        let prompts = prompts.lock().expect("lock");
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("Historical Data: checkout p99 doubled"));
        assert!(prompts[0].contains("System Behavior: three replicas"));
        assert!(prompts[0].contains("\"rationale\""));
    }

    #[tokio::test]
    async fn reply_missing_rationale_fails_without_partial_result() {
        let (backend, _) = CannedBackend::new(Ok(r#"{"experiments":["kill a pod"]}"#));
        let err = Suggester::new(backend).suggest(&input()).await.expect_err("schema");
        assert!(matches!(err, Error::SuggestionSchema(_)));
    }

    #[tokio::test]
    async fn service_failure_is_surfaced_once() {
        let (backend, prompts) = CannedBackend::new(Err("connection reset"));
        let err = Suggester::new(backend).suggest(&input()).await.expect_err("service");
        assert!(matches!(err, Error::SuggestionService(ref e) if e == "connection reset"));
        assert_eq!(prompts.lock().expect("lock").len(), 1);
    }

    #[tokio::test]
    async fn empty_field_never_reaches_the_backend() {
        let (backend, prompts) = CannedBackend::new(Ok("{}"));
        let mut bad = input();
        bad.system_behavior = "  ".into();
        let err = Suggester::new(backend).suggest(&bad).await.expect_err("invalid");
        assert!(matches!(err, Error::InvalidInput(_)));
        assert!(prompts.lock().expect("lock").is_empty());
    }

    #[tokio::test]
    async fn short_fields_are_not_the_adapters_concern() {
        let (backend, _) = CannedBackend::new(Ok(r#"{"experiments":[],"rationale":"none"}"#));
        let short = SuggestExperimentsInput {
            historical_data: "x".into(),
            system_behavior: "y".into(),
        };
        assert!(Suggester::new(backend).suggest(&short).await.is_ok());
    }

    #[test]
    fn unsupported_provider_is_rejected() {
        let config = LlmConfig {
            provider: "anthropic".into(),
            ..LlmConfig::default()
        };
        let err = futures::executor::block_on(run_prompt(&config, PREAMBLE, "hi"))
            .expect_err("provider");
        assert!(err.contains("unsupported llm provider"));
    }
}
