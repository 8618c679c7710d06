use crate::llm::LlmConfig;
use std::time::Duration;

pub const DEFAULT_FINALIZE_DELAY: Duration = Duration::from_secs(10);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LabConfig {
    /// How long a triggered experiment stays `In Progress`.
    pub finalize_delay: Duration,
    /// Seed for the score generator; entropy when unset.
    pub score_seed: Option<u64>,
}

impl Default for LabConfig {
    fn default() -> Self {
        Self {
            finalize_delay: DEFAULT_FINALIZE_DELAY,
            score_seed: None,
        }
    }
}

impl LabConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            finalize_delay: lookup("CHAOS_FINALIZE_DELAY_MS")
                .and_then(|v| v.trim().parse::<u64>().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.finalize_delay),
            score_seed: lookup("CHAOS_SCORE_SEED").and_then(|v| v.trim().parse::<u64>().ok()),
        }
    }
}

/// LLM settings from the environment, or `None` when the key variable is unset.
pub fn llm_config_from_env() -> Option<LlmConfig> {
    llm_config_from_lookup(|key| std::env::var(key).ok())
}

pub fn llm_config_from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Option<LlmConfig> {
    let api_key_env = lookup("LLM_API_KEY_ENV").unwrap_or_else(|| "OPENAI_API_KEY".into());
    lookup(&api_key_env)?;

    let defaults = LlmConfig::default();
    Some(LlmConfig {
        provider: lookup("LLM_PROVIDER").unwrap_or(defaults.provider),
        model: lookup("LLM_MODEL").unwrap_or(defaults.model),
        api_key_env,
        temperature: lookup("LLM_TEMPERATURE")
            .and_then(|v| v.parse::<f64>().ok())
            .unwrap_or(defaults.temperature),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<HashMap<_, _>>();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn lab_config_defaults_to_ten_seconds() {
        let cfg = LabConfig::from_lookup(env(&[]));
        assert_eq!(cfg.finalize_delay, Duration::from_secs(10));
        assert_eq!(cfg.score_seed, None);
    }

    #[test]
    fn lab_config_reads_overrides_and_ignores_garbage() {
        let cfg = LabConfig::from_lookup(env(&[
            ("CHAOS_FINALIZE_DELAY_MS", "250"),
            ("CHAOS_SCORE_SEED", "7"),
        ]));
        assert_eq!(cfg.finalize_delay, Duration::from_millis(250));
        assert_eq!(cfg.score_seed, Some(7));

        let cfg = LabConfig::from_lookup(env(&[("CHAOS_FINALIZE_DELAY_MS", "soon")]));
        assert_eq!(cfg.finalize_delay, DEFAULT_FINALIZE_DELAY);
    }

    #[test]
    fn llm_config_requires_the_key_variable() {
        assert!(llm_config_from_lookup(env(&[])).is_none());

        let cfg = llm_config_from_lookup(env(&[
            ("LLM_API_KEY_ENV", "GATEWAY_KEY"),
            ("GATEWAY_KEY", "secret"),
            ("LLM_MODEL", "gpt-4o"),
            ("LLM_TEMPERATURE", "0.7"),
        ]))
        .expect("configured");
        assert_eq!(cfg.api_key_env, "GATEWAY_KEY");
        assert_eq!(cfg.model, "gpt-4o");
        assert_eq!(cfg.provider, "openai");
        assert_eq!(cfg.temperature, 0.7);
    }
}
