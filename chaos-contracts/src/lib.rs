use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Minimum length the suggestion form asks for in each free-text field.
pub const SUGGEST_FIELD_MIN_CHARS: usize = 50;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuggestExperimentsInput {
    /// Historical data of the system, including logs, metrics, and events.
    pub historical_data: String,
    /// Description of the current system behavior and architecture.
    pub system_behavior: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SuggestExperimentsOutput {
    /// A list of suggested chaos experiments to identify potential vulnerabilities.
    pub experiments: Vec<String>,
    /// Why the suggested experiments are relevant to the system behavior and historical data.
    pub rationale: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerExperimentRequest {
    pub kind: String,
    pub name: String,
}

/// Drop of workflow step `active_id` onto the position of `over_id`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveStepRequest {
    pub active_id: String,
    pub over_id: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperimentStatusDto {
    pub running: bool,
    pub report_id: Option<String>,
}

/// Error body shaped for a user-visible toast.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToastDto {
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<FieldViolation>,
}

impl ToastDto {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            violations: Vec::new(),
        }
    }
}

/// Form-level rule for the suggestion screen. The suggestion adapter itself
/// only requires both fields to be present.
pub fn validate_suggest_input(input: &SuggestExperimentsInput) -> Result<(), Vec<FieldViolation>> {
    let mut violations = Vec::new();
    if input.historical_data.trim().chars().count() < SUGGEST_FIELD_MIN_CHARS {
        violations.push(FieldViolation {
            field: "historicalData".into(),
            message: format!(
                "Please provide at least {SUGGEST_FIELD_MIN_CHARS} characters of historical data."
            ),
        });
    }
    if input.system_behavior.trim().chars().count() < SUGGEST_FIELD_MIN_CHARS {
        violations.push(FieldViolation {
            field: "systemBehavior".into(),
            message: format!(
                "Please provide at least {SUGGEST_FIELD_MIN_CHARS} characters of system description."
            ),
        });
    }
    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

/// Strict parse of a model reply. Both `experiments` and `rationale` must be
/// present; a surrounding fenced code block is tolerated.
pub fn parse_suggest_output(raw: &str) -> Result<SuggestExperimentsOutput, String> {
    let body = strip_code_fence(raw);
    serde_json::from_str::<SuggestExperimentsOutput>(body)
        .map_err(|e| format!("invalid suggestion reply: {e}"))
}

pub fn suggest_output_schema() -> serde_json::Value {
    serde_json::to_value(schemars::schema_for!(SuggestExperimentsOutput))
        .unwrap_or(serde_json::Value::Null)
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn long(text: &str) -> String {
        text.repeat(SUGGEST_FIELD_MIN_CHARS / text.len() + 1)
    }

    #[test]
    fn accepts_long_enough_fields() {
        let input = SuggestExperimentsInput {
            historical_data: long("p99 spikes during deploys. "),
            system_behavior: long("checkout calls inventory over grpc. "),
        };
        assert!(validate_suggest_input(&input).is_ok());
    }

    #[test]
    fn reports_each_short_field() {
        let input = SuggestExperimentsInput {
            historical_data: "too short".into(),
            system_behavior: "   ".into(),
        };
        let violations = validate_suggest_input(&input).expect_err("short fields");
        assert_eq!(violations.len(), 2);
        assert_eq!(violations[0].field, "historicalData");
        assert_eq!(violations[1].field, "systemBehavior");
    }

    #[test]
    fn input_uses_camel_case_on_the_wire() {
        let input: SuggestExperimentsInput = serde_json::from_value(serde_json::json!({
            "historicalData": "h",
            "systemBehavior": "s"
        }))
        .expect("parse");
        assert_eq!(input.historical_data, "h");
        assert_eq!(input.system_behavior, "s");
    }

    #[test]
    fn move_request_uses_camel_case_on_the_wire() {
        let req: MoveStepRequest =
            serde_json::from_str(r#"{"activeId":"1","overId":"3"}"#).expect("parse");
        assert_eq!(req.active_id, "1");
        assert_eq!(req.over_id, "3");
    }

    #[test]
    fn parses_reply_inside_code_fence() {
        let raw = "```json\n{\"experiments\":[\"kill a pod\"],\"rationale\":\"single replica\"}\n```";
        let parsed = parse_suggest_output(raw).expect("parse");
        assert_eq!(parsed.experiments, vec!["kill a pod"]);
        assert_eq!(parsed.rationale, "single replica");
    }

    #[test]
    fn reply_without_rationale_is_rejected() {
        let raw = r#"{"experiments":["kill a pod"]}"#;
        let err = parse_suggest_output(raw).expect_err("missing rationale");
        assert!(err.contains("rationale"), "err={err}");
    }

    #[test]
    fn schema_names_both_output_fields() {
        let schema = suggest_output_schema();
        let props = schema.get("properties").expect("properties");
        assert!(props.get("experiments").is_some());
        assert!(props.get("rationale").is_some());
    }
}
