// Invocation event module
// Typed inbound record and action classification

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Action assumed when the event carries none
pub const DEFAULT_ACTION: &str = "health-check";
pub const SYSTEM_STATS_ACTION: &str = "system-stats";

/// Inbound invocation record
///
/// Only `action` is read. Any other field of the incoming object is accepted
/// and dropped during deserialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct InvocationEvent {
    #[serde(
        default,
        deserialize_with = "deserialize_action",
        skip_serializing_if = "Option::is_none"
    )]
    pub action: Option<String>,
}

impl InvocationEvent {
    #[cfg(test)]
    pub fn with_action(action: impl Into<String>) -> Self {
        Self {
            action: Some(action.into()),
        }
    }

    pub fn action(&self) -> Action<'_> {
        Action::classify(self.action.as_deref())
    }

    /// Compact JSON rendering used for the diagnostic event line
    pub fn to_log_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| format!("{self:?}"))
    }
}

/// Classified action label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action<'a> {
    HealthCheck,
    SystemStats,
    Other(&'a str),
}

impl<'a> Action<'a> {
    /// Absent or empty labels fall back to the health check; only an explicit
    /// unknown label reaches `Other`.
    pub fn classify(label: Option<&'a str>) -> Self {
        match label.filter(|l| !l.is_empty()).unwrap_or(DEFAULT_ACTION) {
            DEFAULT_ACTION => Self::HealthCheck,
            SYSTEM_STATS_ACTION => Self::SystemStats,
            other => Self::Other(other),
        }
    }

    pub const fn label(self) -> &'a str {
        match self {
            Self::HealthCheck => DEFAULT_ACTION,
            Self::SystemStats => SYSTEM_STATS_ACTION,
            Self::Other(label) => label,
        }
    }
}

fn deserialize_action<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(action_label(value))
}

/// Falsy JSON values (`null`, `false`, `""`, `0`, `-0`) count as no action.
/// Other non-string values are kept as their JSON text.
#[allow(clippy::float_cmp)]
fn action_label(value: Value) -> Option<String> {
    match value {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s),
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> InvocationEvent {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_missing_action_is_none() {
        assert_eq!(parse("{}").action, None);
        assert_eq!(parse("{}").action(), Action::HealthCheck);
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let event = parse(r#"{"action":"system-stats","requestContext":{"stage":"dev"},"body":null}"#);
        assert_eq!(event.action(), Action::SystemStats);
    }

    #[test]
    fn test_falsy_values_fall_back_to_default() {
        for json in [
            r#"{"action":null}"#,
            r#"{"action":""}"#,
            r#"{"action":false}"#,
            r#"{"action":0}"#,
            r#"{"action":-0.0}"#,
            r#"{"action":0.0}"#,
        ] {
            assert_eq!(parse(json).action(), Action::HealthCheck, "{json}");
        }
    }

    #[test]
    fn test_non_string_values_become_labels() {
        assert_eq!(parse(r#"{"action":5}"#).action(), Action::Other("5"));
        assert_eq!(parse(r#"{"action":true}"#).action(), Action::Other("true"));
        // Only an exact zero is falsy
        assert_ne!(parse(r#"{"action":1e-20}"#).action(), Action::HealthCheck);
        assert_ne!(parse(r#"{"action":-1e-300}"#).action(), Action::HealthCheck);
        assert_eq!(
            parse(r#"{"action":["a",1]}"#).action(),
            Action::Other(r#"["a",1]"#)
        );
    }

    #[test]
    fn test_classify() {
        assert_eq!(Action::classify(None), Action::HealthCheck);
        assert_eq!(Action::classify(Some("health-check")), Action::HealthCheck);
        assert_eq!(Action::classify(Some("system-stats")), Action::SystemStats);
        assert_eq!(Action::classify(Some("")), Action::HealthCheck);
        // Matching is exact, not case-insensitive
        assert_eq!(
            Action::classify(Some("System-Stats")),
            Action::Other("System-Stats")
        );
    }

    #[test]
    fn test_log_json() {
        assert_eq!(InvocationEvent::default().to_log_json(), "{}");
        assert_eq!(
            InvocationEvent::with_action("foo").to_log_json(),
            r#"{"action":"foo"}"#
        );
    }
}
