//! Status conditions
//!
//! Two condition shapes are in use:
//! - [`Condition`]: the legacy shape (MAPI and CAPI `v1beta1`), carrying a
//!   severity for non-true conditions.
//! - [`V1Beta2Condition`]: the `metav1.Condition` shape used by the CAPI
//!   `v1beta2` status, without severity.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Status of a condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
pub enum ConditionStatus {
    True,
    False,
    #[default]
    Unknown,
}

impl ConditionStatus {
    /// Map a boolean onto `True`/`False`.
    pub fn from_bool(value: bool) -> Self {
        if value {
            ConditionStatus::True
        } else {
            ConditionStatus::False
        }
    }
}

/// Severity of a non-true legacy condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum ConditionSeverity {
    Error,
    Warning,
    Info,
}

/// Legacy condition with severity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    #[serde(rename = "type")]
    pub condition_type: String,

    pub status: ConditionStatus,

    /// Only set when status is not `True`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<ConditionSeverity>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<chrono::DateTime<chrono::Utc>>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub reason: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
}

/// Condition without severity (`metav1.Condition`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct V1Beta2Condition {
    #[serde(rename = "type")]
    pub condition_type: String,

    pub status: ConditionStatus,

    #[serde(default, skip_serializing_if = "is_zero")]
    pub observed_generation: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<chrono::DateTime<chrono::Utc>>,

    pub reason: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
}

#[allow(clippy::trivially_copy_pass_by_ref)] // serde skip_serializing_if signature
fn is_zero(value: &i64) -> bool {
    *value == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_condition_status_serializes_capitalized() {
        let json = serde_json::to_string(&ConditionStatus::True).unwrap();
        assert_eq!(json, "\"True\"");
        let json = serde_json::to_string(&ConditionStatus::Unknown).unwrap();
        assert_eq!(json, "\"Unknown\"");
    }

    #[test]
    fn test_true_condition_omits_severity() {
        let condition = Condition {
            condition_type: "Ready".to_string(),
            status: ConditionStatus::True,
            ..Default::default()
        };
        let value = serde_json::to_value(&condition).unwrap();
        assert!(value.get("severity").is_none(), "severity must be omitted when unset");
        assert!(value.get("reason").is_none(), "empty reason must be omitted");
        assert_eq!(value["type"], "Ready");
    }
}
