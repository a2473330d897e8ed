//! PowerVS provider configuration (`PowerVSMachineProviderConfig`)

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::meta::LocalObjectReference;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PowerVSMachineProviderConfig {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub api_version: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_data_secret: Option<LocalObjectReference>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials_secret: Option<LocalObjectReference>,

    #[serde(default)]
    pub service_instance: PowerVSResource,

    /// Deprecated in favour of `serviceInstance`
    #[serde(default, rename = "serviceInstanceID", skip_serializing_if = "String::is_empty")]
    pub service_instance_id: String,

    #[serde(default)]
    pub image: PowerVSResource,

    #[serde(default)]
    pub network: PowerVSResource,

    #[serde(default)]
    pub key_pair_name: String,

    /// s922, e980, ...
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub system_type: String,

    /// Dedicated, Shared or Capped
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub processor_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processors: Option<IntOrString>,

    #[serde(default, rename = "memoryGiB")]
    pub memory_gib: i32,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub load_balancers: Vec<LoadBalancerReference>,
}

/// Identifies a PowerVS resource by ID, name or regular expression.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PowerVSResource {
    /// ID, Name or RegEx
    #[serde(default, rename = "type", skip_serializing_if = "String::is_empty")]
    pub resource_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regex: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LoadBalancerReference {
    pub name: String,
    #[serde(rename = "type")]
    pub load_balancer_type: String,
}

/// Integer or string value (`intstr.IntOrString`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum IntOrString {
    Int(i32),
    String(String),
}

impl IntOrString {
    /// True for `0` and `""`.
    pub fn is_zero(&self) -> bool {
        match self {
            IntOrString::Int(value) => *value == 0,
            IntOrString::String(value) => value.is_empty(),
        }
    }
}
