//! IBMPowerVSMachine and IBMPowerVSMachineTemplate (`infrastructure.cluster.x-k8s.io/v1beta2`)

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::capi::machine_set::TemplateObjectMeta;
use crate::mapi::powervs::IntOrString;
use crate::meta::MachineAddress;

pub const POWERVS_API_VERSION: &str = "infrastructure.cluster.x-k8s.io/v1beta2";

#[derive(CustomResource, Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "infrastructure.cluster.x-k8s.io",
    version = "v1beta2",
    kind = "IBMPowerVSMachine",
    namespaced,
    status = "IBMPowerVSMachineStatus",
    derive = "PartialEq",
    derive = "Default"
)]
#[serde(rename_all = "camelCase")]
pub struct IBMPowerVSMachineSpec {
    #[serde(default, rename = "providerID", skip_serializing_if = "Option::is_none")]
    pub provider_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_instance: Option<IBMPowerVSResourceReference>,

    #[serde(default, rename = "sshKey", skip_serializing_if = "String::is_empty")]
    pub ssh_key: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<IBMPowerVSResourceReference>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub system_type: String,

    /// Dedicated, Shared or Capped
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub processor_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processors: Option<IntOrString>,

    #[serde(default, rename = "memoryGiB", skip_serializing_if = "is_zero")]
    pub memory_gib: i32,

    #[serde(default)]
    pub network: IBMPowerVSResourceReference,
}

#[allow(clippy::trivially_copy_pass_by_ref)] // serde skip_serializing_if signature
fn is_zero(value: &i32) -> bool {
    *value == 0
}

/// Exactly one of `id`, `name` or `regex` is set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct IBMPowerVSResourceReference {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regex: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct IBMPowerVSMachineStatus {
    #[serde(default)]
    pub ready: bool,

    #[serde(default, rename = "instanceID", skip_serializing_if = "String::is_empty")]
    pub instance_id: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub addresses: Vec<MachineAddress>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_message: Option<String>,
}

#[derive(CustomResource, Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "infrastructure.cluster.x-k8s.io",
    version = "v1beta2",
    kind = "IBMPowerVSMachineTemplate",
    namespaced,
    derive = "PartialEq",
    derive = "Default"
)]
#[serde(rename_all = "camelCase")]
pub struct IBMPowerVSMachineTemplateSpec {
    pub template: IBMPowerVSMachineTemplateResource,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct IBMPowerVSMachineTemplateResource {
    #[serde(default)]
    pub metadata: TemplateObjectMeta,
    pub spec: IBMPowerVSMachineSpec,
}
