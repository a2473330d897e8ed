//! VSphereMachine and VSphereMachineTemplate (`infrastructure.cluster.x-k8s.io/v1beta1`)

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::capi::machine_set::TemplateObjectMeta;
use crate::meta::{MachineAddress, TypedLocalObjectReference};

pub const VSPHERE_API_VERSION: &str = "infrastructure.cluster.x-k8s.io/v1beta1";

#[derive(CustomResource, Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "infrastructure.cluster.x-k8s.io",
    version = "v1beta1",
    kind = "VSphereMachine",
    namespaced,
    status = "VSphereMachineStatus",
    derive = "PartialEq",
    derive = "Default"
)]
#[serde(rename_all = "camelCase")]
pub struct VSphereMachineSpec {
    #[serde(default, rename = "providerID", skip_serializing_if = "Option::is_none")]
    pub provider_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_domain: Option<String>,

    pub template: String,

    /// fullClone or linkedClone
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub clone_mode: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub snapshot: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub server: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub datacenter: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub folder: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub datastore: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub resource_pool: String,

    #[serde(default)]
    pub network: NetworkSpec,

    #[serde(default, rename = "numCPUs", skip_serializing_if = "is_zero_i32")]
    pub num_cpus: i32,

    #[serde(default, skip_serializing_if = "is_zero_i32")]
    pub num_cores_per_socket: i32,

    #[serde(default, rename = "memoryMiB", skip_serializing_if = "is_zero_i64")]
    pub memory_mib: i64,

    #[serde(default, rename = "diskGiB", skip_serializing_if = "is_zero_i32")]
    pub disk_gib: i32,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub data_disks: Vec<VSphereDisk>,

    #[serde(default, rename = "tagIDs", skip_serializing_if = "Vec::is_empty")]
    pub tag_ids: Vec<String>,

    /// hard, soft or trySoft
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub power_off_mode: String,
}

#[allow(clippy::trivially_copy_pass_by_ref)] // serde skip_serializing_if signature
fn is_zero_i32(value: &i32) -> bool {
    *value == 0
}

#[allow(clippy::trivially_copy_pass_by_ref)] // serde skip_serializing_if signature
fn is_zero_i64(value: &i64) -> bool {
    *value == 0
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NetworkSpec {
    pub devices: Vec<NetworkDeviceSpec>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NetworkDeviceSpec {
    pub network_name: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub dhcp4: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub dhcp6: bool,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub gateway4: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub gateway6: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ip_addrs: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nameservers: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub addresses_from_pools: Vec<TypedLocalObjectReference>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VSphereDisk {
    pub name: String,
    #[serde(rename = "sizeGiB")]
    pub size_gib: i32,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub provisioning_mode: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VSphereMachineStatus {
    #[serde(default)]
    pub ready: bool,

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
    version = "v1beta1",
    kind = "VSphereMachineTemplate",
    namespaced,
    derive = "PartialEq",
    derive = "Default"
)]
#[serde(rename_all = "camelCase")]
pub struct VSphereMachineTemplateSpec {
    pub template: VSphereMachineTemplateResource,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VSphereMachineTemplateResource {
    #[serde(default)]
    pub metadata: TemplateObjectMeta,
    pub spec: VSphereMachineSpec,
}
