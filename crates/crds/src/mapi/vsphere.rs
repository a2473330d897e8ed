//! vSphere provider configuration (`VSphereMachineProviderSpec`)

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::meta::LocalObjectReference;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct VSphereMachineProviderSpec {
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

    /// VM template to clone
    #[serde(default)]
    pub template: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace: Option<Workspace>,

    #[serde(default)]
    pub network: NetworkSpec,

    #[serde(default, rename = "numCPUs")]
    pub num_cpus: i32,

    #[serde(default)]
    pub num_cores_per_socket: i32,

    #[serde(default, rename = "memoryMiB")]
    pub memory_mib: i64,

    #[serde(default, rename = "diskGiB")]
    pub disk_gib: i32,

    #[serde(default, rename = "tagIDs", skip_serializing_if = "Vec::is_empty")]
    pub tag_ids: Vec<String>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub snapshot: String,

    /// fullClone or linkedClone
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub clone_mode: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub data_disks: Vec<VSphereDisk>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Workspace {
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
    #[serde(default, rename = "vmGroup", skip_serializing_if = "String::is_empty")]
    pub vm_group: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NetworkSpec {
    #[serde(default)]
    pub devices: Vec<NetworkDeviceSpec>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NetworkDeviceSpec {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub network_name: String,
    /// IPv4 or IPv6 gateway
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub gateway: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ip_addrs: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nameservers: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub addresses_from_pools: Vec<AddressesFromPool>,
}

/// IP address pool to claim addresses from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AddressesFromPool {
    pub group: String,
    pub resource: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct VSphereDisk {
    pub name: String,
    #[serde(rename = "sizeGiB")]
    pub size_gib: i32,
    /// Thin, Thick or EagerlyZeroed
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub provisioning_mode: String,
}
