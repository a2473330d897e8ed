//! NutanixMachine and NutanixMachineTemplate (`infrastructure.cluster.x-k8s.io/v1beta1`)

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::capi::machine_set::TemplateObjectMeta;
use crate::meta::MachineAddress;

pub const NUTANIX_API_VERSION: &str = "infrastructure.cluster.x-k8s.io/v1beta1";

#[derive(CustomResource, Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "infrastructure.cluster.x-k8s.io",
    version = "v1beta1",
    kind = "NutanixMachine",
    namespaced,
    status = "NutanixMachineStatus",
    derive = "PartialEq",
    derive = "Default"
)]
#[serde(rename_all = "camelCase")]
pub struct NutanixMachineSpec {
    #[serde(default, rename = "providerID", skip_serializing_if = "String::is_empty")]
    pub provider_id: String,

    #[serde(default)]
    pub vcpus_per_socket: i32,

    #[serde(default)]
    pub vcpu_sockets: i32,

    /// Quantity, e.g. `16Gi`
    #[serde(default)]
    pub memory_size: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<NutanixResourceIdentifier>,

    #[serde(default)]
    pub cluster: NutanixResourceIdentifier,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subnet: Vec<NutanixResourceIdentifier>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_categories: Option<Vec<NutanixCategoryIdentifier>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<NutanixResourceIdentifier>,

    /// legacy or uefi
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub boot_type: String,

    /// Quantity, e.g. `120Gi`
    #[serde(default)]
    pub system_disk_size: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub data_disks: Vec<NutanixMachineVMDisk>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub gpus: Vec<NutanixGPU>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NutanixResourceIdentifier {
    /// uuid or name
    #[serde(rename = "type")]
    pub identifier_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NutanixCategoryIdentifier {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NutanixGPU {
    /// deviceID or name
    #[serde(rename = "type")]
    pub gpu_type: String,
    #[serde(default, rename = "deviceID", skip_serializing_if = "Option::is_none")]
    pub device_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NutanixMachineVMDisk {
    pub disk_size: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_properties: Option<NutanixMachineVMDiskDeviceProperties>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_config: Option<NutanixMachineVMStorageConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_source: Option<NutanixResourceIdentifier>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NutanixMachineVMDiskDeviceProperties {
    /// Disk or CDRom
    pub device_type: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub adapter_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_index: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NutanixMachineVMStorageConfig {
    /// Standard or Flash
    pub disk_mode: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_container: Option<NutanixResourceIdentifier>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NutanixMachineStatus {
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
    kind = "NutanixMachineTemplate",
    namespaced,
    derive = "PartialEq",
    derive = "Default"
)]
#[serde(rename_all = "camelCase")]
pub struct NutanixMachineTemplateSpec {
    pub template: NutanixMachineTemplateResource,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NutanixMachineTemplateResource {
    #[serde(default)]
    pub metadata: TemplateObjectMeta,
    pub spec: NutanixMachineSpec,
}
