//! Nutanix provider configuration (`NutanixMachineProviderConfig`)

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::meta::LocalObjectReference;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NutanixMachineProviderConfig {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub api_version: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,

    #[serde(default)]
    pub cluster: NutanixResourceIdentifier,

    #[serde(default)]
    pub image: NutanixResourceIdentifier,

    #[serde(default)]
    pub subnets: Vec<NutanixResourceIdentifier>,

    #[serde(default)]
    pub vcpus_per_socket: i32,

    #[serde(default)]
    pub vcpu_sockets: i32,

    /// Quantity, e.g. `16Gi`
    #[serde(default)]
    pub memory_size: String,

    /// Quantity, e.g. `120Gi`
    #[serde(default)]
    pub system_disk_size: String,

    /// Legacy, UEFI or SecureBoot
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub boot_type: String,

    #[serde(default)]
    pub project: NutanixResourceIdentifier,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<NutanixCategory>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub gpus: Vec<NutanixGPU>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub data_disks: Vec<NutanixVMDisk>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_data_secret: Option<LocalObjectReference>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials_secret: Option<LocalObjectReference>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_domain: Option<NutanixFailureDomainReference>,
}

/// Identifies a Prism resource by UUID or name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NutanixResourceIdentifier {
    /// uuid or name
    #[serde(default, rename = "type", skip_serializing_if = "String::is_empty")]
    pub identifier_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NutanixCategory {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NutanixGPU {
    /// DeviceID or Name
    #[serde(rename = "type")]
    pub gpu_type: String,
    #[serde(default, rename = "deviceID", skip_serializing_if = "Option::is_none")]
    pub device_id: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NutanixVMDisk {
    pub disk_size: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_properties: Option<NutanixVMDiskDeviceProperties>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_config: Option<NutanixVMStorageConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_source: Option<NutanixResourceIdentifier>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NutanixVMDiskDeviceProperties {
    /// Disk or CDRom
    pub device_type: String,
    /// SCSI, IDE, PCI, SATA or SPAPR
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub adapter_type: String,
    #[serde(default)]
    pub device_index: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NutanixVMStorageConfig {
    /// Standard or Flash
    pub disk_mode: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_container: Option<NutanixStorageResourceIdentifier>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NutanixStorageResourceIdentifier {
    /// uuid
    #[serde(rename = "type")]
    pub identifier_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NutanixFailureDomainReference {
    pub name: String,
}
