//! AWSMachine and AWSMachineTemplate (`infrastructure.cluster.x-k8s.io/v1beta2`)

use std::collections::BTreeMap;

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::capi::machine_set::TemplateObjectMeta;
use crate::meta::MachineAddress;

pub const AWS_API_VERSION: &str = "infrastructure.cluster.x-k8s.io/v1beta2";

#[derive(CustomResource, Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "infrastructure.cluster.x-k8s.io",
    version = "v1beta2",
    kind = "AWSMachine",
    namespaced,
    status = "AWSMachineStatus",
    derive = "PartialEq",
    derive = "Default"
)]
#[serde(rename_all = "camelCase")]
pub struct AWSMachineSpec {
    #[serde(default, rename = "providerID", skip_serializing_if = "Option::is_none")]
    pub provider_id: Option<String>,

    #[serde(default, rename = "instanceID", skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_metadata_options: Option<InstanceMetadataOptions>,

    #[serde(default)]
    pub ami: AMIReference,

    pub instance_type: String,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub additional_tags: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub iam_instance_profile: String,

    #[serde(default, rename = "publicIP", skip_serializing_if = "Option::is_none")]
    pub public_ip: Option<bool>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub additional_security_groups: Vec<AWSResourceReference>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subnet: Option<AWSResourceReference>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssh_key_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_volume: Option<Volume>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub non_root_volumes: Vec<Volume>,

    /// interface or efa
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub network_interface_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uncompressed_user_data: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignition: Option<Ignition>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spot_market_options: Option<SpotMarketOptions>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub placement_group_name: String,

    #[serde(default, skip_serializing_if = "is_zero")]
    pub placement_group_partition: i64,

    /// default, dedicated or host
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub tenancy: String,

    #[serde(default, rename = "capacityReservationId", skip_serializing_if = "Option::is_none")]
    pub capacity_reservation_id: Option<String>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub market_type: String,

    #[serde(default, rename = "hostID", skip_serializing_if = "Option::is_none")]
    pub host_id: Option<String>,

    /// default or host
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_affinity: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu_options: Option<CPUOptions>,
}

#[allow(clippy::trivially_copy_pass_by_ref)] // serde skip_serializing_if signature
fn is_zero(value: &i64) -> bool {
    *value == 0
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct InstanceMetadataOptions {
    /// enabled or disabled
    pub http_endpoint: String,
    pub http_put_response_hop_limit: i64,
    /// optional or required
    pub http_tokens: String,
    pub instance_metadata_tags: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AMIReference {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// Reference by ID or filters (ID wins when both are set).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AWSResourceReference {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<Filter>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Filter {
    pub name: String,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Volume {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub device_name: String,
    /// GiB
    pub size: i64,
    #[serde(default, rename = "type", skip_serializing_if = "String::is_empty")]
    pub volume_type: String,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub iops: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub throughput: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encrypted: Option<bool>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub encryption_key: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Ignition {
    pub version: String,
    /// ClusterObjectStore or UnencryptedUserData
    pub storage_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SpotMarketOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_price: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CPUOptions {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub confidential_compute: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AWSMachineStatus {
    #[serde(default)]
    pub ready: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub addresses: Vec<MachineAddress>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_state: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_message: Option<String>,
}

#[derive(CustomResource, Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "infrastructure.cluster.x-k8s.io",
    version = "v1beta2",
    kind = "AWSMachineTemplate",
    namespaced,
    derive = "PartialEq",
    derive = "Default"
)]
#[serde(rename_all = "camelCase")]
pub struct AWSMachineTemplateSpec {
    pub template: AWSMachineTemplateResource,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AWSMachineTemplateResource {
    #[serde(default)]
    pub metadata: TemplateObjectMeta,
    pub spec: AWSMachineSpec,
}
