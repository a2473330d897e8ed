//! AWS provider configuration (`AWSMachineProviderConfig`)

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::meta::LocalObjectReference;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AWSMachineProviderConfig {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub api_version: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,

    /// Machine image
    #[serde(default)]
    pub ami: AWSResourceReference,

    #[serde(default)]
    pub instance_type: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<TagSpecification>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iam_instance_profile: Option<AWSResourceReference>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_data_secret: Option<LocalObjectReference>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials_secret: Option<LocalObjectReference>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_name: Option<String>,

    #[serde(default)]
    pub device_index: i64,

    #[serde(default, rename = "publicIp", skip_serializing_if = "Option::is_none")]
    pub public_ip: Option<bool>,

    /// ENA or EFA
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub network_interface_type: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub security_groups: Vec<AWSResourceReference>,

    #[serde(default)]
    pub subnet: AWSResourceReference,

    #[serde(default)]
    pub placement: Placement,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub load_balancers: Vec<LoadBalancerReference>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub block_devices: Vec<BlockDeviceMappingSpec>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spot_market_options: Option<SpotMarketOptions>,

    #[serde(default)]
    pub metadata_service_options: MetadataServiceOptions,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub placement_group_name: String,

    #[serde(default)]
    pub placement_group_partition: i32,

    #[serde(default, rename = "capacityReservationId", skip_serializing_if = "String::is_empty")]
    pub capacity_reservation_id: String,

    /// OnDemand, Spot or CapacityBlock
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub market_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu_options: Option<CPUOptions>,
}

/// Reference to an AWS resource by ID, ARN or filters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AWSResourceReference {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arn: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<Filter>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Filter {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TagSpecification {
    pub name: String,
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Placement {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub region: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub availability_zone: String,
    /// default, dedicated or host
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub tenancy: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<HostPlacement>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct HostPlacement {
    /// AnyAvailable or DedicatedHost
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub affinity: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dedicated_host: Option<DedicatedHost>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DedicatedHost {
    pub id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LoadBalancerReference {
    pub name: String,
    /// classic or network
    #[serde(rename = "type")]
    pub load_balancer_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BlockDeviceMappingSpec {
    /// Unset for the root volume
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ebs: Option<EBSBlockDeviceSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no_device: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub virtual_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct EBSBlockDeviceSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete_on_termination: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encrypted: Option<bool>,
    #[serde(default)]
    pub kms_key: AWSResourceReference,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iops: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub throughput_mib: Option<i32>,
    /// GiB
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_size: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SpotMarketOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_price: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MetadataServiceOptions {
    /// Required or Optional
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub authentication: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CPUOptions {
    /// Disabled or AMDEncryptedVirtualizationNestedPaging
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidential_compute: Option<String>,
}
