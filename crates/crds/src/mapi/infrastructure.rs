//! OpenShift cluster Infrastructure
//!
//! `config.openshift.io/v1` Infrastructure, cluster scoped. Only the fields
//! consumed by machine conversion are modelled.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(CustomResource, Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "config.openshift.io",
    version = "v1",
    kind = "Infrastructure",
    status = "InfrastructureStatus",
    derive = "PartialEq",
    derive = "Default"
)]
#[serde(rename_all = "camelCase")]
pub struct InfrastructureSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform_spec: Option<PlatformSpec>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlatformSpec {
    #[serde(rename = "type")]
    pub platform_type: PlatformType,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct InfrastructureStatus {
    /// Unique cluster identifier, used as the Cluster API cluster name
    #[serde(default)]
    pub infrastructure_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform_status: Option<PlatformStatus>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlatformStatus {
    #[serde(rename = "type")]
    pub platform_type: PlatformType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aws: Option<AWSPlatformStatus>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AWSPlatformStatus {
    #[serde(default)]
    pub region: String,
}

/// Underlying infrastructure provider of the cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
pub enum PlatformType {
    #[serde(rename = "AWS")]
    Aws,
    VSphere,
    OpenStack,
    Nutanix,
    PowerVS,
    BareMetal,
    #[serde(rename = "GCP")]
    Gcp,
    Azure,
    External,
    #[default]
    None,
    #[serde(other)]
    Unknown,
}

impl Infrastructure {
    /// Infrastructure name from status, empty when unset.
    pub fn infrastructure_name(&self) -> &str {
        self.status
            .as_ref()
            .map_or("", |status| status.infrastructure_name.as_str())
    }

    /// Platform type from `status.platformStatus`, falling back to `spec.platformSpec`.
    pub fn platform_type(&self) -> PlatformType {
        self.status
            .as_ref()
            .and_then(|status| status.platform_status.as_ref())
            .map(|platform| platform.platform_type)
            .or_else(|| self.spec.platform_spec.as_ref().map(|spec| spec.platform_type))
            .unwrap_or_default()
    }

    /// AWS region from `status.platformStatus.aws`, `None` when unset or empty.
    pub fn aws_region(&self) -> Option<&str> {
        self.status
            .as_ref()
            .and_then(|status| status.platform_status.as_ref())
            .and_then(|platform| platform.aws.as_ref())
            .map(|aws| aws.region.as_str())
            .filter(|region| !region.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_type_prefers_status() {
        let infra: Infrastructure = serde_json::from_value(serde_json::json!({
            "apiVersion": "config.openshift.io/v1",
            "kind": "Infrastructure",
            "metadata": {"name": "cluster"},
            "spec": {"platformSpec": {"type": "VSphere"}},
            "status": {
                "infrastructureName": "cluster-abc12",
                "platformStatus": {"type": "AWS", "aws": {"region": "us-east-1"}}
            }
        }))
        .unwrap();

        assert_eq!(infra.platform_type(), PlatformType::Aws);
        assert_eq!(infra.infrastructure_name(), "cluster-abc12");
        assert_eq!(infra.aws_region(), Some("us-east-1"));
    }

    #[test]
    fn test_aws_region_unset() {
        let infra = Infrastructure::new("cluster", InfrastructureSpec::default());
        assert_eq!(infra.aws_region(), None);
        assert_eq!(infra.infrastructure_name(), "");
    }

    #[test]
    fn test_unknown_platform_deserializes() {
        let status: PlatformStatus =
            serde_json::from_value(serde_json::json!({"type": "Kubevirt"})).unwrap();
        assert_eq!(status.platform_type, PlatformType::Unknown);
    }
}
