//! Conversion settings
//!
//! Values that the converters would otherwise hard-code. They describe the
//! behaviour of the running Machine API actuators, so the defaults must stay
//! in step with them.

use serde::{Deserialize, Serialize};

use machine_crds::capi::DEFAULT_CAPI_NAMESPACE;

/// Settings injected into every converter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConversionConfig {
    /// Namespace Cluster API resources are created in
    pub capi_namespace: String,

    /// `spec.nodeDeletionTimeout` of every converted machine
    pub node_deletion_timeout_seconds: u64,

    /// Root volume size used when an AWS root block device has none
    pub aws_root_volume_size_gib: i64,

    /// Instance metadata hop limit applied to every AWS machine
    pub aws_http_put_response_hop_limit: i64,

    /// Ignition version set on AWS machines
    pub ignition_version: String,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        ConversionConfig {
            capi_namespace: DEFAULT_CAPI_NAMESPACE.to_string(),
            node_deletion_timeout_seconds: 10,
            aws_root_volume_size_gib: 120,
            aws_http_put_response_hop_limit: 1,
            ignition_version: "3.4".to_string(),
        }
    }
}

impl ConversionConfig {
    /// Node deletion timeout as a duration string (`10s`).
    pub fn node_deletion_timeout(&self) -> String {
        format!("{}s", self.node_deletion_timeout_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ConversionConfig::default();
        assert_eq!(config.capi_namespace, "openshift-cluster-api");
        assert_eq!(config.node_deletion_timeout(), "10s");
        assert_eq!(config.aws_root_volume_size_gib, 120);
        assert_eq!(config.aws_http_put_response_hop_limit, 1);
        assert_eq!(config.ignition_version, "3.4");
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config: ConversionConfig =
            serde_yaml::from_str("capiNamespace: capi-system\nnodeDeletionTimeoutSeconds: 30\n")
                .unwrap();
        assert_eq!(config.capi_namespace, "capi-system");
        assert_eq!(config.node_deletion_timeout(), "30s");
        assert_eq!(config.aws_root_volume_size_gib, 120, "unset fields keep their default");
    }
}
