//! Cluster API resources (`cluster.x-k8s.io`, `infrastructure.cluster.x-k8s.io`)
//!
//! Core Machines and MachineSets plus the infrastructure machine and machine
//! template kinds of each supported provider.

pub mod aws;
pub mod conditions;
pub mod machine;
pub mod machine_set;
pub mod metal3;
pub mod nutanix;
pub mod openstack;
pub mod powervs;
pub mod vsphere;

pub use aws::{AWSMachine, AWSMachineTemplate};
pub use machine::*;
pub use machine_set::*;
pub use metal3::{Metal3Machine, Metal3MachineTemplate};
pub use nutanix::{NutanixMachine, NutanixMachineTemplate};
pub use openstack::{OpenStackMachine, OpenStackMachineTemplate};
pub use powervs::{IBMPowerVSMachine, IBMPowerVSMachineTemplate};
pub use vsphere::{VSphereMachine, VSphereMachineTemplate};

/// `apiVersion` of core Cluster API resources
pub const CLUSTER_API_VERSION: &str = "cluster.x-k8s.io/v1beta1";
/// API group of infrastructure provider resources
pub const INFRASTRUCTURE_API_GROUP: &str = "infrastructure.cluster.x-k8s.io";

pub const CLUSTER_NAME_LABEL: &str = "cluster.x-k8s.io/cluster-name";
pub const MACHINE_SET_NAME_LABEL: &str = "cluster.x-k8s.io/set-name";
pub const MACHINE_DEPLOYMENT_NAME_LABEL: &str = "cluster.x-k8s.io/deployment-name";
pub const MACHINE_TEMPLATE_HASH_LABEL: &str = "machine-template-hash";

/// Node role labels are `node-role.kubernetes.io/<role>` with an empty value
pub const NODE_ROLE_LABEL_PREFIX: &str = "node-role.kubernetes.io";

/// Annotation marking a machine to be removed first on scale down
pub const DELETE_MACHINE_ANNOTATION: &str = "cluster.x-k8s.io/delete-machine";

pub const PRE_DRAIN_DELETE_HOOK_ANNOTATION_PREFIX: &str = "pre-drain.delete.hook.machine.cluster.x-k8s.io";
pub const PRE_TERMINATE_DELETE_HOOK_ANNOTATION_PREFIX: &str =
    "pre-terminate.delete.hook.machine.cluster.x-k8s.io";

/// Namespace Cluster API resources are created in
pub const DEFAULT_CAPI_NAMESPACE: &str = "openshift-cluster-api";

#[cfg(test)]
mod tests {
    use super::*;
    use kube::Resource;

    #[test]
    fn test_infrastructure_kinds_and_versions() {
        assert_eq!(AWSMachine::api_version(&()), "infrastructure.cluster.x-k8s.io/v1beta2");
        assert_eq!(AWSMachineTemplate::kind(&()), "AWSMachineTemplate");
        assert_eq!(VSphereMachine::api_version(&()), "infrastructure.cluster.x-k8s.io/v1beta1");
        assert_eq!(OpenStackMachine::api_version(&()), "infrastructure.cluster.x-k8s.io/v1beta1");
        assert_eq!(NutanixMachine::api_version(&()), "infrastructure.cluster.x-k8s.io/v1beta1");
        assert_eq!(IBMPowerVSMachine::api_version(&()), "infrastructure.cluster.x-k8s.io/v1beta2");
        assert_eq!(Metal3Machine::api_version(&()), "infrastructure.cluster.x-k8s.io/v1beta1");
        assert_eq!(Machine::api_version(&()), CLUSTER_API_VERSION);
    }

    #[test]
    fn test_aws_machine_spec_field_names() {
        let spec = aws::AWSMachineSpec {
            instance_type: "m6i.xlarge".to_string(),
            provider_id: Some("aws:///us-east-1a/i-0123".to_string()),
            instance_id: Some("i-0123".to_string()),
            public_ip: Some(true),
            ..Default::default()
        };
        let value = serde_json::to_value(&spec).unwrap();

        assert_eq!(value["instanceType"], "m6i.xlarge");
        assert_eq!(value["providerID"], "aws:///us-east-1a/i-0123");
        assert_eq!(value["instanceID"], "i-0123");
        assert_eq!(value["publicIP"], true);
        assert!(value.get("additionalTags").is_none(), "empty maps are omitted");
    }

    #[test]
    fn test_openstack_filter_tags_are_flattened() {
        let filter = openstack::NetworkFilter {
            name: "private".to_string(),
            tags: openstack::FilterByNeutronTags {
                tags: vec!["a".to_string()],
                ..Default::default()
            },
            ..Default::default()
        };
        let value = serde_json::to_value(&filter).unwrap();

        assert_eq!(value["name"], "private");
        assert_eq!(value["tags"], serde_json::json!(["a"]));
        assert!(value.get("notTags").is_none());
    }
}
