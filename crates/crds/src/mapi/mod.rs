//! Machine API resources (`machine.openshift.io`)
//!
//! Machines, MachineSets, the cluster Infrastructure object and the
//! provider-specific configurations carried in `spec.providerSpec.value`.

pub mod aws;
pub mod baremetal;
pub mod infrastructure;
pub mod machine;
pub mod machine_set;
pub mod nutanix;
pub mod openstack;
pub mod powervs;
pub mod vsphere;

pub use infrastructure::*;
pub use machine::*;
pub use machine_set::*;

/// Annotation requesting this machine be removed first on scale down
pub const DELETE_MACHINE_ANNOTATION: &str = "machine.openshift.io/delete-machine";
/// Annotation mirroring the cloud instance state
pub const INSTANCE_STATE_ANNOTATION: &str = "machine.openshift.io/instance-state";

pub const MACHINE_ROLE_LABEL: &str = "machine.openshift.io/cluster-api-machine-role";
pub const MACHINE_TYPE_LABEL: &str = "machine.openshift.io/cluster-api-machine-type";
pub const CLUSTER_ID_LABEL: &str = "machine.openshift.io/cluster-api-cluster";
pub const INSTANCE_TYPE_LABEL: &str = "machine.openshift.io/instance-type";
pub const REGION_LABEL: &str = "machine.openshift.io/region";
pub const ZONE_LABEL: &str = "machine.openshift.io/zone";

/// Namespace Machine API resources live in
pub const MACHINE_API_NAMESPACE: &str = "openshift-machine-api";
