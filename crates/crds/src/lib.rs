//! Machine resource definitions
//!
//! Typed Kubernetes resources for both sides of a Machine API to Cluster API
//! conversion: the OpenShift Machine API (`machine.openshift.io`) with its
//! per-provider configuration schemas, and the Cluster API
//! (`cluster.x-k8s.io`) with its infrastructure provider kinds.

pub mod capi;
pub mod conditions;
pub mod mapi;
pub mod meta;

pub use conditions::*;
pub use meta::*;
