//! Core Cluster API Machine
//!
//! Builds the provider independent part of a Cluster API `Machine` from a
//! Machine API `Machine`: identity, labels, annotations, lifecycle hooks,
//! node deletion timeout and status. Provider converters then wire in the
//! infrastructure reference, failure domain, bootstrap secret and cluster
//! name.

use std::collections::BTreeMap;

use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use machine_crds::meta::EmbeddedObjectMeta;
use machine_crds::{capi, mapi};
use tracing::debug;

use crate::conditions::{self, MachineState};
use crate::config::ConversionConfig;
use crate::diagnostics::{Diagnostics, FieldError, FieldPath};
use crate::labels;

/// Finalizer Cluster API places on every machine
pub const MACHINE_FINALIZER: &str = "machine.cluster.x-k8s.io";

/// Build the core machine. `spec_path` locates the machine spec inside the
/// source object (`spec` for a Machine, `spec.template.spec` for a
/// MachineSet template).
pub fn from_mapi_machine(
    machine: &mapi::Machine,
    spec_path: &FieldPath,
    config: &ConversionConfig,
    diag: &mut Diagnostics,
) -> capi::Machine {
    let mut labels = labels::mapi_labels_to_capi(machine.metadata.labels.as_ref());
    labels::propagate_node_labels(&mut labels, machine.spec.metadata.labels.as_ref());

    let mut annotations = labels::mapi_annotations_to_capi(machine.metadata.annotations.as_ref());
    labels::propagate_node_annotations(&mut annotations, machine.spec.metadata.annotations.as_ref());
    add_lifecycle_hook_annotations(&mut annotations, &machine.spec.lifecycle_hooks);

    check_embedded_metadata(&machine.spec.metadata, &spec_path.child("metadata"), diag);

    if !machine.spec.taints.is_empty() {
        diag.error(FieldError::invalid(
            &spec_path.child("taints"),
            &machine.spec.taints,
            "taints are not currently supported",
        ));
    }

    debug!(
        machine = machine.metadata.name.as_deref().unwrap_or_default(),
        "Converted core machine fields"
    );

    capi::Machine {
        metadata: ObjectMeta {
            name: machine.metadata.name.clone(),
            namespace: Some(config.capi_namespace.clone()),
            labels,
            annotations,
            finalizers: Some(vec![MACHINE_FINALIZER.to_string()]),
            ..Default::default()
        },
        spec: capi::MachineSpec {
            provider_id: machine.spec.provider_id.clone(),
            node_deletion_timeout: Some(config.node_deletion_timeout()),
            ..Default::default()
        },
        status: machine.status.as_ref().map(|_| convert_machine_status(machine)),
    }
}

/// Lifecycle hooks become `pre-drain.delete.hook...` and
/// `pre-terminate.delete.hook...` annotations valued with the hook owner.
fn add_lifecycle_hook_annotations(
    annotations: &mut Option<BTreeMap<String, String>>,
    hooks: &mapi::LifecycleHooks,
) {
    let prefixed = hooks
        .pre_drain
        .iter()
        .map(|hook| (capi::PRE_DRAIN_DELETE_HOOK_ANNOTATION_PREFIX, hook))
        .chain(
            hooks
                .pre_terminate
                .iter()
                .map(|hook| (capi::PRE_TERMINATE_DELETE_HOOK_ANNOTATION_PREFIX, hook)),
        );

    for (prefix, hook) in prefixed {
        annotations
            .get_or_insert_with(BTreeMap::new)
            .insert(format!("{prefix}/{}", hook.name), hook.owner.clone());
    }
}

/// Identity fields in nested metadata have no Cluster API counterpart.
pub(crate) fn check_embedded_metadata(
    metadata: &EmbeddedObjectMeta,
    path: &FieldPath,
    diag: &mut Diagnostics,
) {
    if !metadata.name.is_empty() {
        diag.error(FieldError::invalid(
            &path.child("name"),
            &metadata.name,
            "metadata.name is not supported",
        ));
    }
    if !metadata.generate_name.is_empty() {
        diag.error(FieldError::invalid(
            &path.child("generateName"),
            &metadata.generate_name,
            "metadata.generateName is not supported",
        ));
    }
    if !metadata.namespace.is_empty() {
        diag.error(FieldError::invalid(
            &path.child("namespace"),
            &metadata.namespace,
            "metadata.namespace is not supported",
        ));
    }
    if !metadata.owner_references.is_empty() {
        diag.error(FieldError::invalid(
            &path.child("ownerReferences"),
            &metadata.owner_references,
            "metadata.ownerReferences is not supported",
        ));
    }
}

/// Convert Machine API status, deriving both condition sets.
pub fn convert_machine_status(machine: &mapi::Machine) -> capi::MachineStatus {
    let state = MachineState::from_machine(machine);
    let status = machine.status.clone().unwrap_or_default();

    capi::MachineStatus {
        node_ref: status.node_ref,
        last_updated: status.last_updated,
        failure_reason: status.error_reason,
        failure_message: status.error_message,
        addresses: status.addresses,
        phase: status.phase.unwrap_or_default(),
        bootstrap_ready: state.bootstrap_ready(),
        infrastructure_ready: state.infrastructure_ready(),
        observed_generation: state.generation,
        conditions: conditions::machine_legacy_conditions(&state),
        v1beta2: Some(capi::MachineV1Beta2Status {
            conditions: conditions::machine_v1beta2_conditions(&state),
        }),
    }
}

#[cfg(test)]
#[path = "machine_test.rs"]
mod tests;
