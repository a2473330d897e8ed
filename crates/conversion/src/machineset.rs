//! Core Cluster API MachineSet
//!
//! Provider independent part of the machine set. The template spec itself is
//! produced by converting the template machine; see
//! [`MachineSetAndInfra`](crate::providers::MachineSetAndInfra).

use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use machine_crds::meta::LabelSelector;
use machine_crds::{capi, mapi};
use tracing::debug;

use crate::conditions::{self, MachineSetState};
use crate::config::ConversionConfig;
use crate::diagnostics::{Diagnostics, FieldPath};
use crate::labels;
use crate::machine::check_embedded_metadata;

/// Build the core machine set, without cluster name or template spec.
pub fn from_mapi_machine_set(
    machine_set: &mapi::MachineSet,
    config: &ConversionConfig,
    diag: &mut Diagnostics,
) -> capi::MachineSet {
    let template_metadata = &machine_set.spec.template.metadata;
    check_embedded_metadata(
        template_metadata,
        &FieldPath::from_names(&["spec", "template", "metadata"]),
        diag,
    );

    let selector = convert_selector(&machine_set.spec.selector);

    debug!(
        machine_set = machine_set.metadata.name.as_deref().unwrap_or_default(),
        "Converted core machine set fields"
    );

    capi::MachineSet {
        metadata: ObjectMeta {
            name: machine_set.metadata.name.clone(),
            namespace: Some(config.capi_namespace.clone()),
            labels: labels::mapi_labels_to_capi(machine_set.metadata.labels.as_ref()),
            annotations: labels::mapi_annotations_to_capi(
                machine_set.metadata.annotations.as_ref(),
            ),
            ..Default::default()
        },
        spec: capi::MachineSetSpec {
            cluster_name: String::new(),
            replicas: Some(machine_set.spec.replicas.unwrap_or(1)),
            min_ready_seconds: machine_set.spec.min_ready_seconds,
            delete_policy: machine_set.spec.delete_policy.clone(),
            template: capi::MachineTemplateSpec {
                metadata: capi::TemplateObjectMeta {
                    labels: labels::mapi_labels_to_capi(template_metadata.labels.as_ref()),
                    annotations: labels::mapi_annotations_to_capi(
                        template_metadata.annotations.as_ref(),
                    ),
                },
                spec: capi::MachineSpec::default(),
            },
            selector,
        },
        status: machine_set
            .status
            .as_ref()
            .map(|_| convert_machine_set_status(machine_set)),
    }
}

/// Match labels go through the label vocabulary; expressions are kept as is.
fn convert_selector(selector: &LabelSelector) -> LabelSelector {
    LabelSelector {
        match_labels: labels::mapi_labels_to_capi(Some(&selector.match_labels))
            .unwrap_or_default(),
        match_expressions: selector.match_expressions.clone(),
    }
}

/// Convert Machine API set status, deriving both condition sets.
pub fn convert_machine_set_status(machine_set: &mapi::MachineSet) -> capi::MachineSetStatus {
    let state = MachineSetState::from_machine_set(machine_set);
    let status = machine_set.status.clone().unwrap_or_default();

    capi::MachineSetStatus {
        selector: convert_selector(&machine_set.spec.selector).to_selector_string(),
        replicas: status.replicas,
        fully_labeled_replicas: status.fully_labeled_replicas,
        ready_replicas: status.ready_replicas,
        available_replicas: status.available_replicas,
        observed_generation: status.observed_generation,
        failure_reason: status.error_reason,
        failure_message: status.error_message,
        conditions: conditions::machine_set_legacy_conditions(&state),
        v1beta2: Some(capi::MachineSetV1Beta2Status {
            conditions: conditions::machine_set_v1beta2_conditions(&state),
            ready_replicas: Some(status.ready_replicas),
            available_replicas: Some(status.available_replicas),
            up_to_date_replicas: Some(status.fully_labeled_replicas),
        }),
    }
}

#[cfg(test)]
#[path = "machineset_test.rs"]
mod tests;
