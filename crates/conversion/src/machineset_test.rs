//! Unit tests for core machine set conversion

use super::*;
use crate::test_utils::{mapi_machine_set, mapi_machine_set_with_spec, string_map, INFRASTRUCTURE_NAME};
use machine_crds::meta::LabelSelectorRequirement;
use serde_json::json;

fn convert(machine_set: &mapi::MachineSet) -> (capi::MachineSet, Diagnostics) {
    let mut diag = Diagnostics::new();
    let converted = from_mapi_machine_set(machine_set, &ConversionConfig::default(), &mut diag);
    (converted, diag)
}

#[test]
fn test_replicas_default_to_one() {
    let (converted, _) = convert(&mapi_machine_set("workers", None));
    assert_eq!(converted.spec.replicas, Some(1));

    let (converted, _) = convert(&mapi_machine_set("workers", Some(0)));
    assert_eq!(converted.spec.replicas, Some(0));
}

#[test]
fn test_selector_and_template_labels_are_translated() {
    let mut machine_set = mapi_machine_set_with_spec("workers", json!({}));
    machine_set.spec.selector.match_expressions = vec![LabelSelectorRequirement {
        key: "machine.openshift.io/cluster-api-machine-role".to_string(),
        operator: "In".to_string(),
        values: vec!["worker".to_string()],
    }];
    machine_set.spec.min_ready_seconds = 30;
    machine_set.spec.delete_policy = "Oldest".to_string();
    let (converted, diag) = convert(&machine_set);

    assert!(diag.errors.is_empty());
    let expected_labels = string_map(&[
        (capi::CLUSTER_NAME_LABEL, INFRASTRUCTURE_NAME),
        ("machine.openshift.io/cluster-api-machineset", "workers"),
    ]);
    assert_eq!(converted.spec.selector.match_labels, expected_labels);
    assert_eq!(
        converted.spec.selector.match_expressions,
        machine_set.spec.selector.match_expressions,
        "expressions are kept as is"
    );
    assert_eq!(converted.spec.template.metadata.labels, Some(expected_labels));
    assert_eq!(converted.spec.min_ready_seconds, 30);
    assert_eq!(converted.spec.delete_policy, "Oldest");
    assert_eq!(
        converted.metadata.namespace.as_deref(),
        Some(capi::DEFAULT_CAPI_NAMESPACE)
    );
    assert!(converted.spec.cluster_name.is_empty(), "filled in by the provider wiring");
}

#[test]
fn test_template_metadata_identity_is_rejected() {
    let mut machine_set = mapi_machine_set("workers", Some(1));
    machine_set.spec.template.metadata.generate_name = "workers-".to_string();
    let (_, diag) = convert(&machine_set);

    let rendered: Vec<String> = diag.errors.iter().map(ToString::to_string).collect();
    assert_eq!(
        rendered,
        vec![
            "spec.template.metadata.generateName: Invalid value: \"workers-\": \
             metadata.generateName is not supported"
        ]
    );
}

#[test]
fn test_status_conversion() {
    let mut machine_set = mapi_machine_set_with_spec("workers", json!({}));
    machine_set.status = Some(mapi::MachineSetStatus {
        replicas: 3,
        fully_labeled_replicas: 3,
        ready_replicas: 2,
        available_replicas: 2,
        observed_generation: 4,
        error_reason: Some("InvalidConfiguration".to_string()),
        ..Default::default()
    });
    let status = convert_machine_set_status(&machine_set);

    assert_eq!(
        status.selector,
        "cluster.x-k8s.io/cluster-name=test-cluster-abc12,\
         machine.openshift.io/cluster-api-machineset=workers"
    );
    assert_eq!(status.replicas, 3);
    assert_eq!(status.ready_replicas, 2);
    assert_eq!(status.observed_generation, 4);
    assert_eq!(status.failure_reason.as_deref(), Some("InvalidConfiguration"));
    assert!(!status.conditions.is_empty());

    let v1beta2 = status.v1beta2.unwrap();
    assert_eq!(v1beta2.ready_replicas, Some(2));
    assert_eq!(v1beta2.available_replicas, Some(2));
    assert_eq!(v1beta2.up_to_date_replicas, Some(3));
    assert!(!v1beta2.conditions.is_empty());
}

#[test]
fn test_no_status_without_source_status() {
    let (converted, _) = convert(&mapi_machine_set("workers", Some(2)));
    assert_eq!(converted.status, None);
}
