//! Unit tests for the Metal3 converter

use super::*;
use crate::error::ConversionResult;
use crate::providers::MachineAndInfra;
use crate::test_utils::{
    assert_one_diagnostic_each, baremetal_provider_spec, error_strings, infrastructure,
    mapi_machine, with_provider_spec,
};
use machine_crds::{capi, mapi};
use machine_crds::mapi::PlatformType;
use serde_json::{json, Value};

fn convert(provider_spec: Value) -> ConversionResult<(capi::Machine, Metal3Machine)> {
    let machine = with_provider_spec(mapi_machine("worker-0"), provider_spec);
    let infra = infrastructure(PlatformType::BareMetal);
    MachineAndInfra::<Metal3>::from_machine_and_infra(&machine, Some(&infra))
        .to_machine_and_infrastructure_machine()
}

#[test]
fn test_base_machine_converts() {
    let converted = convert(baremetal_provider_spec()).unwrap();
    assert!(converted.warnings.is_empty());
    let (machine, metal3_machine) = converted.value;

    assert_eq!(machine.spec.infrastructure_ref.kind, "Metal3Machine");
    assert_eq!(
        machine.spec.bootstrap.data_secret_name.as_deref(),
        Some("worker-user-data-managed")
    );

    let spec = &metal3_machine.spec;
    let image = spec.image.as_ref().unwrap();
    assert_eq!(image.url, "http://172.22.0.3:6181/images/rhcos.qcow2");
    assert_eq!(image.checksum_type.as_deref(), Some("sha256"));
    assert_eq!(image.disk_format.as_deref(), Some("qcow2"));
    assert_eq!(
        spec.user_data.as_ref().map(|s| s.name.as_str()),
        Some("worker-user-data-managed")
    );
    assert_eq!(
        spec.host_selector.match_labels.get("rack"),
        Some(&"r1".to_string())
    );

    let value = serde_json::to_value(image).unwrap();
    assert_eq!(value["format"], "qcow2", "disk format is serialized as format");
}

#[test]
fn test_image_or_custom_deploy_required() {
    let mut spec = baremetal_provider_spec();
    spec["image"] = json!({});
    let err = convert(spec).unwrap_err();
    assert_eq!(
        error_strings(&err),
        vec!["spec.providerSpec.value.image: Invalid value: {}: image or customDeploy must be set"]
    );

    let mut spec = baremetal_provider_spec();
    spec["image"] = json!({});
    spec["customDeploy"] = json!({"method": "install_coreos"});
    let (_, metal3_machine) = convert(spec).unwrap().value;
    assert_eq!(metal3_machine.spec.image, None);
    assert_eq!(
        metal3_machine.spec.custom_deploy.map(|d| d.method),
        Some("install_coreos".to_string())
    );
}

#[test]
fn test_user_data_namespace_is_ignored() {
    let mut spec = baremetal_provider_spec();
    spec["userData"] = json!({"name": "worker-user-data", "namespace": "elsewhere"});
    let converted = convert(spec).unwrap();

    assert_eq!(
        converted.warnings,
        vec![
            "spec.providerSpec.value.userData.namespace: Invalid value: \"elsewhere\": \
             secret namespace is ignored, the secret is read from the machine namespace"
        ]
    );
    let (_, metal3_machine) = converted.value;
    assert_eq!(
        metal3_machine.spec.user_data,
        Some(machine_crds::meta::SecretReference {
            name: "worker-user-data".to_string(),
            namespace: String::new(),
        })
    );
}

#[test]
fn test_user_data_in_machine_api_namespace() {
    let mut spec = baremetal_provider_spec();
    spec["userData"] = json!({"name": "worker-user-data", "namespace": mapi::MACHINE_API_NAMESPACE});
    let converted = convert(spec).unwrap();
    assert!(converted.warnings.is_empty(), "unexpected warnings: {:?}", converted.warnings);
}

#[test]
fn test_every_dropped_field_is_reported() {
    assert_one_diagnostic_each(
        &baremetal_provider_spec(),
        &[
            (|s| s["image"] = json!({}), "image"),
            (
                |s| {
                    s["image"] = json!({"checksum": "sha256:abc"});
                    s["customDeploy"] = json!({"method": "install_coreos"});
                },
                "image",
            ),
            (|s| s["userData"]["namespace"] = json!("elsewhere"), "userData.namespace"),
        ],
        convert,
    );
}

#[test]
fn test_host_selector_expressions() {
    let mut spec = baremetal_provider_spec();
    spec["hostSelector"] = json!({
        "matchExpressions": [{"key": "disk", "operator": "in", "values": ["ssd"]}]
    });
    let (_, metal3_machine) = convert(spec).unwrap().value;
    let requirement = &metal3_machine.spec.host_selector.match_expressions[0];
    assert_eq!(requirement.key, "disk");
    assert_eq!(requirement.operator, "in");
    assert_eq!(requirement.values, vec!["ssd".to_string()]);
}
