//! Unit tests for platform dispatch

use super::*;
use crate::test_utils::{
    aws_provider_spec, baremetal_provider_spec, infrastructure, mapi_machine,
    mapi_machine_set_with_spec, vsphere_provider_spec, with_provider_spec,
};

#[test]
fn test_machine_dispatch_follows_platform() {
    let machine = with_provider_spec(mapi_machine("worker-0"), aws_provider_spec());
    let infra = infrastructure(PlatformType::Aws);

    let (capi_machine, infra_machine) = convert_machine(&machine, &infra, &ConversionConfig::default())
        .unwrap()
        .value;
    assert!(matches!(infra_machine, InfraMachine::Aws(_)));
    assert_eq!(infra_machine.kind(), "AWSMachine");
    assert_eq!(infra_machine.metadata().name.as_deref(), Some("worker-0"));
    assert_eq!(capi_machine.spec.infrastructure_ref.kind, infra_machine.kind());
}

#[test]
fn test_bare_metal_uses_metal3() {
    let machine = with_provider_spec(mapi_machine("worker-0"), baremetal_provider_spec());
    let infra = infrastructure(PlatformType::BareMetal);

    let (_, infra_machine) = convert_machine(&machine, &infra, &ConversionConfig::default())
        .unwrap()
        .value;
    assert_eq!(infra_machine.kind(), "Metal3Machine");
}

#[test]
fn test_unsupported_platform() {
    let machine = mapi_machine("worker-0");
    for platform in [PlatformType::Gcp, PlatformType::Azure, PlatformType::None] {
        let err = convert_machine(&machine, &infrastructure(platform), &ConversionConfig::default())
            .unwrap_err();
        assert!(
            matches!(err, ConversionError::UnsupportedPlatform(p) if p == platform),
            "{platform:?} has no converter"
        );
    }
}

#[test]
fn test_platform_from_spec_when_status_has_none() {
    let machine = with_provider_spec(mapi_machine("worker-0"), vsphere_provider_spec());
    let mut infra = infrastructure(PlatformType::VSphere);
    if let Some(status) = infra.status.as_mut() {
        status.platform_status = None;
    }
    infra.spec.platform_spec = Some(mapi::PlatformSpec {
        platform_type: PlatformType::VSphere,
    });

    let (_, infra_machine) = convert_machine(&machine, &infra, &ConversionConfig::default())
        .unwrap()
        .value;
    assert!(matches!(infra_machine, InfraMachine::VSphere(_)));
}

#[test]
fn test_machine_set_dispatch_and_config() {
    let machine_set = mapi_machine_set_with_spec("worker", vsphere_provider_spec());
    let infra = infrastructure(PlatformType::VSphere);
    let config = ConversionConfig {
        capi_namespace: "capi-system".to_string(),
        ..Default::default()
    };

    let (capi_machine_set, template) = convert_machine_set(&machine_set, &infra, &config)
        .unwrap()
        .value;
    assert_eq!(template.kind(), "VSphereMachineTemplate");
    assert_eq!(template.metadata().namespace.as_deref(), Some("capi-system"));
    assert_eq!(
        capi_machine_set.spec.template.spec.infrastructure_ref.name.as_str(),
        template.metadata().name.as_deref().unwrap_or_default()
    );
}

#[test]
fn test_erased_machine_serializes_as_resource() {
    let machine = with_provider_spec(mapi_machine("worker-0"), aws_provider_spec());
    let infra = infrastructure(PlatformType::Aws);
    let (_, infra_machine) = convert_machine(&machine, &infra, &ConversionConfig::default())
        .unwrap()
        .value;

    let value = serde_json::to_value(&infra_machine).unwrap();
    assert_eq!(value["kind"], "AWSMachine");
    assert_eq!(value["apiVersion"], "infrastructure.cluster.x-k8s.io/v1beta2");
    assert_eq!(value["spec"]["instanceType"], "m6i.xlarge");
}
