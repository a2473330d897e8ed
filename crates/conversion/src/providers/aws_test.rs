//! Unit tests for the AWS converter

use super::*;
use crate::error::{ConversionError, ConversionResult};
use crate::providers::MachineAndInfra;
use crate::test_utils::{
    assert_one_diagnostic_each, aws_provider_spec, error_fields, error_strings, infrastructure,
    mapi_machine, with_labels, with_provider_spec, AWS_REGION, INFRASTRUCTURE_NAME,
};
use machine_crds::mapi::PlatformType;
use machine_crds::{capi, mapi};
use serde_json::{json, Value};

fn convert(provider_spec: Value) -> ConversionResult<(capi::Machine, AWSMachine)> {
    convert_with_infra(provider_spec, &infrastructure(PlatformType::Aws))
}

fn convert_with_infra(
    provider_spec: Value,
    infra: &mapi::Infrastructure,
) -> ConversionResult<(capi::Machine, AWSMachine)> {
    let machine = with_labels(
        with_provider_spec(mapi_machine("worker-0"), provider_spec),
        &[
            (mapi::CLUSTER_ID_LABEL, INFRASTRUCTURE_NAME),
            (mapi::MACHINE_ROLE_LABEL, "worker"),
            (mapi::MACHINE_TYPE_LABEL, "worker"),
        ],
    );
    MachineAndInfra::<Aws>::from_machine_and_infra(&machine, Some(infra))
        .to_machine_and_infrastructure_machine()
}

fn spec_with(patch: impl FnOnce(&mut Value)) -> Value {
    let mut spec = aws_provider_spec();
    patch(&mut spec);
    spec
}

#[test]
fn test_base_machine_converts_without_diagnostics() {
    let converted = convert(aws_provider_spec()).unwrap();
    assert!(converted.warnings.is_empty(), "unexpected warnings: {:?}", converted.warnings);
    let (machine, aws_machine) = converted.value;

    assert_eq!(machine.spec.cluster_name, INFRASTRUCTURE_NAME);
    assert_eq!(machine.spec.failure_domain.as_deref(), Some("us-east-1a"));
    assert_eq!(
        machine.spec.bootstrap.data_secret_name.as_deref(),
        Some("worker-user-data")
    );
    assert_eq!(machine.spec.infrastructure_ref.kind, "AWSMachine");
    assert_eq!(
        machine.spec.infrastructure_ref.api_version,
        "infrastructure.cluster.x-k8s.io/v1beta2"
    );
    assert_eq!(machine.spec.infrastructure_ref.name, "worker-0");
    assert_eq!(machine.spec.infrastructure_ref.namespace, "openshift-cluster-api");

    let spec = &aws_machine.spec;
    assert_eq!(spec.instance_type, "m6i.xlarge");
    assert_eq!(spec.ami.id.as_deref(), Some("ami-0123456789abcdef0"));
    assert_eq!(spec.iam_instance_profile, "test-cluster-abc12-worker-profile");
    assert_eq!(
        spec.additional_tags.get("kubernetes.io/cluster/test-cluster-abc12"),
        Some(&"owned".to_string())
    );
    assert_eq!(spec.uncompressed_user_data, Some(true));
    assert_eq!(spec.ignition.as_ref().map(|i| i.version.as_str()), Some("3.4"));

    let root = spec.root_volume.as_ref().unwrap();
    assert_eq!(root.size, 120);
    assert_eq!(root.volume_type, "gp3");
    assert_eq!(root.encrypted, Some(true));
    assert!(spec.non_root_volumes.is_empty());

    assert_eq!(spec.additional_security_groups.len(), 2);
    assert_eq!(spec.additional_security_groups[0].filters[0].name, "tag:Name");
    assert_eq!(spec.additional_security_groups[1].id.as_deref(), Some("sg-0123"));
    assert_eq!(
        spec.subnet.as_ref().map(|s| s.filters[0].values.clone()),
        Some(vec!["test-cluster-abc12-private-us-east-1a".to_string()])
    );

    let metadata_options = spec.instance_metadata_options.as_ref().unwrap();
    assert_eq!(metadata_options.http_tokens, "optional");
    assert_eq!(metadata_options.http_put_response_hop_limit, 1);
}

#[test]
fn test_infra_machine_labels_match_core_machine() {
    let (machine, aws_machine) = convert(aws_provider_spec()).unwrap().value;

    let labels = machine.metadata.labels.clone().unwrap();
    assert_eq!(labels.get("node-role.kubernetes.io/worker"), Some(&String::new()));
    assert_eq!(
        labels.get(capi::CLUSTER_NAME_LABEL),
        Some(&INFRASTRUCTURE_NAME.to_string())
    );
    assert_eq!(aws_machine.metadata.labels, machine.metadata.labels);
    assert_eq!(aws_machine.metadata.annotations, machine.metadata.annotations);
    assert_eq!(aws_machine.metadata.name.as_deref(), Some("worker-0"));
}

#[test]
fn test_ami_arn_is_rejected() {
    let spec = spec_with(|s| s["ami"] = json!({"arn": "arn:aws:ec2:us-east-1::image/ami-1"}));
    let err = convert(spec).unwrap_err();

    assert_eq!(
        error_strings(&err),
        vec![
            "spec.providerSpec.value.ami.arn: Invalid value: \"arn:aws:ec2:us-east-1::image/ami-1\": \
             unable to convert AMI ARN reference. Not supported in CAPI"
        ]
    );
}

#[test]
fn test_ami_filters_are_rejected() {
    let spec = spec_with(|s| {
        s["ami"] = json!({"filters": [{"name": "name", "values": ["rhcos-*"]}]});
    });
    let err = convert(spec).unwrap_err();
    assert_eq!(error_fields(&err), vec!["spec.providerSpec.value.ami.filters"]);
    assert!(err.to_string().contains("unable to convert AMI Filters reference"));
}

#[test]
fn test_root_entry_without_ebs_warns_and_uses_default_size() {
    let spec = spec_with(|s| s["blockDevices"] = json!([{}]));
    let converted = convert(spec).unwrap();

    assert_eq!(converted.warnings.len(), 1);
    assert_eq!(
        converted.warnings[0],
        "spec.providerSpec.value.blockDevices[0]: Invalid value: {}: \
         missing ebs configuration for block device"
    );
    let (_, aws_machine) = converted.value;
    assert_eq!(aws_machine.spec.root_volume.map(|v| v.size), Some(120));
}

#[test]
fn test_missing_root_volume_warns_at_block_devices() {
    let spec = spec_with(|s| s["blockDevices"] = json!([]));
    let converted = convert(spec).unwrap();

    assert_eq!(
        converted.warnings,
        vec![
            "spec.providerSpec.value.blockDevices: Invalid value: []: \
             missing ebs configuration for block device"
        ]
    );
    assert_eq!(converted.value.1.spec.root_volume.map(|v| v.size), Some(120));
}

#[test]
fn test_named_block_devices_become_non_root_volumes() {
    let spec = spec_with(|s| {
        s["blockDevices"] = json!([
            {"ebs": {"volumeSize": 200, "volumeType": "io1", "iops": 3000}},
            {"deviceName": "/dev/sdf", "ebs": {
                "volumeSize": 50,
                "volumeType": "gp3",
                "throughputMib": 250,
                "kmsKey": {"arn": "arn:aws:kms:us-east-1:123:key/abc"}
            }}
        ]);
    });
    let (_, aws_machine) = convert(spec).unwrap().value;

    let root = aws_machine.spec.root_volume.unwrap();
    assert_eq!(root.size, 200);
    assert_eq!(root.iops, 3000);

    let volumes = aws_machine.spec.non_root_volumes;
    assert_eq!(volumes.len(), 1);
    assert_eq!(volumes[0].device_name, "/dev/sdf");
    assert_eq!(volumes[0].throughput, Some(250));
    assert_eq!(volumes[0].encryption_key, "arn:aws:kms:us-east-1:123:key/abc");
}

#[test]
fn test_unsupported_block_device_fields_are_errors() {
    let spec = spec_with(|s| {
        s["blockDevices"] = json!([
            {"ebs": {"deleteOnTermination": false}},
            {"ebs": {}},
            {"deviceName": "/dev/sdg", "noDevice": "", "virtualName": "ephemeral0", "ebs": {}}
        ]);
    });
    let err = convert(spec).unwrap_err();

    assert_eq!(
        error_fields(&err),
        vec![
            "spec.providerSpec.value.blockDevices[0].ebs.deleteOnTermination",
            "spec.providerSpec.value.blockDevices[1].deviceName",
            "spec.providerSpec.value.blockDevices[2].virtualName",
        ]
    );
}

#[test]
fn test_load_balancers_and_device_index_are_errors() {
    let spec = spec_with(|s| {
        s["deviceIndex"] = json!(1);
        s["loadBalancers"] = json!([{"name": "test-cluster-int", "type": "network"}]);
    });
    let err = convert(spec).unwrap_err();

    assert_eq!(
        error_fields(&err),
        vec![
            "spec.providerSpec.value.deviceIndex",
            "spec.providerSpec.value.loadBalancers",
        ]
    );
    let ConversionError::Invalid { warnings, .. } = &err else {
        panic!("expected field errors, got {err:?}");
    };
    assert!(warnings.is_empty());
}

#[test]
fn test_credentials_secret_must_be_default() {
    let spec = spec_with(|s| s["credentialsSecret"] = json!({"name": "custom-credentials"}));
    let err = convert(spec).unwrap_err();

    assert_eq!(
        error_strings(&err),
        vec![
            "spec.providerSpec.value.credentialsSecret: Invalid value: {\"name\":\"custom-credentials\"}: \
             credentialsSecret must be either unset or set to \"aws-cloud-credentials\""
        ]
    );
}

#[test]
fn test_metadata_authentication_and_interface_type() {
    let spec = spec_with(|s| {
        s["metadataServiceOptions"] = json!({"authentication": "Required"});
        s["networkInterfaceType"] = json!("EFA");
    });
    let (_, aws_machine) = convert(spec).unwrap().value;
    assert_eq!(
        aws_machine.spec.instance_metadata_options.unwrap().http_tokens,
        "required"
    );
    assert_eq!(aws_machine.spec.network_interface_type, "efa");

    let spec = spec_with(|s| s["networkInterfaceType"] = json!("SRIOV"));
    let err = convert(spec).unwrap_err();
    assert_eq!(
        error_strings(&err),
        vec![
            "spec.providerSpec.value.networkInterfaceType: Unsupported value: \"SRIOV\": \
             supported values: \"ENA\", \"EFA\""
        ]
    );
}

#[test]
fn test_security_group_id_wins_over_filters() {
    let spec = spec_with(|s| {
        s["securityGroups"] = json!([
            {"id": "sg-1", "filters": [{"name": "tag:Name", "values": ["ignored"]}]}
        ]);
        s["subnet"] = json!({"arn": "arn:aws:ec2:us-east-1:123:subnet/subnet-1"});
    });
    let err = convert(spec).unwrap_err();
    assert_eq!(error_fields(&err), vec!["spec.providerSpec.value.subnet.arn"]);

    let spec = spec_with(|s| {
        s["securityGroups"] = json!([
            {"id": "sg-1", "filters": [{"name": "tag:Name", "values": ["ignored"]}]}
        ]);
    });
    let converted = convert(spec).unwrap();
    assert_eq!(
        converted.warnings,
        vec![
            "spec.providerSpec.value.securityGroups[0].filters: Invalid value: \
             [{\"name\":\"tag:Name\",\"values\":[\"ignored\"]}]: \
             security group filters are ignored when id is set"
        ]
    );
    let (_, aws_machine) = converted.value;
    let group = &aws_machine.spec.additional_security_groups[0];
    assert_eq!(group.id.as_deref(), Some("sg-1"));
    assert!(group.filters.is_empty());
}

#[test]
fn test_dedicated_host_placement() {
    let spec = spec_with(|s| {
        s["placement"] = json!({
            "region": "us-east-1",
            "availabilityZone": "us-east-1b",
            "tenancy": "host",
            "host": {"affinity": "DedicatedHost", "dedicatedHost": {"id": "h-0123"}}
        });
    });
    let (machine, aws_machine) = convert(spec).unwrap().value;

    assert_eq!(machine.spec.failure_domain.as_deref(), Some("us-east-1b"));
    assert_eq!(aws_machine.spec.tenancy, "host");
    assert_eq!(aws_machine.spec.host_affinity.as_deref(), Some("host"));
    assert_eq!(aws_machine.spec.host_id.as_deref(), Some("h-0123"));
}

#[test]
fn test_placement_region_must_match_cluster() {
    let spec = spec_with(|s| s["placement"]["region"] = json!("eu-west-1"));
    let err = convert(spec).unwrap_err();
    assert_eq!(
        error_strings(&err),
        vec![
            "spec.providerSpec.value.placement.region: Invalid value: \"eu-west-1\": \
             region must match the infrastructure region \"us-east-1\""
        ]
    );

    let spec = spec_with(|s| s["placement"]["region"] = json!(AWS_REGION));
    assert!(convert(spec).is_ok());
}

#[test]
fn test_placement_region_without_cluster_region() {
    let mut infra = infrastructure(PlatformType::Aws);
    if let Some(platform) = infra.status.as_mut().and_then(|s| s.platform_status.as_mut()) {
        platform.aws = None;
    }
    let spec = spec_with(|s| s["placement"]["region"] = json!("eu-west-1"));

    let converted = convert_with_infra(spec, &infra).unwrap();
    assert!(converted.warnings.is_empty());
}

#[test]
fn test_kms_key_id_wins_over_arn() {
    let spec = spec_with(|s| {
        s["blockDevices"] = json!([
            {"ebs": {"volumeSize": 120, "encrypted": true, "kmsKey": {
                "id": "key-1",
                "arn": "arn:aws:kms:us-east-1:123:key/abc"
            }}}
        ]);
    });
    let converted = convert(spec).unwrap();

    assert_eq!(
        converted.warnings,
        vec![
            "spec.providerSpec.value.blockDevices[0].ebs.kmsKey.arn: Invalid value: \
             \"arn:aws:kms:us-east-1:123:key/abc\": KMS key ARN is ignored when id is set"
        ]
    );
    let root = converted.value.1.spec.root_volume.unwrap();
    assert_eq!(root.encryption_key, "key-1");
}

#[test]
fn test_every_dropped_field_is_reported() {
    assert_one_diagnostic_each(
        &aws_provider_spec(),
        &[
            (|s| s["ami"]["arn"] = json!("arn:aws:ec2:::image/ami-1"), "ami.arn"),
            (
                |s| s["ami"]["filters"] = json!([{"name": "name", "values": ["rhcos-*"]}]),
                "ami.filters",
            ),
            (
                |s| s["iamInstanceProfile"]["arn"] = json!("arn:aws:iam::123:instance-profile/w"),
                "iamInstanceProfile.arn",
            ),
            (
                |s| s["iamInstanceProfile"]["filters"] = json!([{"name": "tag:Name"}]),
                "iamInstanceProfile.filters",
            ),
            (
                |s| s["metadataServiceOptions"]["authentication"] = json!("Sometimes"),
                "metadataServiceOptions.authentication",
            ),
            (|s| s["networkInterfaceType"] = json!("SRIOV"), "networkInterfaceType"),
            (
                |s| s["securityGroups"][1]["arn"] = json!("arn:aws:ec2:::security-group/sg-1"),
                "securityGroups[1].arn",
            ),
            (
                |s| s["securityGroups"][1]["filters"] = json!([{"name": "tag:Name"}]),
                "securityGroups[1].filters",
            ),
            (
                |s| s["subnet"]["arn"] = json!("arn:aws:ec2:::subnet/subnet-1"),
                "subnet.arn",
            ),
            (|s| s["subnet"]["id"] = json!("subnet-1"), "subnet.filters"),
            (|s| s["placement"]["region"] = json!("eu-west-1"), "placement.region"),
            (
                |s| s["placement"]["host"] = json!({"affinity": "Sticky"}),
                "placement.host.affinity",
            ),
            (
                |s| s["blockDevices"][0]["noDevice"] = json!("none"),
                "blockDevices[0].noDevice",
            ),
            (
                |s| s["blockDevices"][0]["virtualName"] = json!("ephemeral0"),
                "blockDevices[0].virtualName",
            ),
            (
                |s| {
                    let devices = s["blockDevices"].as_array_mut().unwrap();
                    devices.push(json!({"ebs": {"volumeSize": 50}}));
                },
                "blockDevices[1].deviceName",
            ),
            (|s| s["blockDevices"][0] = json!({}), "blockDevices[0]"),
            (|s| s["blockDevices"] = json!([]), "blockDevices"),
            (
                |s| s["blockDevices"][0]["ebs"]["deleteOnTermination"] = json!(false),
                "blockDevices[0].ebs.deleteOnTermination",
            ),
            (
                |s| s["blockDevices"][0]["ebs"]["kmsKey"]["filters"] = json!([{"name": "alias"}]),
                "blockDevices[0].ebs.kmsKey.filters",
            ),
            (
                |s| s["blockDevices"][0]["ebs"]["kmsKey"] = json!({"id": "key-1", "arn": "arn:x"}),
                "blockDevices[0].ebs.kmsKey.arn",
            ),
            (
                |s| s["credentialsSecret"]["name"] = json!("custom-credentials"),
                "credentialsSecret",
            ),
            (|s| s["deviceIndex"] = json!(1), "deviceIndex"),
            (
                |s| s["loadBalancers"] = json!([{"name": "int", "type": "network"}]),
                "loadBalancers",
            ),
        ],
        convert,
    );
}

#[test]
fn test_instance_id_from_provider_id() {
    assert_eq!(
        instance_id_from_provider_id("aws:///us-east-1a/i-0123456789abcdef0").as_deref(),
        Some("i-0123456789abcdef0")
    );
    assert_eq!(instance_id_from_provider_id("aws:///i-0123"), None);
    assert_eq!(instance_id_from_provider_id("gce://project/zone/name"), None);
}

#[test]
fn test_provider_id_sets_instance_id() {
    let mut machine = with_provider_spec(mapi_machine("worker-0"), aws_provider_spec());
    machine.spec.provider_id = Some("aws:///us-east-1a/i-0abc".to_string());
    let infra = infrastructure(PlatformType::Aws);

    let (capi_machine, aws_machine) =
        MachineAndInfra::<Aws>::from_machine_and_infra(&machine, Some(&infra))
            .to_machine_and_infrastructure_machine()
            .unwrap()
            .value;
    assert_eq!(capi_machine.spec.provider_id.as_deref(), Some("aws:///us-east-1a/i-0abc"));
    assert_eq!(aws_machine.spec.instance_id.as_deref(), Some("i-0abc"));
}

#[test]
fn test_unknown_field_is_a_decode_error() {
    let spec = spec_with(|s| s["instanceTyp"] = json!("m6i.xlarge"));
    let err = convert(spec).unwrap_err();

    assert!(matches!(err, ConversionError::Decode(_)), "got {err:?}");
    assert_eq!(error_fields(&err), vec!["spec.providerSpec.value"]);
    assert!(err.to_string().contains("error unmarshalling providerSpec"));
}
