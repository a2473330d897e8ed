//! Test utilities for conversion unit tests
//!
//! Builders for Machine API objects, the cluster Infrastructure and
//! representative provider configurations.

use std::collections::BTreeMap;

use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use machine_crds::mapi::{
    self, AWSPlatformStatus, Infrastructure, InfrastructureStatus, PlatformStatus, PlatformType,
};
use machine_crds::meta::ObjectReference;
use serde_json::{json, Value};

use crate::error::{ConversionError, ConversionResult};

pub const INFRASTRUCTURE_NAME: &str = "test-cluster-abc12";
/// Region of the AWS test Infrastructure
pub const AWS_REGION: &str = "us-east-1";

/// Machine in the Machine API namespace with no spec and no status.
pub fn mapi_machine(name: &str) -> mapi::Machine {
    mapi::Machine {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(mapi::MACHINE_API_NAMESPACE.to_string()),
            ..Default::default()
        },
        spec: Default::default(),
        status: None,
    }
}

/// Set the phase, creating the status. An empty phase leaves it unset.
pub fn with_phase(mut machine: mapi::Machine, phase: &str) -> mapi::Machine {
    let status = machine.status.get_or_insert_with(Default::default);
    status.phase = Some(phase.to_string()).filter(|p| !p.is_empty());
    machine
}

pub fn with_node_ref(mut machine: mapi::Machine, node: &str) -> mapi::Machine {
    let status = machine.status.get_or_insert_with(Default::default);
    status.node_ref = Some(ObjectReference {
        kind: "Node".to_string(),
        name: node.to_string(),
        ..Default::default()
    });
    machine
}

/// Mark the machine as being deleted.
pub fn deleting(mut machine: mapi::Machine) -> mapi::Machine {
    machine.metadata.deletion_timestamp =
        Some(serde_json::from_value(json!("2024-05-01T10:00:00Z")).unwrap());
    machine
}

pub fn with_provider_spec(mut machine: mapi::Machine, value: Value) -> mapi::Machine {
    machine.spec.provider_spec.value = Some(value);
    machine
}

pub fn with_labels(mut machine: mapi::Machine, labels: &[(&str, &str)]) -> mapi::Machine {
    machine.metadata.labels = Some(string_map(labels));
    machine
}

pub fn string_map(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Machine set with an empty template and no status.
pub fn mapi_machine_set(name: &str, replicas: Option<i32>) -> mapi::MachineSet {
    let mut machine_set = mapi::MachineSet {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(mapi::MACHINE_API_NAMESPACE.to_string()),
            ..Default::default()
        },
        spec: Default::default(),
        status: None,
    };
    machine_set.spec.replicas = replicas;
    machine_set
}

/// Machine set whose template carries `provider_spec` and the usual worker
/// selector and labels.
pub fn mapi_machine_set_with_spec(name: &str, provider_spec: Value) -> mapi::MachineSet {
    let mut machine_set = mapi_machine_set(name, Some(3));
    let worker_labels = string_map(&[
        (mapi::CLUSTER_ID_LABEL, INFRASTRUCTURE_NAME),
        ("machine.openshift.io/cluster-api-machineset", name),
    ]);
    machine_set.spec.selector.match_labels = worker_labels.clone();
    machine_set.spec.template.metadata.labels = Some(worker_labels);
    machine_set.spec.template.spec.provider_spec.value = Some(provider_spec);
    machine_set
}

pub fn infrastructure(platform: PlatformType) -> Infrastructure {
    infrastructure_named(platform, INFRASTRUCTURE_NAME)
}

pub fn infrastructure_named(platform: PlatformType, name: &str) -> Infrastructure {
    Infrastructure {
        metadata: ObjectMeta {
            name: Some("cluster".to_string()),
            ..Default::default()
        },
        spec: Default::default(),
        status: Some(InfrastructureStatus {
            infrastructure_name: name.to_string(),
            platform_status: Some(PlatformStatus {
                platform_type: platform,
                aws: (platform == PlatformType::Aws).then(|| AWSPlatformStatus {
                    region: AWS_REGION.to_string(),
                }),
            }),
        }),
    }
}

/// Rendered field errors of a failed conversion.
pub fn error_strings(err: &ConversionError) -> Vec<String> {
    err.field_errors().iter().map(ToString::to_string).collect()
}

/// Field paths of a failed conversion's errors.
pub fn error_fields(err: &ConversionError) -> Vec<&str> {
    err.field_errors().iter().map(|e| e.field.as_str()).collect()
}

/// Paths of every error and warning raised by a conversion, errors first.
/// Warnings are rendered like field errors, so their path is the text
/// before the first `": "`.
pub fn diagnostic_paths<T>(result: &ConversionResult<T>) -> Vec<String> {
    let (errors, warnings) = match result {
        Ok(converted) => (&[][..], converted.warnings.as_slice()),
        Err(err) => (err.field_errors(), err.warnings()),
    };
    errors
        .iter()
        .map(|e| e.field.clone())
        .chain(
            warnings
                .iter()
                .map(|w| w.split(": ").next().unwrap_or_default().to_string()),
        )
        .collect()
}

/// Apply each `(patch, path)` case to `base` and assert the conversion
/// reports exactly one diagnostic, at `path`.
pub fn assert_one_diagnostic_each<T>(
    base: &Value,
    cases: &[(fn(&mut Value), &str)],
    convert: impl Fn(Value) -> ConversionResult<T>,
) {
    for (patch, path) in cases {
        let mut spec = base.clone();
        patch(&mut spec);
        let paths = diagnostic_paths(&convert(spec));
        assert_eq!(paths, vec![format!("spec.providerSpec.value.{path}")], "patching {path}");
    }
}

/// A worker `AWSMachineProviderConfig` as the installer writes it.
pub fn aws_provider_spec() -> Value {
    json!({
        "apiVersion": "machine.openshift.io/v1beta1",
        "kind": "AWSMachineProviderConfig",
        "ami": {"id": "ami-0123456789abcdef0"},
        "instanceType": "m6i.xlarge",
        "iamInstanceProfile": {"id": "test-cluster-abc12-worker-profile"},
        "userDataSecret": {"name": "worker-user-data"},
        "credentialsSecret": {"name": "aws-cloud-credentials"},
        "placement": {"region": "us-east-1", "availabilityZone": "us-east-1a"},
        "securityGroups": [
            {"filters": [{"name": "tag:Name", "values": ["test-cluster-abc12-node"]}]},
            {"id": "sg-0123"}
        ],
        "subnet": {
            "filters": [{"name": "tag:Name", "values": ["test-cluster-abc12-private-us-east-1a"]}]
        },
        "tags": [{"name": "kubernetes.io/cluster/test-cluster-abc12", "value": "owned"}],
        "blockDevices": [{
            "ebs": {
                "encrypted": true,
                "iops": 0,
                "kmsKey": {"arn": ""},
                "volumeSize": 120,
                "volumeType": "gp3"
            }
        }],
        "metadataServiceOptions": {}
    })
}

pub fn vsphere_provider_spec() -> Value {
    json!({
        "apiVersion": "machine.openshift.io/v1beta1",
        "kind": "VSphereMachineProviderSpec",
        "template": "test-cluster-abc12-rhcos",
        "userDataSecret": {"name": "worker-user-data"},
        "credentialsSecret": {"name": "vsphere-cloud-credentials"},
        "workspace": {
            "server": "vcenter.example.com",
            "datacenter": "dc1",
            "folder": "/dc1/vm/test-cluster-abc12",
            "datastore": "/dc1/datastore/ds1",
            "resourcePool": "/dc1/host/cluster1/Resources"
        },
        "network": {"devices": [{"networkName": "vm-network"}]},
        "numCPUs": 4,
        "numCoresPerSocket": 2,
        "memoryMiB": 16384,
        "diskGiB": 120
    })
}

pub fn openstack_provider_spec() -> Value {
    json!({
        "apiVersion": "machine.openshift.io/v1alpha1",
        "kind": "OpenstackProviderSpec",
        "cloudName": "openstack",
        "cloudsSecret": {"name": "openstack-cloud-credentials", "namespace": "openshift-machine-api"},
        "flavor": "m1.large",
        "image": "test-cluster-abc12-rhcos",
        "keyName": "test-key",
        "networks": [{"filter": {}, "subnets": [{"filter": {"name": "test-cluster-abc12-nodes"}}]}],
        "securityGroups": [{"name": "test-cluster-abc12-worker"}],
        "serverMetadata": {"Name": "test-cluster-abc12-worker", "openshiftClusterID": "test-cluster-abc12"},
        "tags": ["openshiftClusterID=test-cluster-abc12"],
        "trunk": true,
        "userDataSecret": {"name": "worker-user-data"}
    })
}

pub fn nutanix_provider_spec() -> Value {
    json!({
        "apiVersion": "machine.openshift.io/v1",
        "kind": "NutanixMachineProviderConfig",
        "cluster": {"type": "uuid", "uuid": "00000000-0000-0000-0000-000000000001"},
        "image": {"type": "name", "name": "test-cluster-abc12-rhcos"},
        "subnets": [{"type": "uuid", "uuid": "00000000-0000-0000-0000-000000000002"}],
        "vcpusPerSocket": 1,
        "vcpuSockets": 4,
        "memorySize": "16Gi",
        "systemDiskSize": "120Gi",
        "userDataSecret": {"name": "worker-user-data"},
        "credentialsSecret": {"name": "nutanix-credentials"}
    })
}

pub fn powervs_provider_spec() -> Value {
    json!({
        "apiVersion": "machine.openshift.io/v1",
        "kind": "PowerVSMachineProviderConfig",
        "serviceInstance": {"type": "ID", "id": "service-instance-id"},
        "image": {"type": "Name", "name": "rhcos-image"},
        "network": {"type": "RegEx", "regex": "^DHCPSERVER.*Private$"},
        "keyPairName": "test-key",
        "systemType": "s922",
        "processorType": "Shared",
        "processors": "0.5",
        "memoryGiB": 32,
        "userDataSecret": {"name": "worker-user-data"},
        "credentialsSecret": {"name": "powervs-credentials"}
    })
}

pub fn baremetal_provider_spec() -> Value {
    json!({
        "apiVersion": "baremetal.cluster.k8s.io/v1alpha1",
        "kind": "BareMetalMachineProviderSpec",
        "image": {
            "url": "http://172.22.0.3:6181/images/rhcos.qcow2",
            "checksum": "http://172.22.0.3:6181/images/rhcos.qcow2.sha256sum",
            "checksumType": "sha256",
            "diskFormat": "qcow2"
        },
        "userData": {"name": "worker-user-data-managed"},
        "hostSelector": {"matchLabels": {"rack": "r1"}}
    })
}
