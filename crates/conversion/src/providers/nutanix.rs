//! Nutanix: `NutanixMachineProviderConfig` to `NutanixMachine` (`v1beta1`)

use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use machine_crds::capi::nutanix::{
    self as capx, NutanixMachine, NutanixMachineSpec, NutanixMachineStatus,
    NutanixMachineTemplate, NutanixMachineTemplateResource, NutanixMachineTemplateSpec,
};
use machine_crds::capi::TemplateObjectMeta;
use machine_crds::mapi::nutanix::{
    NutanixGPU, NutanixMachineProviderConfig, NutanixResourceIdentifier, NutanixVMDisk,
};

use super::{check_credentials_secret, secret_name, InfraStatus, Provider, ProviderContext};
use crate::diagnostics::{Diagnostics, FieldError, FieldPath};

/// Credentials secret the Nutanix Cluster API provider reads
pub const DEFAULT_CREDENTIALS_SECRET: &str = "nutanix-credentials";

const IDENTIFIER_UUID: &str = "uuid";
const IDENTIFIER_NAME: &str = "name";

/// Nutanix infrastructure provider.
#[derive(Debug, Clone, Copy, Default)]
pub struct Nutanix;

impl Provider for Nutanix {
    type Spec = NutanixMachineProviderConfig;
    type InfraSpec = NutanixMachineSpec;
    type InfraMachine = NutanixMachine;
    type InfraTemplate = NutanixMachineTemplate;

    fn convert_spec(
        ctx: &ProviderContext<'_>,
        spec: &NutanixMachineProviderConfig,
        path: &FieldPath,
        diag: &mut Diagnostics,
    ) -> NutanixMachineSpec {
        let mut out = NutanixMachineSpec {
            provider_id: ctx.provider_id.unwrap_or_default().to_string(),
            vcpus_per_socket: spec.vcpus_per_socket,
            vcpu_sockets: spec.vcpu_sockets,
            memory_size: spec.memory_size.clone(),
            system_disk_size: spec.system_disk_size.clone(),
            cluster: convert_identifier(&spec.cluster, &path.child("cluster"), diag)
                .unwrap_or_default(),
            image: convert_identifier(&spec.image, &path.child("image"), diag),
            project: convert_identifier(&spec.project, &path.child("project"), diag),
            boot_type: convert_boot_type(&spec.boot_type, &path.child("bootType"), diag),
            ..Default::default()
        };

        let subnets_path = path.child("subnets");
        out.subnet = spec
            .subnets
            .iter()
            .enumerate()
            .filter_map(|(i, subnet)| convert_identifier(subnet, &subnets_path.index(i), diag))
            .collect();

        if !spec.categories.is_empty() {
            out.additional_categories = Some(
                spec.categories
                    .iter()
                    .map(|category| capx::NutanixCategoryIdentifier {
                        key: category.key.clone(),
                        value: category.value.clone(),
                    })
                    .collect(),
            );
        }

        let gpus_path = path.child("gpus");
        out.gpus = spec
            .gpus
            .iter()
            .enumerate()
            .filter_map(|(i, gpu)| convert_gpu(gpu, &gpus_path.index(i), diag))
            .collect();

        let disks_path = path.child("dataDisks");
        out.data_disks = spec
            .data_disks
            .iter()
            .enumerate()
            .map(|(i, disk)| convert_data_disk(disk, &disks_path.index(i), diag))
            .collect();

        check_credentials_secret(
            spec.credentials_secret.as_ref(),
            DEFAULT_CREDENTIALS_SECRET,
            &path.child("credentialsSecret"),
            diag,
        );

        out
    }

    fn failure_domain(spec: &NutanixMachineProviderConfig) -> Option<String> {
        spec.failure_domain
            .as_ref()
            .map(|domain| domain.name.clone())
            .filter(|name| !name.is_empty())
    }

    fn user_data_secret(spec: &NutanixMachineProviderConfig) -> Option<String> {
        secret_name(spec.user_data_secret.as_ref())
    }

    fn new_machine(
        metadata: ObjectMeta,
        spec: NutanixMachineSpec,
        status: Option<InfraStatus>,
    ) -> NutanixMachine {
        NutanixMachine {
            metadata,
            spec,
            status: status.map(|status| NutanixMachineStatus {
                ready: status.ready,
                addresses: status.addresses,
                failure_reason: status.failure_reason,
                failure_message: status.failure_message,
            }),
        }
    }

    fn new_template(metadata: ObjectMeta, spec: NutanixMachineSpec) -> NutanixMachineTemplate {
        NutanixMachineTemplate {
            metadata,
            spec: NutanixMachineTemplateSpec {
                template: NutanixMachineTemplateResource {
                    metadata: TemplateObjectMeta::default(),
                    spec,
                },
            },
        }
    }

    fn machine_spec(machine: &NutanixMachine) -> &NutanixMachineSpec {
        &machine.spec
    }
}

/// An identifier selects by `uuid` or `name`, and the selected field must be
/// set. An identifier with no type and no values is unset.
fn convert_identifier(
    identifier: &NutanixResourceIdentifier,
    path: &FieldPath,
    diag: &mut Diagnostics,
) -> Option<capx::NutanixResourceIdentifier> {
    let uuid = identifier.uuid.clone().filter(|v| !v.is_empty());
    let name = identifier.name.clone().filter(|v| !v.is_empty());

    match identifier.identifier_type.as_str() {
        "" if uuid.is_none() && name.is_none() => None,
        IDENTIFIER_UUID => {
            if let Some(name) = &name {
                diag.warn_field(&path.child("name"), name, "name is ignored when type is uuid");
            }
            if uuid.is_none() {
                diag.error(FieldError::required(
                    &path.child("uuid"),
                    "uuid must be set when type is uuid",
                ));
            }
            Some(capx::NutanixResourceIdentifier {
                identifier_type: IDENTIFIER_UUID.to_string(),
                uuid,
                name: None,
            })
        }
        IDENTIFIER_NAME => {
            if let Some(uuid) = &uuid {
                diag.warn_field(&path.child("uuid"), uuid, "uuid is ignored when type is name");
            }
            if name.is_none() {
                diag.error(FieldError::required(
                    &path.child("name"),
                    "name must be set when type is name",
                ));
            }
            Some(capx::NutanixResourceIdentifier {
                identifier_type: IDENTIFIER_NAME.to_string(),
                uuid: None,
                name,
            })
        }
        other => {
            diag.error(FieldError::not_supported(
                &path.child("type"),
                other,
                &[IDENTIFIER_UUID, IDENTIFIER_NAME],
            ));
            None
        }
    }
}

fn convert_boot_type(boot_type: &str, path: &FieldPath, diag: &mut Diagnostics) -> String {
    match boot_type {
        "" => String::new(),
        "Legacy" => "legacy".to_string(),
        "UEFI" => "uefi".to_string(),
        "SecureBoot" => {
            diag.error(FieldError::invalid(
                path,
                boot_type,
                "SecureBoot boot type is not supported",
            ));
            String::new()
        }
        other => {
            diag.error(FieldError::not_supported(path, other, &["Legacy", "UEFI"]));
            String::new()
        }
    }
}

fn convert_gpu(gpu: &NutanixGPU, path: &FieldPath, diag: &mut Diagnostics) -> Option<capx::NutanixGPU> {
    let name = gpu.name.clone().filter(|name| !name.is_empty());
    match gpu.gpu_type.as_str() {
        "DeviceID" => {
            if let Some(name) = &name {
                diag.warn_field(&path.child("name"), name, "name is ignored when type is DeviceID");
            }
            if gpu.device_id.is_none() {
                diag.error(FieldError::required(
                    &path.child("deviceID"),
                    "deviceID must be set when type is DeviceID",
                ));
            }
            Some(capx::NutanixGPU {
                gpu_type: "deviceID".to_string(),
                device_id: gpu.device_id.map(i64::from),
                name: None,
            })
        }
        "Name" => {
            if let Some(device_id) = gpu.device_id {
                diag.warn_field(
                    &path.child("deviceID"),
                    device_id,
                    "deviceID is ignored when type is Name",
                );
            }
            if name.is_none() {
                diag.error(FieldError::required(
                    &path.child("name"),
                    "name must be set when type is Name",
                ));
            }
            Some(capx::NutanixGPU {
                gpu_type: "name".to_string(),
                device_id: None,
                name,
            })
        }
        other => {
            diag.error(FieldError::not_supported(
                &path.child("type"),
                other,
                &["DeviceID", "Name"],
            ));
            None
        }
    }
}

fn convert_data_disk(
    disk: &NutanixVMDisk,
    path: &FieldPath,
    diag: &mut Diagnostics,
) -> capx::NutanixMachineVMDisk {
    capx::NutanixMachineVMDisk {
        disk_size: disk.disk_size.clone(),
        device_properties: disk.device_properties.as_ref().map(|props| {
            capx::NutanixMachineVMDiskDeviceProperties {
                device_type: props.device_type.clone(),
                adapter_type: props.adapter_type.clone(),
                device_index: Some(props.device_index),
            }
        }),
        storage_config: disk.storage_config.as_ref().map(|config| {
            capx::NutanixMachineVMStorageConfig {
                disk_mode: config.disk_mode.clone(),
                storage_container: config.storage_container.as_ref().map(|container| {
                    capx::NutanixResourceIdentifier {
                        identifier_type: container.identifier_type.clone(),
                        uuid: container.uuid.clone(),
                        name: None,
                    }
                }),
            }
        }),
        data_source: disk
            .data_source
            .as_ref()
            .and_then(|source| convert_identifier(source, &path.child("dataSource"), diag)),
    }
}

#[cfg(test)]
#[path = "nutanix_test.rs"]
mod tests;
