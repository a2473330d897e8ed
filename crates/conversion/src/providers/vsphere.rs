//! vSphere: `VSphereMachineProviderSpec` to `VSphereMachine` (`v1beta1`)

use std::net::IpAddr;

use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use machine_crds::capi::vsphere::{
    self as capv, VSphereMachine, VSphereMachineSpec, VSphereMachineStatus,
    VSphereMachineTemplate, VSphereMachineTemplateResource, VSphereMachineTemplateSpec,
};
use machine_crds::capi::TemplateObjectMeta;
use machine_crds::mapi::vsphere::{NetworkDeviceSpec, VSphereMachineProviderSpec, Workspace};
use machine_crds::meta::TypedLocalObjectReference;

use super::{check_credentials_secret, secret_name, InfraStatus, Provider, ProviderContext};
use crate::diagnostics::{Diagnostics, FieldError, FieldPath};

/// Credentials secret the vSphere Cluster API provider reads
pub const DEFAULT_CREDENTIALS_SECRET: &str = "vsphere-cloud-credentials";

/// vSphere infrastructure provider.
#[derive(Debug, Clone, Copy, Default)]
pub struct VSphere;

impl Provider for VSphere {
    type Spec = VSphereMachineProviderSpec;
    type InfraSpec = VSphereMachineSpec;
    type InfraMachine = VSphereMachine;
    type InfraTemplate = VSphereMachineTemplate;

    fn convert_spec(
        ctx: &ProviderContext<'_>,
        spec: &VSphereMachineProviderSpec,
        path: &FieldPath,
        diag: &mut Diagnostics,
    ) -> VSphereMachineSpec {
        let mut out = VSphereMachineSpec {
            provider_id: ctx.provider_id.map(str::to_string),
            template: spec.template.clone(),
            clone_mode: spec.clone_mode.clone(),
            snapshot: spec.snapshot.clone(),
            num_cpus: spec.num_cpus,
            num_cores_per_socket: spec.num_cores_per_socket,
            memory_mib: spec.memory_mib,
            disk_gib: spec.disk_gib,
            tag_ids: spec.tag_ids.clone(),
            data_disks: spec
                .data_disks
                .iter()
                .map(|disk| capv::VSphereDisk {
                    name: disk.name.clone(),
                    size_gib: disk.size_gib,
                    provisioning_mode: disk.provisioning_mode.clone(),
                })
                .collect(),
            ..Default::default()
        };

        if let Some(workspace) = spec.workspace.as_ref() {
            convert_workspace(workspace, &path.child("workspace"), &mut out, diag);
        }

        let devices_path = path.child("network").child("devices");
        out.network.devices = spec
            .network
            .devices
            .iter()
            .enumerate()
            .map(|(i, device)| convert_network_device(device, &devices_path.index(i), diag))
            .collect();

        check_credentials_secret(
            spec.credentials_secret.as_ref(),
            DEFAULT_CREDENTIALS_SECRET,
            &path.child("credentialsSecret"),
            diag,
        );

        out
    }

    fn user_data_secret(spec: &VSphereMachineProviderSpec) -> Option<String> {
        secret_name(spec.user_data_secret.as_ref())
    }

    fn new_machine(
        metadata: ObjectMeta,
        spec: VSphereMachineSpec,
        status: Option<InfraStatus>,
    ) -> VSphereMachine {
        VSphereMachine {
            metadata,
            spec,
            status: status.map(|status| VSphereMachineStatus {
                ready: status.ready,
                addresses: status.addresses,
                failure_reason: status.failure_reason,
                failure_message: status.failure_message,
            }),
        }
    }

    fn new_template(metadata: ObjectMeta, spec: VSphereMachineSpec) -> VSphereMachineTemplate {
        VSphereMachineTemplate {
            metadata,
            spec: VSphereMachineTemplateSpec {
                template: VSphereMachineTemplateResource {
                    metadata: TemplateObjectMeta::default(),
                    spec,
                },
            },
        }
    }

    fn machine_spec(machine: &VSphereMachine) -> &VSphereMachineSpec {
        &machine.spec
    }
}

fn convert_workspace(
    workspace: &Workspace,
    path: &FieldPath,
    out: &mut VSphereMachineSpec,
    diag: &mut Diagnostics,
) {
    out.server = workspace.server.clone();
    out.datacenter = workspace.datacenter.clone();
    out.folder = workspace.folder.clone();
    out.datastore = workspace.datastore.clone();
    out.resource_pool = workspace.resource_pool.clone();

    if !workspace.vm_group.is_empty() {
        diag.error(FieldError::invalid(
            &path.child("vmGroup"),
            &workspace.vm_group,
            "vmGroup is not supported",
        ));
    }
}

/// Static addresses or pools switch DHCP off; a gateway lands in the field
/// of its address family.
fn convert_network_device(
    device: &NetworkDeviceSpec,
    path: &FieldPath,
    diag: &mut Diagnostics,
) -> capv::NetworkDeviceSpec {
    let mut out = capv::NetworkDeviceSpec {
        network_name: device.network_name.clone(),
        dhcp4: device.ip_addrs.is_empty() && device.addresses_from_pools.is_empty(),
        ip_addrs: device.ip_addrs.clone(),
        nameservers: device.nameservers.clone(),
        addresses_from_pools: device
            .addresses_from_pools
            .iter()
            .map(|pool| TypedLocalObjectReference {
                api_group: Some(pool.group.clone()),
                kind: pool.resource.clone(),
                name: pool.name.clone(),
            })
            .collect(),
        ..Default::default()
    };

    if !device.gateway.is_empty() {
        match device.gateway.parse::<IpAddr>() {
            Ok(IpAddr::V4(_)) => out.gateway4 = device.gateway.clone(),
            Ok(IpAddr::V6(_)) => out.gateway6 = device.gateway.clone(),
            Err(_) => diag.error(FieldError::invalid(
                &path.child("gateway"),
                &device.gateway,
                "gateway is not a valid IP address",
            )),
        }
    }

    out
}

#[cfg(test)]
#[path = "vsphere_test.rs"]
mod tests;
