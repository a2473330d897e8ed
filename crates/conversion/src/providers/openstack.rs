//! OpenStack: `OpenstackProviderSpec` to `OpenStackMachine` (`v1beta1`)
//!
//! Networks become ports: a network without subnets yields one port, a
//! network with subnets one port per subnet. Resource queries are rewritten
//! into Cluster API filters; query fields that only affect pagination or
//! that Neutron ignores on lookup are rejected.

use std::collections::BTreeMap;

use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use machine_crds::capi::openstack::{
    self as capo, OpenStackMachine, OpenStackMachineSpec, OpenStackMachineStatus,
    OpenStackMachineTemplate, OpenStackMachineTemplateResource, OpenStackMachineTemplateSpec,
};
use machine_crds::capi::TemplateObjectMeta;
use machine_crds::mapi::openstack::{
    self as mapo, NetworkFilter, OpenstackProviderSpec, SecurityGroupFilter, SubnetFilter,
};
use serde::Serialize;

use super::{check_secret_namespace, InfraStatus, Provider, ProviderContext};
use crate::diagnostics::{Diagnostics, FieldError, FieldPath};

/// Availability zone source naming an explicit zone
const VOLUME_AZ_FROM_NAME: &str = "Name";

/// OpenStack infrastructure provider.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenStack;

impl Provider for OpenStack {
    type Spec = OpenstackProviderSpec;
    type InfraSpec = OpenStackMachineSpec;
    type InfraMachine = OpenStackMachine;
    type InfraTemplate = OpenStackMachineTemplate;

    fn convert_spec(
        ctx: &ProviderContext<'_>,
        spec: &OpenstackProviderSpec,
        path: &FieldPath,
        diag: &mut Diagnostics,
    ) -> OpenStackMachineSpec {
        let mut out = OpenStackMachineSpec {
            provider_id: ctx.provider_id.map(str::to_string),
            flavor: non_empty(&spec.flavor),
            ssh_key_name: spec.key_name.clone(),
            trunk: spec.trunk,
            tags: spec.tags.clone(),
            server_metadata: spec
                .server_metadata
                .iter()
                .map(|(key, value)| capo::ServerMetadata {
                    key: key.clone(),
                    value: value.clone(),
                })
                .collect(),
            config_drive: spec.config_drive,
            identity_ref: spec
                .clouds_secret
                .as_ref()
                .filter(|secret| !secret.name.is_empty())
                .map(|secret| capo::OpenStackIdentityReference {
                    name: secret.name.clone(),
                    cloud_name: spec.cloud_name.clone(),
                }),
            ..Default::default()
        };

        out.image = convert_image(spec, path, diag);
        out.server_group = convert_server_group(spec, path, diag);

        if let Some(root_volume) = spec.root_volume.as_ref() {
            out.root_volume = Some(convert_root_volume(
                root_volume,
                &path.child("rootVolume"),
                diag,
            ));
        }

        out.additional_block_devices = spec
            .additional_block_devices
            .iter()
            .map(|device| capo::AdditionalBlockDevice {
                name: device.name.clone(),
                size_gib: device.size_gib,
                storage: capo::BlockDeviceStorage {
                    storage_type: device.storage.storage_type.clone(),
                    volume: device.storage.volume.as_ref().map(|volume| {
                        block_device_volume(&volume.volume_type, &volume.availability_zone)
                    }),
                },
            })
            .collect();

        let networks_path = path.child("networks");
        for (i, network) in spec.networks.iter().enumerate() {
            out.ports
                .extend(convert_network(network, &networks_path.index(i), diag));
        }
        let ports_path = path.child("ports");
        for (i, port) in spec.ports.iter().enumerate() {
            out.ports
                .push(convert_port(port, &ports_path.index(i), diag));
        }

        let groups_path = path.child("securityGroups");
        out.security_groups = spec
            .security_groups
            .iter()
            .enumerate()
            .map(|(i, group)| convert_security_group(group, &groups_path.index(i), diag))
            .collect();

        check_secret_namespace(spec.clouds_secret.as_ref(), &path.child("cloudsSecret"), diag);
        check_secret_namespace(
            spec.user_data_secret.as_ref(),
            &path.child("userDataSecret"),
            diag,
        );
        if out.identity_ref.is_none() && !spec.cloud_name.is_empty() {
            diag.warn_field(
                &path.child("cloudName"),
                &spec.cloud_name,
                "cloudName is ignored without cloudsSecret",
            );
        }

        if !spec.ssh_user_name.is_empty() {
            diag.warn_field(
                &path.child("sshUserName"),
                &spec.ssh_user_name,
                "sshUserName is ignored in CAPI",
            );
        }
        if !spec.floating_ip.is_empty() {
            diag.error(FieldError::invalid(
                &path.child("floatingIP"),
                &spec.floating_ip,
                "floatingIP is not supported",
            ));
        }
        if !spec.primary_subnet.is_empty() {
            diag.error(FieldError::invalid(
                &path.child("primarySubnet"),
                &spec.primary_subnet,
                "primarySubnet is not supported",
            ));
        }

        out
    }

    fn failure_domain(spec: &OpenstackProviderSpec) -> Option<String> {
        non_empty(&spec.availability_zone)
    }

    fn user_data_secret(spec: &OpenstackProviderSpec) -> Option<String> {
        spec.user_data_secret
            .as_ref()
            .and_then(|secret| non_empty(&secret.name))
    }

    fn new_machine(
        metadata: ObjectMeta,
        spec: OpenStackMachineSpec,
        status: Option<InfraStatus>,
    ) -> OpenStackMachine {
        OpenStackMachine {
            metadata,
            spec,
            status: status.map(|status| OpenStackMachineStatus {
                ready: status.ready,
                instance_id: None,
                addresses: status.addresses,
                failure_reason: status.failure_reason,
                failure_message: status.failure_message,
            }),
        }
    }

    fn new_template(metadata: ObjectMeta, spec: OpenStackMachineSpec) -> OpenStackMachineTemplate {
        OpenStackMachineTemplate {
            metadata,
            spec: OpenStackMachineTemplateSpec {
                template: OpenStackMachineTemplateResource {
                    metadata: TemplateObjectMeta::default(),
                    spec,
                },
            },
        }
    }

    fn machine_spec(machine: &OpenStackMachine) -> &OpenStackMachineSpec {
        &machine.spec
    }
}

fn non_empty(value: &str) -> Option<String> {
    Some(value.to_string()).filter(|v| !v.is_empty())
}

fn unsupported(diag: &mut Diagnostics, path: &FieldPath, field: &str, value: impl Serialize) {
    diag.error(FieldError::invalid(
        &path.child(field),
        value,
        format!("{field} is not supported"),
    ));
}

/// Neutron tag lists are comma separated in Machine API filters.
fn split_tags(tags: &str) -> Vec<String> {
    tags.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

fn neutron_tags(tags: &str, tags_any: &str, not_tags: &str, not_tags_any: &str) -> capo::FilterByNeutronTags {
    capo::FilterByNeutronTags {
        tags: split_tags(tags),
        tags_any: split_tags(tags_any),
        not_tags: split_tags(not_tags),
        not_tags_any: split_tags(not_tags_any),
    }
}

/// `tenantId` is the older name of `projectId`.
fn project_id(
    project_id: &str,
    tenant_id: &str,
    path: &FieldPath,
    diag: &mut Diagnostics,
) -> String {
    if project_id.is_empty() {
        return tenant_id.to_string();
    }
    if !tenant_id.is_empty() && tenant_id != project_id {
        diag.warn_field(
            &path.child("tenantId"),
            tenant_id,
            "tenantId is ignored when projectId is set",
        );
    }
    project_id.to_string()
}

/// A root volume source takes precedence over the image name.
fn convert_image(
    spec: &OpenstackProviderSpec,
    path: &FieldPath,
    diag: &mut Diagnostics,
) -> capo::ImageParam {
    let source_uuid = spec
        .root_volume
        .as_ref()
        .map(|root_volume| root_volume.source_uuid.as_str())
        .unwrap_or_default();

    if !source_uuid.is_empty() {
        if !spec.image.is_empty() {
            diag.warn_field(
                &path.child("image"),
                &spec.image,
                "image is ignored when rootVolume.sourceUUID is set",
            );
        }
        return capo::ImageParam {
            id: Some(source_uuid.to_string()),
            filter: None,
        };
    }

    capo::ImageParam {
        id: None,
        filter: non_empty(&spec.image).map(|name| capo::ImageFilter {
            name: Some(name),
            tags: Vec::new(),
        }),
    }
}

fn block_device_volume(volume_type: &str, availability_zone: &str) -> capo::BlockDeviceVolume {
    capo::BlockDeviceVolume {
        volume_type: volume_type.to_string(),
        availability_zone: non_empty(availability_zone).map(|name| capo::VolumeAvailabilityZone {
            from: VOLUME_AZ_FROM_NAME.to_string(),
            name: Some(name),
        }),
    }
}

fn convert_root_volume(
    root_volume: &mapo::RootVolume,
    path: &FieldPath,
    diag: &mut Diagnostics,
) -> capo::RootVolume {
    if !root_volume.device_type.is_empty() {
        diag.warn_field(
            &path.child("deviceType"),
            &root_volume.device_type,
            "deviceType is ignored in CAPI",
        );
    }
    if !root_volume.source_type.is_empty() {
        diag.warn_field(
            &path.child("sourceType"),
            &root_volume.source_type,
            "sourceType is ignored in CAPI",
        );
    }

    capo::RootVolume {
        size_gib: root_volume.disk_size,
        volume: block_device_volume(&root_volume.volume_type, &root_volume.availability_zone),
    }
}

/// Server group ID takes precedence over its name.
fn convert_server_group(
    spec: &OpenstackProviderSpec,
    path: &FieldPath,
    diag: &mut Diagnostics,
) -> Option<capo::ServerGroupParam> {
    if let Some(id) = non_empty(&spec.server_group_id) {
        if !spec.server_group_name.is_empty() {
            diag.warn_field(
                &path.child("serverGroupName"),
                &spec.server_group_name,
                "serverGroupName is ignored when serverGroupID is set",
            );
        }
        return Some(capo::ServerGroupParam {
            id: Some(id),
            filter: None,
        });
    }
    non_empty(&spec.server_group_name).map(|name| capo::ServerGroupParam {
        id: None,
        filter: Some(capo::ServerGroupFilter { name: Some(name) }),
    })
}

fn convert_network_filter(
    filter: &NetworkFilter,
    path: &FieldPath,
    diag: &mut Diagnostics,
) -> Option<capo::NetworkFilter> {
    if !filter.id.is_empty() {
        unsupported(diag, path, "id", &filter.id);
    }
    if !filter.status.is_empty() {
        unsupported(diag, path, "status", &filter.status);
    }
    if let Some(admin_state_up) = filter.admin_state_up {
        unsupported(diag, path, "adminStateUp", admin_state_up);
    }
    if let Some(shared) = filter.shared {
        unsupported(diag, path, "shared", shared);
    }
    check_pagination(
        &filter.marker,
        filter.limit,
        &filter.sort_key,
        &filter.sort_dir,
        path,
        diag,
    );

    let out = capo::NetworkFilter {
        name: filter.name.clone(),
        description: filter.description.clone(),
        project_id: project_id(&filter.project_id, &filter.tenant_id, path, diag),
        tags: neutron_tags(
            &filter.tags,
            &filter.tags_any,
            &filter.not_tags,
            &filter.not_tags_any,
        ),
    };
    (out != capo::NetworkFilter::default()).then_some(out)
}

fn convert_subnet_filter(
    filter: &SubnetFilter,
    path: &FieldPath,
    diag: &mut Diagnostics,
) -> Option<capo::SubnetFilter> {
    if !filter.id.is_empty() {
        unsupported(diag, path, "id", &filter.id);
    }
    if !filter.network_id.is_empty() {
        unsupported(diag, path, "networkId", &filter.network_id);
    }
    if !filter.subnetpool_id.is_empty() {
        unsupported(diag, path, "subnetpoolId", &filter.subnetpool_id);
    }
    if let Some(enable_dhcp) = filter.enable_dhcp {
        unsupported(diag, path, "enableDhcp", enable_dhcp);
    }
    check_pagination(
        &filter.marker,
        filter.limit,
        &filter.sort_key,
        &filter.sort_dir,
        path,
        diag,
    );

    let out = capo::SubnetFilter {
        name: filter.name.clone(),
        description: filter.description.clone(),
        project_id: project_id(&filter.project_id, &filter.tenant_id, path, diag),
        ip_version: Some(filter.ip_version).filter(|version| *version != 0),
        gateway_ip: filter.gateway_ip.clone(),
        cidr: filter.cidr.clone(),
        ipv6_address_mode: filter.ipv6_address_mode.clone(),
        ipv6_ra_mode: filter.ipv6_ra_mode.clone(),
        tags: neutron_tags(
            &filter.tags,
            &filter.tags_any,
            &filter.not_tags,
            &filter.not_tags_any,
        ),
    };
    (out != capo::SubnetFilter::default()).then_some(out)
}

fn convert_security_group_filter(
    filter: &SecurityGroupFilter,
    path: &FieldPath,
    diag: &mut Diagnostics,
) -> Option<capo::SecurityGroupFilter> {
    if !filter.id.is_empty() {
        unsupported(diag, path, "id", &filter.id);
    }
    check_pagination(
        &filter.marker,
        filter.limit,
        &filter.sort_key,
        &filter.sort_dir,
        path,
        diag,
    );

    let out = capo::SecurityGroupFilter {
        name: filter.name.clone(),
        description: filter.description.clone(),
        project_id: project_id(&filter.project_id, &filter.tenant_id, path, diag),
        tags: neutron_tags(
            &filter.tags,
            &filter.tags_any,
            &filter.not_tags,
            &filter.not_tags_any,
        ),
    };
    (out != capo::SecurityGroupFilter::default()).then_some(out)
}

/// Pagination and ordering fields only shape list responses.
fn check_pagination(
    marker: &str,
    limit: i32,
    sort_key: &str,
    sort_dir: &str,
    path: &FieldPath,
    diag: &mut Diagnostics,
) {
    if !marker.is_empty() {
        unsupported(diag, path, "marker", marker);
    }
    if limit != 0 {
        unsupported(diag, path, "limit", limit);
    }
    if !sort_key.is_empty() {
        unsupported(diag, path, "sortKey", sort_key);
    }
    if !sort_dir.is_empty() {
        unsupported(diag, path, "sortDir", sort_dir);
    }
}

/// UUID takes precedence over name, name over filter.
fn convert_security_group(
    group: &mapo::SecurityGroupParam,
    path: &FieldPath,
    diag: &mut Diagnostics,
) -> capo::SecurityGroupParam {
    let has_filter = group.filter != SecurityGroupFilter::default();

    if let Some(id) = non_empty(&group.uuid) {
        if !group.name.is_empty() {
            diag.warn_field(
                &path.child("name"),
                &group.name,
                "name is ignored when uuid is set",
            );
        }
        if has_filter {
            diag.warn_field(
                &path.child("filter"),
                &group.filter,
                "filter is ignored when uuid is set",
            );
        }
        return capo::SecurityGroupParam {
            id: Some(id),
            filter: None,
        };
    }
    if let Some(name) = non_empty(&group.name) {
        if has_filter {
            diag.warn_field(
                &path.child("filter"),
                &group.filter,
                "filter is ignored when name is set",
            );
        }
        return capo::SecurityGroupParam {
            id: None,
            filter: Some(capo::SecurityGroupFilter {
                name,
                ..Default::default()
            }),
        };
    }
    capo::SecurityGroupParam {
        id: None,
        filter: convert_security_group_filter(&group.filter, &path.child("filter"), diag),
    }
}

fn convert_binding_profile(
    profile: &BTreeMap<String, String>,
    path: &FieldPath,
    diag: &mut Diagnostics,
) -> Option<capo::BindingProfile> {
    if profile.is_empty() {
        return None;
    }

    let mut out = capo::BindingProfile::default();
    for (key, value) in profile {
        match key.as_str() {
            "capabilities" => {
                if value.contains("switchdev") {
                    out.ovs_hw_offload = Some(true);
                }
            }
            "trusted" => out.trusted_vf = Some(value == "true"),
            _ => diag.error(FieldError::invalid(
                &path.key(key),
                value,
                "binding profile key is not supported",
            )),
        }
    }
    Some(out)
}

fn convert_network(
    network: &mapo::NetworkParam,
    path: &FieldPath,
    diag: &mut Diagnostics,
) -> Vec<capo::PortOpts> {
    if !network.fixed_ip.is_empty() {
        unsupported(diag, path, "fixedIp", &network.fixed_ip);
    }

    let filter_path = path.child("filter");
    let filter = convert_network_filter(&network.filter, &filter_path, diag);
    let network_param = match non_empty(&network.uuid) {
        Some(id) => {
            if filter.is_some() {
                diag.warn_field(
                    &filter_path,
                    &network.filter,
                    "filter is ignored when uuid is set",
                );
            }
            Some(capo::NetworkParam {
                id: Some(id),
                filter: None,
            })
        }
        None => filter.map(|filter| capo::NetworkParam {
            id: None,
            filter: Some(filter),
        }),
    };
    let profile = convert_binding_profile(&network.profile, &path.child("profile"), diag);

    // Cluster API ports carry no allowed address pairs unless listed, which
    // is what noAllowedAddressPairs asks for.
    let port = capo::PortOpts {
        network: network_param,
        tags: network.port_tags.clone(),
        vnic_type: non_empty(&network.vnic_type),
        profile,
        disable_port_security: network.port_security.map(|enabled| !enabled),
        ..Default::default()
    };

    if network.subnets.is_empty() {
        return vec![port];
    }

    let subnets_path = path.child("subnets");
    network
        .subnets
        .iter()
        .enumerate()
        .map(|(i, subnet)| {
            let filter_path = subnets_path.index(i).child("filter");
            let filter = convert_subnet_filter(&subnet.filter, &filter_path, diag);
            let id = non_empty(&subnet.uuid);
            if id.is_some() && filter.is_some() {
                diag.warn_field(&filter_path, &subnet.filter, "filter is ignored when uuid is set");
            }
            let subnet_param = capo::SubnetParam {
                filter: if id.is_none() { filter } else { None },
                id,
            };

            let mut tags = port.tags.clone();
            tags.extend(subnet.port_tags.iter().cloned());

            capo::PortOpts {
                fixed_ips: vec![capo::FixedIP {
                    subnet: Some(subnet_param),
                    ip_address: None,
                }],
                tags,
                disable_port_security: subnet
                    .port_security
                    .or(network.port_security)
                    .map(|enabled| !enabled),
                ..port.clone()
            }
        })
        .collect()
}

fn convert_port(port: &mapo::PortOpts, path: &FieldPath, diag: &mut Diagnostics) -> capo::PortOpts {
    if !port.tenant_id.is_empty() {
        unsupported(diag, path, "tenantID", &port.tenant_id);
    }
    if !port.project_id.is_empty() {
        unsupported(diag, path, "projectID", &port.project_id);
    }

    capo::PortOpts {
        network: non_empty(&port.network_id).map(|id| capo::NetworkParam {
            id: Some(id),
            filter: None,
        }),
        description: non_empty(&port.description),
        name_suffix: non_empty(&port.name_suffix),
        fixed_ips: port
            .fixed_ips
            .iter()
            .map(|fixed_ip| capo::FixedIP {
                subnet: non_empty(&fixed_ip.subnet_id).map(|id| capo::SubnetParam {
                    id: Some(id),
                    filter: None,
                }),
                ip_address: non_empty(&fixed_ip.ip_address),
            })
            .collect(),
        security_groups: port
            .security_groups
            .iter()
            .map(|id| capo::SecurityGroupParam {
                id: Some(id.clone()),
                filter: None,
            })
            .collect(),
        tags: port.tags.clone(),
        trunk: port.trunk,
        admin_state_up: port.admin_state_up,
        mac_address: non_empty(&port.mac_address),
        allowed_address_pairs: port
            .allowed_address_pairs
            .iter()
            .map(|pair| capo::AddressPair {
                ip_address: pair.ip_address.clone(),
                mac_address: non_empty(&pair.mac_address),
            })
            .collect(),
        host_id: non_empty(&port.host_id),
        vnic_type: non_empty(&port.vnic_type),
        profile: convert_binding_profile(&port.profile, &path.child("profile"), diag),
        disable_port_security: port.port_security.map(|enabled| !enabled),
    }
}

#[cfg(test)]
#[path = "openstack_test.rs"]
mod tests;
