//! AWS: `AWSMachineProviderConfig` to `AWSMachine` (`v1beta2`)

use std::collections::BTreeMap;
use std::sync::LazyLock;

use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use machine_crds::capi::aws::{
    self as capa, AWSMachine, AWSMachineSpec, AWSMachineStatus, AWSMachineTemplate,
    AWSMachineTemplateResource, AWSMachineTemplateSpec,
};
use machine_crds::capi::TemplateObjectMeta;
use machine_crds::mapi::aws::{
    AWSMachineProviderConfig, AWSResourceReference, BlockDeviceMappingSpec, EBSBlockDeviceSpec,
    Placement,
};
use regex::Regex;

use super::{check_credentials_secret, secret_name, InfraStatus, Provider, ProviderContext};
use crate::config::ConversionConfig;
use crate::diagnostics::{Diagnostics, FieldError, FieldPath};

/// Credentials secret the AWS Cluster API provider reads
pub const DEFAULT_CREDENTIALS_SECRET: &str = "aws-cloud-credentials";

/// `aws:///<availability zone>/<instance id>`
static PROVIDER_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^aws:///[^/]+/(?P<instance>[^/]+)$").expect("provider ID pattern is valid")
});

/// Ignition user data is passed to the instance as is.
const IGNITION_STORAGE_TYPE: &str = "UnencryptedUserData";

/// AWS infrastructure provider.
#[derive(Debug, Clone, Copy, Default)]
pub struct Aws;

impl Provider for Aws {
    type Spec = AWSMachineProviderConfig;
    type InfraSpec = AWSMachineSpec;
    type InfraMachine = AWSMachine;
    type InfraTemplate = AWSMachineTemplate;

    fn convert_spec(
        ctx: &ProviderContext<'_>,
        spec: &AWSMachineProviderConfig,
        path: &FieldPath,
        diag: &mut Diagnostics,
    ) -> AWSMachineSpec {
        let mut out = AWSMachineSpec {
            provider_id: ctx.provider_id.map(str::to_string),
            instance_id: ctx.provider_id.and_then(instance_id_from_provider_id),
            instance_type: spec.instance_type.clone(),
            additional_tags: convert_tags(spec),
            ssh_key_name: spec.key_name.clone(),
            public_ip: spec.public_ip,
            placement_group_name: spec.placement_group_name.clone(),
            placement_group_partition: i64::from(spec.placement_group_partition),
            capacity_reservation_id: Some(spec.capacity_reservation_id.clone())
                .filter(|id| !id.is_empty()),
            market_type: spec.market_type.clone(),
            spot_market_options: spec.spot_market_options.as_ref().map(|options| {
                capa::SpotMarketOptions {
                    max_price: options.max_price.clone(),
                }
            }),
            cpu_options: spec
                .cpu_options
                .as_ref()
                .and_then(|options| options.confidential_compute.clone())
                .map(|confidential_compute| capa::CPUOptions {
                    confidential_compute,
                }),
            uncompressed_user_data: Some(true),
            ignition: Some(capa::Ignition {
                version: ctx.config.ignition_version.clone(),
                storage_type: IGNITION_STORAGE_TYPE.to_string(),
            }),
            ..Default::default()
        };

        out.ami = convert_ami(&spec.ami, &path.child("ami"), diag);
        out.iam_instance_profile = convert_iam_instance_profile(
            spec.iam_instance_profile.as_ref(),
            &path.child("iamInstanceProfile"),
            diag,
        );
        out.instance_metadata_options = Some(convert_metadata_options(
            &spec.metadata_service_options.authentication,
            &path.child("metadataServiceOptions").child("authentication"),
            ctx.config,
            diag,
        ));
        out.network_interface_type = convert_network_interface_type(
            &spec.network_interface_type,
            &path.child("networkInterfaceType"),
            diag,
        );

        let groups_path = path.child("securityGroups");
        out.additional_security_groups = spec
            .security_groups
            .iter()
            .enumerate()
            .map(|(i, group)| {
                convert_resource_reference(group, "security group", &groups_path.index(i), diag)
            })
            .collect();
        out.subnet = Some(convert_resource_reference(
            &spec.subnet,
            "subnet",
            &path.child("subnet"),
            diag,
        ))
        .filter(|subnet| subnet.id.is_some() || !subnet.filters.is_empty());

        convert_placement(
            &spec.placement,
            ctx.infrastructure.and_then(|infra| infra.aws_region()),
            &path.child("placement"),
            &mut out,
            diag,
        );

        let (root_volume, non_root_volumes) =
            convert_block_devices(&spec.block_devices, &path.child("blockDevices"), ctx.config, diag);
        out.root_volume = Some(root_volume);
        out.non_root_volumes = non_root_volumes;

        check_credentials_secret(
            spec.credentials_secret.as_ref(),
            DEFAULT_CREDENTIALS_SECRET,
            &path.child("credentialsSecret"),
            diag,
        );

        if spec.device_index != 0 {
            diag.error(FieldError::invalid(
                &path.child("deviceIndex"),
                spec.device_index,
                "deviceIndex must be 0 or unset",
            ));
        }

        if !spec.load_balancers.is_empty() {
            diag.error(FieldError::invalid(
                &path.child("loadBalancers"),
                &spec.load_balancers,
                "loadBalancers are not supported",
            ));
        }

        out
    }

    fn failure_domain(spec: &AWSMachineProviderConfig) -> Option<String> {
        Some(spec.placement.availability_zone.clone()).filter(|zone| !zone.is_empty())
    }

    fn user_data_secret(spec: &AWSMachineProviderConfig) -> Option<String> {
        secret_name(spec.user_data_secret.as_ref())
    }

    fn new_machine(
        metadata: ObjectMeta,
        spec: AWSMachineSpec,
        status: Option<InfraStatus>,
    ) -> AWSMachine {
        AWSMachine {
            metadata,
            spec,
            status: status.map(|status| AWSMachineStatus {
                ready: status.ready,
                addresses: status.addresses,
                instance_state: None,
                failure_reason: status.failure_reason,
                failure_message: status.failure_message,
            }),
        }
    }

    fn new_template(metadata: ObjectMeta, spec: AWSMachineSpec) -> AWSMachineTemplate {
        AWSMachineTemplate {
            metadata,
            spec: AWSMachineTemplateSpec {
                template: AWSMachineTemplateResource {
                    metadata: TemplateObjectMeta::default(),
                    spec,
                },
            },
        }
    }

    fn machine_spec(machine: &AWSMachine) -> &AWSMachineSpec {
        &machine.spec
    }
}

/// Instance ID from an `aws:///<zone>/<id>` provider ID.
pub fn instance_id_from_provider_id(provider_id: &str) -> Option<String> {
    PROVIDER_ID_RE
        .captures(provider_id)
        .and_then(|captures| captures.name("instance"))
        .map(|instance| instance.as_str().to_string())
}

fn convert_tags(spec: &AWSMachineProviderConfig) -> BTreeMap<String, String> {
    spec.tags
        .iter()
        .map(|tag| (tag.name.clone(), tag.value.clone()))
        .collect()
}

fn convert_ami(
    ami: &AWSResourceReference,
    path: &FieldPath,
    diag: &mut Diagnostics,
) -> capa::AMIReference {
    if let Some(arn) = ami.arn.as_ref().filter(|arn| !arn.is_empty()) {
        diag.error(FieldError::invalid(
            &path.child("arn"),
            arn,
            "unable to convert AMI ARN reference. Not supported in CAPI",
        ));
    }
    if !ami.filters.is_empty() {
        diag.error(FieldError::invalid(
            &path.child("filters"),
            &ami.filters,
            "unable to convert AMI Filters reference. Not supported in CAPI",
        ));
    }

    capa::AMIReference { id: ami.id.clone() }
}

fn convert_iam_instance_profile(
    profile: Option<&AWSResourceReference>,
    path: &FieldPath,
    diag: &mut Diagnostics,
) -> String {
    let Some(profile) = profile else {
        return String::new();
    };

    if let Some(arn) = profile.arn.as_ref().filter(|arn| !arn.is_empty()) {
        diag.error(FieldError::invalid(
            &path.child("arn"),
            arn,
            "unable to convert IAM instance profile ARN reference. Not supported in CAPI",
        ));
    }
    if !profile.filters.is_empty() {
        diag.error(FieldError::invalid(
            &path.child("filters"),
            &profile.filters,
            "unable to convert IAM instance profile Filters reference. Not supported in CAPI",
        ));
    }

    profile.id.clone().unwrap_or_default()
}

/// Security group or subnet reference. An ID takes precedence over filters.
fn convert_resource_reference(
    reference: &AWSResourceReference,
    what: &str,
    path: &FieldPath,
    diag: &mut Diagnostics,
) -> capa::AWSResourceReference {
    if let Some(arn) = reference.arn.as_ref().filter(|arn| !arn.is_empty()) {
        diag.error(FieldError::invalid(
            &path.child("arn"),
            arn,
            format!("unable to convert {what} ARN reference. Not supported in CAPI"),
        ));
    }

    match reference.id.as_ref().filter(|id| !id.is_empty()) {
        Some(id) => {
            if !reference.filters.is_empty() {
                diag.warn_field(
                    &path.child("filters"),
                    &reference.filters,
                    &format!("{what} filters are ignored when id is set"),
                );
            }
            capa::AWSResourceReference {
                id: Some(id.clone()),
                filters: Vec::new(),
            }
        }
        None => capa::AWSResourceReference {
            id: None,
            filters: reference
                .filters
                .iter()
                .map(|filter| capa::Filter {
                    name: filter.name.clone(),
                    values: filter.values.clone(),
                })
                .collect(),
        },
    }
}

fn convert_metadata_options(
    authentication: &str,
    path: &FieldPath,
    config: &ConversionConfig,
    diag: &mut Diagnostics,
) -> capa::InstanceMetadataOptions {
    let http_tokens = match authentication {
        "Required" => "required",
        "" | "Optional" => "optional",
        other => {
            diag.error(FieldError::not_supported(path, other, &["Optional", "Required"]));
            "optional"
        }
    };

    capa::InstanceMetadataOptions {
        http_endpoint: "enabled".to_string(),
        http_put_response_hop_limit: config.aws_http_put_response_hop_limit,
        http_tokens: http_tokens.to_string(),
        instance_metadata_tags: "disabled".to_string(),
    }
}

fn convert_network_interface_type(
    interface_type: &str,
    path: &FieldPath,
    diag: &mut Diagnostics,
) -> String {
    match interface_type {
        "" => String::new(),
        "ENA" => "interface".to_string(),
        "EFA" => "efa".to_string(),
        other => {
            diag.error(FieldError::not_supported(path, other, &["ENA", "EFA"]));
            String::new()
        }
    }
}

/// Region is cluster wide in Cluster API and the availability zone becomes
/// the machine's failure domain, so only tenancy and host placement land on
/// the infrastructure machine. A region other than the cluster's cannot be
/// expressed at all.
fn convert_placement(
    placement: &Placement,
    cluster_region: Option<&str>,
    path: &FieldPath,
    out: &mut AWSMachineSpec,
    diag: &mut Diagnostics,
) {
    if let Some(cluster_region) = cluster_region {
        if !placement.region.is_empty() && placement.region != cluster_region {
            diag.error(FieldError::invalid(
                &path.child("region"),
                &placement.region,
                format!("region must match the infrastructure region {cluster_region:?}"),
            ));
        }
    }

    out.tenancy = placement.tenancy.clone();

    let Some(host) = placement.host.as_ref() else {
        return;
    };

    out.host_affinity = match host.affinity.as_str() {
        "" => None,
        "DedicatedHost" => Some("host".to_string()),
        "AnyAvailable" => Some("default".to_string()),
        other => {
            diag.error(FieldError::not_supported(
                &path.child("host").child("affinity"),
                other,
                &["AnyAvailable", "DedicatedHost"],
            ));
            None
        }
    };
    out.host_id = host
        .dedicated_host
        .as_ref()
        .map(|dedicated| dedicated.id.clone())
        .filter(|id| !id.is_empty());
}

/// Split block devices into the root volume (the entry without a device
/// name) and the remaining volumes.
fn convert_block_devices(
    devices: &[BlockDeviceMappingSpec],
    path: &FieldPath,
    config: &ConversionConfig,
    diag: &mut Diagnostics,
) -> (capa::Volume, Vec<capa::Volume>) {
    let default_root = capa::Volume {
        size: config.aws_root_volume_size_gib,
        ..Default::default()
    };
    let mut root_volume = None;
    let mut non_root_volumes = Vec::new();

    for (i, device) in devices.iter().enumerate() {
        let device_path = path.index(i);

        if let Some(no_device) = device.no_device.as_ref().filter(|v| !v.is_empty()) {
            diag.error(FieldError::invalid(
                &device_path.child("noDevice"),
                no_device,
                "noDevice is not supported",
            ));
        }
        if let Some(virtual_name) = device.virtual_name.as_ref().filter(|v| !v.is_empty()) {
            diag.error(FieldError::invalid(
                &device_path.child("virtualName"),
                virtual_name,
                "virtualName is not supported",
            ));
        }

        let is_root = device.device_name.as_deref().unwrap_or_default().is_empty();
        if is_root && root_volume.is_some() {
            diag.error(FieldError::invalid(
                &device_path.child("deviceName"),
                "",
                "only one block device without a deviceName can be the root volume",
            ));
            continue;
        }

        let Some(ebs) = device.ebs.as_ref() else {
            diag.warn_field(&device_path, device, "missing ebs configuration for block device");
            if is_root {
                root_volume = Some(default_root.clone());
            }
            continue;
        };

        let default_size = if is_root { config.aws_root_volume_size_gib } else { 0 };
        let mut volume = convert_ebs(ebs, default_size, &device_path.child("ebs"), diag);
        if is_root {
            root_volume = Some(volume);
        } else {
            volume.device_name = device.device_name.clone().unwrap_or_default();
            non_root_volumes.push(volume);
        }
    }

    let root_volume = root_volume.unwrap_or_else(|| {
        diag.warn_field(path, devices, "missing ebs configuration for block device");
        default_root
    });

    (root_volume, non_root_volumes)
}

fn convert_ebs(
    ebs: &EBSBlockDeviceSpec,
    default_size: i64,
    path: &FieldPath,
    diag: &mut Diagnostics,
) -> capa::Volume {
    if ebs.delete_on_termination == Some(false) {
        diag.error(FieldError::invalid(
            &path.child("deleteOnTermination"),
            false,
            "volumes are always deleted on termination in CAPI",
        ));
    }
    if !ebs.kms_key.filters.is_empty() {
        diag.error(FieldError::invalid(
            &path.child("kmsKey").child("filters"),
            &ebs.kms_key.filters,
            "unable to convert KMS key Filters reference. Not supported in CAPI",
        ));
    }

    let kms_id = ebs.kms_key.id.clone().filter(|id| !id.is_empty());
    let kms_arn = ebs.kms_key.arn.clone().filter(|arn| !arn.is_empty());
    if let (Some(_), Some(arn)) = (&kms_id, &kms_arn) {
        diag.warn_field(
            &path.child("kmsKey").child("arn"),
            arn,
            "KMS key ARN is ignored when id is set",
        );
    }
    let encryption_key = kms_id.or(kms_arn).unwrap_or_default();

    capa::Volume {
        device_name: String::new(),
        size: ebs.volume_size.unwrap_or(default_size),
        volume_type: ebs.volume_type.clone().unwrap_or_default(),
        iops: ebs.iops.unwrap_or_default(),
        throughput: ebs.throughput_mib.map(i64::from),
        encrypted: ebs.encrypted,
        encryption_key,
    }
}

#[cfg(test)]
#[path = "aws_test.rs"]
mod tests;
