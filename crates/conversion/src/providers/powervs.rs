//! PowerVS: `PowerVSMachineProviderConfig` to `IBMPowerVSMachine` (`v1beta2`)

use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use machine_crds::capi::powervs::{
    IBMPowerVSMachine, IBMPowerVSMachineSpec, IBMPowerVSMachineStatus, IBMPowerVSMachineTemplate,
    IBMPowerVSMachineTemplateResource, IBMPowerVSMachineTemplateSpec,
    IBMPowerVSResourceReference,
};
use machine_crds::capi::TemplateObjectMeta;
use machine_crds::mapi::powervs::{PowerVSMachineProviderConfig, PowerVSResource};

use super::{check_credentials_secret, secret_name, InfraStatus, Provider, ProviderContext};
use crate::diagnostics::{Diagnostics, FieldError, FieldPath};

/// Credentials secret the IBM Cloud Cluster API provider reads
pub const DEFAULT_CREDENTIALS_SECRET: &str = "powervs-credentials";

/// PowerVS infrastructure provider.
#[derive(Debug, Clone, Copy, Default)]
pub struct PowerVS;

impl Provider for PowerVS {
    type Spec = PowerVSMachineProviderConfig;
    type InfraSpec = IBMPowerVSMachineSpec;
    type InfraMachine = IBMPowerVSMachine;
    type InfraTemplate = IBMPowerVSMachineTemplate;

    fn convert_spec(
        ctx: &ProviderContext<'_>,
        spec: &PowerVSMachineProviderConfig,
        path: &FieldPath,
        diag: &mut Diagnostics,
    ) -> IBMPowerVSMachineSpec {
        let out = IBMPowerVSMachineSpec {
            provider_id: ctx.provider_id.map(str::to_string),
            service_instance: convert_resource(
                &spec.service_instance,
                &path.child("serviceInstance"),
                diag,
            ),
            image: convert_resource(&spec.image, &path.child("image"), diag),
            network: convert_resource(&spec.network, &path.child("network"), diag)
                .unwrap_or_default(),
            ssh_key: spec.key_pair_name.clone(),
            system_type: spec.system_type.clone(),
            processor_type: spec.processor_type.clone(),
            processors: spec.processors.clone().filter(|p| !p.is_zero()),
            memory_gib: spec.memory_gib,
        };

        if !spec.service_instance_id.is_empty() {
            diag.error(FieldError::invalid(
                &path.child("serviceInstanceID"),
                &spec.service_instance_id,
                "serviceInstanceID is deprecated and not supported, use serviceInstance",
            ));
        }
        if !spec.load_balancers.is_empty() {
            diag.error(FieldError::invalid(
                &path.child("loadBalancers"),
                &spec.load_balancers,
                "loadBalancers are not supported",
            ));
        }

        check_credentials_secret(
            spec.credentials_secret.as_ref(),
            DEFAULT_CREDENTIALS_SECRET,
            &path.child("credentialsSecret"),
            diag,
        );

        out
    }

    fn user_data_secret(spec: &PowerVSMachineProviderConfig) -> Option<String> {
        secret_name(spec.user_data_secret.as_ref())
    }

    fn new_machine(
        metadata: ObjectMeta,
        spec: IBMPowerVSMachineSpec,
        status: Option<InfraStatus>,
    ) -> IBMPowerVSMachine {
        IBMPowerVSMachine {
            metadata,
            spec,
            status: status.map(|status| IBMPowerVSMachineStatus {
                ready: status.ready,
                instance_id: String::new(),
                addresses: status.addresses,
                failure_reason: status.failure_reason,
                failure_message: status.failure_message,
            }),
        }
    }

    fn new_template(metadata: ObjectMeta, spec: IBMPowerVSMachineSpec) -> IBMPowerVSMachineTemplate {
        IBMPowerVSMachineTemplate {
            metadata,
            spec: IBMPowerVSMachineTemplateSpec {
                template: IBMPowerVSMachineTemplateResource {
                    metadata: TemplateObjectMeta::default(),
                    spec,
                },
            },
        }
    }

    fn machine_spec(machine: &IBMPowerVSMachine) -> &IBMPowerVSMachineSpec {
        &machine.spec
    }
}

/// A typed reference uses only the field its type names. Untyped references
/// take the first of ID, Name and RegEx that is set. Any other field that is
/// set is reported as ignored.
fn convert_resource(
    resource: &PowerVSResource,
    path: &FieldPath,
    diag: &mut Diagnostics,
) -> Option<IBMPowerVSResourceReference> {
    let fields = [
        ("id", resource.id.as_deref().filter(|v| !v.is_empty())),
        ("name", resource.name.as_deref().filter(|v| !v.is_empty())),
        ("regex", resource.regex.as_deref().filter(|v| !v.is_empty())),
    ];

    let used = match resource.resource_type.as_str() {
        "ID" => "id",
        "Name" => "name",
        "RegEx" => "regex",
        "" => fields
            .iter()
            .find(|(_, value)| value.is_some())
            .map(|(field, _)| *field)?,
        other => {
            diag.error(FieldError::not_supported(
                &path.child("type"),
                other,
                &["ID", "Name", "RegEx"],
            ));
            return None;
        }
    };

    let mut value = None;
    for (field, field_value) in fields {
        if field == used {
            value = field_value.map(str::to_string);
            continue;
        }
        if let Some(ignored) = field_value {
            let detail = if resource.resource_type.is_empty() {
                format!("{field} is ignored when {used} is set")
            } else {
                format!("{field} is ignored when type is {}", resource.resource_type)
            };
            diag.warn_field(&path.child(field), ignored, &detail);
        }
    }
    if value.is_none() {
        diag.error(FieldError::required(
            &path.child(used),
            format!("{used} must be set when type is {}", resource.resource_type),
        ));
    }

    Some(match used {
        "id" => IBMPowerVSResourceReference {
            id: value,
            ..Default::default()
        },
        "name" => IBMPowerVSResourceReference {
            name: value,
            ..Default::default()
        },
        _ => IBMPowerVSResourceReference {
            regex: value,
            ..Default::default()
        },
    })
}

#[cfg(test)]
#[path = "powervs_test.rs"]
mod tests;
