//! Metal3: `BareMetalMachineProviderSpec` to `Metal3Machine` (`v1beta1`)

use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use machine_crds::capi::metal3::{
    Metal3CustomDeploy, Metal3HostSelector, Metal3HostSelectorRequirement, Metal3Image,
    Metal3Machine, Metal3MachineSpec, Metal3MachineStatus, Metal3MachineTemplate,
    Metal3MachineTemplateResource, Metal3MachineTemplateSpec,
};
use machine_crds::capi::TemplateObjectMeta;
use machine_crds::mapi::baremetal::{BareMetalMachineProviderSpec, Image};
use machine_crds::meta::SecretReference;

use super::{check_secret_namespace, InfraStatus, Provider, ProviderContext};
use crate::diagnostics::{Diagnostics, FieldError, FieldPath};

/// Metal3 (bare metal) infrastructure provider.
#[derive(Debug, Clone, Copy, Default)]
pub struct Metal3;

impl Provider for Metal3 {
    type Spec = BareMetalMachineProviderSpec;
    type InfraSpec = Metal3MachineSpec;
    type InfraMachine = Metal3Machine;
    type InfraTemplate = Metal3MachineTemplate;

    fn convert_spec(
        ctx: &ProviderContext<'_>,
        spec: &BareMetalMachineProviderSpec,
        path: &FieldPath,
        diag: &mut Diagnostics,
    ) -> Metal3MachineSpec {
        let custom_deploy = spec
            .custom_deploy
            .as_ref()
            .filter(|deploy| !deploy.method.is_empty())
            .map(|deploy| Metal3CustomDeploy {
                method: deploy.method.clone(),
            });

        let image = (!spec.image.url.is_empty()).then(|| Metal3Image {
            url: spec.image.url.clone(),
            checksum: spec.image.checksum.clone(),
            checksum_type: spec.image.checksum_type.clone(),
            disk_format: spec.image.disk_format.clone(),
        });

        if image.is_none() {
            if custom_deploy.is_none() {
                diag.error(FieldError::invalid(
                    &path.child("image"),
                    &spec.image,
                    "image or customDeploy must be set",
                ));
            } else if spec.image != Image::default() {
                diag.warn_field(&path.child("image"), &spec.image, "image without url is ignored");
            }
        }

        check_secret_namespace(spec.user_data.as_ref(), &path.child("userData"), diag);
        let user_data = spec.user_data.as_ref().filter(|secret| !secret.name.is_empty());

        Metal3MachineSpec {
            provider_id: ctx.provider_id.map(str::to_string),
            image,
            custom_deploy,
            user_data: user_data.map(|secret| SecretReference {
                name: secret.name.clone(),
                namespace: String::new(),
            }),
            host_selector: Metal3HostSelector {
                match_labels: spec.host_selector.match_labels.clone(),
                match_expressions: spec
                    .host_selector
                    .match_expressions
                    .iter()
                    .map(|requirement| Metal3HostSelectorRequirement {
                        key: requirement.key.clone(),
                        operator: requirement.operator.clone(),
                        values: requirement.values.clone(),
                    })
                    .collect(),
            },
            automated_cleaning_mode: None,
        }
    }

    fn user_data_secret(spec: &BareMetalMachineProviderSpec) -> Option<String> {
        spec.user_data
            .as_ref()
            .map(|secret| secret.name.clone())
            .filter(|name| !name.is_empty())
    }

    fn new_machine(
        metadata: ObjectMeta,
        spec: Metal3MachineSpec,
        status: Option<InfraStatus>,
    ) -> Metal3Machine {
        Metal3Machine {
            metadata,
            spec,
            status: status.map(|status| Metal3MachineStatus {
                ready: status.ready,
                addresses: status.addresses,
                failure_reason: status.failure_reason,
                failure_message: status.failure_message,
            }),
        }
    }

    fn new_template(metadata: ObjectMeta, spec: Metal3MachineSpec) -> Metal3MachineTemplate {
        Metal3MachineTemplate {
            metadata,
            spec: Metal3MachineTemplateSpec {
                template: Metal3MachineTemplateResource {
                    metadata: TemplateObjectMeta::default(),
                    spec,
                },
            },
        }
    }

    fn machine_spec(machine: &Metal3Machine) -> &Metal3MachineSpec {
        &machine.spec
    }
}

#[cfg(test)]
#[path = "metal3_test.rs"]
mod tests;
