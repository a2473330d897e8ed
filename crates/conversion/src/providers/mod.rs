//! Per-provider machine converters
//!
//! Each infrastructure provider implements [`Provider`]: it names its Machine
//! API configuration type and its Cluster API infrastructure kinds, and
//! converts one into the other. [`MachineAndInfra`] and
//! [`MachineSetAndInfra`] drive the conversion for any provider and wire the
//! provider output into the core Cluster API objects.

use std::fmt::Debug;
use std::marker::PhantomData;

use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::Resource;
use machine_crds::meta::{LocalObjectReference, MachineAddress, ObjectReference, SecretReference};
use machine_crds::{capi, mapi};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::conditions::MachineState;
use crate::config::ConversionConfig;
use crate::diagnostics::{Diagnostics, FieldError, FieldPath};
use crate::error::{ConversionError, ConversionResult};
use crate::{labels, machine, machineset};

pub mod aws;
pub mod metal3;
pub mod nutanix;
pub mod openstack;
pub mod powervs;
pub mod vsphere;

/// Maximum length of a Kubernetes object name
const MAX_NAME_LENGTH: usize = 253;
/// Hex digits of the spec hash appended to template names
const TEMPLATE_HASH_LENGTH: usize = 8;

/// Inputs shared by every provider conversion.
#[derive(Debug, Clone, Copy)]
pub struct ProviderContext<'a> {
    /// Conversion settings
    pub config: &'a ConversionConfig,
    /// Cluster Infrastructure, when one was given
    pub infrastructure: Option<&'a mapi::Infrastructure>,
    /// `spec.providerID` of the source machine
    pub provider_id: Option<&'a str>,
}

/// Provider independent status of an infrastructure machine.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InfraStatus {
    /// The instance is provisioned
    pub ready: bool,
    /// Addresses reported by the Machine API machine
    pub addresses: Vec<MachineAddress>,
    /// `status.errorReason` of the source machine
    pub failure_reason: Option<String>,
    /// `status.errorMessage` of the source machine
    pub failure_message: Option<String>,
}

/// An infrastructure provider.
pub trait Provider {
    /// Machine API provider configuration (`spec.providerSpec.value`)
    type Spec: DeserializeOwned + Default;
    /// Infrastructure machine spec
    type InfraSpec: Serialize + Clone + Debug;
    type InfraMachine: Resource<DynamicType = ()> + Serialize + Clone + Debug;
    type InfraTemplate: Resource<DynamicType = ()> + Serialize + Clone + Debug;

    /// Convert the provider configuration. `path` points at
    /// `spec.providerSpec.value` of the source object.
    fn convert_spec(
        ctx: &ProviderContext<'_>,
        spec: &Self::Spec,
        path: &FieldPath,
        diag: &mut Diagnostics,
    ) -> Self::InfraSpec;

    /// Failure domain (availability zone) named by the configuration.
    fn failure_domain(_spec: &Self::Spec) -> Option<String> {
        None
    }

    /// Secret holding the bootstrap user data.
    fn user_data_secret(spec: &Self::Spec) -> Option<String>;

    fn new_machine(
        metadata: ObjectMeta,
        spec: Self::InfraSpec,
        status: Option<InfraStatus>,
    ) -> Self::InfraMachine;

    fn new_template(metadata: ObjectMeta, spec: Self::InfraSpec) -> Self::InfraTemplate;

    fn machine_spec(machine: &Self::InfraMachine) -> &Self::InfraSpec;
}

/// Decode `spec.providerSpec.value`. A missing value decodes to the default
/// configuration.
pub fn decode_provider_spec<T>(value: Option<&Value>, path: &FieldPath) -> Result<T, ConversionError>
where
    T: DeserializeOwned + Default,
{
    match value {
        None | Some(Value::Null) => Ok(T::default()),
        Some(raw) => serde_json::from_value(raw.clone()).map_err(|e| {
            ConversionError::Decode(FieldError::invalid(
                path,
                raw,
                format!("error unmarshalling providerSpec: {e}"),
            ))
        }),
    }
}

/// Cluster name from the Infrastructure, or an error when there is none.
pub fn require_cluster_name(
    infrastructure: Option<&mapi::Infrastructure>,
    diag: &mut Diagnostics,
) -> Option<String> {
    match infrastructure.map(|infra| infra.infrastructure_name()) {
        Some(name) if !name.is_empty() => Some(name.to_string()),
        _ => {
            diag.error(FieldError::invalid(
                &FieldPath::from_names(&["infrastructure", "status", "infrastructureName"]),
                "",
                "infrastructure cannot be nil and infrastructure.Status.InfrastructureName cannot be empty",
            ));
            None
        }
    }
}

/// `<base>-<hash>`, the hash being the leading hex digits of the SHA-256 of
/// the JSON encoded spec. `base` is shortened so the name stays a valid
/// object name.
pub fn template_name(base: &str, spec: &impl Serialize) -> String {
    let serialized = serde_json::to_string(spec).unwrap_or_default();
    let hash = format!("{:x}", Sha256::digest(serialized.as_bytes()));

    let base: String = base
        .chars()
        .take(MAX_NAME_LENGTH - TEMPLATE_HASH_LENGTH - 1)
        .collect();
    format!("{base}-{}", &hash[..TEMPLATE_HASH_LENGTH])
}

/// Cluster API providers read credentials from a fixed secret, so only that
/// secret (or none) can be converted.
pub(crate) fn check_credentials_secret(
    secret: Option<&LocalObjectReference>,
    expected: &str,
    path: &FieldPath,
    diag: &mut Diagnostics,
) {
    if let Some(secret) = secret.filter(|s| !s.name.is_empty() && s.name != expected) {
        diag.error(FieldError::invalid(
            path,
            secret,
            format!("credentialsSecret must be either unset or set to {expected:?}"),
        ));
    }
}

/// Name of a referenced secret, `None` when unset or empty.
pub(crate) fn secret_name(secret: Option<&LocalObjectReference>) -> Option<String> {
    secret
        .map(|s| s.name.clone())
        .filter(|name| !name.is_empty())
}

/// Warn on a secret namespace outside the Machine API namespace. Cluster API
/// reads the secret from the namespace of the machine.
pub(crate) fn check_secret_namespace(
    secret: Option<&SecretReference>,
    path: &FieldPath,
    diag: &mut Diagnostics,
) {
    if let Some(secret) = secret
        .filter(|s| !s.namespace.is_empty() && s.namespace != mapi::MACHINE_API_NAMESPACE)
    {
        diag.warn_field(
            &path.child("namespace"),
            &secret.namespace,
            "secret namespace is ignored, the secret is read from the machine namespace",
        );
    }
}

fn reference_to<K: Resource<DynamicType = ()>>(name: &str, namespace: &str) -> ObjectReference {
    ObjectReference {
        api_version: K::api_version(&()).to_string(),
        kind: K::kind(&()).to_string(),
        name: name.to_string(),
        namespace: namespace.to_string(),
        uid: String::new(),
    }
}

fn set_cluster_name_label(metadata: &mut ObjectMeta, cluster_name: &str) {
    metadata
        .labels
        .get_or_insert_with(Default::default)
        .insert(capi::CLUSTER_NAME_LABEL.to_string(), cluster_name.to_string());
}

/// A Machine API machine and the cluster Infrastructure, ready for conversion.
#[derive(Debug, Clone)]
pub struct MachineAndInfra<'a, P: Provider> {
    machine: mapi::Machine,
    infrastructure: Option<&'a mapi::Infrastructure>,
    config: ConversionConfig,
    /// Location of the machine spec in the source object
    spec_root: FieldPath,
    provider: PhantomData<P>,
}

impl<'a, P: Provider> MachineAndInfra<'a, P> {
    /// Prepare `machine` for conversion. Without an Infrastructure the
    /// conversion reports a missing cluster name.
    pub fn from_machine_and_infra(
        machine: &mapi::Machine,
        infrastructure: Option<&'a mapi::Infrastructure>,
    ) -> Self {
        MachineAndInfra {
            machine: machine.clone(),
            infrastructure,
            config: ConversionConfig::default(),
            spec_root: FieldPath::new("spec"),
            provider: PhantomData,
        }
    }

    /// Use `config` instead of the default settings.
    pub fn with_config(mut self, config: ConversionConfig) -> Self {
        self.config = config;
        self
    }

    /// Convert into the core machine and the infrastructure machine.
    pub fn to_machine_and_infrastructure_machine(
        &self,
    ) -> ConversionResult<(capi::Machine, P::InfraMachine)> {
        let (capi_machine, infra_machine, diag) = self.convert()?;
        diag.into_result((capi_machine, infra_machine))
    }

    /// Run the conversion, keeping the diagnostics separate so callers can add
    /// their own before deciding the outcome.
    fn convert(&self) -> Result<(capi::Machine, P::InfraMachine, Diagnostics), ConversionError> {
        let provider_path = self.spec_root.child("providerSpec").child("value");
        let spec: P::Spec =
            decode_provider_spec(self.machine.spec.provider_spec.value.as_ref(), &provider_path)?;

        let mut diag = Diagnostics::new();
        let ctx = ProviderContext {
            config: &self.config,
            infrastructure: self.infrastructure,
            provider_id: self.machine.spec.provider_id.as_deref(),
        };
        let infra_spec = P::convert_spec(&ctx, &spec, &provider_path, &mut diag);

        let mut capi_machine =
            machine::from_mapi_machine(&self.machine, &self.spec_root, &self.config, &mut diag);

        let name = self.machine.metadata.name.clone().unwrap_or_default();
        let namespace = self.config.capi_namespace.clone();

        capi_machine.spec.failure_domain = P::failure_domain(&spec);
        capi_machine.spec.bootstrap.data_secret_name = P::user_data_secret(&spec);
        capi_machine.spec.infrastructure_ref = reference_to::<P::InfraMachine>(&name, &namespace);

        if let Some(cluster_name) = require_cluster_name(self.infrastructure, &mut diag) {
            set_cluster_name_label(&mut capi_machine.metadata, &cluster_name);
            capi_machine.spec.cluster_name = cluster_name;
        }

        // Labels and annotations on the infrastructure machine must match the
        // core machine for propagation to the node.
        let metadata = ObjectMeta {
            name: Some(name),
            namespace: Some(namespace),
            labels: capi_machine.metadata.labels.clone(),
            annotations: capi_machine.metadata.annotations.clone(),
            ..Default::default()
        };
        let status = self.machine.status.as_ref().map(|status| InfraStatus {
            ready: MachineState::from_machine(&self.machine).infrastructure_ready(),
            addresses: status.addresses.clone(),
            failure_reason: status.error_reason.clone(),
            failure_message: status.error_message.clone(),
        });
        let infra_machine = P::new_machine(metadata, infra_spec, status);

        debug!(
            kind = %<P::InfraMachine as Resource>::kind(&()),
            errors = diag.errors.len(),
            warnings = diag.warnings.len(),
            "Converted machine"
        );

        Ok((capi_machine, infra_machine, diag))
    }
}

/// A Machine API machine set and the cluster Infrastructure, ready for
/// conversion.
#[derive(Debug, Clone)]
pub struct MachineSetAndInfra<'a, P: Provider> {
    machine_set: mapi::MachineSet,
    /// Converter for the set's template machine
    template: MachineAndInfra<'a, P>,
}

impl<'a, P: Provider> MachineSetAndInfra<'a, P> {
    /// Prepare `machine_set` for conversion. Its template machine is
    /// converted like a machine, with paths under `spec.template.spec`.
    pub fn from_machine_set_and_infra(
        machine_set: &mapi::MachineSet,
        infrastructure: Option<&'a mapi::Infrastructure>,
    ) -> Self {
        let template_machine = mapi::Machine {
            metadata: Default::default(),
            spec: machine_set.spec.template.spec.clone(),
            status: None,
        };

        MachineSetAndInfra {
            machine_set: machine_set.clone(),
            template: MachineAndInfra {
                spec_root: FieldPath::from_names(&["spec", "template", "spec"]),
                ..MachineAndInfra::from_machine_and_infra(&template_machine, infrastructure)
            },
        }
    }

    /// Use `config` instead of the default settings.
    pub fn with_config(mut self, config: ConversionConfig) -> Self {
        self.template = self.template.with_config(config);
        self
    }

    /// Convert into the core machine set and the infrastructure machine
    /// template.
    pub fn to_machine_set_and_machine_template(
        &self,
    ) -> ConversionResult<(capi::MachineSet, P::InfraTemplate)> {
        let (capi_machine, infra_machine, mut diag) = self.template.convert()?;
        let config = &self.template.config;

        let mut capi_machine_set =
            machineset::from_mapi_machine_set(&self.machine_set, config, &mut diag);

        let infra_spec = P::machine_spec(&infra_machine).clone();
        let set_name = self.machine_set.metadata.name.as_deref().unwrap_or_default();
        let name = template_name(set_name, &infra_spec);

        let template = &mut capi_machine_set.spec.template;
        template.spec = capi_machine.spec;
        template.spec.infrastructure_ref =
            reference_to::<P::InfraTemplate>(&name, &config.capi_namespace);
        template.metadata.labels = labels::merge_maps(&[
            template.metadata.labels.as_ref(),
            capi_machine.metadata.labels.as_ref(),
        ]);
        template.metadata.annotations = labels::merge_maps(&[
            template.metadata.annotations.as_ref(),
            capi_machine.metadata.annotations.as_ref(),
        ]);

        if let Some(cluster_name) = require_cluster_name(self.template.infrastructure, &mut diag) {
            set_cluster_name_label(&mut capi_machine_set.metadata, &cluster_name);
            capi_machine_set.spec.template.spec.cluster_name = cluster_name.clone();
            capi_machine_set.spec.cluster_name = cluster_name;
        }

        let infra_template = P::new_template(
            ObjectMeta {
                name: Some(name),
                namespace: Some(config.capi_namespace.clone()),
                ..Default::default()
            },
            infra_spec,
        );

        debug!(
            machine_set = set_name,
            kind = %<P::InfraTemplate as Resource>::kind(&()),
            errors = diag.errors.len(),
            warnings = diag.warnings.len(),
            "Converted machine set"
        );

        diag.into_result((capi_machine_set, infra_template))
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
