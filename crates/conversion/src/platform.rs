//! Platform dispatch
//!
//! Picks the provider converter from the Infrastructure's platform type and
//! erases the provider specific output type, for callers that handle
//! machines of any platform.

use std::borrow::Cow;

use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::Resource;
use machine_crds::capi::{
    AWSMachine, AWSMachineTemplate, IBMPowerVSMachine, IBMPowerVSMachineTemplate, Metal3Machine,
    Metal3MachineTemplate, NutanixMachine, NutanixMachineTemplate, OpenStackMachine,
    OpenStackMachineTemplate, VSphereMachine, VSphereMachineTemplate,
};
use machine_crds::mapi::PlatformType;
use machine_crds::{capi, mapi};
use serde::Serialize;
use tracing::debug;

use crate::config::ConversionConfig;
use crate::error::{ConversionError, ConversionResult};
use crate::providers::aws::Aws;
use crate::providers::metal3::Metal3;
use crate::providers::nutanix::Nutanix;
use crate::providers::openstack::OpenStack;
use crate::providers::powervs::PowerVS;
use crate::providers::vsphere::VSphere;
use crate::providers::{MachineAndInfra, MachineSetAndInfra, Provider};

/// Infrastructure machine of any supported provider.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum InfraMachine {
    /// `AWSMachine`
    Aws(AWSMachine),
    /// `VSphereMachine`
    VSphere(VSphereMachine),
    /// `OpenStackMachine`
    OpenStack(OpenStackMachine),
    /// `NutanixMachine`
    Nutanix(NutanixMachine),
    /// `IBMPowerVSMachine`
    PowerVS(IBMPowerVSMachine),
    /// `Metal3Machine`
    Metal3(Metal3Machine),
}

/// Infrastructure machine template of any supported provider.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum InfraMachineTemplate {
    /// `AWSMachineTemplate`
    Aws(AWSMachineTemplate),
    /// `VSphereMachineTemplate`
    VSphere(VSphereMachineTemplate),
    /// `OpenStackMachineTemplate`
    OpenStack(OpenStackMachineTemplate),
    /// `NutanixMachineTemplate`
    Nutanix(NutanixMachineTemplate),
    /// `IBMPowerVSMachineTemplate`
    PowerVS(IBMPowerVSMachineTemplate),
    /// `Metal3MachineTemplate`
    Metal3(Metal3MachineTemplate),
}

macro_rules! each_provider {
    ($enum:ident, $value:expr, $inner:ident => $body:expr) => {
        match $value {
            $enum::Aws($inner) => $body,
            $enum::VSphere($inner) => $body,
            $enum::OpenStack($inner) => $body,
            $enum::Nutanix($inner) => $body,
            $enum::PowerVS($inner) => $body,
            $enum::Metal3($inner) => $body,
        }
    };
}

fn kind_of<K: Resource<DynamicType = ()>>(_: &K) -> Cow<'static, str> {
    K::kind(&())
}

impl InfraMachine {
    /// Kubernetes kind of the wrapped machine.
    pub fn kind(&self) -> Cow<'static, str> {
        each_provider!(InfraMachine, self, m => kind_of(m))
    }

    /// Object metadata of the wrapped machine.
    pub fn metadata(&self) -> &ObjectMeta {
        each_provider!(InfraMachine, self, m => m.meta())
    }
}

impl InfraMachineTemplate {
    /// Kubernetes kind of the wrapped template.
    pub fn kind(&self) -> Cow<'static, str> {
        each_provider!(InfraMachineTemplate, self, t => kind_of(t))
    }

    /// Object metadata of the wrapped template.
    pub fn metadata(&self) -> &ObjectMeta {
        each_provider!(InfraMachineTemplate, self, t => t.meta())
    }
}

/// Convert a machine with the converter for the cluster's platform.
pub fn convert_machine(
    machine: &mapi::Machine,
    infrastructure: &mapi::Infrastructure,
    config: &ConversionConfig,
) -> ConversionResult<(capi::Machine, InfraMachine)> {
    let platform = infrastructure.platform_type();
    debug!(
        ?platform,
        machine = machine.metadata.name.as_deref().unwrap_or_default(),
        "Dispatching machine conversion"
    );

    match platform {
        PlatformType::Aws => machine_with::<Aws>(machine, infrastructure, config, InfraMachine::Aws),
        PlatformType::VSphere => {
            machine_with::<VSphere>(machine, infrastructure, config, InfraMachine::VSphere)
        }
        PlatformType::OpenStack => {
            machine_with::<OpenStack>(machine, infrastructure, config, InfraMachine::OpenStack)
        }
        PlatformType::Nutanix => {
            machine_with::<Nutanix>(machine, infrastructure, config, InfraMachine::Nutanix)
        }
        PlatformType::PowerVS => {
            machine_with::<PowerVS>(machine, infrastructure, config, InfraMachine::PowerVS)
        }
        PlatformType::BareMetal => {
            machine_with::<Metal3>(machine, infrastructure, config, InfraMachine::Metal3)
        }
        other => Err(ConversionError::UnsupportedPlatform(other)),
    }
}

/// Convert a machine set with the converter for the cluster's platform.
pub fn convert_machine_set(
    machine_set: &mapi::MachineSet,
    infrastructure: &mapi::Infrastructure,
    config: &ConversionConfig,
) -> ConversionResult<(capi::MachineSet, InfraMachineTemplate)> {
    let platform = infrastructure.platform_type();
    debug!(
        ?platform,
        machine_set = machine_set.metadata.name.as_deref().unwrap_or_default(),
        "Dispatching machine set conversion"
    );

    match platform {
        PlatformType::Aws => {
            machine_set_with::<Aws>(machine_set, infrastructure, config, InfraMachineTemplate::Aws)
        }
        PlatformType::VSphere => machine_set_with::<VSphere>(
            machine_set,
            infrastructure,
            config,
            InfraMachineTemplate::VSphere,
        ),
        PlatformType::OpenStack => machine_set_with::<OpenStack>(
            machine_set,
            infrastructure,
            config,
            InfraMachineTemplate::OpenStack,
        ),
        PlatformType::Nutanix => machine_set_with::<Nutanix>(
            machine_set,
            infrastructure,
            config,
            InfraMachineTemplate::Nutanix,
        ),
        PlatformType::PowerVS => machine_set_with::<PowerVS>(
            machine_set,
            infrastructure,
            config,
            InfraMachineTemplate::PowerVS,
        ),
        PlatformType::BareMetal => machine_set_with::<Metal3>(
            machine_set,
            infrastructure,
            config,
            InfraMachineTemplate::Metal3,
        ),
        other => Err(ConversionError::UnsupportedPlatform(other)),
    }
}

fn machine_with<P: Provider>(
    machine: &mapi::Machine,
    infrastructure: &mapi::Infrastructure,
    config: &ConversionConfig,
    erase: fn(P::InfraMachine) -> InfraMachine,
) -> ConversionResult<(capi::Machine, InfraMachine)> {
    MachineAndInfra::<P>::from_machine_and_infra(machine, Some(infrastructure))
        .with_config(config.clone())
        .to_machine_and_infrastructure_machine()
        .map(|converted| converted.map(|(capi_machine, infra)| (capi_machine, erase(infra))))
}

fn machine_set_with<P: Provider>(
    machine_set: &mapi::MachineSet,
    infrastructure: &mapi::Infrastructure,
    config: &ConversionConfig,
    erase: fn(P::InfraTemplate) -> InfraMachineTemplate,
) -> ConversionResult<(capi::MachineSet, InfraMachineTemplate)> {
    MachineSetAndInfra::<P>::from_machine_set_and_infra(machine_set, Some(infrastructure))
        .with_config(config.clone())
        .to_machine_set_and_machine_template()
        .map(|converted| converted.map(|(capi_set, template)| (capi_set, erase(template))))
}

#[cfg(test)]
#[path = "platform_test.rs"]
mod tests;
