//! Machine API to Cluster API conversion
//!
//! Converts OpenShift Machine API `Machine` and `MachineSet` resources into
//! their Cluster API equivalents: a core `Machine`/`MachineSet` plus the
//! provider-specific infrastructure machine or machine template.
//!
//! Conversion is a pure function of its inputs. Every field of a provider
//! configuration is either converted, ignored with a warning, or rejected
//! with a field error; errors are accumulated rather than returned on the
//! first failure.
//!
//! # Example
//!
//! ```no_run
//! use machine_conversion::providers::{aws::Aws, MachineAndInfra};
//! # fn example(
//! #     machine: &machine_crds::mapi::Machine,
//! #     infrastructure: &machine_crds::mapi::Infrastructure,
//! # ) -> Result<(), machine_conversion::ConversionError> {
//! let converted = MachineAndInfra::<Aws>::from_machine_and_infra(machine, Some(infrastructure))
//!     .to_machine_and_infrastructure_machine()?;
//! let (capi_machine, aws_machine) = converted.value;
//! for warning in &converted.warnings {
//!     eprintln!("{warning}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod conditions;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod labels;
pub mod machine;
pub mod machineset;
pub mod platform;
pub mod providers;

#[cfg(test)]
pub(crate) mod test_utils;

pub use config::ConversionConfig;
pub use diagnostics::{Diagnostics, ErrorList, FieldError, FieldErrorType, FieldPath};
pub use error::{ConversionError, ConversionResult, Converted};
pub use platform::{convert_machine, convert_machine_set, InfraMachine, InfraMachineTemplate};
