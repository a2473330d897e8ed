//! mapi2capi
//!
//! Reads a Machine API `Machine` or `MachineSet` and the cluster
//! `Infrastructure` from YAML manifests and prints the Cluster API
//! equivalents as a multi-document YAML stream: the core object first, the
//! infrastructure machine or template second.
//!
//! Warnings are logged at WARN on stderr, field errors at ERROR.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use machine_conversion::{
    convert_machine, convert_machine_set, ConversionConfig, ConversionError, ConversionResult,
    Converted,
};
use machine_crds::mapi;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "mapi2capi",
    version,
    about = "Convert Machine API resources to Cluster API"
)]
struct Cli {
    /// Cluster Infrastructure manifest
    #[arg(long, short = 'i')]
    infrastructure: PathBuf,

    /// Conversion settings (YAML); defaults apply to unset fields
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Namespace for the Cluster API resources, overrides the config file
    #[arg(long, env = "CAPI_NAMESPACE")]
    capi_namespace: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Convert a Machine into a Machine and an infrastructure machine
    Machine {
        /// Machine manifest, `-` for stdin
        file: PathBuf,
    },

    /// Convert a MachineSet into a MachineSet and an infrastructure machine template
    MachineSet {
        /// MachineSet manifest, `-` for stdin
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let output = cli.run()?;
    print!("{output}");
    Ok(())
}

impl Cli {
    fn load_config(&self) -> Result<ConversionConfig> {
        let mut config = match &self.config {
            Some(path) => read_yaml(path).context("failed to load conversion config")?,
            None => ConversionConfig::default(),
        };
        if let Some(namespace) = &self.capi_namespace {
            config.capi_namespace = namespace.clone();
        }
        Ok(config)
    }

    /// Convert the input and render the output documents.
    fn run(&self) -> Result<String> {
        let config = self.load_config()?;
        let infrastructure: mapi::Infrastructure =
            read_yaml(&self.infrastructure).context("failed to load infrastructure")?;
        info!(
            platform = ?infrastructure.platform_type(),
            cluster = infrastructure.infrastructure_name(),
            "Loaded infrastructure"
        );

        match &self.command {
            Command::Machine { file } => {
                let machine: mapi::Machine = read_yaml(file).context("failed to load machine")?;
                let name = machine.metadata.name.clone().unwrap_or_default();
                let (capi_machine, infra_machine) =
                    report(convert_machine(&machine, &infrastructure, &config))
                        .with_context(|| format!("failed to convert machine {name:?}"))?;
                info!(machine = %name, kind = %infra_machine.kind(), "Converted machine");
                documents(&capi_machine, &infra_machine)
            }
            Command::MachineSet { file } => {
                let machine_set: mapi::MachineSet =
                    read_yaml(file).context("failed to load machine set")?;
                let name = machine_set.metadata.name.clone().unwrap_or_default();
                let (capi_machine_set, template) =
                    report(convert_machine_set(&machine_set, &infrastructure, &config))
                        .with_context(|| format!("failed to convert machine set {name:?}"))?;
                info!(machine_set = %name, kind = %template.kind(), "Converted machine set");
                documents(&capi_machine_set, &template)
            }
        }
    }
}

/// Log the warnings of a conversion, and the field errors when it failed.
fn report<T>(result: ConversionResult<T>) -> Result<T, ConversionError> {
    match result {
        Ok(Converted { value, warnings }) => {
            for warning in &warnings {
                warn!("{warning}");
            }
            Ok(value)
        }
        Err(err) => {
            for warning in err.warnings() {
                warn!("{warning}");
            }
            for field_error in err.field_errors() {
                error!(field = %field_error.field, "{field_error}");
            }
            Err(err)
        }
    }
}

fn read_yaml<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = if path.as_os_str() == "-" {
        let mut raw = String::new();
        io::stdin()
            .read_to_string(&mut raw)
            .context("failed to read stdin")?;
        raw
    } else {
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?
    };
    serde_yaml::from_str(&raw).with_context(|| format!("failed to parse {}", path.display()))
}

fn documents(core: &impl Serialize, infra: &impl Serialize) -> Result<String> {
    Ok(format!(
        "---\n{}---\n{}",
        serde_yaml::to_string(core)?,
        serde_yaml::to_string(infra)?
    ))
}
