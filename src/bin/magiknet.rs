//! magiknet - endpoint identity CLI
//!
//! Resolves the identifiers of an endpoint described by a spec file.
//!
//! ## Usage
//!
//! ```sh
//! magiknet identifiers <spec-file>   # identifier map as JSON
//! magiknet keys <spec-file>          # lookup keys, one per line
//! magiknet cep-name <spec-file>      # namespace/cep-name
//! magiknet version
//! ```
//!
//! Spec files ending in `.json` are parsed as JSON, anything else as YAML.
//! Log level is taken from `MAGIKNET_LOG` (default `info`).

use magiknet::{Endpoint, EndpointSpec, IdentifierPrefix, new_id};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

// =============================================================================
// CLI Parsing
// =============================================================================

#[derive(Debug)]
enum Command {
    Identifiers { spec: PathBuf },
    Keys { spec: PathBuf },
    CepName { spec: PathBuf },
    Version,
    Help,
}

fn parse_args() -> Result<Command, String> {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        return Ok(Command::Help);
    }

    let spec_arg = |cmd: &str| {
        args.get(2)
            .map(PathBuf::from)
            .ok_or_else(|| format!("{} requires <spec-file>", cmd))
    };

    match args[1].as_str() {
        "identifiers" => Ok(Command::Identifiers {
            spec: spec_arg("identifiers")?,
        }),
        "keys" => Ok(Command::Keys {
            spec: spec_arg("keys")?,
        }),
        "cep-name" => Ok(Command::CepName {
            spec: spec_arg("cep-name")?,
        }),
        "version" | "--version" | "-v" => Ok(Command::Version),
        "help" | "--help" | "-h" => Ok(Command::Help),
        unknown => Err(format!("unknown command: {}", unknown)),
    }
}

// =============================================================================
// Commands
// =============================================================================

fn load_endpoint(path: &Path) -> magiknet::Result<Endpoint> {
    let bytes = std::fs::read(path)?;
    let spec = if path.extension().is_some_and(|ext| ext == "json") {
        EndpointSpec::from_json(&bytes)?
    } else {
        EndpointSpec::from_yaml(&bytes)?
    };
    debug!("loaded endpoint spec from {}", path.display());
    Endpoint::from_spec(spec)
}

fn cmd_identifiers(spec: &Path) -> magiknet::Result<()> {
    let endpoint = load_endpoint(spec)?;
    // sorted for stable output
    let ids: BTreeMap<IdentifierPrefix, String> = endpoint.identifiers()?.into_iter().collect();
    let json = serde_json::to_string_pretty(&ids)
        .map_err(|e| magiknet::Error::Serialization(e.to_string()))?;
    println!("{}", json);
    Ok(())
}

fn cmd_keys(spec: &Path) -> magiknet::Result<()> {
    let endpoint = load_endpoint(spec)?;
    let ids = endpoint.identifiers()?;
    for prefix in IdentifierPrefix::ALL {
        if let Some(value) = ids.get(&prefix) {
            println!("{}", new_id(prefix, value));
        }
    }
    Ok(())
}

fn cmd_cep_name(spec: &Path) -> magiknet::Result<()> {
    let endpoint = load_endpoint(spec)?;
    println!("{}", endpoint.k8s_namespace_and_cep_name());
    Ok(())
}

fn cmd_version() {
    println!("magiknet version {}", env!("CARGO_PKG_VERSION"));
}

fn cmd_help() {
    println!(
        r#"magiknet - endpoint identity resolution

USAGE:
    magiknet <COMMAND> [ARGS]

COMMANDS:
    identifiers <spec-file>   Print the identifier map as JSON
    keys <spec-file>          Print lookup keys, one per line
    cep-name <spec-file>      Print namespace/cep-name
    version                   Print version
    help                      Print this help

ENVIRONMENT:
    MAGIKNET_LOG              Log filter (default: info)"#
    );
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("MAGIKNET_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("Failed to set tracing subscriber");
    }
}

fn main() -> ExitCode {
    init_tracing();

    match parse_args() {
        Ok(cmd) => {
            let result = match cmd {
                Command::Identifiers { spec } => cmd_identifiers(&spec),
                Command::Keys { spec } => cmd_keys(&spec),
                Command::CepName { spec } => cmd_cep_name(&spec),
                Command::Version => {
                    cmd_version();
                    Ok(())
                }
                Command::Help => {
                    cmd_help();
                    Ok(())
                }
            };

            match result {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    eprintln!("error: {}", e);
                    ExitCode::FAILURE
                }
            }
        }
        Err(e) => {
            eprintln!("error: {}", e);
            cmd_help();
            ExitCode::FAILURE
        }
    }
}
