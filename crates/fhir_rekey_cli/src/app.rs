//! Argument model and file-to-file run for the CLI.

use clap::Parser;
use fhir_rekey_core::{rekey_value, BundleError, IdentifierPolicy, RekeyOptions};
use log::info;
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

const DEFAULT_INPUT: &str = "example_fhir.json";
const DEFAULT_OUTPUT: &str = "data/example_fhir_uuid.json";

/// Rewrite a FHIR Bundle to use urn:uuid fullUrls and references, adding UUID ids/identifiers.
#[derive(Parser, Debug, Clone)]
#[command(name = "fhir-rekey", version)]
pub struct Cli {
    /// Path to input FHIR Bundle JSON
    #[arg(short, long, value_name = "PATH", default_value = DEFAULT_INPUT)]
    pub input: PathBuf,

    /// Path to write transformed JSON
    #[arg(short, long, value_name = "PATH", default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Only add the urn:uuid identifier to resource types that declare `identifier`
    #[arg(long)]
    pub known_identifier_types_only: bool,

    /// Log level (trace|debug|info|warn|error)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Absolute directory for rolling log files (logs go to stderr when omitted)
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<String>,
}

impl Cli {
    fn options(&self) -> RekeyOptions {
        let identifier_policy = if self.known_identifier_types_only {
            IdentifierPolicy::KnownTypesOnly
        } else {
            IdentifierPolicy::Always
        };
        RekeyOptions { identifier_policy }
    }
}

/// Fatal run errors, each carrying the offending path.
#[derive(Debug)]
pub enum CliError {
    ReadInput {
        path: PathBuf,
        source: std::io::Error,
    },
    ParseInput {
        path: PathBuf,
        source: serde_json::Error,
    },
    InvalidBundle {
        path: PathBuf,
        source: BundleError,
    },
    RenderOutput {
        path: PathBuf,
        source: serde_json::Error,
    },
    WriteOutput {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl CliError {
    /// Process exit code: 1 unreadable input, 2 not a Bundle, 3 output failure.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::ReadInput { .. } | Self::ParseInput { .. } => 1,
            Self::InvalidBundle { .. } => 2,
            Self::RenderOutput { .. } | Self::WriteOutput { .. } => 3,
        }
    }
}

impl Display for CliError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ReadInput { path, source } => {
                write!(f, "Failed to read input JSON '{}': {source}", path.display())
            }
            Self::ParseInput { path, source } => {
                write!(f, "Failed to read input JSON '{}': {source}", path.display())
            }
            Self::InvalidBundle { path, source } => {
                write!(f, "Invalid input '{}': {source}", path.display())
            }
            Self::RenderOutput { path, source } => {
                write!(f, "Failed to write output JSON '{}': {source}", path.display())
            }
            Self::WriteOutput { path, source } => {
                write!(f, "Failed to write output JSON '{}': {source}", path.display())
            }
        }
    }
}

impl Error for CliError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::ReadInput { source, .. } | Self::WriteOutput { source, .. } => Some(source),
            Self::ParseInput { source, .. } | Self::RenderOutput { source, .. } => Some(source),
            Self::InvalidBundle { source, .. } => Some(source),
        }
    }
}

/// Reads, re-keys and writes one bundle. Returns the written path.
///
/// Nothing is written unless the input parsed as a valid Bundle.
pub fn run(cli: &Cli) -> Result<PathBuf, CliError> {
    let input = read_bundle_json(&cli.input)?;
    let (output, outcome) =
        rekey_value(input, &cli.options()).map_err(|source| CliError::InvalidBundle {
            path: cli.input.clone(),
            source,
        })?;

    let rendered = render(&output, cli.pretty).map_err(|source| CliError::RenderOutput {
        path: cli.output.clone(),
        source,
    })?;
    write_output(&cli.output, &rendered)?;

    info!(
        "event=output_written module=cli status=ok path={} entries={} unresolved={}",
        cli.output.display(),
        outcome.assignments.len(),
        outcome.unresolved.len()
    );
    Ok(cli.output.clone())
}

fn read_bundle_json(path: &Path) -> Result<Value, CliError> {
    let raw = std::fs::read_to_string(path).map_err(|source| CliError::ReadInput {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| CliError::ParseInput {
        path: path.to_path_buf(),
        source,
    })
}

fn render(value: &Value, pretty: bool) -> Result<String, serde_json::Error> {
    if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
}

fn write_output(path: &Path, rendered: &str) -> Result<(), CliError> {
    let write_error = |source: std::io::Error| CliError::WriteOutput {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(write_error)?;
    }
    std::fs::write(path, rendered).map_err(write_error)
}
