mod commands;
mod job;

use clap::Parser;
use pulseprop_core::{PropagationError, SpectralError};

pub fn run_from_env() -> i32 {
    let args: Vec<String> = std::env::args().collect();
    match parse_and_dispatch(args) {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error}");
            error.exit_code()
        }
    }
}

pub fn run<I, S>(args: I) -> Result<i32, CliError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let full_args = std::iter::once("pulseprop".to_string())
        .chain(args.into_iter().map(Into::into))
        .collect::<Vec<_>>();
    parse_and_dispatch(full_args)
}

fn parse_and_dispatch(args: Vec<String>) -> Result<i32, CliError> {
    match Cli::try_parse_from(&args) {
        Ok(cli) => dispatch_parsed(cli.command),
        Err(err) => match err.kind() {
            clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                print!("{}", err);
                Ok(0)
            }
            _ => Err(CliError::Usage(err.to_string())),
        },
    }
}

#[derive(Parser)]
#[command(name = "pulseprop", about = "Split-step fiber pulse propagation engine")]
struct Cli {
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(clap::Subcommand)]
enum CliCommand {
    /// Propagate a field described by a JSON job file
    Run(commands::RunArgs),
    /// Manage the persisted Fourier plan cache
    Plans {
        #[command(subcommand)]
        action: commands::PlansAction,
    },
}

fn dispatch_parsed(command: CliCommand) -> Result<i32, CliError> {
    match command {
        CliCommand::Run(args) => commands::run_job_command(args),
        CliCommand::Plans { action } => commands::run_plans_command(action),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error("{0}")]
    Compute(PropagationError),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl CliError {
    fn exit_code(&self) -> i32 {
        match self {
            // Invalid-argument failures from the kernel share the usage exit
            // code; only a transform-provider failure counts as a compute
            // failure.
            Self::Usage(_) => 2,
            Self::Compute(PropagationError::Transform(_)) => 3,
            Self::Compute(_) => 2,
            Self::Internal(_) => 4,
        }
    }
}

impl From<SpectralError> for CliError {
    fn from(error: SpectralError) -> Self {
        Self::Compute(PropagationError::Transform(error))
    }
}
