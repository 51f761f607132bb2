use super::job::{JobExecutionError, PropagationJob};
use super::CliError;
use anyhow::Context;
use pulseprop_core::{
    forget_plans, load_plan_hints, save_plan_hints, set_planner_effort, PlannerEffort,
    DEFAULT_PLAN_HINTS_FILE,
};
use std::fs;
use std::path::PathBuf;

#[derive(clap::Args)]
pub(super) struct RunArgs {
    /// Path to the JSON job file
    pub job: PathBuf,
    /// Write the result JSON here instead of stdout
    #[arg(long)]
    pub output: Option<PathBuf>,
    /// Planner effort for this process: estimate, measure, patient or exhaustive
    #[arg(long)]
    pub effort: Option<String>,
}

#[derive(clap::Subcommand)]
pub(super) enum PlansAction {
    /// Persist the recorded transform lengths to a hint file
    Save {
        #[arg(long, default_value = DEFAULT_PLAN_HINTS_FILE)]
        file: PathBuf,
    },
    /// Load a hint file and plan its lengths
    Load {
        #[arg(long, default_value = DEFAULT_PLAN_HINTS_FILE)]
        file: PathBuf,
    },
    /// Drop every cached plan
    Forget,
}

pub(super) fn run_job_command(args: RunArgs) -> Result<i32, CliError> {
    if let Some(effort) = &args.effort {
        let effort: PlannerEffort = effort
            .parse()
            .map_err(|error| CliError::Usage(format!("{error}")))?;
        set_planner_effort(effort);
    }

    let source = fs::read_to_string(&args.job)
        .with_context(|| format!("failed to read job file '{}'", args.job.display()))?;
    let job: PropagationJob = serde_json::from_str(&source)
        .map_err(|error| CliError::Usage(format!("invalid job file: {error}")))?;

    let report = job.execute().map_err(|error| match error {
        JobExecutionError::Invalid(invalid) => CliError::Usage(invalid.to_string()),
        JobExecutionError::Compute(compute) => CliError::Compute(compute),
    })?;

    for warning in report.warnings() {
        tracing::warn!(
            step = warning.step,
            iterations = warning.iterations,
            residual = warning.residual,
            "nonlinear iteration failed to converge"
        );
    }

    let rendered =
        serde_json::to_string_pretty(&report).context("failed to encode the run report")?;
    match &args.output {
        Some(path) => fs::write(path, rendered)
            .with_context(|| format!("failed to write result to '{}'", path.display()))?,
        None => println!("{rendered}"),
    }

    Ok(0)
}

pub(super) fn run_plans_command(action: PlansAction) -> Result<i32, CliError> {
    match action {
        PlansAction::Save { file } => {
            let count = save_plan_hints(&file)?;
            tracing::info!(count, file = %file.display(), "saved plan hints");
        }
        PlansAction::Load { file } => {
            let count = load_plan_hints(&file)?;
            tracing::info!(count, file = %file.display(), "loaded plan hints");
        }
        PlansAction::Forget => {
            forget_plans();
            tracing::info!("cleared the plan cache");
        }
    }
    Ok(0)
}
