use anyhow::Result;
use colored::Colorize;
use phasesync_core::PhaseType;
use phasesync_engine::{PlanSummary, ReconcileError, ReconcileOutcome, Reconciler};

use crate::cli::OutputFormat;
use crate::commands::read_desired;
use crate::output::{
    print_field_errors, print_json, print_plan_table, print_success, print_summary,
};

pub async fn apply(
    reconciler: &Reconciler,
    phase_type: PhaseType,
    file: &Option<String>,
    format: OutputFormat,
) -> Result<()> {
    let desired = read_desired(file)?;
    let result = reconciler.run(phase_type, &desired).await;
    let summary = result.as_ref().ok().map(|report| report.plan);
    let outcome = ReconcileOutcome::from(result);

    report_outcome(&outcome, summary, phase_type, format)
}

/// Prints the outcome; a failure comes back as the single error to report.
fn report_outcome(
    outcome: &ReconcileOutcome,
    summary: Option<PlanSummary>,
    phase_type: PhaseType,
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(outcome)?,
        OutputFormat::Table => match outcome {
            ReconcileOutcome::Applied { phase_id } => {
                print_success(&format!("Reconciled {phase_type} phase {}", phase_id.cyan()));
                if let Some(summary) = summary {
                    print_summary(&summary);
                }
            }
            ReconcileOutcome::Invalid { field_errors } => print_field_errors(field_errors),
            ReconcileOutcome::Failed { stage, error } => {
                anyhow::bail!("Failed while {stage}: {error}");
            }
        },
    }

    if !outcome.is_success() {
        anyhow::bail!("Reconciliation of the {phase_type} phase did not complete");
    }
    Ok(())
}

pub async fn plan(
    reconciler: &Reconciler,
    phase_type: PhaseType,
    file: &Option<String>,
    format: OutputFormat,
) -> Result<()> {
    let desired = read_desired(file)?;
    let preview = match reconciler.preview(phase_type, &desired).await {
        Ok(preview) => preview,
        Err(ReconcileError::Validation(errors)) => {
            print_field_errors(&errors);
            anyhow::bail!("Desired state is invalid");
        }
        Err(e) => return Err(e.into()),
    };

    match format {
        OutputFormat::Json => print_json(&preview)?,
        OutputFormat::Table => {
            match &preview.phase {
                Some(phase) => println!(
                    "{} {} ({}) would be updated",
                    "Phase:".cyan(),
                    phase.name,
                    phase.id
                ),
                None => println!(
                    "{} no {phase_type} phase yet, it would be created",
                    "Phase:".cyan()
                ),
            }
            print_plan_table(&preview.plan);
        }
    }
    Ok(())
}
