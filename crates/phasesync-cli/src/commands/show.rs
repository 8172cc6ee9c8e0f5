use anyhow::Result;
use phasesync_api::TrackerApi;
use phasesync_core::PhaseType;
use phasesync_engine::PhaseResolver;

use crate::cli::OutputFormat;
use crate::output::{print_json, print_phase_table};

pub async fn show(
    api: &dyn TrackerApi,
    phase_type: PhaseType,
    project: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    let Some(phase) = PhaseResolver::new(api, project).find(phase_type).await? else {
        match project {
            Some(project) => anyhow::bail!("No {phase_type} phase found in project {project}"),
            None => anyhow::bail!("No {phase_type} phase found"),
        }
    };
    let detail = api.get_phase_detail(&phase.id).await?;
    match format {
        OutputFormat::Json => print_json(&detail)?,
        OutputFormat::Table => print_phase_table(&detail),
    }
    Ok(())
}
