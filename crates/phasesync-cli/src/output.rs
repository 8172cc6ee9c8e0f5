use anyhow::Result;
use colored::Colorize;
use phasesync_core::{PersistedDeliverable, PhaseDetail, date_only};
use phasesync_engine::{FieldErrors, PlanSummary, ReconcilePlan};
use serde::Serialize;
use tabled::builder::Builder;
use tabled::settings::Style;

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

pub fn print_summary(summary: &PlanSummary) {
    println!(
        "{} {}  {} {}  {} {}  {} {}",
        "delete".red(),
        summary.deletes,
        "create".green(),
        summary.creates,
        "update".yellow(),
        summary.updates,
        "unchanged".dimmed(),
        summary.unchanged
    );
}

pub fn print_field_errors(errors: &FieldErrors) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Problem"]);
    for (field, messages) in errors.iter() {
        for message in messages {
            builder.push_record([field, message.as_str()]);
        }
    }
    eprintln!("{}", builder.build().with(Style::rounded()));
}

fn due(value: Option<&str>) -> &str {
    match date_only(value) {
        "" => "-",
        date => date,
    }
}

pub fn print_plan_table(plan: &ReconcilePlan) {
    if plan.is_empty() {
        println!("Nothing to change.");
        print_summary(&plan.summary());
        return;
    }
    let mut builder = Builder::default();
    builder.push_record(["Action", "ID", "Title", "Due"]);
    for record in &plan.to_delete {
        builder.push_record([
            "delete",
            record.id.as_str(),
            record.title.as_str(),
            due(record.due_date.as_deref()),
        ]);
    }
    for pair in &plan.to_update {
        builder.push_record([
            "update",
            pair.existing.id.as_str(),
            pair.desired.title.as_str(),
            due(pair.desired.due_date.as_deref()),
        ]);
    }
    for desired in &plan.to_create {
        builder.push_record([
            "create",
            "-",
            desired.title.as_str(),
            due(desired.due_date.as_deref()),
        ]);
    }
    println!("{}", builder.build().with(Style::rounded()));
    print_summary(&plan.summary());
}

fn deliverable_row(d: &PersistedDeliverable) -> [String; 4] {
    [
        d.id.clone(),
        d.title.clone(),
        d.status.to_string(),
        due(d.due_date.as_deref()).to_string(),
    ]
}

pub fn print_phase_table(detail: &PhaseDetail) {
    let phase = &detail.phase;
    println!(
        "{} {} ({}, {})",
        "Phase:".cyan(),
        phase.name.cyan(),
        phase.phase_type,
        phase.id
    );
    if let Some(project) = &phase.project_id {
        println!("{} {}", "Project:".cyan(), project);
    }
    println!(
        "{} {} .. {}",
        "Dates:".cyan(),
        due(phase.start_date.as_deref()),
        due(phase.end_date.as_deref())
    );
    if detail.deliverables.is_empty() {
        println!("No deliverables.");
        return;
    }
    let mut builder = Builder::default();
    builder.push_record(["ID", "Title", "Status", "Due"]);
    for d in &detail.deliverables {
        builder.push_record(deliverable_row(d));
    }
    println!("{}", builder.build().with(Style::rounded()));
}
