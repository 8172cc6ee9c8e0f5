use anyhow::Result;
use colored::Colorize;
use phasesync_cli::AppConfig;

use crate::cli::OutputFormat;
use crate::output::print_json;

pub fn show(cfg: &AppConfig, source: Option<&str>, format: OutputFormat) -> Result<()> {
    let masked = cfg.masked();
    match format {
        OutputFormat::Json => print_json(&masked)?,
        OutputFormat::Table => {
            println!(
                "{}: {}",
                "Config file".cyan(),
                source.unwrap_or("(none, defaults and environment)")
            );
            print!("{}", toml::to_string_pretty(&masked)?);
        }
    }
    Ok(())
}
