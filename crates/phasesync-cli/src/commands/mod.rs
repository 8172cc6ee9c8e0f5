pub mod config;
pub mod reconcile;
pub mod show;

use std::fs;
use std::io::{self, Read};

use anyhow::{Context, Result};
use phasesync_core::DesiredPhase;

/// Reads the desired phase from `file`, or from stdin when no file is given.
pub fn read_desired(file: &Option<String>) -> Result<DesiredPhase> {
    let content = match file {
        Some(path) => {
            fs::read_to_string(path).with_context(|| format!("Failed to read file: {path}"))?
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            buf
        }
    };
    serde_json::from_str(&content).context("Invalid desired-state JSON")
}
