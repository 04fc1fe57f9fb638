//! `milonga check <plan>`: advisory warnings for the timeline.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;

use milonga_advisor::{generate_warnings, Severity, Warning};
use milonga_renderer::Renderer;

use super::Session;
use crate::GlobalArgs;

#[derive(Args, Debug)]
pub struct CheckArgs {
    pub plan: String,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct WarningJson<'a> {
    id: &'a str,
    severity: &'static str,
    key: &'static str,
    message: String,
    /// 1-based.
    slots: Vec<usize>,
    params: &'a BTreeMap<String, String>,
}

impl CheckArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<()> {
        let session = Session::open(global)?;
        let program = session.load(&self.plan)?;
        let catalog = session.catalog()?;
        let renderer = session.renderer()?;

        let warnings = generate_warnings(&program.slots(), &catalog);
        if self.json {
            return print_json(&renderer, &warnings);
        }

        if warnings.is_empty() {
            println!("{} No issues found in '{}'", "✓".green().bold(), self.plan);
            return Ok(());
        }
        for warning in &warnings {
            let message = renderer
                .message(warning)
                .with_context(|| format!("failed to render warning '{}'", warning.id))?;
            println!("{} {message}", indicator(warning.severity));
        }
        let count = |s: Severity| warnings.iter().filter(|w| w.severity == s).count();
        println!(
            "{} warning(s), {} suggestion(s)",
            count(Severity::Warning),
            count(Severity::Suggestion)
        );
        Ok(())
    }
}

fn indicator(severity: Severity) -> String {
    match severity {
        Severity::Warning => "▲".yellow().bold().to_string(),
        Severity::Suggestion => "●".cyan().bold().to_string(),
    }
}

fn print_json(renderer: &Renderer, warnings: &[Warning]) -> Result<()> {
    let payload = warnings
        .iter()
        .map(|w| -> Result<WarningJson<'_>> {
            Ok(WarningJson {
                id: &w.id,
                severity: w.severity.as_str(),
                key: w.key.as_str(),
                message: renderer.message(w)?,
                slots: w.slots.iter().map(|s| s + 1).collect(),
                params: &w.params,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    println!(
        "{}",
        serde_json::to_string_pretty(&payload).context("failed to serialize warnings JSON")?
    );
    Ok(())
}
