//! `milonga export <plan> --format text|json|svg [--output FILE]`

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};

use milonga_advisor::curve_points;
use milonga_core::store;

use super::Session;
use crate::GlobalArgs;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    /// One line per slot with cortinas between.
    Text,
    /// Portable set file, readable by `milonga import`.
    Json,
    /// Energy curve image.
    Svg,
}

#[derive(Args, Debug)]
pub struct ExportArgs {
    pub plan: String,

    #[arg(long, short = 'f', value_enum, default_value_t = ExportFormat::Text)]
    pub format: ExportFormat,

    /// Write here instead of stdout.
    #[arg(long, short = 'o', value_name = "FILE")]
    pub output: Option<PathBuf>,
}

impl ExportArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<()> {
        let session = Session::open(global)?;
        let program = session.load(&self.plan)?;

        let rendered = match self.format {
            ExportFormat::Text => {
                let catalog = session.catalog()?;
                session.renderer()?.program_text(&program, &catalog)?
            }
            ExportFormat::Json => {
                let mut json = store::export_set_json(&program)
                    .with_context(|| format!("failed to export '{}'", self.plan))?;
                json.push('\n');
                json
            }
            ExportFormat::Svg => {
                let slots = program.slots();
                session
                    .renderer()?
                    .energy_curve_svg(&curve_points(&slots), slots.len())?
            }
        };

        match &self.output {
            Some(path) => {
                std::fs::write(path, &rendered)
                    .with_context(|| format!("failed to write {}", path.display()))?;
                eprintln!("✓ Wrote {}", path.display());
            }
            None => print!("{rendered}"),
        }
        Ok(())
    }
}
