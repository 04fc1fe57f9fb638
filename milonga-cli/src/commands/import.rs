//! `milonga import <file.json> [--name NAME]`

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use milonga_core::store;
use milonga_core::types::PlanName;

use super::Session;
use crate::GlobalArgs;

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// A file written by `milonga export --format json`.
    pub file: PathBuf,

    /// Plan name to store under. Defaults to the file name without extension.
    #[arg(long)]
    pub name: Option<String>,
}

impl ImportArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<()> {
        let session = Session::open(global)?;
        let json = std::fs::read_to_string(&self.file)
            .with_context(|| format!("cannot read {}", self.file.display()))?;
        let program = store::import_set_json(&json)
            .with_context(|| format!("cannot import {}", self.file.display()))?;

        let name = match self.name {
            Some(name) => PlanName::from(name),
            None => self
                .file
                .file_stem()
                .and_then(|s| s.to_str())
                .map(PlanName::from)
                .context("cannot derive a plan name from the file; pass --name")?,
        };
        store::create_plan_at(&session.home, &name, &program)
            .with_context(|| format!("failed to create plan '{name}'"))?;

        let placed = program.slots().iter().flatten().count();
        println!("✓ Imported '{}' as plan '{name}'", program.set.name);
        println!("  {} tandas, {placed} placed", program.tandas.len());
        Ok(())
    }
}
