pub mod catalog;
pub mod check;
pub mod energy;
pub mod export;
pub mod import;
pub mod mix;
pub mod plan;
pub mod stats;
pub mod tanda;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use milonga_core::types::PlanName;
use milonga_core::{config, store, Catalog, Config, Program};
use milonga_renderer::{user_template_dir_at, Renderer};

use crate::GlobalArgs;

/// Home directory, config and catalog choice shared by every command.
pub struct Session {
    pub home: PathBuf,
    pub config: Config,
    catalog_path: Option<PathBuf>,
}

impl Session {
    pub fn open(global: &GlobalArgs) -> Result<Self> {
        let home = dirs::home_dir().context("could not determine home directory")?;
        let config = config::load_at(&home).context("failed to read ~/.milonga/config.yaml")?;
        let catalog_path = global.catalog.clone().or_else(|| config.catalog_path.clone());
        tracing::debug!(home = %home.display(), catalog = ?catalog_path, "session opened");
        Ok(Session {
            home,
            config,
            catalog_path,
        })
    }

    pub fn catalog(&self) -> Result<Catalog> {
        Catalog::resolve(self.catalog_path.as_deref()).context("failed to load orchestra catalog")
    }

    pub fn renderer(&self) -> Result<Renderer> {
        let dir = user_template_dir_at(&self.home);
        Renderer::with_overrides(&dir)
            .with_context(|| format!("failed to load templates from {}", dir.display()))
    }

    pub fn load(&self, plan: &str) -> Result<Program> {
        store::load_plan_at(&self.home, &PlanName::from(plan))
            .with_context(|| format!("failed to load plan '{plan}' (create it with `milonga plan new {plan}`)"))
    }

    pub fn save(&self, plan: &str, program: &Program) -> Result<()> {
        store::save_plan_at(&self.home, &PlanName::from(plan), program)
            .with_context(|| format!("failed to save plan '{plan}'"))
    }
}

/// 1-based slot from the command line to a timeline index.
pub fn slot_index(slot: usize) -> Result<usize> {
    if slot == 0 {
        bail!("slots are numbered from 1");
    }
    Ok(slot - 1)
}
