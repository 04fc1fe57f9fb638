//! `milonga energy <base> <type>`

use anyhow::Result;
use clap::Args;

use milonga_advisor::energy::{compute_energy_named, modifier_for_name};
use milonga_core::types::TandaType;

use super::Session;
use crate::GlobalArgs;

#[derive(Args, Debug)]
pub struct EnergyArgs {
    /// Base energy of the orchestra profile (1-10).
    #[arg(allow_negative_numbers = true)]
    pub base: f64,

    /// tango, vals or milonga. Anything else adds nothing.
    #[arg(value_name = "TYPE")]
    pub tanda_type: String,
}

impl EnergyArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<()> {
        let energy = compute_energy_named(self.base, &self.tanda_type);
        let modifier = modifier_for_name(&self.tanda_type);
        println!("{energy:.1}");
        println!("  base {:.1} {:+.1} ({})", self.base, modifier, self.tanda_type);

        if let Ok(tanda_type) = self.tanda_type.parse::<TandaType>() {
            let catalog = Session::open(global)?.catalog()?;
            if let Some(notes) = catalog.type_notes(tanda_type).filter(|n| !n.is_empty()) {
                println!("  {notes}");
            }
        } else {
            tracing::debug!(tanda_type = %self.tanda_type, "not a tanda type; no modifier");
        }
        Ok(())
    }
}
