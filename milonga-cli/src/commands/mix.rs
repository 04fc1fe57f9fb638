//! `milonga mix <orch[:singer]> <orch[:singer]> ...`

use anyhow::{bail, Result};
use clap::Args;
use colored::Colorize;

use milonga_advisor::compat::energy_spread;
use milonga_advisor::energy::tanda_energy;
use milonga_advisor::{era_bracket, validate_mix, Selection};
use milonga_core::types::{OrchestraId, OrchestraProfile, TandaType};

use super::tanda::orchestra_id;
use super::Session;
use crate::GlobalArgs;

#[derive(Args, Debug)]
pub struct MixArgs {
    /// Two or more `id` or `id:Singer` selections.
    #[arg(num_args = 2.., required = true, value_name = "ORCH[:SINGER]")]
    pub selections: Vec<Selection>,

    /// Tanda type used for the combined energy.
    #[arg(long = "type", short = 't', value_name = "TYPE", default_value = "tango")]
    pub tanda_type: TandaType,
}

impl MixArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<()> {
        let catalog = Session::open(global)?.catalog()?;

        let mut profiles: Vec<&OrchestraProfile> = Vec::with_capacity(self.selections.len());
        let mut seen: Vec<OrchestraId> = Vec::with_capacity(self.selections.len());
        for selection in &self.selections {
            let id = orchestra_id(&catalog, selection.orchestra.as_str());
            if seen.contains(&id) {
                bail!("{id} is listed more than once; a mixed tanda blends different orchestras");
            }
            seen.push(id.clone());
            let Some(profile) = catalog.profile(&id, selection.singer.as_deref()) else {
                bail!("no catalog profile for '{selection}'");
            };
            println!(
                "  {:<28} {:<16} {:<12} energy {:.1}",
                catalog.display_name(&id),
                profile.style.label(),
                era_bracket(&profile.era).as_str(),
                profile.energy
            );
            profiles.push(profile);
        }

        let issues = validate_mix(&profiles);
        if !issues.is_empty() {
            for issue in &issues {
                println!("{} {issue}", "✗".red().bold());
            }
            bail!("these orchestras cannot share a mixed tanda");
        }

        println!(
            "{} Compatible (energy spread {:.1})",
            "✓".green().bold(),
            energy_spread(&profiles)
        );
        if let Some(energy) = tanda_energy(&profiles, self.tanda_type) {
            println!("  {} tanda energy: {energy:.1}", self.tanda_type);
        }
        Ok(())
    }
}
