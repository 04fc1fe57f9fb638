//! `milonga tanda add|place|unplace|move|delete`

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use milonga_advisor::{resolve, Selection, TandaRequest};
use milonga_core::types::{TandaMode, TandaType};
use milonga_core::{name_to_id, Catalog, OrchestraId};

use super::plan::orchestra_label;
use super::{slot_index, Session};
use crate::GlobalArgs;

#[derive(Subcommand, Debug)]
pub enum TandaCommand {
    /// Create a tanda in the plan's library, optionally placing it.
    Add(AddArgs),

    /// Put a library tanda into an empty slot.
    Place {
        plan: String,
        /// Tanda id or a unique prefix of it.
        tanda: String,
        slot: usize,
    },

    /// Return the tanda in a slot to the library.
    Unplace { plan: String, slot: usize },

    /// Move a slot's tanda; an occupied target swaps the two.
    Move { plan: String, from: usize, to: usize },

    /// Remove a tanda from the plan entirely.
    Delete {
        plan: String,
        /// Tanda id or a unique prefix of it.
        tanda: String,
    },
}

#[derive(Args, Debug)]
pub struct AddArgs {
    pub plan: String,

    /// Catalog id (e.g. `di_sarli`) or full orchestra name.
    pub orchestra: String,

    /// Selects the profile featuring this singer.
    #[arg(long)]
    pub singer: Option<String>,

    #[arg(long = "type", short = 't', value_name = "TYPE", default_value = "tango")]
    pub tanda_type: TandaType,

    /// 3 or 4. Defaults to the configured track count.
    #[arg(long)]
    pub tracks: Option<u8>,

    /// Replaces the computed energy (1-10, half points).
    #[arg(long)]
    pub energy: Option<f64>,

    /// More orchestras for a mixed tanda, as `id` or `id:Singer`.
    #[arg(long, num_args = 1.., value_name = "ORCH[:SINGER]")]
    pub mix: Vec<Selection>,

    /// Place the new tanda in this slot.
    #[arg(long)]
    pub place: Option<usize>,
}

pub fn run(cmd: TandaCommand, global: &GlobalArgs) -> Result<()> {
    let session = Session::open(global)?;
    match cmd {
        TandaCommand::Add(args) => add(&session, args),
        TandaCommand::Place { plan, tanda, slot } => {
            let mut program = session.load(&plan)?;
            let id = program.resolve_id(&tanda)?;
            program.place(&id, slot_index(slot)?)?;
            session.save(&plan, &program)?;
            println!("✓ Placed {} in slot {slot}", id.short());
            Ok(())
        }
        TandaCommand::Unplace { plan, slot } => {
            let mut program = session.load(&plan)?;
            let id = program.unplace_slot(slot_index(slot)?)?;
            session.save(&plan, &program)?;
            println!("✓ Slot {slot} cleared; {} is back in the library", id.short());
            Ok(())
        }
        TandaCommand::Move { plan, from, to } => {
            let mut program = session.load(&plan)?;
            program.move_slot(slot_index(from)?, slot_index(to)?)?;
            session.save(&plan, &program)?;
            println!("✓ Moved slot {from} to slot {to}");
            Ok(())
        }
        TandaCommand::Delete { plan, tanda } => {
            let mut program = session.load(&plan)?;
            let id = program.resolve_id(&tanda)?;
            let removed = program.delete_tanda(&id)?;
            session.save(&plan, &program)?;
            println!("✓ Deleted {} ({})", removed.id.short(), removed.tanda_type);
            Ok(())
        }
    }
}

/// Accept a catalog id as-is, or match a typed-out orchestra name.
pub(crate) fn orchestra_id(catalog: &Catalog, raw: &str) -> OrchestraId {
    let id = OrchestraId::from(raw.trim());
    if catalog.orchestra(&id).is_some() {
        return id;
    }
    let wanted = name_to_id(raw);
    catalog
        .orchestras
        .iter()
        .find(|o| name_to_id(&o.name) == wanted)
        .map(|o| o.id.clone())
        .unwrap_or(wanted)
}

fn add(session: &Session, args: AddArgs) -> Result<()> {
    let catalog = session.catalog()?;
    let mut program = session.load(&args.plan)?;

    let primary = Selection {
        orchestra: orchestra_id(&catalog, &args.orchestra),
        singer: args.singer.clone(),
    };
    let mut request = if args.mix.is_empty() {
        TandaRequest::standard(primary, args.tanda_type)
    } else {
        let mut selections = vec![primary];
        selections.extend(args.mix.into_iter().map(|s| Selection {
            orchestra: orchestra_id(&catalog, s.orchestra.as_str()),
            singer: s.singer,
        }));
        TandaRequest::mixed(selections, args.tanda_type)
    };
    request.track_count = args.tracks.unwrap_or(session.config.default_track_count);
    request.energy_override = args.energy;

    let new = resolve(&request, &catalog).context("cannot build tanda")?;
    let id = program.add_tanda(new);
    if let Some(slot) = args.place {
        program.place(&id, slot_index(slot)?)?;
    }
    session.save(&args.plan, &program)?;

    let tanda = program.tanda(&id).context("tanda vanished after add")?;
    let kind = match tanda.mode {
        TandaMode::Standard => "",
        TandaMode::Mixed => " mixed",
    };
    println!(
        "✓ Added{kind} tanda {}: [{}] {} | Energy: {:.1}",
        id.short(),
        tanda.tanda_type.as_str().to_uppercase(),
        orchestra_label(tanda, &catalog),
        tanda.energy
    );
    match args.place {
        Some(slot) => println!("  Placed in slot {slot}"),
        None => println!(
            "  In the library; place it with `milonga tanda place {} {} <slot>`",
            args.plan,
            id.short()
        ),
    }
    Ok(())
}
