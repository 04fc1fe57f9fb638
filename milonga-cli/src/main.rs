//! Milonga: tango DJ set planning from the terminal.
//!
//! # Usage
//!
//! ```text
//! milonga plan new <name> [--venue V] [--date YYYY-MM-DD] [--start HH:MM] [--slots N]
//! milonga plan list | show <name> [--type T] [--search Q] | slots <name> <N>
//! milonga tanda add <plan> <orchestra> [--singer S] [--type T] [--tracks N] [--energy E]
//!                   [--mix orch[:singer] ...] [--place SLOT]
//! milonga tanda place <plan> <tanda-id> <slot>
//! milonga tanda unplace <plan> <slot>
//! milonga tanda move <plan> <from> <to>
//! milonga tanda delete <plan> <tanda-id>
//! milonga check <plan> [--json]
//! milonga stats <plan> [--json]
//! milonga export <plan> --format text|json|svg [--output FILE]
//! milonga import <file.json> [--name NAME]
//! milonga catalog list [--search Q] [--style S] [--min-energy E] [--max-energy E]
//! milonga catalog show <orchestra-id>
//! milonga energy <base> <type>
//! milonga mix <orch[:singer]> <orch[:singer]> ...
//! ```
//!
//! Slots on the command line count from 1.

mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use commands::{
    catalog::CatalogCommand, check::CheckArgs, energy::EnergyArgs, export::ExportArgs,
    import::ImportArgs, mix::MixArgs, plan::PlanCommand, stats::StatsArgs, tanda::TandaCommand,
};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "milonga",
    version,
    about = "Plan tango DJ sets: tandas, timeline, energy and advice",
    long_about = None,
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Flags accepted by every subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Orchestra catalog YAML to use instead of the configured or bundled one.
    #[arg(long, global = true, value_name = "FILE")]
    pub catalog: Option<PathBuf>,

    /// Log debug output to stderr.
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create, list and inspect plans.
    Plan {
        #[command(subcommand)]
        command: PlanCommand,
    },

    /// Build tandas and arrange them on the timeline.
    Tanda {
        #[command(subcommand)]
        command: TandaCommand,
    },

    /// Run the advisory rules over a plan's timeline.
    Check(CheckArgs),

    /// Duration, energy and type distribution of a plan.
    Stats(StatsArgs),

    /// Write a plan as text, JSON or an SVG energy curve.
    Export(ExportArgs),

    /// Create a plan from an exported JSON set.
    Import(ImportArgs),

    /// Browse the orchestra catalog.
    Catalog {
        #[command(subcommand)]
        command: CatalogCommand,
    },

    /// Energy of a tanda type for a given base energy.
    Energy(EnergyArgs),

    /// Check whether orchestras can share a mixed tanda.
    Mix(MixArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.global.verbose);
    let global = &cli.global;
    match cli.command {
        Commands::Plan { command } => commands::plan::run(command, global),
        Commands::Tanda { command } => commands::tanda::run(command, global),
        Commands::Check(args) => args.run(global),
        Commands::Stats(args) => args.run(global),
        Commands::Export(args) => args.run(global),
        Commands::Import(args) => args.run(global),
        Commands::Catalog { command } => commands::catalog::run(command, global),
        Commands::Energy(args) => args.run(global),
        Commands::Mix(args) => args.run(global),
    }
}
