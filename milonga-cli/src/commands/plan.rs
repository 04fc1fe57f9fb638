//! `milonga plan new|list|show|slots`

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate, NaiveTime};
use clap::{Args, Subcommand};
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use milonga_advisor::stats::expected_type;
use milonga_advisor::slot_times;
use milonga_core::types::{hhmm, PlanName, Tanda, TandaType};
use milonga_core::{store, Catalog, Program};

use super::Session;
use crate::GlobalArgs;

#[derive(Subcommand, Debug)]
pub enum PlanCommand {
    /// Create an empty plan.
    New(NewArgs),

    /// List saved plans.
    List,

    /// Timeline with start times, pattern marks and the tanda library.
    Show(ShowArgs),

    /// Change how many slots the timeline has (4-30).
    Slots {
        plan: String,
        count: usize,
    },
}

#[derive(Args, Debug)]
pub struct NewArgs {
    /// Plan name; becomes ~/.milonga/plans/<name>.yaml.
    pub name: String,

    /// Display title of the set. Defaults to the plan name.
    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub venue: Option<String>,

    /// YYYY-MM-DD. Defaults to today.
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// HH:MM. Defaults to the configured start time.
    #[arg(long, value_parser = parse_time)]
    pub start: Option<NaiveTime>,

    /// Defaults to the configured slot count.
    #[arg(long)]
    pub slots: Option<usize>,
}

#[derive(Args, Debug)]
pub struct ShowArgs {
    pub plan: String,

    /// Only list library tandas of this type.
    #[arg(long = "type", short = 't', value_name = "TYPE")]
    pub tanda_type: Option<TandaType>,

    /// Only list library tandas whose orchestra or singer contains this.
    #[arg(long, short = 's')]
    pub search: Option<String>,
}

fn parse_time(raw: &str) -> std::result::Result<NaiveTime, String> {
    hhmm::parse(raw).map_err(|_| format!("invalid time '{raw}'; expected HH:MM"))
}

pub fn run(cmd: PlanCommand, global: &GlobalArgs) -> Result<()> {
    let session = Session::open(global)?;
    match cmd {
        PlanCommand::New(args) => new(&session, args),
        PlanCommand::List => list(&session),
        PlanCommand::Show(args) => show(&session, args),
        PlanCommand::Slots { plan, count } => slots(&session, &plan, count),
    }
}

fn new(session: &Session, args: NewArgs) -> Result<()> {
    let name = PlanName::from(args.name.clone());
    let program = Program::new(
        args.title.unwrap_or_else(|| args.name.clone()),
        args.venue,
        args.date.unwrap_or_else(|| Local::now().date_naive()),
        args.start.unwrap_or(session.config.default_start_time),
        args.slots.unwrap_or(session.config.default_slots),
    );
    store::create_plan_at(&session.home, &name, &program)
        .with_context(|| format!("failed to create plan '{name}'"))?;

    println!("✓ Created plan '{}' ({} slots)", name, program.slot_count);
    println!("  Saved to: ~/.milonga/plans/{name}.yaml");
    Ok(())
}

#[derive(Tabled)]
struct PlanRow {
    #[tabled(rename = "plan")]
    plan: String,
    #[tabled(rename = "set")]
    set: String,
    #[tabled(rename = "date")]
    date: String,
    #[tabled(rename = "start")]
    start: String,
    #[tabled(rename = "filled")]
    filled: String,
}

fn list(session: &Session) -> Result<()> {
    let names = store::list_plans_at(&session.home).context("failed to list plans")?;
    if names.is_empty() {
        println!("No plans yet.");
        println!("Run: milonga plan new <name>");
        return Ok(());
    }

    let rows: Vec<PlanRow> = names
        .into_iter()
        .map(|name| match store::load_plan_at(&session.home, &name) {
            Ok(p) => {
                let filled = p.slots().iter().flatten().count();
                PlanRow {
                    plan: name.0,
                    set: p.set.name.clone(),
                    date: p.set.date.to_string(),
                    start: p.set.start_time.format("%H:%M").to_string(),
                    filled: format!("{filled}/{}", p.slot_count),
                }
            }
            Err(err) => {
                tracing::warn!(plan = %name, error = %err, "unreadable plan");
                PlanRow {
                    plan: name.0,
                    set: "(unreadable)".red().to_string(),
                    date: String::new(),
                    start: String::new(),
                    filled: String::new(),
                }
            }
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
    Ok(())
}

#[derive(Tabled)]
struct SlotRow {
    #[tabled(rename = "#")]
    slot: usize,
    #[tabled(rename = "time")]
    time: String,
    #[tabled(rename = "type")]
    tanda_type: String,
    #[tabled(rename = "orchestra")]
    orchestra: String,
    #[tabled(rename = "singer")]
    singer: String,
    #[tabled(rename = "energy")]
    energy: String,
    #[tabled(rename = "tracks")]
    tracks: String,
    #[tabled(rename = "TTVTTM")]
    pattern: String,
}

#[derive(Tabled)]
struct LibraryRow {
    #[tabled(rename = "id")]
    id: String,
    #[tabled(rename = "type")]
    tanda_type: String,
    #[tabled(rename = "orchestra")]
    orchestra: String,
    #[tabled(rename = "singer")]
    singer: String,
    #[tabled(rename = "energy")]
    energy: String,
}

/// Orchestra names of a tanda, joined for mixed ones.
pub(crate) fn orchestra_label(tanda: &Tanda, catalog: &Catalog) -> String {
    tanda
        .orchestras()
        .into_iter()
        .map(|id| catalog.display_name(id))
        .collect::<Vec<_>>()
        .join(" + ")
}

fn show(session: &Session, args: ShowArgs) -> Result<()> {
    let program = session.load(&args.plan)?;
    let catalog = session.catalog()?;
    let slots = program.slots();
    let times = slot_times(program.set.start_time, &slots);

    let set = &program.set;
    println!("{}", set.name.bold());
    if let Some(venue) = &set.venue {
        println!("Venue: {venue}");
    }
    println!("Date: {} | Start: {}", set.date, set.start_time.format("%H:%M"));

    let rows: Vec<SlotRow> = slots
        .iter()
        .zip(&times)
        .enumerate()
        .map(|(i, (slot, at))| {
            let expected = expected_type(i);
            match slot {
                Some(t) => SlotRow {
                    slot: i + 1,
                    time: at.format("%H:%M").to_string(),
                    tanda_type: t.tanda_type.as_str().to_uppercase(),
                    orchestra: orchestra_label(t, &catalog),
                    singer: t.singer.clone().unwrap_or_default(),
                    energy: format!("{:.1}", t.energy),
                    tracks: t.track_count.to_string(),
                    pattern: if t.tanda_type == expected {
                        expected.letter().to_string().green().to_string()
                    } else {
                        format!("{} (expected {})", t.tanda_type.letter(), expected.letter())
                            .yellow()
                            .to_string()
                    },
                },
                None => SlotRow {
                    slot: i + 1,
                    time: at.format("%H:%M").to_string(),
                    tanda_type: "-".to_string(),
                    orchestra: "(empty)".bright_black().to_string(),
                    singer: String::new(),
                    energy: String::new(),
                    tracks: String::new(),
                    pattern: expected.letter().to_string().bright_black().to_string(),
                },
            }
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");

    let filtered = args.tanda_type.is_some() || args.search.is_some();
    let library = program.library_filtered(args.tanda_type, args.search.as_deref(), |t| {
        orchestra_label(t, &catalog)
    });
    if library.is_empty() {
        if filtered {
            println!("Library: no matching tandas");
        } else {
            println!("Library: empty");
        }
        return Ok(());
    }
    println!("{}", "Library".bold());
    let rows: Vec<LibraryRow> = library
        .into_iter()
        .map(|t| LibraryRow {
            id: t.id.short().to_string(),
            tanda_type: t.tanda_type.as_str().to_uppercase(),
            orchestra: orchestra_label(t, &catalog),
            singer: t.singer.clone().unwrap_or_default(),
            energy: format!("{:.1}", t.energy),
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
    Ok(())
}

fn slots(session: &Session, plan: &str, count: usize) -> Result<()> {
    let mut program = session.load(plan)?;
    let applied = program.set_slot_count(count);
    session.save(plan, &program)?;

    println!("✓ '{plan}' now has {applied} slots");
    let hidden = program
        .tandas
        .iter()
        .filter(|t| t.position.is_some_and(|p| p >= applied))
        .count();
    if hidden > 0 {
        println!(
            "  {} {hidden} placed tanda(s) sit beyond slot {applied} and are hidden until the timeline grows",
            "!".yellow().bold()
        );
    }
    Ok(())
}
