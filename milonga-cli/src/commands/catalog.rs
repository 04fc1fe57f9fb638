//! `milonga catalog list|show`

use anyhow::{bail, Result};
use clap::{Args, Subcommand};
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use milonga_advisor::era_bracket;
use milonga_core::types::{Orchestra, StyleCategory};
use milonga_core::{Catalog, CatalogFilter, CatalogSource};

use super::tanda::orchestra_id;
use super::Session;
use crate::GlobalArgs;

#[derive(Subcommand, Debug)]
pub enum CatalogCommand {
    /// Orchestras matching every given filter.
    List(ListArgs),

    /// Profiles, singers and DJ notes for one orchestra.
    Show {
        /// Catalog id or full name.
        orchestra: String,
    },
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Substring of the name or nickname.
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Style tag, e.g. `harder_rhythmic` or "Harder Rhythmic".
    #[arg(long)]
    pub style: Option<StyleCategory>,

    #[arg(long, value_name = "E")]
    pub min_energy: Option<f64>,

    #[arg(long, value_name = "E")]
    pub max_energy: Option<f64>,
}

pub fn run(cmd: CatalogCommand, global: &GlobalArgs) -> Result<()> {
    let session = Session::open(global)?;
    let catalog = session.catalog()?;
    if let CatalogSource::File(path) = &catalog.source {
        tracing::debug!(path = %path.display(), "catalog from file");
    }
    match cmd {
        CatalogCommand::List(args) => list(&catalog, args),
        CatalogCommand::Show { orchestra } => show(&catalog, &orchestra),
    }
}

#[derive(Tabled)]
struct OrchestraRow {
    #[tabled(rename = "id")]
    id: String,
    #[tabled(rename = "name")]
    name: String,
    #[tabled(rename = "style")]
    style: String,
    #[tabled(rename = "energy")]
    energy: String,
    #[tabled(rename = "types")]
    types: String,
}

fn energy_range(orchestra: &Orchestra) -> String {
    let energies = orchestra.profiles.iter().map(|p| p.energy);
    let lo = energies.clone().fold(f64::INFINITY, f64::min);
    let hi = energies.fold(f64::NEG_INFINITY, f64::max);
    if lo == hi {
        format!("{lo}")
    } else {
        format!("{lo}-{hi}")
    }
}

fn styles(orchestra: &Orchestra) -> String {
    let mut labels: Vec<String> = Vec::new();
    for p in &orchestra.profiles {
        let label = p.style.label();
        if !labels.contains(&label) {
            labels.push(label);
        }
    }
    labels.join(", ")
}

fn types(orchestra: &Orchestra) -> String {
    let mut letters: Vec<char> = orchestra
        .profiles
        .iter()
        .flat_map(|p| p.types.iter().map(|t| t.letter()))
        .collect();
    letters.sort_by_key(|c| "TVM".find(*c));
    letters.dedup();
    letters.into_iter().collect()
}

fn list(catalog: &Catalog, args: ListArgs) -> Result<()> {
    let energy = match (args.min_energy, args.max_energy) {
        (None, None) => None,
        (lo, hi) => Some((lo.unwrap_or(f64::NEG_INFINITY), hi.unwrap_or(f64::INFINITY))),
    };
    let filter = CatalogFilter {
        query: args.search,
        style: args.style,
        energy,
    };
    let found = catalog.search(&filter);
    if found.is_empty() {
        println!("No orchestras match.");
        return Ok(());
    }

    let rows: Vec<OrchestraRow> = found
        .into_iter()
        .map(|o| OrchestraRow {
            id: o.id.to_string(),
            name: o.name.clone(),
            style: styles(o),
            energy: energy_range(o),
            types: types(o),
        })
        .collect();
    let count = rows.len();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
    println!("{count} orchestra(s)");
    Ok(())
}

#[derive(Tabled)]
struct ProfileRow {
    #[tabled(rename = "era")]
    era: String,
    #[tabled(rename = "bracket")]
    bracket: String,
    #[tabled(rename = "style")]
    style: String,
    #[tabled(rename = "energy")]
    energy: f64,
    #[tabled(rename = "types")]
    types: String,
    #[tabled(rename = "singers")]
    singers: String,
    #[tabled(rename = "mood")]
    mood: String,
}

fn show(catalog: &Catalog, raw: &str) -> Result<()> {
    let id = orchestra_id(catalog, raw);
    let Some(orchestra) = catalog.orchestra(&id) else {
        bail!("unknown orchestra '{raw}'; try `milonga catalog list --search {raw}`");
    };

    println!("{} ({})", orchestra.name.bold(), orchestra.id);
    if let Some(nickname) = &orchestra.nickname {
        println!("Known as:     {nickname}");
    }
    if let Some(instrument) = &orchestra.instrument {
        println!("Instrument:   {instrument}");
    }
    if let Some(years) = &orchestra.active_years {
        println!("Active:       {years}");
    }
    let singers = catalog.singers(&orchestra.id);
    if !singers.is_empty() {
        println!("Singers:      {}", singers.join(", "));
    }
    if catalog.warm_up_recommendations().iter().any(|o| o.id == orchestra.id) {
        println!("{} Recommended for warm-up", "●".cyan().bold());
    }

    let rows: Vec<ProfileRow> = orchestra
        .profiles
        .iter()
        .map(|p| ProfileRow {
            era: p.era_label.clone().unwrap_or_else(|| p.era.clone()),
            bracket: era_bracket(&p.era).to_string(),
            style: p.style.label(),
            energy: p.energy,
            types: p.types.iter().map(|t| t.letter()).collect(),
            singers: p
                .singer
                .iter()
                .chain(p.key_singers.iter())
                .cloned()
                .collect::<Vec<_>>()
                .join(", "),
            mood: p.mood.clone(),
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");

    for (i, p) in orchestra.profiles.iter().enumerate() {
        if !p.dj_notes.is_empty() {
            println!("{} {}", format!("[{}]", i + 1).bright_black(), p.dj_notes);
        }
    }
    let mut seen = Vec::new();
    for p in &orchestra.profiles {
        if seen.contains(&p.style) {
            continue;
        }
        seen.push(p.style);
        if let Some(description) = catalog.style_description(p.style) {
            println!("{}: {description}", p.style.label().bold());
        }
    }
    Ok(())
}
