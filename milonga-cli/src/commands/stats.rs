//! `milonga stats <plan>`

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use milonga_advisor::stats::pattern_mismatches;
use milonga_advisor::{set_stats, SetStats};

use super::Session;
use crate::GlobalArgs;

#[derive(Args, Debug)]
pub struct StatsArgs {
    pub plan: String,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct StatsJson {
    #[serde(flatten)]
    stats: SetStats,
    duration: String,
    /// 1-based slots whose type breaks the TTVTTM rotation.
    pattern_mismatches: Vec<usize>,
}

#[derive(Tabled)]
struct ShareRow {
    #[tabled(rename = "")]
    label: String,
    #[tabled(rename = "tandas")]
    count: usize,
    #[tabled(rename = "share")]
    percent: String,
}

impl StatsArgs {
    pub fn run(self, global: &GlobalArgs) -> Result<()> {
        let session = Session::open(global)?;
        let program = session.load(&self.plan)?;
        let slots = program.slots();
        let stats = set_stats(&slots);
        let mismatches: Vec<usize> = pattern_mismatches(&slots).into_iter().map(|i| i + 1).collect();

        if self.json {
            let payload = StatsJson {
                duration: stats.duration_label(),
                stats,
                pattern_mismatches: mismatches,
            };
            println!(
                "{}",
                serde_json::to_string_pretty(&payload).context("failed to serialize stats JSON")?
            );
            return Ok(());
        }

        println!("{}", program.set.name.bold());
        println!("Slots filled:       {}/{}", stats.filled, stats.total);
        println!("Estimated duration: {}", stats.duration_label());
        match stats.average_energy {
            Some(avg) => println!("Average energy:     {avg:.1}"),
            None => println!("Average energy:     -"),
        }
        println!("Orchestras:         {}", stats.unique_orchestras);

        if stats.filled == 0 {
            return Ok(());
        }

        let types: Vec<ShareRow> = stats
            .types
            .iter()
            .map(|t| ShareRow {
                label: t.tanda_type.as_str().to_string(),
                count: t.count,
                percent: format!("{:.0}%", t.percent.round()),
            })
            .collect();
        let mut table = Table::new(types);
        table.with(Style::rounded());
        println!("{table}");

        if !stats.styles.is_empty() {
            let styles: Vec<ShareRow> = stats
                .styles
                .iter()
                .map(|s| ShareRow {
                    label: s.style.label(),
                    count: s.count,
                    percent: format!("{:.0}%", s.percent.round()),
                })
                .collect();
            let mut table = Table::new(styles);
            table.with(Style::rounded());
            println!("{table}");
        }

        if mismatches.is_empty() {
            println!("{} Timeline follows TTVTTM", "✓".green().bold());
        } else {
            let listed: Vec<String> = mismatches.iter().map(ToString::to_string).collect();
            println!(
                "{} Off the TTVTTM rotation at slot(s) {}",
                "●".cyan().bold(),
                listed.join(", ")
            );
        }
        Ok(())
    }
}
