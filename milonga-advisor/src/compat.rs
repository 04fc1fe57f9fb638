//! Compatibility rules for mixed tandas.
//!
//! [`validate_mix`] returns every problem it finds as a value. It never
//! fails; callers decide whether a non-empty list blocks creation.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use thiserror::Error;

use milonga_core::types::{OrchestraProfile, StyleCategory};

/// Fewest profiles a mixed tanda may combine.
pub const MIN_MIX_PROFILES: usize = 2;

/// Largest allowed gap between any two base energies in a mix.
pub const MAX_ENERGY_SPREAD: f64 = 1.0;

/// Coarse historical period, keyed on the first four-digit year of an era.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EraBracket {
    PreGolden,
    GoldenEarly,
    GoldenLate,
    PostGolden,
    Modern,
    Unknown,
}

impl EraBracket {
    pub fn as_str(&self) -> &'static str {
        match self {
            EraBracket::PreGolden => "pre_golden",
            EraBracket::GoldenEarly => "golden_early",
            EraBracket::GoldenLate => "golden_late",
            EraBracket::PostGolden => "post_golden",
            EraBracket::Modern => "modern",
            EraBracket::Unknown => "unknown",
        }
    }

    fn from_year(year: u32) -> Self {
        match year {
            0..=1934 => EraBracket::PreGolden,
            1935..=1944 => EraBracket::GoldenEarly,
            1945..=1959 => EraBracket::GoldenLate,
            1960..=1989 => EraBracket::PostGolden,
            _ => EraBracket::Modern,
        }
    }
}

impl fmt::Display for EraBracket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn year_pattern() -> Option<&'static Regex> {
    static YEAR: OnceLock<Option<Regex>> = OnceLock::new();
    YEAR.get_or_init(|| Regex::new(r"[0-9]{4}").ok()).as_ref()
}

/// Bracket of a free-text era such as `1935-1945` or `c. 1950s`.
///
/// Strings without a four-digit run map to [`EraBracket::Unknown`].
pub fn era_bracket(era: &str) -> EraBracket {
    year_pattern()
        .and_then(|re| re.find(era))
        .and_then(|m| m.as_str().parse::<u32>().ok())
        .map(EraBracket::from_year)
        .unwrap_or(EraBracket::Unknown)
}

/// Two unknown brackets compare equal and are therefore compatible.
pub fn same_era_bracket(a: &str, b: &str) -> bool {
    era_bracket(a) == era_bracket(b)
}

/// One reason a set of profiles cannot form a mixed tanda.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MixIssue {
    #[error("a mixed tanda needs at least {required} orchestras, got {found}")]
    TooFew { required: usize, found: usize },

    #[error("style {found} does not match {expected}")]
    StyleMismatch {
        index: usize,
        expected: StyleCategory,
        found: StyleCategory,
    },

    #[error("era bracket {found} does not match {expected}")]
    EraMismatch {
        index: usize,
        expected: EraBracket,
        found: EraBracket,
    },

    #[error("energy spread {spread:.1} exceeds {max:.1}")]
    EnergySpread { spread: f64, max: f64 },
}

/// Check whether `profiles` may be combined into one mixed tanda.
///
/// Fewer than two profiles yields only [`MixIssue::TooFew`]. Otherwise the
/// style, era and energy checks all run; each reports at most one issue,
/// naming the first profile that disagrees with the first.
pub fn validate_mix(profiles: &[&OrchestraProfile]) -> Vec<MixIssue> {
    if profiles.len() < MIN_MIX_PROFILES {
        return vec![MixIssue::TooFew {
            required: MIN_MIX_PROFILES,
            found: profiles.len(),
        }];
    }

    let mut issues = Vec::new();
    let first = profiles[0];

    if let Some((index, p)) = profiles
        .iter()
        .enumerate()
        .skip(1)
        .find(|(_, p)| p.style != first.style)
    {
        issues.push(MixIssue::StyleMismatch {
            index,
            expected: first.style,
            found: p.style,
        });
    }

    let expected = era_bracket(&first.era);
    if let Some((index, found)) = profiles
        .iter()
        .enumerate()
        .skip(1)
        .map(|(i, p)| (i, era_bracket(&p.era)))
        .find(|(_, b)| *b != expected)
    {
        issues.push(MixIssue::EraMismatch {
            index,
            expected,
            found,
        });
    }

    let spread = energy_spread(profiles);
    if spread > MAX_ENERGY_SPREAD {
        issues.push(MixIssue::EnergySpread {
            spread,
            max: MAX_ENERGY_SPREAD,
        });
    }

    issues
}

/// Largest pairwise difference between base energies.
pub fn energy_spread(profiles: &[&OrchestraProfile]) -> f64 {
    let mut energies = profiles.iter().map(|p| p.energy);
    let Some(first) = energies.next() else {
        return 0.0;
    };
    let (lo, hi) = energies.fold((first, first), |(lo, hi), e| (lo.min(e), hi.max(e)));
    hi - lo
}
