//! Advisory engine: programming heuristics over a slot timeline.
//!
//! Each heuristic is a [`Rule`]. [`generate_warnings`] runs every rule in
//! [`Rule::ALL`] order over the same snapshot and concatenates the results,
//! so output order is rule order, then slot order within a rule.
//!
//! Warnings carry a [`MessageKey`] and string params rather than prose; the
//! renderer owns the wording. Slot numbers in params are 1-based, slot
//! indices in [`Warning::slots`] are 0-based.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use milonga_core::catalog::Catalog;
use milonga_core::types::{OrchestraId, Tanda, TandaType};

/// Energy difference between neighbours above which a transition is flagged.
pub const ENERGY_JUMP_LIMIT: f64 = 4.0;

/// Orchestras considered too demanding for the opening slots.
pub const ADVANCED_ORCHESTRAS: [&str; 2] = ["pugliese", "biagi"];

/// Opening slots in which advanced orchestras are flagged.
pub const COMPLEX_EARLY_SLOTS: usize = 3;

/// Most orchestras named by the warm-up suggestion.
pub const WARM_UP_SUGGESTIONS: usize = 3;

/// Appearances of one orchestra above which it counts as overused.
pub const OVERUSE_LIMIT: usize = 3;

/// Healthy share of tango tandas, percent.
pub const TANGO_PERCENT_RANGE: (f64, f64) = (50.0, 75.0);

/// Filled slots needed before the tango share is judged.
pub const TANGO_RATIO_MIN_FILLED: usize = 4;

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Suggestion,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Warning => "warning",
            Severity::Suggestion => "suggestion",
        }
    }
}

/// Identifies the message template for a warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKey {
    BackToBack,
    ConsecutiveType,
    NoValsEarly,
    NoMilongaEarly,
    EnergyJump,
    ComplexEarly,
    SuggestWarmup,
    SuggestCumparsita,
    LowTangoPercent,
    HighTangoPercent,
    Overused,
}

impl MessageKey {
    pub const ALL: [MessageKey; 11] = [
        MessageKey::BackToBack,
        MessageKey::ConsecutiveType,
        MessageKey::NoValsEarly,
        MessageKey::NoMilongaEarly,
        MessageKey::EnergyJump,
        MessageKey::ComplexEarly,
        MessageKey::SuggestWarmup,
        MessageKey::SuggestCumparsita,
        MessageKey::LowTangoPercent,
        MessageKey::HighTangoPercent,
        MessageKey::Overused,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKey::BackToBack => "back_to_back",
            MessageKey::ConsecutiveType => "consecutive_type",
            MessageKey::NoValsEarly => "no_vals_early",
            MessageKey::NoMilongaEarly => "no_milonga_early",
            MessageKey::EnergyJump => "energy_jump",
            MessageKey::ComplexEarly => "complex_early",
            MessageKey::SuggestWarmup => "suggest_warmup",
            MessageKey::SuggestCumparsita => "suggest_cumparsita",
            MessageKey::LowTangoPercent => "low_tango_percent",
            MessageKey::HighTangoPercent => "high_tango_percent",
            MessageKey::Overused => "overused",
        }
    }
}

/// One finding of the advisory engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Warning {
    /// Stable identifier (`back-to-back-3`, `no-vals-early`, ...) for
    /// de-duplication and dismissal.
    pub id: String,
    pub severity: Severity,
    pub key: MessageKey,
    pub params: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub slots: Vec<usize>,
}

impl Warning {
    fn new(id: impl Into<String>, severity: Severity, key: MessageKey) -> Self {
        Warning {
            id: id.into(),
            severity,
            key,
            params: BTreeMap::new(),
            slots: Vec::new(),
        }
    }

    fn param(mut self, name: &str, value: impl ToString) -> Self {
        self.params.insert(name.to_string(), value.to_string());
        self
    }

    fn slots(mut self, slots: impl IntoIterator<Item = usize>) -> Self {
        self.slots = slots.into_iter().collect();
        self
    }
}

// ---------------------------------------------------------------------------
// Rule registry
// ---------------------------------------------------------------------------

/// A single advisory heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    /// Adjacent filled slots from the same orchestra.
    BackToBack,
    /// Three adjacent filled slots of one type.
    ConsecutiveType,
    /// Four or more of the first 8 slots filled, none vals.
    NoValsEarly,
    /// Six or more of the first 10 slots filled, none milonga.
    NoMilongaEarly,
    /// Adjacent filled slots whose energies differ by more than 4.
    EnergyJump,
    /// Advanced orchestra in one of the first 3 slots.
    ComplexEarly,
    /// First two slots empty.
    SuggestWarmup,
    /// Last slot empty.
    SuggestCumparsita,
    /// Tango share of filled slots outside 50–75%.
    TangoRatio,
    /// One orchestra filling more than 3 slots.
    Overuse,
}

impl Rule {
    /// Every rule, in evaluation order.
    pub const ALL: [Rule; 10] = [
        Rule::BackToBack,
        Rule::ConsecutiveType,
        Rule::NoValsEarly,
        Rule::NoMilongaEarly,
        Rule::EnergyJump,
        Rule::ComplexEarly,
        Rule::SuggestWarmup,
        Rule::SuggestCumparsita,
        Rule::TangoRatio,
        Rule::Overuse,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Rule::BackToBack => "back-to-back",
            Rule::ConsecutiveType => "consecutive-type",
            Rule::NoValsEarly => "no-vals-early",
            Rule::NoMilongaEarly => "no-milonga-early",
            Rule::EnergyJump => "energy-jump",
            Rule::ComplexEarly => "complex-early",
            Rule::SuggestWarmup => "suggest-warmup",
            Rule::SuggestCumparsita => "suggest-cumparsita",
            Rule::TangoRatio => "tango-ratio",
            Rule::Overuse => "overused",
        }
    }

    /// Findings of this rule alone.
    pub fn evaluate(&self, slots: &[Option<&Tanda>], catalog: &Catalog) -> Vec<Warning> {
        match self {
            Rule::BackToBack => back_to_back(slots, catalog),
            Rule::ConsecutiveType => consecutive_type(slots),
            Rule::NoValsEarly => opening_lacks(slots, TandaType::Vals, 8, 4)
                .then(|| Warning::new("no-vals-early", Severity::Warning, MessageKey::NoValsEarly))
                .into_iter()
                .collect(),
            Rule::NoMilongaEarly => opening_lacks(slots, TandaType::Milonga, 10, 6)
                .then(|| {
                    Warning::new("no-milonga-early", Severity::Warning, MessageKey::NoMilongaEarly)
                })
                .into_iter()
                .collect(),
            Rule::EnergyJump => energy_jump(slots),
            Rule::ComplexEarly => complex_early(slots, catalog),
            Rule::SuggestWarmup => suggest_warmup(slots, catalog),
            Rule::SuggestCumparsita => suggest_cumparsita(slots),
            Rule::TangoRatio => tango_ratio(slots),
            Rule::Overuse => overuse(slots, catalog),
        }
    }
}

/// Run every rule over `slots` and collect the findings in rule order.
///
/// Pure and deterministic: the same snapshot always yields the same list.
pub fn generate_warnings(slots: &[Option<&Tanda>], catalog: &Catalog) -> Vec<Warning> {
    Rule::ALL
        .iter()
        .flat_map(|rule| rule.evaluate(slots, catalog))
        .collect()
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

fn back_to_back(slots: &[Option<&Tanda>], catalog: &Catalog) -> Vec<Warning> {
    adjacent_pairs(slots)
        .filter(|(_, a, b)| a.orchestra == b.orchestra)
        .map(|(i, a, _)| {
            Warning::new(format!("back-to-back-{i}"), Severity::Warning, MessageKey::BackToBack)
                .param("orchestra", catalog.display_name(&a.orchestra))
                .param("first", i + 1)
                .param("last", i + 2)
                .slots([i, i + 1])
        })
        .collect()
}

fn consecutive_type(slots: &[Option<&Tanda>]) -> Vec<Warning> {
    slots
        .windows(3)
        .enumerate()
        .filter_map(|(i, w)| match w {
            [Some(a), Some(b), Some(c)]
                if a.tanda_type == b.tanda_type && b.tanda_type == c.tanda_type =>
            {
                Some(
                    Warning::new(
                        format!("consecutive-type-{i}"),
                        Severity::Warning,
                        MessageKey::ConsecutiveType,
                    )
                    .param("type", a.tanda_type)
                    .param("first", i + 1)
                    .param("last", i + 3)
                    .slots([i, i + 1, i + 2]),
                )
            }
            _ => None,
        })
        .collect()
}

/// True when the first `window` slots hold at least `min_filled` tandas and
/// none of them is `wanted`.
fn opening_lacks(
    slots: &[Option<&Tanda>],
    wanted: TandaType,
    window: usize,
    min_filled: usize,
) -> bool {
    let opening: Vec<&Tanda> = slots.iter().take(window).flatten().copied().collect();
    opening.len() >= min_filled && !opening.iter().any(|t| t.tanda_type == wanted)
}

fn energy_jump(slots: &[Option<&Tanda>]) -> Vec<Warning> {
    adjacent_pairs(slots)
        .filter(|(_, a, b)| (a.energy - b.energy).abs() > ENERGY_JUMP_LIMIT)
        .map(|(i, a, b)| {
            Warning::new(format!("energy-jump-{i}"), Severity::Warning, MessageKey::EnergyJump)
                .param("from", format!("{:.1}", a.energy))
                .param("to", format!("{:.1}", b.energy))
                .param("first", i + 1)
                .param("last", i + 2)
                .slots([i, i + 1])
        })
        .collect()
}

fn complex_early(slots: &[Option<&Tanda>], catalog: &Catalog) -> Vec<Warning> {
    slots
        .iter()
        .take(COMPLEX_EARLY_SLOTS)
        .enumerate()
        .filter_map(|(i, slot)| slot.map(|t| (i, t)))
        .filter(|(_, t)| ADVANCED_ORCHESTRAS.contains(&t.orchestra.as_str()))
        .map(|(i, t)| {
            Warning::new(format!("complex-early-{i}"), Severity::Warning, MessageKey::ComplexEarly)
                .param("orchestra", catalog.display_name(&t.orchestra))
                .param("slot", i + 1)
                .slots([i])
        })
        .collect()
}

fn suggest_warmup(slots: &[Option<&Tanda>], catalog: &Catalog) -> Vec<Warning> {
    if slots.len() < 2 || slots[..2].iter().any(Option::is_some) {
        return vec![];
    }
    let names: Vec<&str> = catalog
        .warm_up_recommendations()
        .into_iter()
        .take(WARM_UP_SUGGESTIONS)
        .map(|o| o.name.as_str())
        .collect();
    vec![
        Warning::new("suggest-warmup", Severity::Suggestion, MessageKey::SuggestWarmup)
            .param("orchestras", names.join(", ")),
    ]
}

fn suggest_cumparsita(slots: &[Option<&Tanda>]) -> Vec<Warning> {
    match slots.last() {
        Some(None) => vec![Warning::new(
            "suggest-cumparsita",
            Severity::Suggestion,
            MessageKey::SuggestCumparsita,
        )],
        _ => vec![],
    }
}

fn tango_ratio(slots: &[Option<&Tanda>]) -> Vec<Warning> {
    let filled: Vec<&Tanda> = slots.iter().flatten().copied().collect();
    if filled.len() < TANGO_RATIO_MIN_FILLED {
        return vec![];
    }
    let tangos = filled
        .iter()
        .filter(|t| t.tanda_type == TandaType::Tango)
        .count();
    let percent = tangos as f64 / filled.len() as f64 * 100.0;
    let (low, high) = TANGO_PERCENT_RANGE;
    let shown = format!("{:.0}", percent.round());
    if percent < low {
        vec![
            Warning::new("low-tango-percent", Severity::Warning, MessageKey::LowTangoPercent)
                .param("percent", shown),
        ]
    } else if percent > high {
        vec![
            Warning::new("high-tango-percent", Severity::Warning, MessageKey::HighTangoPercent)
                .param("percent", shown),
        ]
    } else {
        vec![]
    }
}

fn overuse(slots: &[Option<&Tanda>], catalog: &Catalog) -> Vec<Warning> {
    let mut order: Vec<&OrchestraId> = Vec::new();
    let mut counts: HashMap<&OrchestraId, usize> = HashMap::new();
    for tanda in slots.iter().flatten() {
        let count = counts.entry(&tanda.orchestra).or_insert(0);
        if *count == 0 {
            order.push(&tanda.orchestra);
        }
        *count += 1;
    }
    order
        .into_iter()
        .filter_map(|id| {
            let count = counts.get(id).copied().unwrap_or(0);
            (count > OVERUSE_LIMIT).then(|| {
                Warning::new(format!("overused-{id}"), Severity::Warning, MessageKey::Overused)
                    .param("orchestra", catalog.display_name(id))
                    .param("count", count)
            })
        })
        .collect()
}

/// `(i, slots[i], slots[i + 1])` for every pair of filled neighbours.
fn adjacent_pairs<'a>(
    slots: &'a [Option<&'a Tanda>],
) -> impl Iterator<Item = (usize, &'a Tanda, &'a Tanda)> + 'a {
    slots
        .windows(2)
        .enumerate()
        .filter_map(|(i, w)| match w {
            [Some(a), Some(b)] => Some((i, *a, *b)),
            _ => None,
        })
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use milonga_core::types::{TandaId, TandaMode};

    fn tanda(orchestra: &str, tanda_type: TandaType, energy: f64) -> Tanda {
        Tanda {
            id: TandaId::from(format!("{orchestra}-{tanda_type}-{energy}")),
            orchestra: OrchestraId::from(orchestra),
            mode: TandaMode::Standard,
            mix: vec![],
            singer: None,
            tanda_type,
            track_count: 4,
            energy,
            position: None,
            style: None,
            era: None,
        }
    }

    fn ids(warnings: &[Warning]) -> Vec<&str> {
        warnings.iter().map(|w| w.id.as_str()).collect()
    }

    #[test]
    fn registry_has_ten_rules_in_order() {
        assert_eq!(Rule::ALL.len(), 10);
        assert_eq!(Rule::ALL[0], Rule::BackToBack);
        assert_eq!(Rule::ALL[9], Rule::Overuse);
    }

    #[test]
    fn empty_timeline_yields_nothing() {
        let catalog = Catalog::from_orchestras(vec![]);
        assert!(generate_warnings(&[], &catalog).is_empty());
    }

    #[test]
    fn single_empty_slot_only_suggests_closer() {
        let catalog = Catalog::from_orchestras(vec![]);
        let warnings = generate_warnings(&[None], &catalog);
        assert_eq!(ids(&warnings), ["suggest-cumparsita"]);
        assert_eq!(warnings[0].severity, Severity::Suggestion);
    }

    #[test]
    fn energy_jump_is_strictly_greater_than_four() {
        let a = tanda("canaro", TandaType::Tango, 3.0);
        let b = tanda("troilo", TandaType::Tango, 7.0);
        let c = tanda("darienzo", TandaType::Milonga, 2.5);
        assert!(energy_jump(&[Some(&a), Some(&b)]).is_empty());
        let w = energy_jump(&[Some(&b), Some(&c)]);
        assert_eq!(ids(&w), ["energy-jump-0"]);
        assert_eq!(w[0].params["from"], "7.0");
        assert_eq!(w[0].params["to"], "2.5");
    }

    #[test]
    fn consecutive_type_ignores_gaps() {
        let t = tanda("canaro", TandaType::Tango, 5.0);
        assert!(consecutive_type(&[Some(&t), Some(&t), None, Some(&t)]).is_empty());
        let w = consecutive_type(&[Some(&t), Some(&t), Some(&t), Some(&t)]);
        assert_eq!(ids(&w), ["consecutive-type-0", "consecutive-type-1"]);
        assert_eq!(w[1].slots, [1, 2, 3]);
        assert_eq!(w[0].params["type"], "tango");
    }

    #[test]
    fn tango_ratio_needs_four_filled() {
        let v = tanda("calo", TandaType::Vals, 4.0);
        assert!(tango_ratio(&[Some(&v), Some(&v), Some(&v)]).is_empty());
        let w = tango_ratio(&[Some(&v), Some(&v), Some(&v), Some(&v)]);
        assert_eq!(ids(&w), ["low-tango-percent"]);
        assert_eq!(w[0].params["percent"], "0");
    }

    #[test]
    fn tango_ratio_boundaries_are_inclusive() {
        let t = tanda("canaro", TandaType::Tango, 5.0);
        let v = tanda("calo", TandaType::Vals, 4.0);
        // 2/4 = 50% and 3/4 = 75% are both healthy.
        assert!(tango_ratio(&[Some(&t), Some(&t), Some(&v), Some(&v)]).is_empty());
        assert!(tango_ratio(&[Some(&t), Some(&t), Some(&t), Some(&v)]).is_empty());
        let w = tango_ratio(&[Some(&t), Some(&t), Some(&t), Some(&t)]);
        assert_eq!(ids(&w), ["high-tango-percent"]);
        assert_eq!(w[0].params["percent"], "100");
    }

    #[test]
    fn overuse_lists_orchestras_in_first_appearance_order() {
        let catalog = Catalog::from_orchestras(vec![]);
        let a = tanda("troilo", TandaType::Tango, 5.0);
        let b = tanda("canaro", TandaType::Tango, 5.0);
        let slots = [
            Some(&a), Some(&b), Some(&a), Some(&b), Some(&a), Some(&b), Some(&a), Some(&b),
        ];
        let w = overuse(&slots, &catalog);
        assert_eq!(ids(&w), ["overused-troilo", "overused-canaro"]);
        assert_eq!(w[0].params["count"], "4");
        assert_eq!(w[0].params["orchestra"], "troilo");
    }

    #[test]
    fn warmup_requires_two_slots() {
        let catalog = Catalog::from_orchestras(vec![]);
        assert!(suggest_warmup(&[None], &catalog).is_empty());
        let w = suggest_warmup(&[None, None], &catalog);
        assert_eq!(ids(&w), ["suggest-warmup"]);
        assert_eq!(w[0].params["orchestras"], "");
    }
}
