//! Advisory engine behaviour over whole timelines, against the bundled catalog.
//!
//! Each `#[case]` is isolated; timelines are built from a compact
//! `orchestra/type/energy` notation.

use milonga_advisor::{generate_warnings, MessageKey, Rule, Severity, Warning};
use milonga_core::types::{OrchestraId, Tanda, TandaId, TandaMode, TandaType};
use milonga_core::Catalog;
use rstest::{fixture, rstest};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

#[fixture]
fn catalog() -> Catalog {
    Catalog::bundled().expect("bundled catalog")
}

fn tanda(desc: &str) -> Tanda {
    let mut parts = desc.split('/');
    let orchestra = parts.next().unwrap();
    let tanda_type: TandaType = parts.next().unwrap_or("tango").parse().unwrap();
    let energy: f64 = parts.next().unwrap_or("5").parse().unwrap();
    Tanda {
        id: TandaId::from(desc),
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

/// `"-"` is an empty slot.
fn timeline(specs: &[&str]) -> Vec<Option<Tanda>> {
    specs
        .iter()
        .map(|s| if *s == "-" { None } else { Some(tanda(s)) })
        .collect()
}

fn run(slots: &[Option<Tanda>], catalog: &Catalog) -> Vec<Warning> {
    let view: Vec<Option<&Tanda>> = slots.iter().map(Option::as_ref).collect();
    generate_warnings(&view, catalog)
}

fn ids(warnings: &[Warning]) -> Vec<&str> {
    warnings.iter().map(|w| w.id.as_str()).collect()
}

fn with_key(warnings: &[Warning], key: MessageKey) -> Vec<&Warning> {
    warnings.iter().filter(|w| w.key == key).collect()
}

// ---------------------------------------------------------------------------
// 1. Individual rules through the full engine
// ---------------------------------------------------------------------------

#[rstest]
fn back_to_back_same_orchestra_references_both_slots(catalog: Catalog) {
    let slots = timeline(&["darienzo/tango/9", "darienzo/tango/9", "-", "-"]);
    let warnings = run(&slots, &catalog);
    let hits = with_key(&warnings, MessageKey::BackToBack);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, "back-to-back-0");
    assert_eq!(hits[0].slots, [0, 1]);
    assert_eq!(hits[0].params["orchestra"], "Juan D'Arienzo");
    assert_eq!(hits[0].params["first"], "1");
    assert_eq!(hits[0].params["last"], "2");
}

#[rstest]
fn no_vals_in_opening_fires_once_and_clears_with_one_vals(catalog: Catalog) {
    let mut specs = vec![
        "canaro", "di_sarli", "troilo", "calo", "tanturi", "laurenz", "donato", "demare",
        "-", "-",
    ];
    let warnings = run(&timeline(&specs), &catalog);
    assert_eq!(with_key(&warnings, MessageKey::NoValsEarly).len(), 1);

    specs[5] = "laurenz/vals";
    let warnings = run(&timeline(&specs), &catalog);
    assert!(with_key(&warnings, MessageKey::NoValsEarly).is_empty());
}

#[rstest]
fn no_vals_needs_four_filled_in_window(catalog: Catalog) {
    let slots = timeline(&["canaro", "-", "troilo", "-", "calo", "-", "-", "-", "laurenz"]);
    let warnings = run(&slots, &catalog);
    assert!(with_key(&warnings, MessageKey::NoValsEarly).is_empty());
}

#[rstest]
fn no_milonga_in_opening(catalog: Catalog) {
    let slots = timeline(&[
        "canaro", "di_sarli", "calo/vals", "troilo", "tanturi", "laurenz", "-", "-", "-", "-",
    ]);
    let warnings = run(&slots, &catalog);
    let hits = with_key(&warnings, MessageKey::NoMilongaEarly);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, "no-milonga-early");
    assert!(hits[0].slots.is_empty());
}

#[rstest]
#[case::pugliese_first(&["pugliese", "-", "-", "-"], &["complex-early-0"])]
#[case::biagi_third(&["canaro", "-", "biagi", "-"], &["complex-early-2"])]
#[case::pugliese_fourth(&["canaro", "-", "-", "pugliese"], &[])]
fn advanced_orchestras_early(catalog: Catalog, #[case] specs: &[&str], #[case] expected: &[&str]) {
    let warnings = run(&timeline(specs), &catalog);
    let hits: Vec<&str> = with_key(&warnings, MessageKey::ComplexEarly)
        .into_iter()
        .map(|w| w.id.as_str())
        .collect();
    assert_eq!(hits, expected);
}

#[rstest]
fn warm_up_suggestion_names_three_catalog_orchestras(catalog: Catalog) {
    let slots = timeline(&["-", "-", "troilo", "calo"]);
    let warnings = run(&slots, &catalog);
    let hits = with_key(&warnings, MessageKey::SuggestWarmup);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].severity, Severity::Suggestion);
    assert_eq!(
        hits[0].params["orchestras"],
        "Francisco Canaro, Carlos Di Sarli, Enrique Rodriguez"
    );
    assert!(hits[0].slots.is_empty());
}

#[rstest]
fn overused_orchestra_named_with_count(catalog: Catalog) {
    let slots = timeline(&[
        "di_sarli", "canaro", "di_sarli", "calo/vals", "di_sarli", "troilo", "di_sarli",
        "darienzo/milonga",
    ]);
    let warnings = run(&slots, &catalog);
    let hits = with_key(&warnings, MessageKey::Overused);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, "overused-di_sarli");
    assert_eq!(hits[0].params["orchestra"], "Carlos Di Sarli");
    assert_eq!(hits[0].params["count"], "4");
}

#[rstest]
#[case::all_tango(&["canaro", "troilo", "calo", "di_sarli"], Some("high-tango-percent"), "100")]
#[case::one_in_four(&["canaro", "calo/vals", "darienzo/milonga", "donato/vals"], Some("low-tango-percent"), "25")]
#[case::two_thirds(&["canaro", "troilo", "calo/vals", "-", "di_sarli", "darienzo/milonga", "laurenz"], None, "")]
fn tango_ratio(
    catalog: Catalog,
    #[case] specs: &[&str],
    #[case] expected: Option<&str>,
    #[case] percent: &str,
) {
    let warnings = run(&timeline(specs), &catalog);
    let hit = warnings
        .iter()
        .find(|w| matches!(w.key, MessageKey::LowTangoPercent | MessageKey::HighTangoPercent));
    assert_eq!(hit.map(|w| w.id.as_str()), expected);
    if let Some(w) = hit {
        assert_eq!(w.params["percent"], percent);
    }
}

// ---------------------------------------------------------------------------
// 2. Engine-wide properties
// ---------------------------------------------------------------------------

#[rstest]
fn output_follows_rule_order(catalog: Catalog) {
    let slots = timeline(&[
        "-", "-", "pugliese/tango/9", "pugliese/tango/3", "troilo", "troilo", "-",
    ]);
    let warnings = run(&slots, &catalog);
    assert_eq!(
        ids(&warnings),
        [
            "back-to-back-2",
            "back-to-back-4",
            "consecutive-type-2",
            "consecutive-type-3",
            "no-vals-early",
            "energy-jump-2",
            "complex-early-2",
            "suggest-warmup",
            "suggest-cumparsita",
            "high-tango-percent",
        ]
    );
}

#[rstest]
fn evaluation_is_idempotent(catalog: Catalog) {
    let slots = timeline(&[
        "darienzo/tango/9", "darienzo/tango/9", "pugliese/tango/3", "-", "calo/vals", "-",
    ]);
    let view: Vec<Option<&Tanda>> = slots.iter().map(Option::as_ref).collect();
    let first = generate_warnings(&view, &catalog);
    let second = generate_warnings(&view, &catalog);
    assert_eq!(first, second);
}

#[rstest]
fn rules_can_be_evaluated_individually(catalog: Catalog) {
    let slots = timeline(&["darienzo/tango/9", "darienzo/tango/2"]);
    let view: Vec<Option<&Tanda>> = slots.iter().map(Option::as_ref).collect();
    let from_rules: Vec<Warning> = Rule::ALL
        .iter()
        .flat_map(|r| r.evaluate(&view, &catalog))
        .collect();
    assert_eq!(from_rules, generate_warnings(&view, &catalog));
    assert_eq!(Rule::EnergyJump.evaluate(&view, &catalog).len(), 1);
}

#[rstest]
fn all_empty_timeline_only_suggests(catalog: Catalog) {
    let warnings = run(&timeline(&["-"; 14]), &catalog);
    assert_eq!(ids(&warnings), ["suggest-warmup", "suggest-cumparsita"]);
    assert!(warnings.iter().all(|w| w.severity == Severity::Suggestion));
}
