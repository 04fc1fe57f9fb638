//! Energy model: profile base energy plus a fixed per-type modifier.
//!
//! Every function here is total. Inputs outside the scale are clamped and
//! unknown type names contribute no modifier.

use milonga_core::types::{clamp_energy, OrchestraProfile, TandaType};

/// Additive energy modifier for a tanda type.
pub fn type_modifier(tanda_type: TandaType) -> f64 {
    match tanda_type {
        TandaType::Tango => 0.0,
        TandaType::Vals => -1.0,
        TandaType::Milonga => 1.5,
    }
}

/// Modifier for a free-text type name; `0.0` when the name is not a type.
pub fn modifier_for_name(name: &str) -> f64 {
    name.parse::<TandaType>().map(type_modifier).unwrap_or(0.0)
}

/// `base + modifier(type)`, clamped to `[1, 10]`.
pub fn compute_energy(base: f64, tanda_type: TandaType) -> f64 {
    clamp_energy(base + type_modifier(tanda_type))
}

/// [`compute_energy`] for callers holding the type as a string.
pub fn compute_energy_named(base: f64, type_name: &str) -> f64 {
    clamp_energy(base + modifier_for_name(type_name))
}

/// Arithmetic mean of the profiles' base energies; `None` for no profiles.
pub fn mixed_base_energy(profiles: &[&OrchestraProfile]) -> Option<f64> {
    if profiles.is_empty() {
        return None;
    }
    let sum: f64 = profiles.iter().map(|p| p.energy).sum();
    Some(sum / profiles.len() as f64)
}

/// Energy of a tanda built from `profiles` (one for standard, several for mixed).
pub fn tanda_energy(profiles: &[&OrchestraProfile], tanda_type: TandaType) -> Option<f64> {
    mixed_base_energy(profiles).map(|base| compute_energy(base, tanda_type))
}

/// A manual override replaces the computed value. Clamped, then snapped to
/// the nearest half point.
pub fn apply_override(value: f64) -> f64 {
    clamp_energy((clamp_energy(value) * 2.0).round() / 2.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use milonga_core::types::StyleCategory;
    use rstest::rstest;

    fn profile(energy: f64) -> OrchestraProfile {
        OrchestraProfile {
            era: "1940".into(),
            era_label: None,
            style: StyleCategory::Smooth,
            energy,
            mood: String::new(),
            danceability: 8,
            complexity: 3,
            types: vec![TandaType::Tango],
            dj_notes: String::new(),
            singer: None,
            key_singers: vec![],
            tags: vec![],
        }
    }

    #[rstest]
    #[case(9.0, TandaType::Milonga, 10.0)]
    #[case(5.0, TandaType::Vals, 4.0)]
    #[case(6.0, TandaType::Tango, 6.0)]
    #[case(1.0, TandaType::Vals, 1.0)]
    #[case(3.5, TandaType::Milonga, 5.0)]
    fn energy_table(#[case] base: f64, #[case] ty: TandaType, #[case] expected: f64) {
        assert_eq!(compute_energy(base, ty), expected);
    }

    #[test]
    fn energy_always_in_range() {
        for tenths in 10..=100 {
            let base = f64::from(tenths) / 10.0;
            for ty in TandaType::ALL {
                let e = compute_energy(base, ty);
                assert!((1.0..=10.0).contains(&e), "{base} {ty} -> {e}");
            }
        }
    }

    #[test]
    fn unknown_type_name_has_zero_modifier() {
        assert_eq!(modifier_for_name("cumbia"), 0.0);
        assert_eq!(compute_energy_named(7.0, "cumbia"), 7.0);
        assert_eq!(compute_energy_named(7.0, "milonga"), 8.5);
    }

    #[test]
    fn mixed_energy_uses_mean_before_modifier() {
        let a = profile(6.0);
        let b = profile(7.0);
        assert_eq!(mixed_base_energy(&[&a, &b]), Some(6.5));
        assert_eq!(tanda_energy(&[&a, &b], TandaType::Vals), Some(5.5));
        assert_eq!(mixed_base_energy(&[]), None);
    }

    #[rstest]
    #[case(12.0, 10.0)]
    #[case(-3.0, 1.0)]
    #[case(6.3, 6.5)]
    #[case(6.2, 6.0)]
    #[case(f64::NAN, 1.0)]
    fn override_is_clamped_and_snapped(#[case] raw: f64, #[case] expected: f64) {
        assert_eq!(apply_override(raw), expected);
    }
}
