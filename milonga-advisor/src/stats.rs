//! Set-level analysis: totals, distributions, slot clock times, the TTVTTM
//! pattern and energy-curve points.

use std::collections::{BTreeMap, HashSet};

use chrono::{Duration, NaiveTime};
use serde::Serialize;

use milonga_core::types::{StyleCategory, Tanda, TandaType};

/// Minutes reserved for a slot nobody has filled yet.
pub const EMPTY_SLOT_MINUTES: u32 = 13;

/// Classic rotation: two tangos, vals, two tangos, milonga.
pub const TTVTTM: [TandaType; 6] = [
    TandaType::Tango,
    TandaType::Tango,
    TandaType::Vals,
    TandaType::Tango,
    TandaType::Tango,
    TandaType::Milonga,
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeShare {
    #[serde(rename = "type")]
    pub tanda_type: TandaType,
    pub count: usize,
    /// Share of filled slots, 0–100.
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StyleShare {
    pub style: StyleCategory,
    pub count: usize,
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SetStats {
    pub filled: usize,
    pub total: usize,
    /// Sum of filled tandas' durations, cortinas included.
    pub duration_minutes: u32,
    /// `None` when no slot is filled.
    pub average_energy: Option<f64>,
    pub unique_orchestras: usize,
    /// Always tango, vals, milonga, in that order.
    pub types: Vec<TypeShare>,
    /// Most common first; ties by style tag.
    pub styles: Vec<StyleShare>,
}

impl SetStats {
    /// Duration as `2h 5m`, or `45m` under an hour.
    pub fn duration_label(&self) -> String {
        let hours = self.duration_minutes / 60;
        let mins = self.duration_minutes % 60;
        if hours > 0 {
            format!("{hours}h {mins}m")
        } else {
            format!("{mins}m")
        }
    }
}

fn percent(count: usize, of: usize) -> f64 {
    if of == 0 {
        0.0
    } else {
        count as f64 / of as f64 * 100.0
    }
}

pub fn set_stats(slots: &[Option<&Tanda>]) -> SetStats {
    let filled: Vec<&Tanda> = slots.iter().flatten().copied().collect();
    let n = filled.len();

    let duration_minutes = filled.iter().map(|t| t.duration_minutes()).sum();
    let average_energy = (n > 0).then(|| filled.iter().map(|t| t.energy).sum::<f64>() / n as f64);
    let unique_orchestras = filled
        .iter()
        .map(|t| &t.orchestra)
        .collect::<HashSet<_>>()
        .len();

    let types = TandaType::ALL
        .into_iter()
        .map(|ty| {
            let count = filled.iter().filter(|t| t.tanda_type == ty).count();
            TypeShare {
                tanda_type: ty,
                count,
                percent: percent(count, n),
            }
        })
        .collect();

    let mut style_counts: BTreeMap<StyleCategory, usize> = BTreeMap::new();
    for style in filled.iter().filter_map(|t| t.style) {
        *style_counts.entry(style).or_insert(0) += 1;
    }
    let mut styles: Vec<StyleShare> = style_counts
        .into_iter()
        .map(|(style, count)| StyleShare {
            style,
            count,
            percent: percent(count, n),
        })
        .collect();
    styles.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.style.as_str().cmp(b.style.as_str())));

    SetStats {
        filled: n,
        total: slots.len(),
        duration_minutes,
        average_energy,
        unique_orchestras,
        types,
        styles,
    }
}

/// Minutes a slot occupies on the clock.
pub fn slot_minutes(slot: Option<&Tanda>) -> u32 {
    slot.map_or(EMPTY_SLOT_MINUTES, Tanda::duration_minutes)
}

/// Clock time at which each slot starts. Wraps past midnight.
pub fn slot_times(start: NaiveTime, slots: &[Option<&Tanda>]) -> Vec<NaiveTime> {
    let mut elapsed: u32 = 0;
    slots
        .iter()
        .map(|slot| {
            let at = start + Duration::minutes(i64::from(elapsed));
            elapsed += slot_minutes(*slot);
            at
        })
        .collect()
}

/// Type the TTVTTM rotation expects at `slot`.
pub fn expected_type(slot: usize) -> TandaType {
    TTVTTM[slot % TTVTTM.len()]
}

/// Filled slots whose type departs from the rotation.
pub fn pattern_mismatches(slots: &[Option<&Tanda>]) -> Vec<usize> {
    slots
        .iter()
        .enumerate()
        .filter_map(|(i, slot)| slot.map(|t| (i, t)))
        .filter(|(i, t)| t.tanda_type != expected_type(*i))
        .map(|(i, _)| i)
        .collect()
}

/// One plotted point of the energy curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CurvePoint {
    pub slot: usize,
    pub energy: f64,
    #[serde(rename = "type")]
    pub tanda_type: TandaType,
}

/// Points for every filled slot, in slot order.
pub fn curve_points(slots: &[Option<&Tanda>]) -> Vec<CurvePoint> {
    slots
        .iter()
        .enumerate()
        .filter_map(|(slot, t)| {
            t.map(|t| CurvePoint {
                slot,
                energy: t.energy,
                tanda_type: t.tanda_type,
            })
        })
        .collect()
}
