//! Serializable rendering payloads: one per template family.
//!
//! Everything a template prints is formatted here (energies to one decimal,
//! SVG coordinates trimmed) so the templates only lay text out.

use std::collections::BTreeMap;

use serde::Serialize;

use milonga_advisor::{CurvePoint, Warning};
use milonga_core::types::{Tanda, TandaType};
use milonga_core::{Catalog, Program};

use crate::error::RenderError;

// ---------------------------------------------------------------------------
// Warning messages
// ---------------------------------------------------------------------------

/// A warning's params, flattened so templates read `{{ orchestra }}`.
#[derive(Debug, Clone, Serialize)]
pub struct MessageContext<'a> {
    pub severity: &'static str,
    #[serde(flatten)]
    pub params: &'a BTreeMap<String, String>,
}

impl<'a> MessageContext<'a> {
    pub fn from_warning(warning: &'a Warning) -> Self {
        MessageContext {
            severity: warning.severity.as_str(),
            params: &warning.params,
        }
    }

    pub fn to_tera_context(&self) -> Result<tera::Context, RenderError> {
        Ok(tera::Context::from_serialize(self)?)
    }
}

// ---------------------------------------------------------------------------
// Plain-text program
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct ProgramContext {
    pub name: String,
    pub venue: Option<String>,
    /// `YYYY-MM-DD`.
    pub date: String,
    /// `HH:MM`.
    pub start: String,
    pub slots: Vec<SlotCtx>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SlotCtx {
    /// 1-based.
    pub number: usize,
    pub filled: bool,
    /// Upper-case type, e.g. `TANGO`.
    pub tanda_type: String,
    /// Orchestra name; mixed tandas join every name with ` + `.
    pub orchestra: String,
    pub singer: Option<String>,
    pub energy: String,
    pub tracks: u8,
}

impl SlotCtx {
    fn empty(number: usize) -> Self {
        SlotCtx {
            number,
            filled: false,
            tanda_type: String::new(),
            orchestra: String::new(),
            singer: None,
            energy: String::new(),
            tracks: 0,
        }
    }

    fn filled(number: usize, tanda: &Tanda, catalog: &Catalog) -> Self {
        let orchestra = tanda
            .orchestras()
            .into_iter()
            .map(|id| catalog.display_name(id))
            .collect::<Vec<_>>()
            .join(" + ");
        SlotCtx {
            number,
            filled: true,
            tanda_type: tanda.tanda_type.as_str().to_uppercase(),
            orchestra,
            singer: tanda.singer.clone(),
            energy: format!("{:.1}", tanda.energy),
            tracks: tanda.track_count,
        }
    }
}

impl ProgramContext {
    pub fn from_program(program: &Program, catalog: &Catalog) -> Self {
        let slots = program
            .slots()
            .into_iter()
            .enumerate()
            .map(|(i, slot)| match slot {
                Some(t) => SlotCtx::filled(i + 1, t, catalog),
                None => SlotCtx::empty(i + 1),
            })
            .collect();
        ProgramContext {
            name: program.set.name.clone(),
            venue: program.set.venue.clone().filter(|v| !v.trim().is_empty()),
            date: program.set.date.format("%Y-%m-%d").to_string(),
            start: program.set.start_time.format("%H:%M").to_string(),
            slots,
        }
    }

    pub fn to_tera_context(&self) -> Result<tera::Context, RenderError> {
        Ok(tera::Context::from_serialize(self)?)
    }
}

// ---------------------------------------------------------------------------
// Energy curve
// ---------------------------------------------------------------------------

pub const CURVE_WIDTH: f64 = 800.0;
pub const CURVE_HEIGHT: f64 = 120.0;
const PAD_TOP: f64 = 15.0;
const PAD_RIGHT: f64 = 30.0;
const PAD_BOTTOM: f64 = 25.0;
const PAD_LEFT: f64 = 35.0;
/// Energies that get a dashed guide line.
pub const GRID_ENERGIES: [u8; 5] = [1, 3, 5, 7, 9];
/// Fewer points than this renders the placeholder.
pub const MIN_CURVE_POINTS: usize = 2;

pub fn type_color(tanda_type: TandaType) -> &'static str {
    match tanda_type {
        TandaType::Tango => "#c94c4c",
        TandaType::Vals => "#4c8ec9",
        TandaType::Milonga => "#4cc96a",
    }
}

/// Coordinate as SVG text: two decimals at most, trailing zeros dropped.
fn coord(v: f64) -> String {
    let s = format!("{v:.2}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

struct Scale {
    total_slots: usize,
}

impl Scale {
    fn chart_width() -> f64 {
        CURVE_WIDTH - PAD_LEFT - PAD_RIGHT
    }

    fn chart_height() -> f64 {
        CURVE_HEIGHT - PAD_TOP - PAD_BOTTOM
    }

    fn baseline() -> f64 {
        CURVE_HEIGHT - PAD_BOTTOM
    }

    fn x(&self, slot: usize) -> f64 {
        let span = self.total_slots.saturating_sub(1).max(1) as f64;
        PAD_LEFT + slot as f64 / span * Self::chart_width()
    }

    fn y(energy: f64) -> f64 {
        PAD_TOP + Self::chart_height() - (energy - 1.0) / 9.0 * Self::chart_height()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GridLineCtx {
    pub energy: u8,
    pub x1: String,
    pub x2: String,
    pub y: String,
    pub label_x: String,
    pub label_y: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PointCtx {
    pub x: String,
    pub y: String,
    pub color: &'static str,
    /// 1-based slot number.
    pub label: usize,
    pub label_y: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CurveContext {
    pub width: String,
    pub height: String,
    pub grid: Vec<GridLineCtx>,
    /// Stroke path through the points.
    pub path: String,
    /// Same path closed down to the baseline.
    pub fill: String,
    pub points: Vec<PointCtx>,
}

impl CurveContext {
    /// Geometry for `points` on a timeline of `total_slots`. `None` when
    /// there are too few points to draw a curve.
    pub fn build(points: &[CurvePoint], total_slots: usize) -> Option<Self> {
        if points.len() < MIN_CURVE_POINTS {
            return None;
        }
        let scale = Scale { total_slots };
        let xy: Vec<(f64, f64)> = points
            .iter()
            .map(|p| (scale.x(p.slot), Scale::y(p.energy)))
            .collect();

        let (first, last) = (xy[0], xy[xy.len() - 1]);
        let mut path = format!("M {} {}", coord(first.0), coord(first.1));
        for pair in xy.windows(2) {
            let ((px, py), (cx, cy)) = (pair[0], pair[1]);
            let dx = cx - px;
            path.push_str(&format!(
                " C {} {}, {} {}, {} {}",
                coord(px + dx * 0.4),
                coord(py),
                coord(px + dx * 0.6),
                coord(cy),
                coord(cx),
                coord(cy),
            ));
        }
        let baseline = coord(Scale::baseline());
        let fill = format!(
            "{path} L {} {baseline} L {} {baseline} Z",
            coord(last.0),
            coord(first.0)
        );

        let grid = GRID_ENERGIES
            .iter()
            .map(|&e| {
                let y = Scale::y(f64::from(e));
                GridLineCtx {
                    energy: e,
                    x1: coord(PAD_LEFT),
                    x2: coord(CURVE_WIDTH - PAD_RIGHT),
                    y: coord(y),
                    label_x: coord(PAD_LEFT - 8.0),
                    label_y: coord(y + 3.0),
                }
            })
            .collect();

        let label_y = coord(Scale::baseline() + 14.0);
        let points = points
            .iter()
            .zip(&xy)
            .map(|(p, (x, y))| PointCtx {
                x: coord(*x),
                y: coord(*y),
                color: type_color(p.tanda_type),
                label: p.slot + 1,
                label_y: label_y.clone(),
            })
            .collect();

        Some(CurveContext {
            width: coord(CURVE_WIDTH),
            height: coord(CURVE_HEIGHT),
            grid,
            path,
            fill,
            points,
        })
    }

    pub fn to_tera_context(&self) -> Result<tera::Context, RenderError> {
        Ok(tera::Context::from_serialize(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(slot: usize, energy: f64) -> CurvePoint {
        CurvePoint {
            slot,
            energy,
            tanda_type: TandaType::Tango,
        }
    }

    #[test]
    fn coord_trims_trailing_zeros() {
        assert_eq!(coord(35.0), "35");
        assert_eq!(coord(95.5), "95.5");
        assert_eq!(coord(1.0 / 3.0), "0.33");
    }

    #[test]
    fn energy_one_sits_on_the_baseline_and_ten_on_top() {
        assert_eq!(Scale::y(1.0), 95.0);
        assert_eq!(Scale::y(10.0), 15.0);
    }

    #[test]
    fn first_and_last_slot_span_the_chart() {
        let scale = Scale { total_slots: 14 };
        assert_eq!(scale.x(0), 35.0);
        assert_eq!(scale.x(13), 770.0);
    }

    #[test]
    fn single_point_has_no_curve() {
        assert!(CurveContext::build(&[point(0, 5.0)], 14).is_none());
    }

    #[test]
    fn path_uses_cubic_segments_between_points() {
        let ctx = CurveContext::build(&[point(0, 1.0), point(1, 10.0)], 2).unwrap();
        assert_eq!(ctx.path, "M 35 95 C 329 95, 476 15, 770 15");
        assert!(ctx.fill.ends_with("L 770 95 L 35 95 Z"));
        assert_eq!(ctx.points[1].label, 2);
        assert_eq!(ctx.grid.len(), 5);
    }
}
