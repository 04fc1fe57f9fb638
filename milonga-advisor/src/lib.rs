//! Milonga advisor: pure planning logic over resolved catalog and program data.
//!
//! - [`energy`]: energy model (base + type modifier, clamped)
//! - [`compat`]: mixed-tanda compatibility checks
//! - [`warnings`]: advisory rule registry
//! - [`draft`]: tanda request resolution
//! - [`stats`]: set statistics, slot timing, TTVTTM, curve points
//!
//! Nothing here performs I/O. The catalog is always passed in.

pub mod compat;
pub mod draft;
pub mod energy;
pub mod stats;
pub mod warnings;

pub use compat::{era_bracket, validate_mix, EraBracket, MixIssue};
pub use draft::{resolve, DraftError, Selection, TandaRequest};
pub use energy::{apply_override, compute_energy, type_modifier};
pub use stats::{curve_points, set_stats, slot_times, CurvePoint, SetStats};
pub use warnings::{generate_warnings, MessageKey, Rule, Severity, Warning};
