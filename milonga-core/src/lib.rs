//! Milonga core library: domain types, orchestra catalog, program timeline,
//! plan persistence, config, errors.
//!
//! - [`types`]: newtypes and domain structs
//! - [`catalog`]: bundled and file-backed orchestra reference data
//! - [`program`]: a set's tandas, library and slot timeline
//! - [`store`]: load / save / list plan documents, JSON exchange
//! - [`config`]: `~/.milonga/config.yaml`
//! - [`error`]: [`StoreError`], [`CatalogError`], [`ProgramError`]

pub mod catalog;
pub mod config;
pub mod error;
pub mod program;
pub mod store;
pub mod types;

pub use catalog::{name_to_id, Catalog, CatalogFilter, CatalogSource};
pub use config::Config;
pub use error::{CatalogError, ProgramError, StoreError};
pub use program::Program;
pub use types::{
    clamp_energy, style_label, MilongaSet, NewTanda, Orchestra, OrchestraId, OrchestraProfile,
    PlanName, SetId, StyleCategory, Tanda, TandaId, TandaMode, TandaType, MAX_ENERGY, MAX_SLOTS,
    MIN_ENERGY, MIN_SLOTS, TRACK_COUNTS,
};
