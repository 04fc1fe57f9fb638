//! Error types for milonga-core.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::{OrchestraId, TandaId};

/// Errors from the plan store and config loading.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying I/O failure (file not found, permission denied, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization error (save path).
    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization error (export path).
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parse error on load, with the offending file.
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// Imported set file was not a `{set, tandas}` document.
    #[error("invalid set file: {source}")]
    Import {
        #[source]
        source: serde_json::Error,
    },

    /// `dirs::home_dir()` returned `None`.
    #[error("cannot determine home directory; set $HOME or equivalent")]
    HomeNotFound,

    #[error("plan not found at {path}")]
    PlanNotFound { path: PathBuf },

    #[error("plan already exists at {path}")]
    PlanExists { path: PathBuf },

    /// Plan document violates a timeline invariant.
    #[error("invalid plan {path}: {source}")]
    Invalid {
        path: PathBuf,
        #[source]
        source: ProgramError,
    },

    /// Plan names become file names, so path separators are refused.
    #[error("invalid plan name '{name}': use letters, digits, '-' or '_'")]
    InvalidPlanName { name: String },
}

/// Errors from loading a catalog file.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("cannot read catalog at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse catalog {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: serde_yaml::Error,
    },

    /// Too few orchestras to be a real catalog; likely a truncated export.
    #[error("catalog {origin} has only {count} orchestras (need at least {min})")]
    TooSmall { origin: String, count: usize, min: usize },

    #[error("orchestra '{0}' appears more than once")]
    DuplicateId(OrchestraId),

    #[error("orchestra '{0}' has no profiles")]
    NoProfiles(OrchestraId),
}

/// Errors from editing a program's timeline and library.
#[derive(Debug, Error, PartialEq)]
pub enum ProgramError {
    #[error("slot {} is outside the program (1-{slot_count})", .slot + 1)]
    SlotOutOfRange { slot: usize, slot_count: usize },

    #[error("slot {} is already taken by tanda {occupant}", .slot + 1)]
    SlotOccupied { slot: usize, occupant: TandaId },

    #[error("slot {} is empty", .slot + 1)]
    SlotEmpty { slot: usize },

    #[error("slot {} holds more than one tanda", .slot + 1)]
    DuplicatePosition { slot: usize },

    #[error("tanda {tanda} has {count} tracks; a tanda has 3 or 4")]
    TrackCount { tanda: TandaId, count: u8 },

    #[error("mixed tanda {tanda} lists {found} orchestras; a mix needs at least 2")]
    MixTooSmall { tanda: TandaId, found: usize },

    #[error("no tanda matches '{0}'")]
    TandaNotFound(String),

    #[error("'{prefix}' matches {count} tandas; use a longer id")]
    AmbiguousTanda { prefix: String, count: usize },
}

/// Convenience constructor for [`CatalogError::Io`].
pub(crate) fn catalog_io(path: impl Into<PathBuf>, source: std::io::Error) -> CatalogError {
    CatalogError::Io {
        path: path.into(),
        source,
    }
}
