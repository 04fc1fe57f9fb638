//! Turning a user's tanda request into a ready-to-store [`NewTanda`].
//!
//! Resolution looks every selection up in the catalog, validates mixes,
//! computes energy (or applies an override) and copies the primary profile's
//! style and era onto the tanda.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use milonga_core::catalog::Catalog;
use milonga_core::types::{NewTanda, OrchestraId, OrchestraProfile, TandaMode, TandaType};
pub use milonga_core::types::TRACK_COUNTS;

use crate::compat::{validate_mix, MixIssue};
use crate::energy::{apply_override, tanda_energy};

/// One orchestra, optionally narrowed to the profile featuring `singer`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub orchestra: OrchestraId,
    pub singer: Option<String>,
}

impl Selection {
    pub fn new(orchestra: impl Into<OrchestraId>, singer: Option<&str>) -> Self {
        Selection {
            orchestra: orchestra.into(),
            singer: singer.map(str::to_string),
        }
    }
}

/// `orchestra` or `orchestra:Singer Name`.
impl FromStr for Selection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (id, singer) = match s.split_once(':') {
            Some((id, singer)) => (id.trim(), Some(singer.trim()).filter(|s| !s.is_empty())),
            None => (s.trim(), None),
        };
        if id.is_empty() {
            return Err(format!("missing orchestra id in '{s}'"));
        }
        Ok(Selection::new(id, singer))
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.singer {
            Some(singer) => write!(f, "{}:{}", self.orchestra, singer),
            None => write!(f, "{}", self.orchestra),
        }
    }
}

/// What the user asked for.
#[derive(Debug, Clone, PartialEq)]
pub struct TandaRequest {
    pub mode: TandaMode,
    /// Exactly one for standard tandas; two or more for mixed.
    pub selections: Vec<Selection>,
    pub tanda_type: TandaType,
    pub track_count: u8,
    /// Replaces the computed energy when present.
    pub energy_override: Option<f64>,
}

impl TandaRequest {
    pub fn standard(selection: Selection, tanda_type: TandaType) -> Self {
        TandaRequest {
            mode: TandaMode::Standard,
            selections: vec![selection],
            tanda_type,
            track_count: 4,
            energy_override: None,
        }
    }

    pub fn mixed(selections: Vec<Selection>, tanda_type: TandaType) -> Self {
        TandaRequest {
            mode: TandaMode::Mixed,
            selections,
            tanda_type,
            track_count: 4,
            energy_override: None,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum DraftError {
    #[error("unknown orchestra '{0}'")]
    UnknownOrchestra(OrchestraId),

    #[error("{orchestra} has no profile featuring {singer}")]
    UnknownSinger { orchestra: OrchestraId, singer: String },

    #[error("a tanda has 3 or 4 tracks, got {0}")]
    TrackCount(u8),

    #[error("a standard tanda takes exactly one orchestra, got {0}")]
    StandardSelections(usize),

    #[error("{0} is listed more than once; a mixed tanda blends different orchestras")]
    DuplicateOrchestra(OrchestraId),

    #[error("orchestras cannot be mixed: {}", join_issues(.0))]
    Mix(Vec<MixIssue>),
}

fn join_issues(issues: &[MixIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Resolve `request` against `catalog`.
pub fn resolve(request: &TandaRequest, catalog: &Catalog) -> Result<NewTanda, DraftError> {
    if !TRACK_COUNTS.contains(&request.track_count) {
        return Err(DraftError::TrackCount(request.track_count));
    }
    if request.mode == TandaMode::Standard && request.selections.len() != 1 {
        return Err(DraftError::StandardSelections(request.selections.len()));
    }

    if request.mode == TandaMode::Mixed {
        let mut seen = HashSet::new();
        if let Some(dup) = request.selections.iter().find(|s| !seen.insert(&s.orchestra)) {
            return Err(DraftError::DuplicateOrchestra(dup.orchestra.clone()));
        }
    }

    let profiles = request
        .selections
        .iter()
        .map(|s| lookup(catalog, s))
        .collect::<Result<Vec<&OrchestraProfile>, DraftError>>()?;

    if request.mode == TandaMode::Mixed {
        let issues = validate_mix(&profiles);
        if !issues.is_empty() {
            return Err(DraftError::Mix(issues));
        }
    }

    let computed = tanda_energy(&profiles, request.tanda_type);
    let energy = match request.energy_override {
        Some(value) => apply_override(value),
        None => computed.unwrap_or(5.0),
    };

    // Non-empty: a standard request has one selection, a mixed one passed validation.
    let (primary, primary_profile) = match (request.selections.first(), profiles.first()) {
        (Some(s), Some(p)) => (s, *p),
        _ => return Err(DraftError::Mix(validate_mix(&profiles))),
    };

    Ok(NewTanda {
        orchestra: primary.orchestra.clone(),
        mode: request.mode,
        mix: match request.mode {
            TandaMode::Mixed => request.selections.iter().map(|s| s.orchestra.clone()).collect(),
            TandaMode::Standard => Vec::new(),
        },
        singer: primary
            .singer
            .as_deref()
            .map(|wanted| canonical_singer(primary_profile, wanted)),
        tanda_type: request.tanda_type,
        track_count: request.track_count,
        energy,
        style: Some(primary_profile.style),
        era: Some(primary_profile.era.clone()),
    })
}

fn lookup<'c>(catalog: &'c Catalog, selection: &Selection) -> Result<&'c OrchestraProfile, DraftError> {
    if catalog.orchestra(&selection.orchestra).is_none() {
        return Err(DraftError::UnknownOrchestra(selection.orchestra.clone()));
    }
    catalog
        .profile(&selection.orchestra, selection.singer.as_deref())
        .ok_or_else(|| DraftError::UnknownSinger {
            orchestra: selection.orchestra.clone(),
            singer: selection.singer.clone().unwrap_or_default(),
        })
}

/// The catalog's spelling of `wanted`, which matched case-insensitively.
fn canonical_singer(profile: &OrchestraProfile, wanted: &str) -> String {
    profile
        .singer
        .iter()
        .chain(profile.key_singers.iter())
        .find(|s| s.eq_ignore_ascii_case(wanted.trim()))
        .cloned()
        .unwrap_or_else(|| wanted.to_string())
}
