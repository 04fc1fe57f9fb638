//! Orchestra catalog: reference data describing orchestras, eras, and styles.
//!
//! A [`Catalog`] is an ordinary value. Callers resolve one (bundled, or from a
//! user file) and pass it to whatever needs orchestra data; nothing here keeps
//! process-wide state.
//!
//! # Sources
//!
//! - Bundled: `data/catalog.yaml`, baked into the binary via `include_str!`.
//! - File: any YAML document with the same schema. Fewer than
//!   [`MIN_FILE_ORCHESTRAS`] orchestras is rejected as a truncated export.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{catalog_io, CatalogError};
use crate::types::{Orchestra, OrchestraId, OrchestraProfile, StyleCategory, TandaType};

const BUNDLED_YAML: &str = include_str!("../data/catalog.yaml");

/// Minimum orchestra count for a user-supplied catalog file.
pub const MIN_FILE_ORCHESTRAS: usize = 3;

/// Placement key whose recommendations seed the warm-up suggestion.
pub const WARM_UP: &str = "warm_up";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Where a catalog came from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CatalogSource {
    #[default]
    Bundled,
    File(PathBuf),
}

/// Programming advice for one phase of the evening.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacementGuideline {
    pub position: String,
    #[serde(default)]
    pub recommended: Vec<OrchestraId>,
    #[serde(default)]
    pub energy_range: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Documented energy adjustment for one tanda type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeModifier {
    pub modifier: f64,
    #[serde(default)]
    pub notes: String,
}

/// Resolved, in-memory orchestra reference data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub styles: BTreeMap<StyleCategory, String>,
    #[serde(default)]
    pub type_modifiers: BTreeMap<TandaType, TypeModifier>,
    #[serde(default)]
    pub placement: BTreeMap<String, PlacementGuideline>,
    pub orchestras: Vec<Orchestra>,
    #[serde(skip)]
    pub source: CatalogSource,
}

/// Criteria for [`Catalog::search`]. Empty criteria match everything.
#[derive(Debug, Clone, Default)]
pub struct CatalogFilter {
    /// Case-insensitive substring of name or nickname.
    pub query: Option<String>,
    /// Matches when any profile has this style.
    pub style: Option<StyleCategory>,
    /// Inclusive range; matches when any profile's base energy falls inside.
    pub energy: Option<(f64, f64)>,
}

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

impl Catalog {
    /// The catalog shipped inside the binary.
    pub fn bundled() -> Result<Self, CatalogError> {
        let catalog: Catalog = serde_yaml::from_str(BUNDLED_YAML).map_err(|source| {
            CatalogError::Parse {
                origin: "(bundled)".to_string(),
                source,
            }
        })?;
        catalog.validate("(bundled)", 1)?;
        Ok(catalog)
    }

    /// A catalog holding just `orchestras`, with no style or placement notes.
    pub fn from_orchestras(orchestras: Vec<Orchestra>) -> Self {
        Catalog {
            styles: BTreeMap::new(),
            type_modifiers: BTreeMap::new(),
            placement: BTreeMap::new(),
            orchestras,
            source: CatalogSource::Bundled,
        }
    }

    /// Load a user catalog from a YAML file.
    pub fn load_file(path: &Path) -> Result<Self, CatalogError> {
        let contents = std::fs::read_to_string(path).map_err(|e| catalog_io(path, e))?;
        let origin = path.display().to_string();
        let mut catalog: Catalog = serde_yaml::from_str(&contents).map_err(|source| {
            CatalogError::Parse {
                origin: origin.clone(),
                source,
            }
        })?;
        catalog.validate(&origin, MIN_FILE_ORCHESTRAS)?;
        catalog.source = CatalogSource::File(path.to_path_buf());
        Ok(catalog)
    }

    /// Load `path` when given, falling back to the bundled catalog if the file
    /// is missing or unusable. Only a broken bundled catalog is an error.
    pub fn resolve(path: Option<&Path>) -> Result<Self, CatalogError> {
        if let Some(path) = path {
            match Self::load_file(path) {
                Ok(catalog) => {
                    tracing::debug!(
                        path = %path.display(),
                        orchestras = catalog.orchestras.len(),
                        "loaded catalog file"
                    );
                    return Ok(catalog);
                }
                Err(err) => {
                    tracing::warn!(error = %err, "catalog file unusable, using bundled catalog");
                }
            }
        }
        let catalog = Self::bundled()?;
        tracing::debug!(orchestras = catalog.orchestras.len(), "using bundled catalog");
        Ok(catalog)
    }

    fn validate(&self, origin: &str, min: usize) -> Result<(), CatalogError> {
        if self.orchestras.len() < min {
            return Err(CatalogError::TooSmall {
                origin: origin.to_string(),
                count: self.orchestras.len(),
                min,
            });
        }
        let mut seen = HashSet::new();
        for orchestra in &self.orchestras {
            if !seen.insert(&orchestra.id) {
                return Err(CatalogError::DuplicateId(orchestra.id.clone()));
            }
            if orchestra.profiles.is_empty() {
                return Err(CatalogError::NoProfiles(orchestra.id.clone()));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Lookups
// ---------------------------------------------------------------------------

impl Catalog {
    pub fn orchestra(&self, id: &OrchestraId) -> Option<&Orchestra> {
        self.orchestras.iter().find(|o| &o.id == id)
    }

    /// Display name for `id`, or the id itself when the catalog lacks it.
    pub fn display_name(&self, id: &OrchestraId) -> String {
        self.orchestra(id)
            .map(|o| o.name.clone())
            .unwrap_or_else(|| id.0.clone())
    }

    /// Profile of `id` recorded with `singer`; the default profile when no
    /// singer is given. `None` if the orchestra or singer is unknown.
    pub fn profile(&self, id: &OrchestraId, singer: Option<&str>) -> Option<&OrchestraProfile> {
        let orchestra = self.orchestra(id)?;
        match singer {
            Some(singer) => orchestra.profiles.iter().find(|p| p.features_singer(singer)),
            None => orchestra.default_profile(),
        }
    }

    /// Every singer across an orchestra's profiles, deduplicated, profile order.
    pub fn singers(&self, id: &OrchestraId) -> Vec<String> {
        let Some(orchestra) = self.orchestra(id) else {
            return vec![];
        };
        let mut seen = HashSet::new();
        orchestra
            .profiles
            .iter()
            .flat_map(|p| p.singer.iter().chain(p.key_singers.iter()))
            .filter(|s| !s.starts_with('('))
            .filter(|s| seen.insert(*s))
            .cloned()
            .collect()
    }

    pub fn search(&self, filter: &CatalogFilter) -> Vec<&Orchestra> {
        let query = filter.query.as_ref().map(|q| q.to_lowercase());
        self.orchestras
            .iter()
            .filter(|o| match &query {
                None => true,
                Some(q) => {
                    o.name.to_lowercase().contains(q)
                        || o.nickname
                            .as_ref()
                            .is_some_and(|n| n.to_lowercase().contains(q))
                }
            })
            .filter(|o| match filter.style {
                None => true,
                Some(style) => o.profiles.iter().any(|p| p.style == style),
            })
            .filter(|o| match filter.energy {
                None => true,
                Some((lo, hi)) => o.profiles.iter().any(|p| p.energy >= lo && p.energy <= hi),
            })
            .collect()
    }

    /// Recommended warm-up orchestras that exist in this catalog, in order.
    pub fn warm_up_recommendations(&self) -> Vec<&Orchestra> {
        self.placement
            .get(WARM_UP)
            .map(|g| {
                g.recommended
                    .iter()
                    .filter_map(|id| self.orchestra(id))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn style_description(&self, style: StyleCategory) -> Option<&str> {
        self.styles.get(&style).map(String::as_str)
    }

    pub fn type_notes(&self, tanda_type: TandaType) -> Option<&str> {
        self.type_modifiers.get(&tanda_type).map(|m| m.notes.as_str())
    }
}

// ---------------------------------------------------------------------------
// Id derivation
// ---------------------------------------------------------------------------

/// Derive a catalog id from a display name: `Juan D'Arienzo` → `juan_darienzo`.
pub fn name_to_id(name: &str) -> OrchestraId {
    let mut id = String::with_capacity(name.len());
    let mut pending_sep = false;
    for c in name.chars() {
        if c == '\'' || c == '\u{2019}' {
            continue;
        }
        if c.is_ascii_alphanumeric() {
            if pending_sep && !id.is_empty() {
                id.push('_');
            }
            pending_sep = false;
            id.push(c.to_ascii_lowercase());
        } else {
            pending_sep = true;
        }
    }
    OrchestraId(id)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
