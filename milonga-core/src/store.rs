//! Plan documents on disk.
//!
//! # Storage layout
//!
//! ```text
//! ~/.milonga/
//!   config.yaml        (optional, see `config`)
//!   plans/
//!     <plan_name>.yaml (one program per file, mode 0600)
//! ```
//!
//! # API pattern
//!
//! Every function touching disk has two forms:
//! - `fn_at(home: &Path, …)`: explicit home; used in tests with `TempDir`
//! - `fn(…)`: derives home from `dirs::home_dir()`, delegates to `_at`
//!
//! Tests must NEVER call the no-arg wrappers; always use `_at`.

use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::program::{Program, PLAN_VERSION};
use crate::types::{MilongaSet, PlanName, SetId, Tanda, TandaId, DEFAULT_SLOTS};

/// Suffix appended to the set name of an imported program.
pub const IMPORTED_SUFFIX: &str = " (imported)";

// ---------------------------------------------------------------------------
// 1. Path helpers
// ---------------------------------------------------------------------------

/// `<home>/.milonga/`, pure, no I/O.
pub fn milonga_dir_at(home: &Path) -> PathBuf {
    home.join(".milonga")
}

/// `<home>/.milonga/plans/`
///
/// Creates the directory (mode `0700`) if it does not yet exist.
pub fn plans_dir_at(home: &Path) -> Result<PathBuf, StoreError> {
    let dir = milonga_dir_at(home).join("plans");
    if !dir.exists() {
        std::fs::create_dir_all(&dir)?;
        set_dir_permissions(&milonga_dir_at(home))?;
        set_dir_permissions(&dir)?;
    }
    Ok(dir)
}

/// `<home>/.milonga/plans/<name>.yaml`, pure apart from name validation.
pub fn plan_path_at(home: &Path, name: &PlanName) -> Result<PathBuf, StoreError> {
    validate_plan_name(name)?;
    Ok(milonga_dir_at(home)
        .join("plans")
        .join(format!("{}.yaml", name.0)))
}

/// Plan names become file names: letters, digits, `-` and `_` only.
pub fn validate_plan_name(name: &PlanName) -> Result<(), StoreError> {
    let ok = !name.0.is_empty()
        && name
            .0
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if ok {
        Ok(())
    } else {
        Err(StoreError::InvalidPlanName {
            name: name.0.clone(),
        })
    }
}

// ---------------------------------------------------------------------------
// 2. Load / list
// ---------------------------------------------------------------------------

/// Load a program from `<home>/.milonga/plans/<name>.yaml`.
///
/// Returns `StoreError::PlanNotFound` if absent, `StoreError::Parse` if the
/// YAML is malformed and `StoreError::Invalid` if a tanda breaks a timeline
/// invariant (see [`Program::normalize`]). Energies are clamped on the way in.
pub fn load_plan_at(home: &Path, name: &PlanName) -> Result<Program, StoreError> {
    let path = plan_path_at(home, name)?;
    if !path.exists() {
        return Err(StoreError::PlanNotFound { path });
    }
    let contents = std::fs::read_to_string(&path)?;
    let mut program: Program = serde_yaml::from_str(&contents).map_err(|e| StoreError::Parse {
        path: path.clone(),
        source: e,
    })?;
    if let Err(source) = program.normalize() {
        return Err(StoreError::Invalid { path, source });
    }
    tracing::debug!(path = %path.display(), tandas = program.tandas.len(), "loaded plan");
    Ok(program)
}

/// `load_plan_at` convenience wrapper.
pub fn load_plan(name: &PlanName) -> Result<Program, StoreError> {
    load_plan_at(&home()?, name)
}

/// Names of every stored plan, sorted.
pub fn list_plans_at(home: &Path) -> Result<Vec<PlanName>, StoreError> {
    let dir = milonga_dir_at(home).join("plans");
    if !dir.exists() {
        return Ok(vec![]);
    }
    let mut names: Vec<PlanName> = std::fs::read_dir(&dir)?
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
        .filter_map(|e| {
            let fname = e.file_name().to_string_lossy().into_owned();
            fname.strip_suffix(".yaml").map(PlanName::from)
        })
        .collect();
    names.sort();
    Ok(names)
}

/// `list_plans_at` convenience wrapper.
pub fn list_plans() -> Result<Vec<PlanName>, StoreError> {
    list_plans_at(&home()?)
}

pub fn plan_exists_at(home: &Path, name: &PlanName) -> Result<bool, StoreError> {
    Ok(plan_path_at(home, name)?.exists())
}

// ---------------------------------------------------------------------------
// 3. Save (atomic)
// ---------------------------------------------------------------------------

/// Atomically save a program to `<home>/.milonga/plans/<name>.yaml`.
///
/// Write flow: serialize → `.yaml.tmp` sibling → `chmod 0600` → `rename`.
/// `.tmp` is always in the same directory as the target (same filesystem).
pub fn save_plan_at(home: &Path, name: &PlanName, program: &Program) -> Result<(), StoreError> {
    let path = plan_path_at(home, name)?;
    plans_dir_at(home)?;
    let tmp_path = path.with_file_name(format!("{}.yaml.tmp", name.0));

    let yaml = serde_yaml::to_string(program)?;
    std::fs::write(&tmp_path, yaml)?;
    set_file_permissions(&tmp_path)?;
    std::fs::rename(&tmp_path, &path)?;
    tracing::debug!(path = %path.display(), "saved plan");
    Ok(())
}

/// `save_plan_at` convenience wrapper.
pub fn save_plan(name: &PlanName, program: &Program) -> Result<(), StoreError> {
    save_plan_at(&home()?, name, program)
}

/// Save `program` under a new name. Refuses to overwrite an existing plan.
pub fn create_plan_at(home: &Path, name: &PlanName, program: &Program) -> Result<(), StoreError> {
    let path = plan_path_at(home, name)?;
    if path.exists() {
        return Err(StoreError::PlanExists { path });
    }
    save_plan_at(home, name, program)?;
    tracing::info!(plan = %name, "created plan");
    Ok(())
}

/// `create_plan_at` convenience wrapper.
pub fn create_plan(name: &PlanName, program: &Program) -> Result<(), StoreError> {
    create_plan_at(&home()?, name, program)
}

// ---------------------------------------------------------------------------
// 4. JSON exchange
// ---------------------------------------------------------------------------

/// Portable form of a single set, as written by `export`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetExport {
    pub set: MilongaSet,
    #[serde(default = "default_export_slots")]
    pub slot_count: usize,
    #[serde(default)]
    pub tandas: Vec<Tanda>,
}

fn default_export_slots() -> usize {
    DEFAULT_SLOTS
}

/// Pretty JSON `{set, slot_count, tandas}` for one program.
pub fn export_set_json(program: &Program) -> Result<String, StoreError> {
    let export = SetExport {
        set: program.set.clone(),
        slot_count: program.slot_count,
        tandas: program.tandas.clone(),
    };
    Ok(serde_json::to_string_pretty(&export)?)
}

/// Build a program from exported JSON.
///
/// The set and every tanda get fresh ids and the set name gains
/// [`IMPORTED_SUFFIX`]. Positions are kept and the result is normalized
/// like a loaded plan.
pub fn import_set_json(json: &str) -> Result<Program, StoreError> {
    let export: SetExport =
        serde_json::from_str(json).map_err(|source| StoreError::Import { source })?;

    let mut set = export.set;
    set.id = SetId::generate();
    set.name = format!("{}{}", set.name, IMPORTED_SUFFIX);
    set.created_at = Utc::now();

    let tandas = export
        .tandas
        .into_iter()
        .map(|mut t| {
            t.id = TandaId::generate();
            t
        })
        .collect();

    let mut program = Program {
        version: PLAN_VERSION,
        set,
        slot_count: export.slot_count,
        tandas,
    };
    program
        .normalize()
        .map_err(|source| StoreError::Invalid {
            path: PathBuf::from("(import)"),
            source,
        })?;
    Ok(program)
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

pub(crate) fn home() -> Result<PathBuf, StoreError> {
    dirs::home_dir().ok_or(StoreError::HomeNotFound)
}

#[cfg(unix)]
fn set_dir_permissions(path: &Path) -> Result<(), StoreError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700))?;
    Ok(())
}
#[cfg(not(unix))]
fn set_dir_permissions(_path: &Path) -> Result<(), StoreError> {
    Ok(())
}

#[cfg(unix)]
fn set_file_permissions(path: &Path) -> Result<(), StoreError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    Ok(())
}
#[cfg(not(unix))]
fn set_file_permissions(_path: &Path) -> Result<(), StoreError> {
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};
    use tempfile::TempDir;

    use crate::types::{NewTanda, OrchestraId, TandaMode, TandaType};

    fn make_home() -> TempDir {
        TempDir::new().expect("tempdir")
    }

    fn plan() -> PlanName {
        PlanName::from("saturday")
    }

    fn program() -> Program {
        let mut p = Program::new(
            "Saturday Milonga",
            Some("Salon Canning".into()),
            NaiveDate::from_ymd_opt(2026, 3, 7).unwrap(),
            NaiveTime::from_hms_opt(21, 0, 0).unwrap(),
            8,
        );
        let id = p.add_tanda(NewTanda {
            orchestra: OrchestraId::from("di_sarli"),
            mode: TandaMode::Standard,
            mix: vec![],
            singer: None,
            tanda_type: TandaType::Tango,
            track_count: 4,
            energy: 6.0,
            style: None,
            era: None,
        });
        p.place(&id, 0).unwrap();
        p
    }

    #[test]
    fn plan_path_is_correct() {
        let home = make_home();
        let path = plan_path_at(home.path(), &plan()).unwrap();
        assert!(path.ends_with(".milonga/plans/saturday.yaml"));
    }

    #[test]
    fn plan_name_rejects_separators() {
        let home = make_home();
        let err = plan_path_at(home.path(), &PlanName::from("../etc")).unwrap_err();
        assert!(matches!(err, StoreError::InvalidPlanName { .. }));
        assert!(validate_plan_name(&PlanName::from("")).is_err());
        assert!(validate_plan_name(&PlanName::from("fri-13_late")).is_ok());
    }

    #[test]
    fn plans_dir_created_with_perms() {
        let home = make_home();
        let dir = plans_dir_at(home.path()).expect("plans_dir_at");
        assert!(dir.exists());
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&dir).unwrap().permissions().mode() & 0o777;
            assert_eq!(mode, 0o700);
        }
    }

    #[test]
    fn save_and_load_roundtrip() {
        let home = make_home();
        let p = program();
        save_plan_at(home.path(), &plan(), &p).expect("save");
        let loaded = load_plan_at(home.path(), &plan()).expect("load");
        assert_eq!(loaded, p);
    }

    #[test]
    fn atomic_write_cleans_up_tmp() {
        let home = make_home();
        save_plan_at(home.path(), &plan(), &program()).expect("save");
        let tmp = plan_path_at(home.path(), &plan())
            .unwrap()
            .with_file_name("saturday.yaml.tmp");
        assert!(!tmp.exists(), ".tmp must be gone after successful save");
    }

    #[test]
    fn load_missing_plan_returns_not_found() {
        let home = make_home();
        let err = load_plan_at(home.path(), &plan()).unwrap_err();
        assert!(matches!(err, StoreError::PlanNotFound { .. }));
    }

    #[test]
    fn create_refuses_existing() {
        let home = make_home();
        create_plan_at(home.path(), &plan(), &program()).expect("create");
        let err = create_plan_at(home.path(), &plan(), &program()).unwrap_err();
        assert!(matches!(err, StoreError::PlanExists { .. }));
        assert!(plan_exists_at(home.path(), &plan()).unwrap());
    }

    #[test]
    fn list_plans_empty_then_sorted() {
        let home = make_home();
        assert!(list_plans_at(home.path()).unwrap().is_empty());
        for name in ["zeta", "alpha", "mid"] {
            save_plan_at(home.path(), &PlanName::from(name), &program()).unwrap();
        }
        let names: Vec<_> = list_plans_at(home.path())
            .unwrap()
            .into_iter()
            .map(|n| n.0)
            .collect();
        assert_eq!(names, ["alpha", "mid", "zeta"]);
    }

    #[test]
    fn import_assigns_fresh_ids() {
        let p = program();
        let json = export_set_json(&p).unwrap();
        let imported = import_set_json(&json).unwrap();
        assert_ne!(imported.set.id, p.set.id);
        assert_eq!(imported.set.name, "Saturday Milonga (imported)");
        assert_eq!(imported.tandas.len(), 1);
        assert_ne!(imported.tandas[0].id, p.tandas[0].id);
        assert_eq!(imported.tandas[0].position, Some(0));
        assert_eq!(imported.slot_count, 8);
    }

    #[test]
    fn import_rejects_garbage() {
        let err = import_set_json("{\"tandas\": []}").unwrap_err();
        assert!(matches!(err, StoreError::Import { .. }));
    }

    #[test]
    fn home_not_found_error_message() {
        assert!(StoreError::HomeNotFound.to_string().contains("home directory"));
    }
}
