//! Plan store error-message, atomic-write-safety, and exchange integration tests.
//! Layout: ~/.milonga/plans/<name>.yaml

use assert_fs::prelude::*;
use chrono::{NaiveDate, NaiveTime};
use milonga_core::{
    store, NewTanda, OrchestraId, PlanName, Program, StoreError, TandaMode, TandaType,
};
use predicates::prelude::predicate;
use std::fs;

fn name() -> PlanName {
    PlanName::from("friday")
}

fn program_with(placed: &[(&str, TandaType, usize)]) -> Program {
    let mut program = Program::new(
        "Friday Practica",
        None,
        NaiveDate::from_ymd_opt(2026, 5, 1).unwrap(),
        NaiveTime::from_hms_opt(20, 30, 0).unwrap(),
        10,
    );
    for (orch, ty, slot) in placed {
        let id = program.add_tanda(NewTanda {
            orchestra: OrchestraId::from(*orch),
            mode: TandaMode::Standard,
            mix: vec![],
            singer: None,
            tanda_type: *ty,
            track_count: 4,
            energy: 5.5,
            style: None,
            era: None,
        });
        program.place(&id, *slot).expect("place");
    }
    program
}

// ---------------------------------------------------------------------------
// 1. Load error messages
// ---------------------------------------------------------------------------

#[test]
fn load_missing_plan_names_the_file() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    let err = store::load_plan_at(home.path(), &name()).unwrap_err();
    assert!(matches!(err, StoreError::PlanNotFound { .. }), "got: {err}");
    assert!(err.to_string().contains("friday.yaml"));
}

#[test]
fn load_corrupt_yaml_returns_parse_error_with_path() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    home.child(".milonga/plans/friday.yaml")
        .write_str(": : corrupt : yaml : !!!\n  - broken: [unclosed")
        .expect("write");

    let err = store::load_plan_at(home.path(), &name()).unwrap_err();
    assert!(matches!(err, StoreError::Parse { .. }), "got: {err}");
    assert!(err.to_string().contains("friday.yaml"));
}

#[test]
fn load_rejects_two_tandas_in_one_slot() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    let mut program = program_with(&[("canaro", TandaType::Tango, 0), ("donato", TandaType::Vals, 1)]);
    program.tandas[1].position = Some(0);
    // Bypass the API to write a document the timeline would never produce.
    let yaml = serde_yaml::to_string(&program).expect("yaml");
    home.child(".milonga/plans/friday.yaml")
        .write_str(&yaml)
        .expect("write");

    let err = store::load_plan_at(home.path(), &name()).unwrap_err();
    assert!(matches!(err, StoreError::Invalid { .. }), "got: {err}");
    assert!(err.to_string().contains("slot 1"));
}

fn write_plan_document(home: &assert_fs::TempDir, program: &Program) {
    let yaml = serde_yaml::to_string(program).expect("yaml");
    home.child(".milonga/plans/friday.yaml")
        .write_str(&yaml)
        .expect("write");
}

#[test]
fn load_clamps_out_of_range_energy() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    let mut program = program_with(&[("canaro", TandaType::Tango, 0), ("donato", TandaType::Vals, 1)]);
    program.tandas[0].energy = 25.0;
    program.tandas[1].energy = -3.0;
    write_plan_document(&home, &program);

    let loaded = store::load_plan_at(home.path(), &name()).expect("load");
    assert_eq!(loaded.tandas[0].energy, 10.0);
    assert_eq!(loaded.tandas[1].energy, 1.0);
}

#[test]
fn load_rejects_track_count_outside_three_to_four() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    let mut program = program_with(&[("canaro", TandaType::Tango, 0)]);
    program.tandas[0].track_count = 9;
    write_plan_document(&home, &program);

    let err = store::load_plan_at(home.path(), &name()).unwrap_err();
    assert!(matches!(err, StoreError::Invalid { .. }), "got: {err}");
    assert!(err.to_string().contains("9 tracks"), "got: {err}");
}

#[test]
fn load_rejects_mixed_tanda_with_one_orchestra() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    let mut program = program_with(&[("canaro", TandaType::Tango, 0)]);
    program.tandas[0].mode = TandaMode::Mixed;
    program.tandas[0].mix = vec![OrchestraId::from("canaro")];
    write_plan_document(&home, &program);

    let err = store::load_plan_at(home.path(), &name()).unwrap_err();
    assert!(matches!(err, StoreError::Invalid { .. }), "got: {err}");
    assert!(err.to_string().contains("at least 2"), "got: {err}");
}

// ---------------------------------------------------------------------------
// 2. Atomic write safety
// ---------------------------------------------------------------------------

#[test]
fn save_writes_0600_and_leaves_no_tmp() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    let program = program_with(&[("di_sarli", TandaType::Tango, 0)]);
    store::save_plan_at(home.path(), &name(), &program).expect("save");

    home.child(".milonga/plans/friday.yaml")
        .assert(predicate::path::exists());
    home.child(".milonga/plans/friday.yaml.tmp")
        .assert(predicate::path::missing());

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let path = store::plan_path_at(home.path(), &name()).unwrap();
        let mode = fs::metadata(&path).expect("meta").permissions().mode() & 0o777;
        assert_eq!(mode, 0o600, "expected 0600, got {mode:o}");
    }
}

#[test]
fn mid_write_crash_leaves_original_intact() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    let program = program_with(&[("di_sarli", TandaType::Tango, 0)]);
    store::save_plan_at(home.path(), &name(), &program).expect("save");

    let path = store::plan_path_at(home.path(), &name()).unwrap();
    let original = fs::read(&path).expect("read original");

    // Simulate crash: .tmp written but process died before rename
    let tmp = path.with_file_name("friday.yaml.tmp");
    fs::write(&tmp, b"CRASH - INCOMPLETE WRITE").expect("write tmp");

    assert_eq!(original, fs::read(&path).expect("read after crash"));
    let loaded = store::load_plan_at(home.path(), &name()).expect("load");
    assert_eq!(loaded, program);
}

#[test]
fn list_ignores_tmp_orphans() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    store::save_plan_at(home.path(), &name(), &program_with(&[])).expect("save");
    home.child(".milonga/plans/other.yaml.tmp")
        .write_str("orphan")
        .expect("write");

    let names = store::list_plans_at(home.path()).expect("list");
    assert_eq!(names, vec![name()]);
}

// ---------------------------------------------------------------------------
// 3. JSON exchange
// ---------------------------------------------------------------------------

#[test]
fn export_then_import_keeps_timeline_shape() {
    let program = program_with(&[
        ("canaro", TandaType::Tango, 0),
        ("donato", TandaType::Vals, 2),
        ("canaro", TandaType::Milonga, 5),
    ]);
    let json = store::export_set_json(&program).expect("export");
    assert!(json.contains("\"set\""));
    assert!(json.contains("\"tandas\""));

    let imported = store::import_set_json(&json).expect("import");
    assert!(imported.set.name.ends_with(" (imported)"));
    let shape = |p: &Program| -> Vec<Option<(String, TandaType)>> {
        p.slots()
            .iter()
            .map(|s| s.map(|t| (t.orchestra.0.clone(), t.tanda_type)))
            .collect()
    };
    assert_eq!(shape(&imported), shape(&program));
    for (a, b) in imported.tandas.iter().zip(&program.tandas) {
        assert_ne!(a.id, b.id);
    }
}

#[test]
fn imported_program_saves_under_new_name() {
    let home = assert_fs::TempDir::new().expect("tempdir");
    let json = store::export_set_json(&program_with(&[("troilo", TandaType::Tango, 3)])).unwrap();
    let imported = store::import_set_json(&json).unwrap();
    store::create_plan_at(home.path(), &PlanName::from("friday-copy"), &imported).expect("create");
    home.child(".milonga/plans/friday-copy.yaml")
        .assert(predicate::str::contains("troilo"));
}

#[test]
fn import_clamps_energy_into_range() {
    let mut program = program_with(&[("canaro", TandaType::Tango, 0), ("troilo", TandaType::Tango, 1)]);
    program.tandas[0].energy = 25.0;
    program.tandas[1].energy = 0.0;
    let json = store::export_set_json(&program).expect("export");

    let imported = store::import_set_json(&json).expect("import");
    let energies: Vec<f64> = imported.tandas.iter().map(|t| t.energy).collect();
    assert_eq!(energies, vec![10.0, 1.0]);
}

#[test]
fn import_rejects_bad_track_count() {
    let mut program = program_with(&[("canaro", TandaType::Tango, 0)]);
    program.tandas[0].energy = 25.0;
    program.tandas[0].track_count = 9;
    let json = store::export_set_json(&program).expect("export");

    let err = store::import_set_json(&json).unwrap_err();
    assert!(matches!(err, StoreError::Invalid { .. }), "got: {err}");
    assert!(err.to_string().contains("9 tracks"), "got: {err}");
}
