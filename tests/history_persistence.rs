// On-disk behaviour of the history store: reopen, ordering, export

use bmi_tracker::{compute, BmiCalculator, Category, HistoryRecord, HistoryStore};
use std::fs;
use tempfile::TempDir;

fn db_path(dir: &TempDir) -> std::path::PathBuf {
    dir.path().join("bmi_calculator.db")
}

#[test]
fn test_records_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let path = db_path(&dir);

    let saved = {
        let calc = BmiCalculator::open(&path).unwrap();
        let first = calc.calculate("Ana", "70", "175").unwrap();
        let second = calc.calculate("Ana", "100", "170").unwrap();
        calc.shutdown().unwrap();
        vec![first.record, second.record]
    };

    let store = HistoryStore::open(&path).unwrap();
    let records = store.read_all().unwrap();

    assert_eq!(records, saved);
    assert_eq!(records[1].category, Category::Obesity.label());
    store.close().unwrap();
}

#[test]
fn test_ids_continue_after_reopen() {
    let dir = TempDir::new().unwrap();
    let path = db_path(&dir);

    let first_id = {
        let store = HistoryStore::open(&path).unwrap();
        let r = store.append("a", 50.0, 1.6, 19.53, "Normal weight").unwrap();
        store.close().unwrap();
        r.id
    };

    let store = HistoryStore::open(&path).unwrap();
    let next = store.append("b", 45.0, 1.7, 15.57, "Underweight").unwrap();

    assert!(next.id > first_id);
    assert_eq!(store.count().unwrap(), 2);
}

#[test]
fn test_engine_output_round_trips_through_store() {
    let dir = TempDir::new().unwrap();
    let store = HistoryStore::open(&db_path(&dir)).unwrap();

    let result = compute(45.0, 170.0).unwrap();
    let appended = store
        .append("Bo", 45.0, 1.70, result.bmi, result.label())
        .unwrap();

    let records = store.read_all().unwrap();
    let found: Vec<&HistoryRecord> = records.iter().filter(|r| r.id == appended.id).collect();

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].name, "Bo");
    assert_eq!(found[0].weight, 45.0);
    assert_eq!(found[0].height, 1.70);
    assert_eq!(found[0].bmi, result.bmi);
    assert_eq!(found[0].category, "Underweight");
}

#[test]
fn test_rejected_input_leaves_file_untouched() {
    let dir = TempDir::new().unwrap();
    let path = db_path(&dir);
    let calc = BmiCalculator::open(&path).unwrap();

    let err = calc.calculate("x", "-5", "170").unwrap_err();

    assert!(err.is_invalid_measurement());
    assert_eq!(calc.store().count().unwrap(), 0);
}

#[test]
fn test_export_csv_to_file() {
    let dir = TempDir::new().unwrap();
    let calc = BmiCalculator::open(&db_path(&dir)).unwrap();
    calc.calculate("Ana", "70", "175").unwrap();
    calc.calculate("Bo", "50", "160").unwrap();

    let out = dir.path().join("history.csv");
    let written = calc
        .store()
        .export_csv(fs::File::create(&out).unwrap())
        .unwrap();

    let text = fs::read_to_string(&out).unwrap();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(written, 2);
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "ID,Date,Name,Weight,Height,BMI,Category");
    assert!(lines[1].starts_with("1,"));
    assert!(lines[1].ends_with(",Ana,70.0,1.75,22.857142857142858,Normal weight"));
    assert!(lines[2].contains(",Bo,50.0,1.6,"));
}

#[test]
fn test_open_fails_for_missing_directory() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("no/such/dir/bmi.db");

    let err = HistoryStore::open(&path).err().expect("open should fail");
    assert!(err.is_persistence_failure());
}
