//! Integration tests for the loader crate, on temporary ledger directories.

use chrono::NaiveDate;
use coin_core::Ledger;
use coin_loader::{ledger_files, FileState, LoadError, Loader, LoaderConfig};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2018, 10, 1).unwrap()
}

fn write(dir: &Path, name: &str, contents: &str) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

fn sample_db() -> TempDir {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "commodities.coin", "commodity CAD\n  format 1.00 CAD\n\ncommodity TDB162\n  format 1.000 TDB162\n");
    write(dir.path(), "accounts.coin", "account Assets:Bank\n  commodity CAD\n");
    write(dir.path(), "prices.coin", "P 2018/09/01 TDB162 12.50 CAD\n");
    write(
        dir.path(),
        "2018/10.coin",
        "2018/10/01 buy\n  Assets:TDB162  2.000 TDB162\n  Assets:Bank\n",
    );
    write(
        dir.path(),
        "2018/09.coin",
        "2018/09/15 salary\n  Assets:Bank  100.00\n  Income:Salary\n",
    );
    write(dir.path(), "notes.txt", "not a ledger file\n");
    dir
}

#[test]
fn test_ledger_files_order() {
    let db = sample_db();
    let files = ledger_files(db.path()).unwrap();
    let names: Vec<_> = files
        .iter()
        .map(|p| p.strip_prefix(db.path()).unwrap().to_string_lossy().replace('\\', "/"))
        .collect();
    assert_eq!(
        names,
        vec![
            "commodities.coin",
            "accounts.coin",
            "prices.coin",
            "2018/09.coin",
            "2018/10.coin",
        ]
    );
}

#[test]
fn test_load_all() {
    let db = sample_db();
    let mut ledger = Ledger::new();
    let mut loader = Loader::new(today());
    let result = loader.load_all(&mut ledger, db.path());

    assert!(result.is_ok(), "errors: {:?}", result.errors);
    assert_eq!(result.files.len(), 5);
    assert_eq!(ledger.transaction_count(), 2);
    assert_eq!(ledger.prices.len(), 1);

    let bank = ledger.accounts.by_name("Assets:Bank").unwrap();
    assert_eq!(ledger.accounts.get(bank).balance().unwrap().to_string(), "75.00 CAD");
    for file in &result.files {
        assert_eq!(loader.state(file), FileState::Resolved);
    }
}

#[test]
fn test_failing_file_does_not_stop_others() {
    let db = sample_db();
    write(db.path(), "2018/08.coin", "2018/08/01 broken\n  Assets:Bank  1.00 CAD\n");
    let mut ledger = Ledger::new();
    let mut loader = Loader::new(today());
    let result = loader.load_all(&mut ledger, db.path());

    assert_eq!(result.errors.len(), 1);
    let err = &result.errors[0];
    assert!(matches!(err, LoadError::Parse { .. }));
    assert!(err.path().ends_with("08.coin"));
    assert_eq!(loader.state(err.path()), FileState::Failed);
    assert_eq!(ledger.transaction_count(), 2);
}

#[test]
fn test_resolve_error_is_reported_with_path() {
    let db = TempDir::new().unwrap();
    write(
        db.path(),
        "ledger.coin",
        "2018/10/01 a\n  AA 1.00 CAD\n  BB\n\n2018/10/02 b\n  AA 1.00 USD\n  BB\n",
    );
    let mut ledger = Ledger::new();
    let result = Loader::new(today()).load_all(&mut ledger, db.path());

    assert_eq!(result.errors.len(), 1);
    assert!(matches!(result.errors[0], LoadError::Resolve { .. }));
    assert!(result.errors[0].to_string().ends_with("line 6: AA holds CAD, cannot post USD"));
}

#[test]
fn test_missing_directory() {
    let db = TempDir::new().unwrap();
    let missing = db.path().join("missing");
    let mut ledger = Ledger::new();
    let result = Loader::new(today()).load_all(&mut ledger, &missing);
    assert!(matches!(result.errors[..], [LoadError::Io { .. }]));
    assert!(result.files.is_empty());
}

#[test]
fn test_relative_dates_use_config_reference() {
    let db = TempDir::new().unwrap();
    write(db.path(), "ledger.coin", "-1d yesterday\n  AA 1.00 CAD\n  BB\n");
    let config = LoaderConfig::new(db.path(), today());
    let mut ledger = Ledger::new();
    let mut loader = Loader::from_config(&config);
    assert!(loader.load_all(&mut ledger, &config.db).is_ok());

    let (_, transaction) = ledger.transactions().next().unwrap();
    assert_eq!(transaction.posted, NaiveDate::from_ymd_opt(2018, 9, 30).unwrap());
}
