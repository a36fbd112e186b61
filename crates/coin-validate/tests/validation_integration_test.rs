//! Integration tests for ledger diagnostics.

use chrono::NaiveDate;
use coin_core::Ledger;
use coin_validate::{
    assertion_failures, find_duplicates, find_unbalanced, validate, ErrorCode, Severity,
};
use proptest::prelude::*;

fn load(source: &str) -> Ledger {
    let today = NaiveDate::from_ymd_opt(2018, 10, 1).unwrap();
    let items = coin_parser::parse(source, today).unwrap();
    let mut ledger = Ledger::new();
    coin_resolver::resolve(&mut ledger, "test.coin", items).unwrap();
    ledger
}

#[test]
fn test_assertion_failure() {
    let ledger = load("2018/10/01 payee1\n  AA 10.00 CAD\n  BB -10.00 CAD = 50.00 CAD\n");
    let diagnostics = assertion_failures(&ledger);
    assert_eq!(diagnostics.len(), 1);
    let diagnostic = &diagnostics[0];
    assert_eq!(diagnostic.code, ErrorCode::BalanceAssertionFailed);
    assert_eq!(diagnostic.severity, Severity::Error);
    assert_eq!(
        diagnostic.to_string(),
        "test.coin:1: [E2001] balance assertion failed for BB"
    );
    assert_eq!(
        diagnostic.context.as_deref(),
        Some("expected 50.00 CAD, found -10.00 CAD")
    );
}

#[test]
fn test_unbalanced() {
    let ledger = load(
        "2018/10/01 fine\n  AA 10.00 CAD\n  BB\n\n2018/10/02 oops\n  AA 10.00 CAD\n  BB -9.50 CAD\n",
    );
    let diagnostics = find_unbalanced(&ledger);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].location.line, 5);
    assert_eq!(diagnostics[0].message, "transaction is unbalanced by 0.50 CAD");
    assert_eq!(diagnostics[0].context.as_deref(), Some("oops"));
}

#[test]
fn test_unbalanced_ignores_cleared_journal() {
    let mut ledger = load("2018/10/02 oops\n  AA 10.00 CAD\n  BB -9.50 CAD\n");
    ledger.clear_transactions();
    assert!(find_unbalanced(&ledger).is_empty());
}

#[test]
fn test_duplicates() {
    let ledger = load(
        "2018/10/01 payee1\n  AA 10.00 CAD\n  BB\n\n\
         2018/10/01 payee1\n  AA 10.00 CAD\n  BB\n\n\
         2018/10/01 payee1\n  AA 10.01 CAD\n  BB\n\n\
         2018/10/02 payee1\n  AA 10.00 CAD\n  BB\n",
    );
    let diagnostics = find_duplicates(&ledger);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].code, ErrorCode::DuplicateTransaction);
    assert_eq!(diagnostics[0].severity, Severity::Warning);
    assert_eq!(diagnostics[0].location.line, 5);
    assert_eq!(
        diagnostics[0].message,
        "possible duplicate of transaction at test.coin:1"
    );
    let original = diagnostics[0].related.expect("duplicate points at its original");
    assert_eq!(ledger.transaction(original).location.line, 1);
}

#[test]
fn test_validate_orders_by_line() {
    let ledger = load(
        "2018/10/01 payee1\n  AA 10.00 CAD\n  BB\n\n\
         2018/10/01 payee1\n  AA 10.00 CAD\n  BB\n\n\
         2018/10/02 oops\n  AA 10.00 CAD = 5.00 CAD\n  BB -9.00 CAD\n",
    );
    let codes: Vec<_> = validate(&ledger)
        .into_iter()
        .map(|d| (d.location.line, d.code.code()))
        .collect();
    assert_eq!(codes, vec![(5, "E3005"), (9, "E2001"), (9, "E3001")]);
}

proptest! {
    #[test]
    fn prop_repeated_transactions_are_flagged(copies in 1usize..6, cents in 1u32..100_000) {
        let entry = format!(
            "2018/10/01 payee\n  AA {}.{:02} CAD\n  BB\n\n",
            cents / 100,
            cents % 100
        );
        let ledger = load(&entry.repeat(copies));
        prop_assert_eq!(find_duplicates(&ledger).len(), copies - 1);
    }
}
