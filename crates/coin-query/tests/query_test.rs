//! Integration tests for registers and rollups.

use chrono::NaiveDate;
use coin_core::{Amount, Ledger, LookupError, Location, NewPosting, TagMatcher, Transaction};
use coin_query::{
    register, Interval, QueryError, RegisterOptions, Report, Rollup, RowKind, Stats, OTHER, TOTALS,
};
use proptest::prelude::*;
use rayon::prelude::*;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn load(text: &str) -> Ledger {
    let mut ledger = Ledger::new();
    let items = coin_parser::parse(text, date(2018, 10, 1)).expect("parse failed");
    coin_resolver::resolve(&mut ledger, "test.coin", items).expect("resolve failed");
    ledger
}

fn rollup_of(ledger: &Ledger, pattern: &str, options: &RegisterOptions) -> Rollup {
    match register(ledger, pattern, options).unwrap().report {
        Report::Rollup(rollup) => rollup,
        other => panic!("expected a rollup, got {other:?}"),
    }
}

fn monthly_rollup(top: usize) -> RegisterOptions {
    RegisterOptions {
        recurse: true,
        interval: Some(Interval::Month),
        top,
        ..RegisterOptions::default()
    }
}

fn rendered(values: &[Amount]) -> Vec<String> {
    values.iter().map(|v| v.render_number()).collect()
}

const SPENDING: &str = "\
2000/01/15 a
  Expenses:A 50.00 CAD
  Assets:Bank

2000/01/15 b
  Expenses:B 30.00 CAD
  Assets:Bank

2000/01/15 c
  Expenses:C 20.00 CAD
  Assets:Bank

2000/01/15 e
  Expenses:E 5.00 CAD
  Assets:Bank

2000/01/15 d
  Expenses:D 5.00 CAD
  Assets:Bank
";

#[test]
fn test_top_n_with_other() {
    let ledger = load(SPENDING);
    let rollup = rollup_of(&ledger, "expenses", &monthly_rollup(2));

    assert_eq!(rollup.periods, vec![date(2000, 1, 1)]);
    let rows: Vec<(&str, RowKind, Vec<String>)> = rollup
        .rows
        .iter()
        .map(|r| (r.label.as_str(), r.kind, rendered(&r.values)))
        .collect();
    assert_eq!(
        rows,
        vec![
            ("A", RowKind::Account, vec!["50.00".to_string()]),
            ("B", RowKind::Account, vec!["30.00".to_string()]),
            (OTHER, RowKind::Other, vec!["30.00".to_string()]),
            (TOTALS, RowKind::Totals, vec!["110.00".to_string()]),
        ]
    );
}

#[test]
fn test_top_n_ties_by_name() {
    let ledger = load(SPENDING);
    let rollup = rollup_of(&ledger, "expenses", &monthly_rollup(4));
    let labels: Vec<&str> = rollup.rows.iter().map(|r| r.label.as_str()).collect();
    assert_eq!(labels, vec!["A", "B", "C", "D", OTHER, TOTALS]);
    assert_eq!(rendered(&rollup.row(OTHER).unwrap().values), vec!["5.00"]);
}

#[test]
fn test_no_other_row_when_all_children_fit() {
    let ledger = load(SPENDING);
    let rollup = rollup_of(&ledger, "expenses", &monthly_rollup(5));
    assert!(rollup.row(OTHER).is_none());
    assert_eq!(rollup.rows.len(), 6);
}

#[test]
fn test_rollup_merges_grandchildren_and_aligns_periods() {
    let ledger = load(
        "\
2000/01/03 groceries
  Expenses:Food:Groceries 10.00 CAD
  Assets:Bank

2000/03/04 dining
  Expenses:Food:Dining 4.00 CAD
  Assets:Bank

2000/02/10 rent
  Expenses:Rent 100.00 CAD
  Assets:Bank
",
    );
    let rollup = rollup_of(&ledger, "expenses", &monthly_rollup(5));
    assert_eq!(
        rollup.periods,
        vec![date(2000, 1, 1), date(2000, 2, 1), date(2000, 3, 1)]
    );
    // ordered by the last period: Food has 4.00 there, Rent nothing
    let food = &rollup.rows[0];
    assert_eq!(food.label, "Food");
    assert_eq!(rendered(&food.values), vec!["10.00", "0.00", "4.00"]);
    let rent = &rollup.rows[1];
    assert_eq!(rent.label, "Rent");
    assert_eq!(rendered(&rent.values), vec!["0.00", "100.00", "0.00"]);
    let totals = rollup.row(TOTALS).unwrap();
    assert_eq!(rendered(&totals.values), vec!["10.00", "100.00", "4.00"]);
}

#[test]
fn test_rollup_cumulative() {
    let ledger = load(
        "\
2000/01/03 a
  Expenses:A 10.00 CAD
  Assets:Bank

2000/02/03 a
  Expenses:A 5.00 CAD
  Assets:Bank
",
    );
    let options = RegisterOptions {
        cumulative: true,
        ..monthly_rollup(5)
    };
    let rollup = rollup_of(&ledger, "expenses", &options);
    assert_eq!(rendered(&rollup.row("A").unwrap().values), vec!["10.00", "15.00"]);
    assert_eq!(rendered(&rollup.row(TOTALS).unwrap().values), vec!["10.00", "15.00"]);
}

#[test]
fn test_rollup_includes_own_postings_in_totals() {
    let ledger = load(
        "\
2000/01/03 a
  Expenses 1.00 CAD
  Assets:Bank

2000/01/04 b
  Expenses:A 2.00 CAD
  Assets:Bank
",
    );
    let rollup = rollup_of(&ledger, "expenses", &monthly_rollup(5));
    let labels: Vec<&str> = rollup.rows.iter().map(|r| r.label.as_str()).collect();
    assert_eq!(labels, vec!["A", TOTALS]);
    assert_eq!(rendered(&rollup.row(TOTALS).unwrap().values), vec!["3.00"]);
}

#[test]
fn test_rollup_of_mixed_commodities_fails() {
    let ledger = load(
        "\
2000/01/03 a
  Expenses:A 1.00 CAD
  Assets:Bank

2000/01/04 b
  Expenses:B 2.00 USD
  Assets:Cash
",
    );
    let err = register(&ledger, "expenses", &monthly_rollup(5)).unwrap_err();
    assert!(matches!(err, QueryError::Amount(_)));
}

#[test]
fn test_empty_rollup() {
    let mut ledger = load(SPENDING);
    ledger.accounts.get_or_create("Equity:Opening");
    let rollup = rollup_of(&ledger, "equity", &monthly_rollup(5));
    assert!(rollup.rows.is_empty());
    assert!(rollup.periods.is_empty());
}

#[test]
fn test_date_window() {
    let text: String = (1..=12)
        .map(|month| format!("2000/{month:02}/01 rent\n  Expenses:Rent 100.00 CAD\n  Assets:Bank\n\n"))
        .collect();
    let ledger = load(&text);
    let options = RegisterOptions {
        begin: Some(date(2000, 4, 1)),
        end: Some(date(2000, 7, 1)),
        interval: Some(Interval::Month),
        ..RegisterOptions::default()
    };
    let Report::Buckets { interval, rows } = register(&ledger, "rent", &options).unwrap().report
    else {
        panic!("expected buckets");
    };
    let periods: Vec<String> = rows.iter().map(|r| interval.label(r.period)).collect();
    assert_eq!(periods, vec!["2000/04", "2000/05", "2000/06"]);
    assert_eq!(rows[2].total.to_string(), "300.00 CAD");
}

#[test]
fn test_recursive_relative_names() {
    let ledger = load(
        "\
2000/01/05 groceries
  Expenses:Food:Groceries 10.00 CAD
  Assets:Bank

2000/01/02 reclassify
  Expenses:Food:Dining 3.00 CAD
  Expenses:Food:Groceries
",
    );
    let options = RegisterOptions {
        recurse: true,
        ..RegisterOptions::default()
    };
    let register = register(&ledger, "food", &options).unwrap();
    assert_eq!(register.account, "Expenses:Food");
    let Report::Recursive(rows) = register.report else {
        panic!("expected recursive rows");
    };
    let rows: Vec<(&str, &str, String, &str)> = rows
        .iter()
        .map(|r| (r.account.as_str(), r.other.as_str(), r.quantity.render_number(), r.commodity.as_str()))
        .collect();
    assert_eq!(
        rows,
        vec![
            ("Dining", "Groceries", "3.00".to_string(), "CAD"),
            ("Groceries", "Dining", "-3.00".to_string(), "CAD"),
            ("Groceries", "Assets:Bank", "10.00".to_string(), "CAD"),
        ]
    );
}

#[test]
fn test_tag_filter() {
    let ledger = load(
        "\
2000/01/05 hotel ; #trip: paris
  Expenses:Travel 100.00 CAD
  Assets:Bank

2000/01/06 taxi
  Expenses:Travel 20.00 CAD ; #trip: rome
  Assets:Bank

2000/01/07 train
  Expenses:Travel 30.00 CAD
  Assets:Bank
",
    );
    let descriptions = |expression: &str| -> Vec<String> {
        let options = RegisterOptions {
            tag: Some(TagMatcher::new(expression).unwrap()),
            ..RegisterOptions::default()
        };
        match register(&ledger, "travel", &options).unwrap().report {
            Report::Postings(rows) => rows.into_iter().map(|r| r.description).collect(),
            other => panic!("expected postings, got {other:?}"),
        }
    };
    assert_eq!(descriptions("trip"), vec!["hotel", "taxi"]);
    assert_eq!(descriptions("trip:par"), vec!["hotel"]);
    assert!(descriptions("vat").is_empty());
}

#[test]
fn test_lookup_errors() {
    let ledger = load(
        "\
2000/01/05 a
  Expenses:Food:Groceries 10.00 CAD
  Expenses:Home:Groceries
",
    );
    let options = RegisterOptions::default();
    assert!(matches!(
        register(&ledger, "nothing", &options),
        Err(QueryError::Lookup(LookupError::NotFound { .. }))
    ));
    match register(&ledger, "groc", &options) {
        Err(QueryError::Lookup(LookupError::Ambiguous { candidates, .. })) => assert_eq!(
            candidates,
            vec!["Expenses:Food:Groceries", "Expenses:Home:Groceries"]
        ),
        other => panic!("expected ambiguity, got {other:?}"),
    }
    assert!(register(&ledger, "food:groc", &options).is_ok());
}

#[test]
fn test_stats() {
    let ledger = load(SPENDING);
    let stats = Stats::of(&ledger);
    assert_eq!(stats.commodities, 1);
    assert_eq!(stats.transactions, 5);
    // Unbalanced, Expenses, A..E, Assets, Assets:Bank
    assert_eq!(stats.accounts, 9);
}

#[test]
fn test_concurrent_registers() {
    let ledger = load(SPENDING);
    let patterns = ["expenses:a", "expenses:b", "bank", "expenses"];
    let options = RegisterOptions::default();
    let sequential: Vec<_> = patterns
        .iter()
        .map(|p| register(&ledger, p, &options).unwrap())
        .collect();
    let parallel: Vec<_> = patterns
        .par_iter()
        .map(|p| register(&ledger, p, &options).unwrap())
        .collect();
    assert_eq!(sequential, parallel);
}

fn cents(amount: &Amount) -> i64 {
    amount.render_number().replace('.', "").parse().unwrap()
}

fn build(postings: &[(usize, bool, u32, i64)]) -> Ledger {
    let mut ledger = Ledger::new();
    let cad = ledger.commodities.declare("CAD", 2, "");
    let bank = ledger.accounts.get_or_create("Assets:Bank");
    for (line, &(child, deep, month, magnitude)) in postings.iter().enumerate() {
        let name = if deep {
            format!("Expenses:C{child}:Sub")
        } else {
            format!("Expenses:C{child}")
        };
        let account = ledger.accounts.get_or_create(&name);
        let quantity = Amount::new(magnitude, cad.clone());
        let transaction = Transaction::new(date(2000, month, 1), "x", Location::new("p.coin", line + 1));
        ledger
            .append_transaction(
                transaction,
                vec![NewPosting::new(account, quantity.clone()), NewPosting::new(bank, -quantity)],
            )
            .unwrap();
    }
    ledger
}

proptest! {
    #[test]
    fn prop_rollup_is_additive(
        postings in prop::collection::vec((0usize..6, any::<bool>(), 1u32..=12, -100_000i64..100_000), 1..40),
        top in 0usize..7,
    ) {
        let ledger = build(&postings);
        let rollup = rollup_of(&ledger, "expenses", &monthly_rollup(top));

        let totals = rollup.row(TOTALS).unwrap();
        for (index, period) in rollup.periods.iter().enumerate() {
            let expected: i64 = postings
                .iter()
                .filter(|p| date(2000, p.2, 1) == *period)
                .map(|p| p.3)
                .sum();
            prop_assert_eq!(cents(&totals.values[index]), expected);

            let parts: i64 = rollup
                .rows
                .iter()
                .filter(|r| r.kind != RowKind::Totals)
                .map(|r| cents(&r.values[index]))
                .sum();
            prop_assert_eq!(parts, expected);
        }
        let shown = rollup.rows.iter().filter(|r| r.kind == RowKind::Account).count();
        prop_assert!(shown <= top);
    }
}
