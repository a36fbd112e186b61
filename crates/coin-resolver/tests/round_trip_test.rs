//! Rendering resolved entries and parsing the text again is lossless.

use chrono::NaiveDate;
use coin_core::{format_price, format_transaction, Ledger, Style};
use coin_parser::{parse, Item};
use coin_resolver::resolve;

/// Declarations live apart from the journal, as `commodities.coin` does.
const DECLARATIONS: &str = "commodity TDB162\n  format 1.000 TDB162\n";

const EXPLICIT: &str = "\
P 2018/10/01 TDB162 12.50 CAD

2018/10/01 (42) COSTCO WHOLESALE ; hello
  ;   indented #travel: Paris
  Expenses:Groceries        37.92 CAD ; dinner
  Liabilities:Credit:AMEX  -37.92 CAD = -37.92 CAD
    ; second line #card: amex

2018/10/02 buy
  Assets:RRSP   2.000 TDB162
  Assets:Cash  -25.00 CAD

2018/10/03
  Assets:RRSP  \"TDB162\" 1.500
  Assets:Cash  CAD -18.75 = CAD -43.75
";

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2018, 10, 1).unwrap()
}

/// Resolve the declarations, then `source`, into a fresh ledger.
fn load(source: &str) -> Ledger {
    let mut ledger = Ledger::new();
    resolve(&mut ledger, "commodities.coin", parse(DECLARATIONS, today()).unwrap()).unwrap();
    resolve(&mut ledger, "source.coin", parse(source, today()).unwrap()).unwrap();
    ledger
}

/// Every price, then every transaction, each followed by a blank line.
fn render(ledger: &Ledger, style: Style) -> String {
    let mut text = String::new();
    for price in ledger.prices.iter() {
        text.push_str(&format_price(price, style));
        text.push('\n');
    }
    for (id, _) in ledger.transactions() {
        text.push_str(&format_transaction(ledger, id, style));
        text.push('\n');
    }
    text
}

/// Parsed prices and transactions, with source line numbers dropped.
fn entries(source: &str) -> Vec<Item> {
    parse(source, today())
        .unwrap()
        .into_iter()
        .filter_map(|item| match item.into_inner() {
            Item::Transaction(mut txn) => {
                for posting in &mut txn.postings {
                    posting.line = 0;
                }
                Some(Item::Transaction(txn))
            }
            price @ Item::Price(_) => Some(price),
            _ => None,
        })
        .collect()
}

#[test]
fn test_rendered_entries_parse_back_unchanged() {
    let ledger = load(EXPLICIT);
    for style in [Style::Native, Style::Ledger] {
        let text = render(&ledger, style);
        assert_eq!(entries(&text), entries(EXPLICIT), "{style:?}:\n{text}");
    }
}

#[test]
fn test_rendering_is_a_fixed_point() {
    let elided = "\
2018/10/01 payee1 ; #trip: Paris
  AA  10.00 CAD
  BB

2018/10/02 (7) payee2
  BB  5.00 CAD = -5.00 CAD
  ; kept
  CC
";
    for source in [EXPLICIT, elided] {
        for style in [Style::Native, Style::Ledger] {
            let once = render(&load(source), style);
            let twice = render(&load(&once), style);
            assert_eq!(once, twice, "{style:?}");
        }
    }
}

#[test]
fn test_styles_render_each_other() {
    let native = render(&load(EXPLICIT), Style::Native);
    let ledger = render(&load(EXPLICIT), Style::Ledger);
    assert_eq!(render(&load(&ledger), Style::Native), native);
    assert_eq!(render(&load(&native), Style::Ledger), ledger);
}
