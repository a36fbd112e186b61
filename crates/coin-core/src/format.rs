//! Rendering of ledger entries back to text.
//!
//! Output is stable: rendering an entry, parsing the text and rendering the
//! result again yields the same bytes in either [`Style`].

use crate::amount::Style;
use crate::ledger::Ledger;
use crate::price::Price;
use crate::transaction::TransactionId;

/// Date format of entries and daily or weekly report rows.
pub const DATE_FORMAT: &str = "%Y/%m/%d";

/// Date format of monthly report rows.
pub const MONTH_FORMAT: &str = "%Y/%m";

/// Date format of yearly report rows.
pub const YEAR_FORMAT: &str = "%Y";

/// Append one note line as a `;` comment.
fn push_note_line(out: &mut String, line: &str) {
    out.push(';');
    if !line.is_empty() {
        out.push(' ');
        out.push_str(line);
    }
}

/// Append a note: the first line inline, the rest on indented lines.
fn push_note(out: &mut String, note: &str, indent: &str) {
    let mut lines = note.split('\n');
    if let Some(first) = lines.next() {
        out.push(' ');
        push_note_line(out, first);
    }
    for line in lines {
        out.push('\n');
        out.push_str(indent);
        push_note_line(out, line);
    }
}

/// Render a transaction with its postings.
///
/// Account names are padded to a common width and quantities right-aligned
/// so that the amounts of a transaction line up.
pub fn format_transaction(ledger: &Ledger, id: TransactionId, style: Style) -> String {
    let transaction = ledger.transaction(id);
    let mut out = transaction.posted.format(DATE_FORMAT).to_string();
    if !transaction.code.is_empty() {
        out.push_str(&format!(" ({})", transaction.code));
    }
    if !transaction.description.is_empty() {
        out.push(' ');
        out.push_str(&transaction.description);
    }
    if !transaction.note.is_empty() {
        push_note(&mut out, &transaction.note, "  ");
    }
    out.push('\n');

    let rows: Vec<_> = ledger
        .postings_of(id)
        .map(|(_, posting)| {
            (
                ledger.accounts.get(posting.account).full_name.as_str(),
                posting.quantity.render(style),
                posting,
            )
        })
        .collect();
    let name_width = rows.iter().map(|(name, ..)| name.chars().count()).max().unwrap_or(0);
    let amount_width = rows.iter().map(|(_, q, _)| q.chars().count()).max().unwrap_or(0);

    for (name, quantity, posting) in rows {
        out.push_str(&format!("  {name:<name_width$}  {quantity:>amount_width$}"));
        if let Some(balance) = &posting.balance {
            out.push_str(&format!(" = {}", balance.render(style)));
        }
        if !posting.note.is_empty() {
            push_note(&mut out, &posting.note, "    ");
        }
        out.push('\n');
    }
    out
}

/// Render a price directive.
pub fn format_price(price: &Price, style: Style) -> String {
    format!(
        "P {} {} {}\n",
        price.date.format(DATE_FORMAT),
        price.commodity.safe_id(style == Style::Ledger),
        price.value.render(style)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amount::Amount;
    use crate::ledger::NewPosting;
    use crate::transaction::{Location, Transaction};
    use chrono::NaiveDate;

    fn sample() -> (Ledger, TransactionId) {
        let mut ledger = Ledger::new();
        let cad = ledger.commodities.declare("CAD", 2, "");
        let groceries = ledger.accounts.get_or_create("Expenses:Groceries");
        let amex = ledger.accounts.get_or_create("Liabilities:Credit:AMEX");
        let mut transaction = Transaction::new(
            NaiveDate::from_ymd_opt(2008, 4, 2).unwrap(),
            "COSTCO WHOLESALE",
            Location::new("test.coin", 1),
        );
        transaction.code = "42".to_string();
        transaction.note = "hello\n  indented".to_string();
        let quantity = Amount::parse("37.92", cad.clone()).unwrap();
        let mut charge = NewPosting::new(amex, -quantity.clone());
        charge.balance = Some(Amount::parse("-37.92", cad).unwrap());
        charge.note = "card".to_string();
        let (id, _) = ledger
            .append_transaction(transaction, vec![NewPosting::new(groceries, quantity), charge])
            .unwrap();
        (ledger, id)
    }

    #[test]
    fn test_format_native() {
        let (ledger, id) = sample();
        assert_eq!(
            format_transaction(&ledger, id, Style::Native),
            "2008/04/02 (42) COSTCO WHOLESALE ; hello\n\
             \x20 ;   indented\n\
             \x20 Expenses:Groceries        37.92 CAD\n\
             \x20 Liabilities:Credit:AMEX  -37.92 CAD = -37.92 CAD ; card\n"
        );
    }

    #[test]
    fn test_format_ledger() {
        let (ledger, id) = sample();
        assert_eq!(
            format_transaction(&ledger, id, Style::Ledger),
            "2008/04/02 (42) COSTCO WHOLESALE ; hello\n\
             \x20 ;   indented\n\
             \x20 Expenses:Groceries        CAD 37.92\n\
             \x20 Liabilities:Credit:AMEX  CAD -37.92 = CAD -37.92 ; card\n"
        );
    }

    #[test]
    fn test_format_price() {
        let mut ledger = Ledger::new();
        let cad = ledger.commodities.declare("CAD", 2, "");
        let tdb = ledger.commodities.declare("TDB162", 3, "");
        let price = Price::new(
            NaiveDate::from_ymd_opt(2018, 10, 1).unwrap(),
            tdb,
            Amount::parse("12.5", cad).unwrap(),
        );
        assert_eq!(format_price(&price, Style::Native), "P 2018/10/01 TDB162 12.50 CAD\n");
        assert_eq!(format_price(&price, Style::Ledger), "P 2018/10/01 \"TDB162\" CAD 12.50\n");
    }
}
