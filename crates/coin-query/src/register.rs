//! Account registers.
//!
//! A register lists the postings of one account. Depending on
//! [`RegisterOptions`] it takes one of four shapes:
//!
//! | recurse | interval | shape |
//! |---------|----------|-------|
//! | no      | none     | [`Report::Postings`]: one row per posting with a running total |
//! | no      | set      | [`Report::Buckets`]: one row per period with a running total |
//! | yes     | none     | [`Report::Recursive`]: postings of the whole subtree |
//! | yes     | set      | [`Report::Rollup`]: per-period totals of the top sub-accounts |

use chrono::NaiveDate;
use coin_core::{AccountId, Amount, Ledger, Posting, PostingId, TagMatcher, Transaction};
use serde::Serialize;
use tracing::debug;

use crate::error::QueryError;
use crate::interval::Interval;
use crate::rollup::{rollup, Rollup};
use crate::totals::Totals;

/// Number of sub-accounts a rollup shows by default.
pub const DEFAULT_TOP: usize = 5;

/// What a register includes and how it aggregates.
#[derive(Debug, Clone)]
pub struct RegisterOptions {
    /// Include postings of all descendant accounts.
    pub recurse: bool,
    /// Drop postings before this date.
    pub begin: Option<NaiveDate>,
    /// Drop postings on or after this date.
    pub end: Option<NaiveDate>,
    /// Aggregate postings into periods.
    pub interval: Option<Interval>,
    /// Sub-accounts shown individually in a rollup.
    pub top: usize,
    /// Show running values in a rollup.
    pub cumulative: bool,
    /// Keep only postings whose own or transaction tags match.
    pub tag: Option<TagMatcher>,
}

impl Default for RegisterOptions {
    fn default() -> Self {
        Self {
            recurse: false,
            begin: None,
            end: None,
            interval: None,
            top: DEFAULT_TOP,
            cumulative: false,
            tag: None,
        }
    }
}

/// One posting of a flat register.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostingRow {
    /// Posting date.
    pub date: NaiveDate,
    /// Transaction description.
    pub description: String,
    /// Full name of the account on the other side.
    pub other: String,
    /// Posted quantity.
    pub quantity: Amount,
    /// Running total after this posting.
    pub total: Amount,
}

/// One period of a bucketed register.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BucketRow {
    /// First day of the period.
    pub period: NaiveDate,
    /// Sum of the period's postings.
    pub amount: Amount,
    /// Running total at the end of the period.
    pub total: Amount,
}

/// One posting of a recursive register.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecursiveRow {
    /// Posting date.
    pub date: NaiveDate,
    /// Transaction description.
    pub description: String,
    /// Posting account, relative to the queried account.
    pub account: String,
    /// Account on the other side, relative to the queried account when it
    /// lies below it.
    pub other: String,
    /// Posted quantity.
    pub quantity: Amount,
    /// Commodity of the posting account.
    pub commodity: String,
}

/// The rows of a register, in one of its shapes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "shape", content = "rows", rename_all = "snake_case")]
pub enum Report {
    /// Flat register.
    Postings(Vec<PostingRow>),
    /// Flat register aggregated by period.
    Buckets {
        /// Period length.
        interval: Interval,
        /// One row per period with postings.
        rows: Vec<BucketRow>,
    },
    /// Postings of the account and its descendants.
    Recursive(Vec<RecursiveRow>),
    /// Per-period totals of the account's top sub-accounts.
    Rollup(Rollup),
}

impl Report {
    /// Whether the report has no rows.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Postings(rows) => rows.is_empty(),
            Self::Buckets { rows, .. } => rows.is_empty(),
            Self::Recursive(rows) => rows.is_empty(),
            Self::Rollup(rollup) => rollup.rows.is_empty(),
        }
    }
}

/// A register of one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Register {
    /// Full name of the queried account.
    pub account: String,
    /// Commodity symbol of the queried account; empty when it has none.
    pub commodity: String,
    /// The rows.
    pub report: Report,
}

/// A posting together with its transaction.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Entry<'l> {
    pub id: PostingId,
    pub posting: &'l Posting,
    pub transaction: &'l Transaction,
}

/// Postings of `account` passing the tag filter and the date window,
/// stably sorted by date.
pub(crate) fn select<'l>(
    ledger: &'l Ledger,
    account: AccountId,
    options: &RegisterOptions,
) -> Vec<Entry<'l>> {
    let mut entries: Vec<Entry<'l>> = ledger
        .account_postings(account)
        .map(|(id, posting)| Entry {
            id,
            posting,
            transaction: ledger.transaction(posting.transaction),
        })
        .filter(|entry| {
            options.tag.as_ref().map_or(true, |tag| {
                tag.matches(&entry.posting.tags) || tag.matches(&entry.transaction.tags)
            })
        })
        .collect();
    entries.sort_by_key(|entry| entry.transaction.posted);
    window(&mut entries, options.begin, options.end);
    entries
}

/// Restrict date-sorted entries to `[begin, end)`.
fn window(entries: &mut Vec<Entry<'_>>, begin: Option<NaiveDate>, end: Option<NaiveDate>) {
    if let Some(end) = end {
        let to = entries.partition_point(|entry| entry.transaction.posted < end);
        entries.truncate(to);
    }
    if let Some(begin) = begin {
        let from = entries.partition_point(|entry| entry.transaction.posted < begin);
        *entries = entries.split_off(from);
    }
}

/// Full name of the account on the other side of `entry`.
fn other_account(ledger: &Ledger, entry: &Entry<'_>) -> Option<AccountId> {
    entry
        .transaction
        .other(entry.id)
        .map(|other| ledger.posting(other).account)
}

fn postings(ledger: &Ledger, entries: &[Entry<'_>]) -> Result<Vec<PostingRow>, QueryError> {
    let Some(first) = entries.first() else {
        return Ok(Vec::new());
    };
    let mut total = Amount::zero(first.posting.quantity.commodity().clone());
    entries
        .iter()
        .map(|entry| {
            total.add_in(&entry.posting.quantity)?;
            Ok(PostingRow {
                date: entry.transaction.posted,
                description: entry.transaction.description.clone(),
                other: other_account(ledger, entry)
                    .map(|id| ledger.accounts.get(id).full_name.clone())
                    .unwrap_or_default(),
                quantity: entry.posting.quantity.clone(),
                total: total.clone(),
            })
        })
        .collect()
}

fn buckets(entries: &[Entry<'_>], interval: Interval) -> Result<Vec<BucketRow>, QueryError> {
    let Some(first) = entries.first() else {
        return Ok(Vec::new());
    };
    let mut totals = Totals::new(interval);
    for entry in entries {
        totals.add(entry.transaction.posted, &entry.posting.quantity)?;
    }
    let mut total = Amount::zero(first.posting.quantity.commodity().clone());
    totals
        .iter()
        .map(|(period, amount)| {
            total.add_in(amount)?;
            Ok(BucketRow {
                period,
                amount: amount.clone(),
                total: total.clone(),
            })
        })
        .collect()
}

fn recursive(ledger: &Ledger, account: AccountId, options: &RegisterOptions) -> Vec<RecursiveRow> {
    let mut entries: Vec<Entry<'_>> = ledger
        .accounts
        .with_descendants(account)
        .into_iter()
        .flat_map(|id| select(ledger, id, options))
        .collect();
    entries.sort_by_key(|entry| entry.transaction.posted);

    let accounts = &ledger.accounts;
    entries
        .iter()
        .map(|entry| RecursiveRow {
            date: entry.transaction.posted,
            description: entry.transaction.description.clone(),
            account: accounts.relative_name(entry.posting.account, account).to_string(),
            other: other_account(ledger, entry)
                .map(|id| accounts.relative_name(id, account).to_string())
                .unwrap_or_default(),
            quantity: entry.posting.quantity.clone(),
            commodity: accounts.get(entry.posting.account).commodity_id().to_string(),
        })
        .collect()
}

/// Register of the account designated by `pattern`.
///
/// # Errors
///
/// - [`QueryError::Lookup`] - the pattern matches no account or several
/// - [`QueryError::Amount`] - postings of different commodities were summed
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use coin_core::Ledger;
/// use coin_query::{register, RegisterOptions, Report};
///
/// let text = "2018/10/01 payee1\n  Assets:Bank 10.00 CAD\n  Income:Salary\n";
/// let today = NaiveDate::from_ymd_opt(2018, 10, 1).unwrap();
/// let mut ledger = Ledger::new();
/// let items = coin_parser::parse(text, today).unwrap();
/// coin_resolver::resolve(&mut ledger, "inline.coin", items).unwrap();
///
/// let register = register(&ledger, "bank", &RegisterOptions::default()).unwrap();
/// assert_eq!(register.account, "Assets:Bank");
/// let Report::Postings(rows) = register.report else { panic!() };
/// assert_eq!(rows[0].other, "Income:Salary");
/// assert_eq!(rows[0].total.to_string(), "10.00 CAD");
/// ```
pub fn register(
    ledger: &Ledger,
    pattern: &str,
    options: &RegisterOptions,
) -> Result<Register, QueryError> {
    let account = ledger.accounts.find(pattern)?;
    register_account(ledger, account, options)
}

/// Register of a known account.
pub fn register_account(
    ledger: &Ledger,
    account: AccountId,
    options: &RegisterOptions,
) -> Result<Register, QueryError> {
    let node = ledger.accounts.get(account);
    debug!(
        account = %node.full_name,
        recurse = options.recurse,
        interval = ?options.interval,
        "building register"
    );
    let report = match (options.recurse, options.interval) {
        (false, None) => Report::Postings(postings(ledger, &select(ledger, account, options))?),
        (false, Some(interval)) => Report::Buckets {
            interval,
            rows: buckets(&select(ledger, account, options), interval)?,
        },
        (true, None) => Report::Recursive(recursive(ledger, account, options)),
        (true, Some(interval)) => Report::Rollup(rollup(ledger, account, interval, options)?),
    };
    Ok(Register {
        account: node.full_name.clone(),
        commodity: node.commodity_id().to_string(),
        report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use coin_core::{Location, NewPosting};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// Postings appended out of date order.
    fn ledger() -> Ledger {
        let mut ledger = Ledger::new();
        let cad = ledger.commodities.declare("CAD", 2, "");
        let bank = ledger.accounts.get_or_create("Assets:Bank");
        let food = ledger.accounts.get_or_create("Expenses:Food");
        for (day, text) in [(20, "3.00"), (5, "1.00"), (12, "2.00"), (5, "4.00")] {
            let quantity = Amount::parse(text, cad.clone()).unwrap();
            let transaction = Transaction::new(
                date(2000, 1, day),
                format!("day {day}"),
                Location::new("test.coin", day as usize),
            );
            ledger
                .append_transaction(
                    transaction,
                    vec![NewPosting::new(food, quantity.clone()), NewPosting::new(bank, -quantity)],
                )
                .unwrap();
        }
        ledger
    }

    fn descriptions(entries: &[Entry<'_>]) -> Vec<String> {
        entries.iter().map(|e| e.transaction.description.clone()).collect()
    }

    #[test]
    fn test_select_is_stable_date_order() {
        let ledger = ledger();
        let food = ledger.accounts.by_name("Expenses:Food").unwrap();
        let entries = select(&ledger, food, &RegisterOptions::default());
        assert_eq!(descriptions(&entries), vec!["day 5", "day 5", "day 12", "day 20"]);
        assert_eq!(entries[0].posting.quantity.to_string(), "1.00 CAD");
        assert_eq!(entries[1].posting.quantity.to_string(), "4.00 CAD");
    }

    #[test]
    fn test_select_window() {
        let ledger = ledger();
        let food = ledger.accounts.by_name("Expenses:Food").unwrap();
        let options = RegisterOptions {
            begin: Some(date(2000, 1, 6)),
            end: Some(date(2000, 1, 20)),
            ..RegisterOptions::default()
        };
        assert_eq!(descriptions(&select(&ledger, food, &options)), vec!["day 12"]);

        let options = RegisterOptions {
            begin: Some(date(2000, 2, 1)),
            ..RegisterOptions::default()
        };
        assert!(select(&ledger, food, &options).is_empty());
    }

    #[test]
    fn test_flat_running_total() {
        let ledger = ledger();
        let register = register(&ledger, "bank", &RegisterOptions::default()).unwrap();
        assert_eq!(register.commodity, "");
        let Report::Postings(rows) = register.report else {
            panic!("expected postings");
        };
        let totals: Vec<String> = rows.iter().map(|r| r.total.to_string()).collect();
        assert_eq!(totals, vec!["-1.00 CAD", "-5.00 CAD", "-7.00 CAD", "-10.00 CAD"]);
        assert!(rows.iter().all(|r| r.other == "Expenses:Food"));
    }

    #[test]
    fn test_weekly_buckets() {
        let ledger = ledger();
        let options = RegisterOptions {
            interval: Some(Interval::Week),
            ..RegisterOptions::default()
        };
        let register = register(&ledger, "food", &options).unwrap();
        let Report::Buckets { rows, .. } = register.report else {
            panic!("expected buckets");
        };
        // 2000-01-05 is a Wednesday
        let periods: Vec<NaiveDate> = rows.iter().map(|r| r.period).collect();
        assert_eq!(periods, vec![date(2000, 1, 3), date(2000, 1, 10), date(2000, 1, 17)]);
        assert_eq!(rows[0].amount.to_string(), "5.00 CAD");
        assert_eq!(rows[2].total.to_string(), "10.00 CAD");
    }

    #[test]
    fn test_empty_register() {
        let mut ledger = ledger();
        ledger.accounts.get_or_create("Assets:Cash");
        let register = register(&ledger, "cash", &RegisterOptions::default()).unwrap();
        assert!(register.report.is_empty());
    }
}
