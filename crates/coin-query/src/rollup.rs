//! Hierarchical, time-bucketed totals.
//!
//! Every account below the queried one sums its own postings per period;
//! those sums are then merged upwards so each account holds the totals of
//! its whole subtree. The direct children with the largest totals in the
//! last period are shown individually, the rest are merged into an
//! `Other` row, and the queried account's own subtree total closes the
//! table as `Totals`.

use chrono::NaiveDate;
use coin_core::{AccountId, Amount, Ledger, SEPARATOR};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

use crate::error::QueryError;
use crate::interval::Interval;
use crate::register::{select, RegisterOptions};
use crate::totals::{cumulative, Totals};

/// Label of the row holding the merged remainder.
pub const OTHER: &str = "Other";

/// Label of the row holding the queried account's total.
pub const TOTALS: &str = "Totals";

/// What a rollup row stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RowKind {
    /// A direct child of the queried account.
    Account,
    /// Children merged together.
    Other,
    /// The queried account including all descendants.
    Totals,
}

/// One row of a rollup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RollupRow {
    /// Account name relative to the queried account, or `Other`/`Totals`.
    pub label: String,
    /// What the row stands for.
    pub kind: RowKind,
    /// One value per period of [`Rollup::periods`].
    pub values: Vec<Amount>,
}

/// Per-period totals of an account tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rollup {
    /// Period length.
    pub interval: Interval,
    /// Period starts shared by all rows.
    pub periods: Vec<NaiveDate>,
    /// Top children, then `Other` if any child was left out, then `Totals`.
    pub rows: Vec<RollupRow>,
}

impl Rollup {
    /// The row labelled `label`.
    pub fn row(&self, label: &str) -> Option<&RollupRow> {
        self.rows.iter().find(|row| row.label == label)
    }
}

/// Roll the postings below `account` up into per-period totals.
pub fn rollup(
    ledger: &Ledger,
    account: AccountId,
    interval: Interval,
    options: &RegisterOptions,
) -> Result<Rollup, QueryError> {
    let accounts = &ledger.accounts;

    let mut totals: BTreeMap<AccountId, Totals> = BTreeMap::new();
    for id in accounts.with_descendants(account) {
        let mut own = Totals::new(interval);
        for entry in select(ledger, id, options) {
            own.add(entry.transaction.posted, &entry.posting.quantity)?;
        }
        totals.insert(id, own);
    }
    for id in accounts.post_order(account) {
        if id == account {
            continue;
        }
        let Some(parent) = accounts.get(id).parent else {
            continue;
        };
        if let (Some(child), Some(mut sum)) = (totals.get(&id).cloned(), totals.remove(&parent)) {
            sum.merge(&child)?;
            totals.insert(parent, sum);
        }
    }

    let empty = Rollup {
        interval,
        periods: Vec::new(),
        rows: Vec::new(),
    };
    let Some(grand) = totals.remove(&account) else {
        return Ok(empty);
    };
    let periods: Vec<NaiveDate> = grand.periods().collect();
    let Some(&last) = periods.last() else {
        return Ok(empty);
    };

    let mut ranked: Vec<(AccountId, Amount)> = accounts
        .get(account)
        .children()
        .iter()
        .filter_map(|&child| {
            let sum = totals.get(&child)?;
            weight(sum, last).map(|w| (child, w))
        })
        .collect();
    ranked.sort_by(|(a, wa), (b, wb)| {
        wb.magnitude()
            .cmp(wa.magnitude())
            .then_with(|| accounts.get(*a).full_name.cmp(&accounts.get(*b).full_name))
    });
    debug!(
        account = %accounts.get(account).full_name,
        children = ranked.len(),
        top = options.top,
        periods = periods.len(),
        "rolling up"
    );

    let mut rows = Vec::with_capacity(options.top.min(ranked.len()) + 2);
    let mut other: Option<Totals> = None;
    for (index, (child, _)) in ranked.iter().enumerate() {
        let Some(sum) = totals.get(child) else {
            continue;
        };
        if index < options.top {
            if let Some(values) = sum.align(&periods) {
                rows.push(RollupRow {
                    label: accounts.relative_name(*child, account).to_string(),
                    kind: RowKind::Account,
                    values,
                });
            }
        } else {
            match &mut other {
                Some(rest) => rest.merge(sum)?,
                None => other = Some(sum.clone()),
            }
        }
    }
    for (label, kind, sum) in [
        (OTHER, RowKind::Other, other.as_ref()),
        (TOTALS, RowKind::Totals, Some(&grand)),
    ] {
        if let Some(values) = sum.and_then(|sum| sum.align(&periods)) {
            rows.push(RollupRow {
                label: label.to_string(),
                kind,
                values,
            });
        }
    }

    if options.cumulative {
        for row in &mut rows {
            cumulative(&mut row.values)?;
        }
    }
    Ok(Rollup {
        interval,
        periods,
        rows,
    })
}

/// Magnitude of a row in `period`, zero when it has no postings there.
/// `None` for rows without any postings.
fn weight(totals: &Totals, period: NaiveDate) -> Option<Amount> {
    let (_, sample) = totals.last()?;
    Some(
        totals
            .get(period)
            .map_or_else(|| Amount::zero(sample.commodity().clone()), Amount::abs),
    )
}

/// Shorten an account name to at most `width` characters.
///
/// Leading segments are cut to their first character, one at a time from
/// the left, until the name fits; a name that still does not fit is
/// truncated.
///
/// ```
/// use coin_query::shorten_account_name;
///
/// assert_eq!(shorten_account_name("Expenses:Groceries", 12), "E:Groceries");
/// assert_eq!(shorten_account_name("Food", 12), "Food");
/// assert_eq!(shorten_account_name("Entertainment", 6), "Entert");
/// ```
pub fn shorten_account_name(name: &str, width: usize) -> String {
    let fits = |segments: &[&str]| {
        segments.iter().map(|s| s.chars().count()).sum::<usize>() + segments.len().saturating_sub(1)
            <= width
    };
    let mut segments: Vec<&str> = name.split(SEPARATOR).collect();
    for i in 0..segments.len().saturating_sub(1) {
        if fits(&segments) {
            break;
        }
        let segment = segments[i];
        let first = segment.chars().next().map_or(0, char::len_utf8);
        segments[i] = &segment[..first];
    }
    let separator = SEPARATOR.to_string();
    let short = segments.join(separator.as_str());
    if short.chars().count() > width {
        short.chars().take(width).collect()
    } else {
        short
    }
}
