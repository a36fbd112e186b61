//! The ledger context.
//!
//! A [`Ledger`] holds every registry the engine works with: commodities,
//! accounts, prices, transactions with their postings, embedded test cases
//! and the warnings recorded while resolving. It starts empty, is filled by
//! successive loads and is then read by queries. Queries only need `&Ledger`,
//! so a loaded ledger can be shared by any number of reader threads.
//!
//! Transactions and postings are stored in append-only arenas. The journal,
//! the list of transactions visible to queries, is separate from the store:
//! [`Ledger::clear_transactions`] empties the journal but leaves postings
//! reachable through their accounts until the ledger is rebuilt.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use crate::account::{AccountId, Accounts};
use crate::amount::Amount;
use crate::commodity::{Commodities, Commodity};
use crate::error::{AmountError, ResolutionWarning};
use crate::price::Prices;
use crate::tags::Tags;
use crate::transaction::{Location, Posting, PostingId, Transaction, TransactionId};

/// A posting ready to be appended with its transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPosting {
    /// The resolved account.
    pub account: AccountId,
    /// Signed quantity.
    pub quantity: Amount,
    /// Asserted balance after this posting.
    pub balance: Option<Amount>,
    /// Verbatim note.
    pub note: String,
    /// Tags found in the note.
    pub tags: Tags,
}

impl NewPosting {
    /// Create a posting without assertion or note.
    pub fn new(account: AccountId, quantity: Amount) -> Self {
        Self {
            account,
            quantity,
            balance: None,
            note: String::new(),
            tags: Tags::new(),
        }
    }
}

/// A test block embedded in a ledger file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    /// The command line to run.
    pub cmd: String,
    /// Expected output, byte for byte.
    pub expected: String,
    /// Where the block was read.
    pub location: Location,
}

/// The context object holding all ledger state.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    /// Commodity registry.
    pub commodities: Commodities,
    /// Account tree.
    pub accounts: Accounts,
    /// Price database.
    pub prices: Prices,
    store: Vec<Transaction>,
    journal: Vec<TransactionId>,
    postings: Vec<Posting>,
    tests: Vec<TestCase>,
    warnings: Vec<ResolutionWarning>,
}

impl Ledger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Transactions in the journal, in load order.
    pub fn transactions(&self) -> impl Iterator<Item = (TransactionId, &Transaction)> + '_ {
        self.journal.iter().map(|&id| (id, &self.store[id.0]))
    }

    /// Number of transactions in the journal.
    pub fn transaction_count(&self) -> usize {
        self.journal.len()
    }

    /// Get a transaction by handle.
    pub fn transaction(&self, id: TransactionId) -> &Transaction {
        &self.store[id.0]
    }

    /// Get a transaction by handle for modification.
    ///
    /// Meant for descriptive fields; the postings list must not change since
    /// accounts index the postings.
    pub fn transaction_mut(&mut self, id: TransactionId) -> &mut Transaction {
        &mut self.store[id.0]
    }

    /// Get a posting by handle.
    pub fn posting(&self, id: PostingId) -> &Posting {
        &self.postings[id.0]
    }

    /// Postings of a transaction, in the order they were written.
    pub fn postings_of(&self, id: TransactionId) -> impl Iterator<Item = (PostingId, &Posting)> + '_ {
        self.store[id.0]
            .postings
            .iter()
            .map(|&p| (p, &self.postings[p.0]))
    }

    /// Postings indexed under an account, in load order.
    pub fn account_postings(&self, id: AccountId) -> impl Iterator<Item = (PostingId, &Posting)> + '_ {
        self.accounts
            .get(id)
            .postings()
            .iter()
            .map(|&p| (p, &self.postings[p.0]))
    }

    /// Append a resolved transaction and its postings.
    ///
    /// Each posting is indexed under its account and added to the account's
    /// running balance in order. The returned vector holds, for every
    /// posting, its account's balance right after it; the `Unbalanced`
    /// account keeps no balance and reports `None`.
    ///
    /// Fails without modifying the ledger if a posting's commodity differs
    /// from the balance already held by its account.
    pub fn append_transaction(
        &mut self,
        mut transaction: Transaction,
        postings: Vec<NewPosting>,
    ) -> Result<(TransactionId, Vec<Option<Amount>>), AmountError> {
        let mut held: HashMap<AccountId, &Arc<Commodity>> = HashMap::new();
        for posting in &postings {
            if posting.account == self.accounts.unbalanced() {
                continue;
            }
            let commodity = *held.entry(posting.account).or_insert_with(|| {
                self.accounts
                    .get(posting.account)
                    .balance()
                    .map_or(posting.quantity.commodity(), Amount::commodity)
            });
            if commodity != posting.quantity.commodity() {
                return Err(AmountError::CommodityMismatch {
                    left: commodity.id.clone(),
                    right: posting.quantity.commodity().id.clone(),
                });
            }
        }

        let id = TransactionId(self.store.len());
        let mut balances = Vec::with_capacity(postings.len());
        transaction.postings.clear();
        for posting in postings {
            let pid = PostingId(self.postings.len());
            let tracked = posting.account != self.accounts.unbalanced();
            let account = self.accounts.get_mut(posting.account);
            account.postings.push(pid);
            if tracked {
                let balance = account
                    .balance
                    .get_or_insert_with(|| Amount::zero(posting.quantity.commodity().clone()));
                balance.add_in(&posting.quantity)?;
                balances.push(Some(balance.clone()));
            } else {
                balances.push(None);
            }
            transaction.postings.push(pid);
            self.postings.push(Posting {
                transaction: id,
                account: posting.account,
                quantity: posting.quantity,
                balance: posting.balance,
                note: posting.note,
                tags: posting.tags,
            });
        }
        self.store.push(transaction);
        self.journal.push(id);
        Ok((id, balances))
    }

    /// Empty the journal.
    ///
    /// Postings stay indexed under their accounts and keep contributing to
    /// account balances; only [`Ledger::transactions`] forgets them.
    pub fn clear_transactions(&mut self) {
        self.journal.clear();
    }

    /// Record a resolution warning.
    pub fn warn(&mut self, warning: ResolutionWarning) {
        self.warnings.push(warning);
    }

    /// Warnings recorded so far.
    pub fn warnings(&self) -> &[ResolutionWarning] {
        &self.warnings
    }

    /// Record an embedded test case.
    pub fn add_test(&mut self, test: TestCase) {
        self.tests.push(test);
    }

    /// Embedded test cases in load order.
    pub fn tests(&self) -> &[TestCase] {
        &self.tests
    }

    /// Whether two journal transactions look like duplicates: same date,
    /// same description and the same postings in the same order.
    pub fn is_duplicate(&self, a: TransactionId, b: TransactionId) -> bool {
        let (ta, tb) = (self.transaction(a), self.transaction(b));
        ta.posted == tb.posted
            && ta.description == tb.description
            && ta.postings.len() == tb.postings.len()
            && self.postings_of(a).zip(self.postings_of(b)).all(|((_, pa), (_, pb))| {
                pa.account == pb.account
                    && pa.quantity.checked_cmp(&pb.quantity) == Ok(Ordering::Equal)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ledger() -> Ledger {
        let mut ledger = Ledger::new();
        ledger.commodities.declare("CAD", 2, "");
        ledger
    }

    fn append(ledger: &mut Ledger, day: u32, description: &str, amount: &str) -> TransactionId {
        let cad = ledger.commodities.get("CAD").unwrap().clone();
        let aa = ledger.accounts.get_or_create("AA");
        let bb = ledger.accounts.get_or_create("BB");
        let quantity = Amount::parse(amount, cad).unwrap();
        let posted = NaiveDate::from_ymd_opt(2018, 10, day).unwrap();
        ledger
            .append_transaction(
                Transaction::new(posted, description, Location::new("test.coin", 1)),
                vec![
                    NewPosting::new(aa, quantity.clone()),
                    NewPosting::new(bb, -quantity),
                ],
            )
            .unwrap()
            .0
    }

    #[test]
    fn test_append_accumulates_balances() {
        let mut ledger = ledger();
        append(&mut ledger, 1, "payee1", "10.00");
        append(&mut ledger, 2, "payee2", "5.00");

        let aa = ledger.accounts.by_name("AA").unwrap();
        let bb = ledger.accounts.by_name("BB").unwrap();
        assert_eq!(ledger.accounts.get(aa).balance().unwrap().to_string(), "15.00 CAD");
        assert_eq!(ledger.accounts.get(bb).balance().unwrap().to_string(), "-15.00 CAD");
        assert_eq!(ledger.account_postings(aa).count(), 2);
        assert_eq!(ledger.transaction_count(), 2);
    }

    #[test]
    fn test_append_reports_running_balances() {
        let mut ledger = ledger();
        append(&mut ledger, 1, "payee1", "10.00");
        let cad = ledger.commodities.get("CAD").unwrap().clone();
        let aa = ledger.accounts.by_name("AA").unwrap();
        let posted = NaiveDate::from_ymd_opt(2018, 10, 3).unwrap();
        let (_, balances) = ledger
            .append_transaction(
                Transaction::new(posted, "", Location::new("test.coin", 9)),
                vec![
                    NewPosting::new(aa, Amount::parse("1.00", cad.clone()).unwrap()),
                    NewPosting::new(aa, Amount::parse("-3.00", cad).unwrap()),
                ],
            )
            .unwrap();
        let rendered: Vec<_> = balances.iter().map(|b| b.as_ref().unwrap().to_string()).collect();
        assert_eq!(rendered, vec!["11.00 CAD", "8.00 CAD"]);
    }

    #[test]
    fn test_append_rejects_commodity_change() {
        let mut ledger = ledger();
        append(&mut ledger, 1, "payee1", "10.00");
        let usd = ledger.commodities.declare("USD", 2, "");
        let aa = ledger.accounts.by_name("AA").unwrap();
        let posted = NaiveDate::from_ymd_opt(2018, 10, 3).unwrap();
        let result = ledger.append_transaction(
            Transaction::new(posted, "", Location::new("test.coin", 9)),
            vec![NewPosting::new(aa, Amount::parse("1.00", usd).unwrap())],
        );
        assert!(result.is_err());
        assert_eq!(ledger.transaction_count(), 1);
        assert_eq!(ledger.account_postings(aa).count(), 1);
    }

    #[test]
    fn test_clear_keeps_stale_postings() {
        let mut ledger = ledger();
        let id = append(&mut ledger, 1, "payee1", "10.00");
        ledger.clear_transactions();

        assert_eq!(ledger.transactions().count(), 0);
        let aa = ledger.accounts.by_name("AA").unwrap();
        let (_, posting) = ledger.account_postings(aa).next().unwrap();
        assert_eq!(posting.transaction, id);
        assert_eq!(ledger.transaction(id).description, "payee1");
    }

    #[test]
    fn test_is_duplicate() {
        let mut ledger = ledger();
        let a = append(&mut ledger, 1, "payee1", "10.00");
        let b = append(&mut ledger, 1, "payee1", "10.00");
        let other_day = append(&mut ledger, 2, "payee1", "10.00");
        let other_amount = append(&mut ledger, 1, "payee1", "10.01");
        let other_payee = append(&mut ledger, 1, "payee2", "10.00");

        assert!(ledger.is_duplicate(a, b));
        assert!(!ledger.is_duplicate(a, other_day));
        assert!(!ledger.is_duplicate(a, other_amount));
        assert!(!ledger.is_duplicate(a, other_payee));
    }
}
