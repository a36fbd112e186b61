//! Linking parsed items into a [`Ledger`].

use coin_core::{
    AccountId, Amount, Commodity, Ledger, Location, NewPosting, Price, ResolutionWarning, TestCase,
    Transaction, DEFAULT_DECIMALS,
};
use coin_parser::{AccountDecl, CommodityDecl, Item, PriceDecl, RawAmount, RawTransaction, Spanned};
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::ResolveError;
use crate::interpolate::{interpolate, majority, residual};

/// Resolves the items of one file into a ledger.
///
/// Items must be fed in file order: running balances, and therefore balance
/// assertions, follow load order.
pub struct Resolver<'l> {
    ledger: &'l mut Ledger,
    file: Arc<str>,
}

impl<'l> Resolver<'l> {
    /// Create a resolver for items read from `file`.
    pub fn new(ledger: &'l mut Ledger, file: impl Into<Arc<str>>) -> Self {
        Self {
            ledger,
            file: file.into(),
        }
    }

    /// Resolve a single item.
    pub fn resolve(&mut self, item: Spanned<Item>) -> Result<(), ResolveError> {
        let line = item.span.line;
        match item.value {
            Item::Commodity(decl) => self.commodity(decl),
            Item::Account(decl) => self.account(decl),
            Item::Price(decl) => self.price(decl, line)?,
            Item::Transaction(txn) => self.transaction(txn, line)?,
            Item::Test(test) => self.ledger.add_test(TestCase {
                cmd: test.cmd,
                expected: test.expected,
                location: self.location(line),
            }),
        }
        Ok(())
    }

    fn location(&self, line: usize) -> Location {
        Location::new(self.file.clone(), line)
    }

    fn commodity(&mut self, decl: CommodityDecl) {
        let decimals = decl
            .format
            .as_ref()
            .map_or(DEFAULT_DECIMALS, |f| Amount::literal_decimals(&f.number));
        let commodity = self.ledger.commodities.declare(&decl.symbol, decimals, &decl.note);
        debug!(commodity = %commodity.id, decimals = commodity.decimals, "declared commodity");
    }

    fn account(&mut self, decl: AccountDecl) {
        let id = self.ledger.accounts.get_or_create(&decl.name);
        let default = decl
            .commodity
            .map(|symbol| self.ledger.commodities.get_or_create(&symbol, DEFAULT_DECIMALS));
        let account = self.ledger.accounts.get_mut(id);
        if account.commodity.is_none() {
            account.commodity = default;
        }
        if !decl.note.is_empty() {
            account.note = decl.note;
        }
    }

    fn price(&mut self, decl: PriceDecl, line: usize) -> Result<(), ResolveError> {
        let commodity = self
            .ledger
            .commodities
            .get_or_create(&decl.commodity, DEFAULT_DECIMALS);
        let value = self.literal(&decl.value, None, &decl.commodity, line)?;
        self.ledger.prices.insert(Price::new(decl.date, commodity, value));
        Ok(())
    }

    /// Read an amount literal. A bare number takes `default`, the commodity
    /// of the account it is posted to.
    fn literal(
        &mut self,
        raw: &RawAmount,
        default: Option<Arc<Commodity>>,
        owner: &str,
        line: usize,
    ) -> Result<Amount, ResolveError> {
        let commodity = match (&raw.commodity, default) {
            (Some(symbol), _) => self
                .ledger
                .commodities
                .get_or_create(symbol, Amount::literal_decimals(&raw.number)),
            (None, Some(commodity)) => commodity,
            (None, None) => {
                return Err(ResolveError::MissingCommodity {
                    line,
                    account: owner.to_string(),
                })
            }
        };
        Amount::parse(&raw.number, commodity).map_err(|source| ResolveError::Amount { line, source })
    }

    /// The commodity an account holds, counting bindings not yet applied.
    fn held(&self, id: AccountId, pending: &[(AccountId, Arc<Commodity>)]) -> Option<Arc<Commodity>> {
        self.ledger.accounts.get(id).commodity.clone().or_else(|| {
            pending
                .iter()
                .find(|(account, _)| *account == id)
                .map(|(_, commodity)| commodity.clone())
        })
    }

    /// Bind an account to the commodity of its first posting, or check that
    /// a posting uses the commodity it already holds.
    ///
    /// New bindings go to `pending` and reach the ledger only once the
    /// transaction is appended.
    fn adopt(
        &self,
        pending: &mut Vec<(AccountId, Arc<Commodity>)>,
        id: AccountId,
        quantity: &Amount,
        line: usize,
    ) -> Result<(), ResolveError> {
        if id == self.ledger.accounts.unbalanced() {
            return Ok(());
        }
        match self.held(id, pending) {
            None => {
                pending.push((id, quantity.commodity().clone()));
                Ok(())
            }
            Some(held) if held == *quantity.commodity() => Ok(()),
            Some(held) => Err(ResolveError::AccountCommodity {
                line,
                account: self.ledger.accounts.get(id).full_name.clone(),
                expected: held.id.clone(),
                found: quantity.commodity().id.clone(),
            }),
        }
    }

    fn transaction(&mut self, raw: RawTransaction, line: usize) -> Result<(), ResolveError> {
        let RawTransaction {
            posted,
            code,
            description,
            note,
            tags,
            postings: raw_postings,
        } = raw;

        let mut pending = Vec::new();
        let mut accounts = Vec::with_capacity(raw_postings.len());
        let mut quantities = Vec::with_capacity(raw_postings.len());
        for posting in &raw_postings {
            let account = self.ledger.accounts.get_or_create(&posting.account);
            let quantity = match &posting.quantity {
                Some(raw) => {
                    let default = self.held(account, &pending);
                    let amount = self.literal(raw, default, &posting.account, posting.line)?;
                    self.adopt(&mut pending, account, &amount, posting.line)?;
                    Some(amount)
                }
                None => None,
            };
            accounts.push(account);
            quantities.push(quantity);
        }

        let diverted = match quantities.iter().position(Option::is_none) {
            Some(index) => {
                let known: Vec<&Amount> = quantities.iter().flatten().collect();
                let elided = &raw_postings[index];
                let target = match self.held(accounts[index], &pending) {
                    Some(commodity) => commodity,
                    None => majority(known.iter().copied()).ok_or_else(|| {
                        ResolveError::MissingCommodity {
                            line: elided.line,
                            account: elided.account.clone(),
                        }
                    })?,
                };
                let value = interpolate(&known, &target, &self.ledger.prices, posted)
                    .map_err(|source| ResolveError::Interpolation { line, source })?;
                self.adopt(&mut pending, accounts[index], &value, elided.line)?;
                quantities[index] = Some(value);
                None
            }
            None => {
                let known: Vec<&Amount> = quantities.iter().flatten().collect();
                match residual(&known, &self.ledger.prices, posted)
                    .map_err(|source| ResolveError::Amount { line, source })?
                {
                    Some(residual) if !residual.is_zero() => Some(residual),
                    Some(_) => None,
                    None => {
                        debug!(line, "accepting implicit exchange");
                        None
                    }
                }
            }
        };

        let mut postings = Vec::with_capacity(raw_postings.len() + 1);
        for ((raw, account), quantity) in raw_postings
            .into_iter()
            .zip(accounts)
            .zip(quantities.into_iter().flatten())
        {
            let balance = match &raw.balance {
                Some(balance) => {
                    let default = self.held(account, &pending);
                    Some(self.literal(balance, default, &raw.account, raw.line)?)
                }
                None => None,
            };
            postings.push(NewPosting {
                account,
                quantity,
                balance,
                note: raw.note,
                tags: raw.tags,
            });
        }
        if let Some(residual) = &diverted {
            postings.push(NewPosting::new(self.ledger.accounts.unbalanced(), -residual));
        }

        let location = self.location(line);
        let mut transaction = Transaction::new(posted, description, location.clone());
        transaction.code = code;
        transaction.note = note;
        transaction.tags = tags;
        let (id, balances) = self
            .ledger
            .append_transaction(transaction, postings)
            .map_err(|source| ResolveError::Amount { line, source })?;
        for (account, commodity) in pending {
            self.ledger.accounts.get_mut(account).commodity = Some(commodity);
        }

        let mut warnings = Vec::new();
        if let Some(residual) = diverted {
            warnings.push(ResolutionWarning::Unbalanced {
                location: location.clone(),
                transaction: id,
                residual,
            });
        }
        for ((_, posting), actual) in self.ledger.postings_of(id).zip(&balances) {
            let (Some(expected), Some(actual)) = (&posting.balance, actual) else {
                continue;
            };
            if expected.checked_cmp(actual) != Ok(Ordering::Equal) {
                warnings.push(ResolutionWarning::BalanceMismatch {
                    location: location.clone(),
                    transaction: id,
                    account: self.ledger.accounts.get(posting.account).full_name.clone(),
                    expected: expected.clone(),
                    actual: actual.clone(),
                });
            }
        }
        for warning in warnings {
            warn!("{warning}");
            self.ledger.warn(warning);
        }
        Ok(())
    }
}

/// Resolve all items of one file, in order.
///
/// Stops at the first error. Returns the number of items resolved.
pub fn resolve(
    ledger: &mut Ledger,
    file: impl Into<Arc<str>>,
    items: impl IntoIterator<Item = Spanned<Item>>,
) -> Result<usize, ResolveError> {
    let mut resolver = Resolver::new(ledger, file);
    let mut count = 0;
    for item in items {
        resolver.resolve(item)?;
        count += 1;
    }
    debug!(file = %resolver.file, items = count, "resolved");
    Ok(count)
}
