//! The account tree.
//!
//! Accounts live in a single arena owned by [`Accounts`] and refer to each
//! other through [`AccountId`] handles: a child points at its parent by index
//! and the parent lists its children, ordered by name. The arena owns every
//! node, so there are no reference cycles and the tree can be shared
//! read-only across threads.
//!
//! Index 0 is the nameless root. The `Unbalanced` account is created with the
//! registry and receives the residual of transactions that do not balance.

use regex::{Regex, RegexBuilder};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

use crate::amount::Amount;
use crate::commodity::Commodity;
use crate::error::LookupError;
use crate::transaction::PostingId;

/// Separator between account name segments.
pub const SEPARATOR: char = ':';

/// Full name of the account receiving unbalanced residuals.
pub const UNBALANCED: &str = "Unbalanced";

/// Handle of an account in [`Accounts`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct AccountId(usize);

impl AccountId {
    /// Position of the account in the registry.
    pub const fn index(self) -> usize {
        self.0
    }
}

/// A node of the account tree.
#[derive(Debug, Clone)]
pub struct Account {
    /// Last segment of the full name.
    pub name: String,
    /// Colon separated path from the root, e.g. `Expenses:Groceries`.
    pub full_name: String,
    /// Parent node; `None` only for the root.
    pub parent: Option<AccountId>,
    /// Default commodity of postings to this account.
    pub commodity: Option<Arc<Commodity>>,
    /// Free text from the declaration.
    pub note: String,
    children: Vec<AccountId>,
    pub(crate) postings: Vec<PostingId>,
    pub(crate) balance: Option<Amount>,
}

impl Account {
    fn new(name: &str, full_name: &str, parent: Option<AccountId>) -> Self {
        Self {
            name: name.to_string(),
            full_name: full_name.to_string(),
            parent,
            commodity: None,
            note: String::new(),
            children: Vec::new(),
            postings: Vec::new(),
            balance: None,
        }
    }

    /// Child accounts, ordered by name.
    pub fn children(&self) -> &[AccountId] {
        &self.children
    }

    /// Postings to this account, in the order they were appended.
    pub fn postings(&self) -> &[PostingId] {
        &self.postings
    }

    /// Running balance; `None` until the first posting.
    pub const fn balance(&self) -> Option<&Amount> {
        self.balance.as_ref()
    }

    /// Commodity symbol, empty when the account has none.
    pub fn commodity_id(&self) -> &str {
        self.commodity.as_ref().map_or("", |c| c.id.as_str())
    }
}

/// Registry of all accounts, keyed by full name.
#[derive(Debug, Clone)]
pub struct Accounts {
    arena: Vec<Account>,
    by_name: HashMap<String, AccountId>,
    unbalanced: AccountId,
}

impl Default for Accounts {
    fn default() -> Self {
        Self::new()
    }
}

impl Accounts {
    /// Create a registry holding only the root and the `Unbalanced` account.
    pub fn new() -> Self {
        let mut accounts = Self {
            arena: vec![Account::new("", "", None)],
            by_name: HashMap::new(),
            unbalanced: AccountId(0),
        };
        accounts.unbalanced = accounts.get_or_create(UNBALANCED);
        accounts
    }

    /// The nameless root account.
    pub const fn root(&self) -> AccountId {
        AccountId(0)
    }

    /// The sentinel receiving unbalanced residuals.
    pub const fn unbalanced(&self) -> AccountId {
        self.unbalanced
    }

    /// Get an account by handle.
    pub fn get(&self, id: AccountId) -> &Account {
        &self.arena[id.0]
    }

    /// Get an account by handle for modification.
    pub fn get_mut(&mut self, id: AccountId) -> &mut Account {
        &mut self.arena[id.0]
    }

    /// Look up an account by exact full name.
    pub fn by_name(&self, full_name: &str) -> Option<AccountId> {
        self.by_name.get(full_name).copied()
    }

    /// Fetch an account by full name, creating it and any missing ancestors.
    pub fn get_or_create(&mut self, full_name: &str) -> AccountId {
        if let Some(id) = self.by_name(full_name) {
            return id;
        }
        let (parent, name) = match full_name.rsplit_once(SEPARATOR) {
            Some((parent, name)) => (self.get_or_create(parent), name),
            None => (self.root(), full_name),
        };
        let id = AccountId(self.arena.len());
        self.arena
            .push(Account::new(name, full_name, Some(parent)));
        self.by_name.insert(full_name.to_string(), id);

        let at = self.arena[parent.0]
            .children
            .partition_point(|c| self.arena[c.0].name.as_str() < name);
        self.arena[parent.0].children.insert(at, id);
        id
    }

    /// Number of accounts, not counting the root.
    pub fn len(&self) -> usize {
        self.arena.len() - 1
    }

    /// Whether only the built-in accounts exist.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All accounts except the root, in creation order.
    pub fn iter(&self) -> impl Iterator<Item = (AccountId, &Account)> {
        self.arena
            .iter()
            .enumerate()
            .skip(1)
            .map(|(i, a)| (AccountId(i), a))
    }

    /// `id` followed by all its descendants, parents before children.
    pub fn with_descendants(&self, id: AccountId) -> Vec<AccountId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.get(next).children.iter().rev());
        }
        out
    }

    /// `id` and all its descendants, children before parents.
    pub fn post_order(&self, id: AccountId) -> Vec<AccountId> {
        let mut out = Vec::new();
        self.visit_post_order(id, &mut out);
        out
    }

    fn visit_post_order(&self, id: AccountId, out: &mut Vec<AccountId>) {
        for &child in &self.get(id).children {
            self.visit_post_order(child, out);
        }
        out.push(id);
    }

    /// Full name of `id` relative to its ancestor `base`, without the
    /// leading separator.
    pub fn relative_name(&self, id: AccountId, base: AccountId) -> &str {
        let full = self.get(id).full_name.as_str();
        let prefix = self.get(base).full_name.as_str();
        full.strip_prefix(prefix)
            .map_or(full, |rest| rest.trim_start_matches(SEPARATOR))
    }

    /// Every account matching `pattern`, ordered by full name.
    ///
    /// The pattern is a colon separated list of case-insensitive regular
    /// expressions, each anchored at the start of a name segment. The last
    /// expression must match the account's last segment and the others must
    /// match earlier segments in order, so `exp:groc` finds
    /// `Expenses:Groceries`, `Expenses:Food:Groceries` but not
    /// `Expenses:Groceries:Costco`.
    pub fn matching(&self, pattern: &str) -> Result<Vec<AccountId>, LookupError> {
        let segments = pattern
            .split(SEPARATOR)
            .map(|segment| {
                RegexBuilder::new(&format!("^(?:{segment})"))
                    .case_insensitive(true)
                    .build()
            })
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| LookupError::InvalidPattern {
                pattern: pattern.to_string(),
                message: e.to_string(),
            })?;

        let mut found: Vec<AccountId> = self
            .iter()
            .filter(|(_, account)| segments_match(&segments, &account.full_name))
            .map(|(id, _)| id)
            .collect();
        found.sort_by(|a, b| self.get(*a).full_name.cmp(&self.get(*b).full_name));
        Ok(found)
    }

    /// Find the single account designated by `pattern`.
    ///
    /// An exact full name always wins; otherwise the pattern must match
    /// exactly one account.
    pub fn find(&self, pattern: &str) -> Result<AccountId, LookupError> {
        if let Some(id) = self.by_name(pattern) {
            return Ok(id);
        }
        let found = self.matching(pattern)?;
        match found.as_slice() {
            [] => Err(LookupError::NotFound {
                pattern: pattern.to_string(),
            }),
            [id] => Ok(*id),
            _ => Err(LookupError::Ambiguous {
                pattern: pattern.to_string(),
                candidates: found
                    .iter()
                    .map(|id| self.get(*id).full_name.clone())
                    .collect(),
            }),
        }
    }
}

fn segments_match(patterns: &[Regex], full_name: &str) -> bool {
    let names: Vec<&str> = full_name.split(SEPARATOR).collect();
    let (Some((last_pattern, patterns)), Some((last_name, names))) =
        (patterns.split_last(), names.split_last())
    else {
        return false;
    };
    if !last_pattern.is_match(last_name) {
        return false;
    }
    let mut names = names.iter().rev();
    patterns
        .iter()
        .rev()
        .all(|pattern| names.any(|name| pattern.is_match(name)))
}
