//! Commodities and the commodity registry.
//!
//! A [`Commodity`] is a unit of value (a currency or a security) with a fixed
//! number of decimal places. Its precision is settled when it is created and
//! never changes afterwards, which is what lets [`Amount`](crate::Amount)
//! share it through an [`Arc`].

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Decimal places of a commodity declared without a `format` line.
pub const DEFAULT_DECIMALS: u32 = 2;

/// A currency or security.
///
/// Identity is the symbol alone: two commodities with the same `id` are the
/// same commodity.
#[derive(Debug, Clone, Serialize)]
pub struct Commodity {
    /// Unique symbol, e.g. `CAD` or `TDB162`.
    pub id: String,
    /// Number of digits after the decimal point.
    pub decimals: u32,
    /// Free text from the declaration.
    pub note: String,
}

impl Commodity {
    /// Create a commodity with an empty note.
    #[must_use]
    pub fn new(id: impl Into<String>, decimals: u32) -> Self {
        Self {
            id: id.into(),
            decimals,
            note: String::new(),
        }
    }

    /// The symbol as written in the given output style.
    ///
    /// Ledger-compatible output quotes symbols containing anything but
    /// letters, so `TDB162` becomes `"TDB162"`.
    pub fn safe_id(&self, ledger: bool) -> String {
        if ledger && !self.id.chars().all(char::is_alphabetic) {
            format!("\"{}\"", self.id)
        } else {
            self.id.clone()
        }
    }
}

impl PartialEq for Commodity {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Commodity {}

impl Hash for Commodity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Commodity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

/// Registry of every commodity seen so far, keyed by symbol.
#[derive(Debug, Clone, Default)]
pub struct Commodities {
    by_id: BTreeMap<String, Arc<Commodity>>,
}

impl Commodities {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a commodity.
    ///
    /// The first declaration wins; later ones return the existing entry
    /// unchanged.
    pub fn declare(&mut self, id: &str, decimals: u32, note: &str) -> Arc<Commodity> {
        self.by_id
            .entry(id.to_string())
            .or_insert_with(|| {
                Arc::new(Commodity {
                    id: id.to_string(),
                    decimals,
                    note: note.to_string(),
                })
            })
            .clone()
    }

    /// Fetch a commodity, creating it with `decimals` on first reference.
    pub fn get_or_create(&mut self, id: &str, decimals: u32) -> Arc<Commodity> {
        self.declare(id, decimals, "")
    }

    /// Look up a commodity by symbol.
    pub fn get(&self, id: &str) -> Option<&Arc<Commodity>> {
        self.by_id.get(id)
    }

    /// Number of commodities.
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Whether no commodity exists yet.
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// All commodities ordered by symbol.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Commodity>> {
        self.by_id.values()
    }
}
