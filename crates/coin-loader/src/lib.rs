//! Coin ledger loader.
//!
//! This crate reads ledger files from disk and feeds them through the parser
//! and the resolver into a [`Ledger`]. A ledger directory is loaded in a
//! fixed order: `commodities.coin`, `accounts.coin` and `prices.coin` first
//! (when present), then every other `*.coin` file below the directory in
//! sorted path order.
//!
//! Each file is parsed completely before any of its items are resolved, so
//! a parse error leaves nothing of that file in the ledger. Errors in one
//! file never stop the others from loading.
//!
//! # Example
//!
//! ```no_run
//! use chrono::NaiveDate;
//! use coin_core::Ledger;
//! use coin_loader::Loader;
//! use std::path::Path;
//!
//! let today = NaiveDate::from_ymd_opt(2018, 10, 1).unwrap();
//! let mut ledger = Ledger::new();
//! let result = Loader::new(today).load_all(&mut ledger, Path::new("ledger"));
//! for error in &result.errors {
//!     eprintln!("{error}");
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;

pub use config::{LoaderConfig, ACCOUNTS_FILE, COMMODITIES_FILE, EXTENSION, PRICES_FILE};

use chrono::NaiveDate;
use coin_core::Ledger;
use coin_parser::ParseError;
use coin_resolver::ResolveError;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Errors that can occur during loading.
#[derive(Debug, Error)]
pub enum LoadError {
    /// IO error reading a file or directory.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// The path that failed to read.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The file does not follow the ledger grammar.
    #[error("{}: {source}", path.display())]
    Parse {
        /// The file with the parse error.
        path: PathBuf,
        /// The parse error.
        #[source]
        source: ParseError,
    },

    /// An item could not be linked into the ledger.
    #[error("{}: {source}", path.display())]
    Resolve {
        /// The file with the offending item.
        path: PathBuf,
        /// The resolve error.
        #[source]
        source: ResolveError,
    },
}

impl LoadError {
    /// The file the error belongs to.
    pub fn path(&self) -> &Path {
        match self {
            Self::Io { path, .. } | Self::Parse { path, .. } | Self::Resolve { path, .. } => path,
        }
    }
}

/// Progress of a single file through the loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileState {
    /// Not seen yet.
    Unloaded,
    /// Being read and parsed.
    Parsing,
    /// All items resolved into the ledger.
    Resolved,
    /// Reading, parsing or resolving failed.
    Failed,
}

/// Outcome of loading a ledger directory.
#[derive(Debug, Default)]
pub struct LoadResult {
    /// Files in load order.
    pub files: Vec<PathBuf>,
    /// All errors encountered, in load order.
    pub errors: Vec<LoadError>,
}

impl LoadResult {
    /// Whether every file loaded cleanly.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Coin ledger loader.
#[derive(Debug, Clone)]
pub struct Loader {
    reference_date: NaiveDate,
    states: HashMap<PathBuf, FileState>,
}

impl Loader {
    /// Create a loader resolving relative dates against `reference_date`.
    #[must_use]
    pub fn new(reference_date: NaiveDate) -> Self {
        Self {
            reference_date,
            states: HashMap::new(),
        }
    }

    /// Create a loader from a configuration.
    #[must_use]
    pub fn from_config(config: &LoaderConfig) -> Self {
        Self::new(config.reference_date)
    }

    /// The reference date for relative dates.
    pub const fn reference_date(&self) -> NaiveDate {
        self.reference_date
    }

    /// Current state of a file.
    pub fn state(&self, path: &Path) -> FileState {
        self.states.get(path).copied().unwrap_or(FileState::Unloaded)
    }

    fn transition(&mut self, path: &Path, state: FileState) {
        debug!(file = %path.display(), ?state, "file state");
        self.states.insert(path.to_path_buf(), state);
    }

    /// Parse and resolve ledger text as if it were read from `path`.
    ///
    /// Returns the number of items resolved.
    ///
    /// # Errors
    ///
    /// - [`LoadError::Parse`] - the text does not parse; the ledger is untouched
    /// - [`LoadError::Resolve`] - an item failed to resolve; earlier items stay
    pub fn load_str(
        &mut self,
        ledger: &mut Ledger,
        path: &Path,
        source: &str,
    ) -> Result<usize, LoadError> {
        self.transition(path, FileState::Parsing);
        let items = match coin_parser::parse(source, self.reference_date) {
            Ok(items) => items,
            Err(source) => {
                self.transition(path, FileState::Failed);
                return Err(LoadError::Parse {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        let name = path.display().to_string();
        match coin_resolver::resolve(ledger, name, items) {
            Ok(count) => {
                self.transition(path, FileState::Resolved);
                Ok(count)
            }
            Err(source) => {
                self.transition(path, FileState::Failed);
                Err(LoadError::Resolve {
                    path: path.to_path_buf(),
                    source,
                })
            }
        }
    }

    /// Load a single file.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Io`] if the file cannot be read, otherwise as
    /// [`Loader::load_str`].
    pub fn load_file(&mut self, ledger: &mut Ledger, path: &Path) -> Result<usize, LoadError> {
        self.transition(path, FileState::Parsing);
        let source = fs::read_to_string(path).map_err(|source| {
            self.transition(path, FileState::Failed);
            LoadError::Io {
                path: path.to_path_buf(),
                source,
            }
        })?;
        self.load_str(ledger, path, &source)
    }

    /// Load every ledger file of a directory.
    ///
    /// Errors are collected per file; a failing file does not stop the
    /// others.
    pub fn load_all(&mut self, ledger: &mut Ledger, dir: &Path) -> LoadResult {
        let mut result = LoadResult::default();
        let files = match ledger_files(dir) {
            Ok(files) => files,
            Err(err) => {
                result.errors.push(err);
                return result;
            }
        };
        for path in files {
            if let Err(err) = self.load_file(ledger, &path) {
                warn!("{err}");
                result.errors.push(err);
            }
            result.files.push(path);
        }
        debug!(
            files = result.files.len(),
            errors = result.errors.len(),
            transactions = ledger.transaction_count(),
            "loaded ledger"
        );
        result
    }
}

/// Ledger files of a directory, in load order.
///
/// The declaration files at the top of `dir` come first, in the order
/// commodities, accounts, prices; all other `*.coin` files follow, found
/// recursively and sorted by path.
///
/// # Errors
///
/// Returns [`LoadError::Io`] if a directory cannot be listed.
pub fn ledger_files(dir: &Path) -> Result<Vec<PathBuf>, LoadError> {
    let mut found = Vec::new();
    collect(dir, &mut found)?;
    found.sort();

    let mut files = Vec::with_capacity(found.len());
    for name in [COMMODITIES_FILE, ACCOUNTS_FILE, PRICES_FILE] {
        let path = dir.join(name);
        if let Some(index) = found.iter().position(|p| *p == path) {
            files.push(found.remove(index));
        }
    }
    files.extend(found);
    Ok(files)
}

fn collect(dir: &Path, found: &mut Vec<PathBuf>) -> Result<(), LoadError> {
    let io_error = |source| LoadError::Io {
        path: dir.to_path_buf(),
        source,
    };
    for entry in fs::read_dir(dir).map_err(io_error)? {
        let path = entry.map_err(io_error)?.path();
        if path.is_dir() {
            collect(&path, found)?;
        } else if path.extension().is_some_and(|e| e == EXTENSION) {
            found.push(path);
        }
    }
    Ok(())
}
