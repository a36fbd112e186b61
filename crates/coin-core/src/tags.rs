//! Tags extracted from note text.
//!
//! A tag is written `#key` or `#key: value` anywhere in a note; several tags
//! on one line are separated by commas (`#trip: Paris, #business`). The
//! verbatim note is kept alongside, tags are only an index into it.

use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::OnceLock;

fn tag_regex() -> &'static Regex {
    static TAG: OnceLock<Regex> = OnceLock::new();
    TAG.get_or_init(|| {
        Regex::new(r"#(?P<key>\w+)(:\s*(?P<value>[^,]+\S)\s*(,|$))?")
            .expect("tag pattern compiles")
    })
}

/// Key/value annotations of a transaction or posting.
///
/// An empty map is a valid, inert value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Tags(BTreeMap<String, String>);

impl Tags {
    /// Create an empty tag set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Extract tags from note text, one line at a time.
    ///
    /// A key without a value maps to the empty string; a repeated key keeps
    /// the last value.
    pub fn parse(note: &str) -> Self {
        let mut tags = BTreeMap::new();
        for line in note.lines() {
            for captures in tag_regex().captures_iter(line) {
                let value = captures.name("value").map_or("", |m| m.as_str());
                tags.insert(captures["key"].to_string(), value.to_string());
            }
        }
        Self(tags)
    }

    /// Whether no tag is present.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether `key` is present.
    pub fn includes(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Value of `key`, empty when absent.
    pub fn value(&self, key: &str) -> &str {
        self.0.get(key).map_or("", String::as_str)
    }

    /// Keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Key/value pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Matches tags against a `key[:value]` expression.
///
/// Both halves are regular expressions; the value half is optional. A tag
/// set matches when any of its entries matches.
#[derive(Debug, Clone)]
pub struct TagMatcher {
    key: Regex,
    value: Option<Regex>,
}

impl TagMatcher {
    /// Compile a `key[:value]` expression.
    pub fn new(expression: &str) -> Result<Self, regex::Error> {
        let (key, value) = match expression.split_once(':') {
            Some((key, value)) => (key, Some(Regex::new(value)?)),
            None => (expression, None),
        };
        Ok(Self {
            key: Regex::new(key)?,
            value,
        })
    }

    /// Whether any tag matches.
    pub fn matches(&self, tags: &Tags) -> bool {
        tags.iter().any(|(key, value)| {
            self.key.is_match(key) && self.value.as_ref().map_or(true, |v| v.is_match(value))
        })
    }
}
