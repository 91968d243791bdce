//! In-memory token table.
//!
//! A token can collide: two format strings may hash to the same value, and a
//! string removed from the firmware keeps its entry with a removal date. All
//! entries are kept; [`TokenTable::lookup`] picks one:
//!
//! 1. entries without a removal date (still present in the firmware)
//! 2. otherwise the latest removal date
//! 3. ties go to the most recently inserted entry

use std::borrow::Cow;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::TokenDatabase;
use crate::protocol::Token;

/// One token database row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenEntry {
    /// Token (hash of the format string).
    pub token: Token,
    /// Original printf-style format string.
    pub format: String,
    /// Date the string was removed from the firmware, if it was.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub removal_date: Option<String>,
}

impl TokenEntry {
    /// Create an entry that is still present in the firmware.
    pub fn new(token: Token, format: impl Into<String>) -> Self {
        Self {
            token,
            format: format.into(),
            removal_date: None,
        }
    }

    /// Set the removal date.
    pub fn removed(mut self, date: impl Into<String>) -> Self {
        self.removal_date = Some(date.into());
        self
    }

    /// Check if the string is still present in the firmware.
    #[inline]
    pub fn is_present(&self) -> bool {
        self.removal_date.is_none()
    }
}

/// In-memory token database.
#[derive(Debug, Clone, Default)]
pub struct TokenTable {
    entries: HashMap<Token, Vec<TokenEntry>>,
    count: usize,
}

impl TokenTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a present (not removed) format string for a token.
    pub fn insert(&mut self, token: Token, format: impl Into<String>) {
        self.push(TokenEntry::new(token, format));
    }

    /// Add a full entry.
    pub fn push(&mut self, entry: TokenEntry) {
        self.entries.entry(entry.token).or_default().push(entry);
        self.count += 1;
    }

    /// Add every entry of another table.
    pub fn merge(&mut self, other: TokenTable) {
        for entry in other.entries.into_values().flatten() {
            self.push(entry);
        }
    }

    /// All entries recorded for a token, in insertion order.
    pub fn entries(&self, token: Token) -> &[TokenEntry] {
        self.entries.get(&token).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The entry chosen for a token by the collision policy.
    pub fn best_entry(&self, token: Token) -> Option<&TokenEntry> {
        self.entries(token)
            .iter()
            .max_by(|a, b| {
                (a.is_present(), a.removal_date.as_deref())
                    .cmp(&(b.is_present(), b.removal_date.as_deref()))
            })
    }

    /// Total number of entries, collisions included.
    pub fn len(&self) -> usize {
        self.count
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Number of distinct tokens.
    pub fn token_count(&self) -> usize {
        self.entries.len()
    }
}

impl Extend<TokenEntry> for TokenTable {
    fn extend<I: IntoIterator<Item = TokenEntry>>(&mut self, iter: I) {
        for entry in iter {
            self.push(entry);
        }
    }
}

impl FromIterator<TokenEntry> for TokenTable {
    fn from_iter<I: IntoIterator<Item = TokenEntry>>(iter: I) -> Self {
        let mut table = Self::new();
        table.extend(iter);
        table
    }
}

impl TokenDatabase for TokenTable {
    fn lookup(&self, token: Token) -> Option<Cow<'_, str>> {
        self.best_entry(token)
            .map(|entry| Cow::Borrowed(entry.format.as_str()))
    }
}
