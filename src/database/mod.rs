//! Database module - token to format string lookup.
//!
//! The detokenizer only needs the read accessor of [`TokenDatabase`]; any
//! backing (in-memory table, external service, generated code) can implement
//! it. [`TokenTable`] is the in-memory implementation, loadable from CSV and
//! JSON files.
//!
//! # Example
//!
//! ```
//! use tokenlog::database::{TokenDatabase, TokenTable};
//!
//! let mut table = TokenTable::new();
//! table.insert(42, "answer=%d");
//!
//! assert_eq!(table.lookup(42).as_deref(), Some("answer=%d"));
//! assert!(table.lookup(7).is_none());
//! ```

mod load;
mod table;

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;

use crate::protocol::Token;

pub use table::{TokenEntry, TokenTable};

/// Read-only lookup from token to its original format string.
///
/// Implementations must be safe for concurrent reads; the detokenizer never
/// mutates them.
pub trait TokenDatabase: Send + Sync {
    /// Look up the format string for a token, `None` if unknown.
    fn lookup(&self, token: Token) -> Option<Cow<'_, str>>;
}

impl TokenDatabase for HashMap<Token, String> {
    fn lookup(&self, token: Token) -> Option<Cow<'_, str>> {
        self.get(&token).map(|s| Cow::Borrowed(s.as_str()))
    }
}

impl TokenDatabase for HashMap<Token, &'static str> {
    fn lookup(&self, token: Token) -> Option<Cow<'_, str>> {
        self.get(&token).map(|s| Cow::Borrowed(*s))
    }
}

impl<T: TokenDatabase + ?Sized> TokenDatabase for Arc<T> {
    fn lookup(&self, token: Token) -> Option<Cow<'_, str>> {
        (**self).lookup(token)
    }
}

impl<T: TokenDatabase + ?Sized> TokenDatabase for Box<T> {
    fn lookup(&self, token: Token) -> Option<Cow<'_, str>> {
        (**self).lookup(token)
    }
}
