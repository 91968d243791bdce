//! # tokenlog
//!
//! Detokenizer for tokenized embedded-device logs.
//!
//! Instead of printing a full format string, a device emits a 4-byte
//! little-endian token (a hash of the string) followed by its packed
//! arguments. This crate recovers the original message from such frames.
//!
//! ## Architecture
//!
//! - **Binary path**: `token + args` frame → format string lookup → rendered message
//! - **Text path**: `$`-prefixed Base64 frames embedded in plain text are
//!   rendered in place; anything that fails to resolve is left as written
//!
//! ## Example
//!
//! ```
//! use tokenlog::database::TokenTable;
//! use tokenlog::protocol::Frame;
//! use tokenlog::Detokenizer;
//!
//! let mut table = TokenTable::new();
//! table.insert(42, "answer=%d");
//!
//! let detokenizer = Detokenizer::new(table);
//!
//! let frame = Frame::from_slice(&[0x2A, 0, 0, 0, 0x2A, 0, 0, 0]);
//! assert_eq!(detokenizer.detokenize(&frame), "answer=42");
//!
//! let line = detokenizer.detokenize_text("prefix $KgAAACoAAAA= suffix");
//! assert_eq!(line, "prefix answer=42 suffix");
//! ```

pub mod codec;
pub mod database;
pub mod embedded;
pub mod error;
pub mod protocol;
pub mod stream;

mod detokenizer;

pub use codec::{ArgumentDecoder, PrintfDecoder};
pub use database::{TokenDatabase, TokenTable};
pub use detokenizer::{
    Detokenized, Detokenizer, DetokenizerBuilder, DetokenizerConfig, DEFAULT_RECURSION,
};
pub use error::DetokenizeError;
