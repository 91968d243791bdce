//! Codec module - rendering argument bytes against a format string.
//!
//! This module provides decoders for the argument payload of a frame:
//!
//! - [`PrintfDecoder`] - printf conversions over fixed-width little-endian arguments
//! - [`RawDecoder`] - returns the format string untouched
//!
//! # Design
//!
//! The detokenizer only depends on the [`ArgumentDecoder`] trait, so a
//! different argument encoding can be plugged in without touching it.
//!
//! # Example
//!
//! ```
//! use tokenlog::codec::{ArgumentDecoder, PrintfDecoder, RawDecoder};
//!
//! let args = [0x2A, 0, 0, 0];
//! assert_eq!(PrintfDecoder.decode("answer=%d", &args), "answer=42");
//! assert_eq!(RawDecoder.decode("answer=%d", &args), "answer=%d");
//! ```

mod format;
mod printf;
mod raw;

use std::sync::Arc;

pub use format::{parse_conversion, Conversion, Count, Flags, Length};
pub use printf::{render, PrintfDecoder, MAX_FIELD_WIDTH, TRUNCATED_MARKER};
pub use raw::RawDecoder;

/// Renders a format string's conversions against raw argument bytes.
///
/// Implementations must not fail: short or malformed argument bytes are
/// rendered best-effort or as placeholders. The returned string is final.
pub trait ArgumentDecoder: Send + Sync {
    /// Render `format` using `args`.
    fn decode(&self, format: &str, args: &[u8]) -> String;
}

impl<T: ArgumentDecoder + ?Sized> ArgumentDecoder for Arc<T> {
    fn decode(&self, format: &str, args: &[u8]) -> String {
        (**self).decode(format, args)
    }
}

impl<T: ArgumentDecoder + ?Sized> ArgumentDecoder for Box<T> {
    fn decode(&self, format: &str, args: &[u8]) -> String {
        (**self).decode(format, args)
    }
}
