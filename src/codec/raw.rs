//! Raw decoder - pass-through for format strings.
//!
//! Used when only the original format string is wanted, e.g. to inspect which
//! log statement produced a frame without trusting its argument bytes.
//!
//! # Example
//!
//! ```
//! use tokenlog::codec::{ArgumentDecoder, RawDecoder};
//!
//! assert_eq!(RawDecoder.decode("temp=%d C", &[0x15, 0, 0, 0]), "temp=%d C");
//! ```

use super::ArgumentDecoder;

/// Decoder that ignores the arguments and returns the format string as-is.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawDecoder;

impl ArgumentDecoder for RawDecoder {
    #[inline]
    fn decode(&self, format: &str, _args: &[u8]) -> String {
        format.to_string()
    }
}
