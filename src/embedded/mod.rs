//! Embedded module - Base64 token frames inside text.
//!
//! Devices that can only emit text wrap each binary frame as `$` followed by
//! its Base64 encoding, mixed freely with plain log output:
//!
//! ```text
//! boot ok $KgAAACoAAAA= temp=21
//! ```
//!
//! - [`Scanner`] - finds candidate substrings without decoding them
//! - [`decode_candidate`] - turns one candidate into token + argument bytes

mod decode;
mod scanner;

pub use decode::{decode_body, decode_candidate, DecodedCandidate};
pub use scanner::{is_base64_symbol, scan, Candidate, Scanner, DEFAULT_PREFIX};
