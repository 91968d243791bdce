//! Base64 decoding of matched candidates.
//!
//! Uses the `base64` crate with canonical padding. Non-zero bits left over
//! in the last symbol are ignored, as most Base64 decoders do. Bodies
//! containing `-` or `_` are decoded with the URL-safe alphabet, everything
//! else with the standard one. Mixing both alphabets in one body fails to
//! decode.

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, PAD};
use base64::Engine as _;

use super::scanner::Candidate;
use crate::error::Result;
use crate::protocol::{split_frame, Token};

const STANDARD: GeneralPurpose =
    GeneralPurpose::new(&alphabet::STANDARD, PAD.with_decode_allow_trailing_bits(true));
const URL_SAFE: GeneralPurpose =
    GeneralPurpose::new(&alphabet::URL_SAFE, PAD.with_decode_allow_trailing_bits(true));

/// Decode a Base64 body (prefix already stripped) into raw frame bytes.
pub fn decode_body(body: &str) -> Result<Vec<u8>> {
    let engine = if body.bytes().any(|b| b == b'-' || b == b'_') {
        &URL_SAFE
    } else {
        &STANDARD
    };
    Ok(engine.decode(body)?)
}

/// Token and argument bytes recovered from one candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedCandidate {
    /// Token from the first 4 decoded bytes.
    pub token: Token,
    /// Decoded bytes after the token.
    pub args: Vec<u8>,
}

/// Turn a matched candidate into its token and argument bytes.
///
/// # Errors
///
/// - `Base64` if the body is not valid Base64.
/// - `MalformedFrame` if it decodes to fewer than 4 bytes (including the
///   bare-prefix candidate).
///
/// # Example
///
/// ```
/// use tokenlog::embedded::{decode_candidate, scan};
///
/// let candidate = scan("$KgAAACoAAAA=").next().unwrap();
/// let decoded = decode_candidate(&candidate, '$').unwrap();
/// assert_eq!(decoded.token, 42);
/// assert_eq!(decoded.args, [0x2A, 0, 0, 0]);
/// ```
pub fn decode_candidate(candidate: &Candidate<'_>, prefix: char) -> Result<DecodedCandidate> {
    let bytes = decode_body(candidate.body(prefix))?;
    let (token, args) = split_frame(&bytes)?;
    Ok(DecodedCandidate {
        token,
        args: args.to_vec(),
    })
}
