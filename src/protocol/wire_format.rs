//! Wire format of a tokenized frame.
//!
//! ```text
//! ┌──────────┬──────────────────────────┐
//! │ Token    │ Arguments                │
//! │ 4 bytes  │ 0..N bytes               │
//! │ uint32 LE│ packed, format-dependent │
//! └──────────┴──────────────────────────┘
//! ```
//!
//! The token is Little Endian, matching the device's native byte order.

use crate::error::{DetokenizeError, Result};

/// Token size in bytes (fixed, exactly 4).
pub const TOKEN_SIZE: usize = 4;

/// A 32-bit hash of the original format string.
pub type Token = u32;

/// Decode the token prefix of a frame.
///
/// Returns `None` if the buffer is too short.
///
/// # Example
///
/// ```
/// use tokenlog::protocol::decode_token;
///
/// assert_eq!(decode_token(&[0x2A, 0, 0, 0, 0xFF]), Some(42));
/// assert_eq!(decode_token(&[0x2A, 0, 0]), None);
/// ```
#[inline]
pub fn decode_token(buf: &[u8]) -> Option<Token> {
    if buf.len() < TOKEN_SIZE {
        return None;
    }
    Some(u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]))
}

/// Encode a token to its wire bytes (Little Endian).
#[inline]
pub fn encode_token(token: Token) -> [u8; TOKEN_SIZE] {
    token.to_le_bytes()
}

/// Split raw frame bytes into the token and the argument bytes.
///
/// # Errors
///
/// Returns [`DetokenizeError::MalformedFrame`] if fewer than 4 bytes are given.
///
/// # Example
///
/// ```
/// use tokenlog::protocol::split_frame;
///
/// let (token, args) = split_frame(&[0x2A, 0, 0, 0, 0x2A, 0, 0, 0]).unwrap();
/// assert_eq!(token, 42);
/// assert_eq!(args, &[0x2A, 0, 0, 0]);
///
/// assert!(split_frame(&[1, 2]).is_err());
/// ```
pub fn split_frame(buf: &[u8]) -> Result<(Token, &[u8])> {
    match decode_token(buf) {
        Some(token) => Ok((token, &buf[TOKEN_SIZE..])),
        None => Err(DetokenizeError::MalformedFrame { len: buf.len() }),
    }
}

/// Render arbitrary bytes as text, replacing invalid UTF-8 with U+FFFD.
///
/// Used as the fallback rendering of frames whose token is unknown.
/// Never fails.
pub fn lossy_text(buf: &[u8]) -> String {
    String::from_utf8_lossy(buf).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_little_endian_byte_order() {
        let bytes = encode_token(0x0403_0201);
        assert_eq!(bytes, [0x01, 0x02, 0x03, 0x04]);
        assert_eq!(decode_token(&bytes), Some(0x0403_0201));
    }

    #[test]
    fn test_token_size_is_exactly_4() {
        assert_eq!(TOKEN_SIZE, 4);
        assert_eq!(encode_token(u32::MAX).len(), 4);
    }

    #[test]
    fn test_decode_too_short_buffer() {
        assert!(decode_token(&[]).is_none());
        assert!(decode_token(&[0u8; 3]).is_none());
    }

    #[test]
    fn test_split_token_only() {
        let (token, args) = split_frame(&[0xEF, 0xBE, 0xAD, 0xDE]).unwrap();
        assert_eq!(token, 0xDEAD_BEEF);
        assert!(args.is_empty());
    }

    #[test]
    fn test_split_args_length() {
        let frame = [1u8, 0, 0, 0, 9, 8, 7];
        let (token, args) = split_frame(&frame).unwrap();
        assert_eq!(token, 1);
        assert_eq!(args.len(), frame.len() - TOKEN_SIZE);
        assert_eq!(args, &[9, 8, 7]);
    }

    #[test]
    fn test_split_short_frame_is_malformed() {
        let err = split_frame(&[0x2A, 0x00]).unwrap_err();
        assert!(matches!(err, DetokenizeError::MalformedFrame { len: 2 }));
        assert!(err.to_string().contains("need at least 4"));
    }

    #[test]
    fn test_lossy_text_replaces_invalid_utf8() {
        assert_eq!(lossy_text(b"plain"), "plain");
        assert_eq!(lossy_text(&[b'a', 0xFF, b'b']), "a\u{FFFD}b");
        assert_eq!(lossy_text(&[]), "");
    }
}
