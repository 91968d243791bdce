//! Frame struct with token accessors.
//!
//! Represents one complete, already-delimited unit of device output.
//! Uses `bytes::Bytes` for zero-copy payload sharing.
//!
//! # Example
//!
//! ```
//! use tokenlog::protocol::Frame;
//!
//! let frame = Frame::from_slice(&[0x2A, 0, 0, 0, 0x07, 0, 0, 0]);
//!
//! assert_eq!(frame.token(), Some(42));
//! assert_eq!(frame.args(), &[0x07, 0, 0, 0]);
//! ```

use bytes::Bytes;

use super::wire_format::{decode_token, encode_token, split_frame, Token, TOKEN_SIZE};
use crate::error::Result;

/// A complete tokenized frame, as delivered by the framing layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Payload bytes: token followed by encoded arguments.
    pub payload: Bytes,
}

impl Frame {
    /// Create a new frame from payload bytes.
    pub fn new(payload: Bytes) -> Self {
        Self { payload }
    }

    /// Create a frame from raw bytes (copies data).
    pub fn from_slice(payload: &[u8]) -> Self {
        Self {
            payload: Bytes::copy_from_slice(payload),
        }
    }

    /// Get a reference to the payload bytes.
    #[inline]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Get a clone of the payload as Bytes (cheap, zero-copy).
    #[inline]
    pub fn payload_bytes(&self) -> Bytes {
        self.payload.clone()
    }

    /// Get the payload length.
    #[inline]
    pub fn payload_len(&self) -> usize {
        self.payload.len()
    }

    /// Get the token, or `None` if the frame is shorter than 4 bytes.
    #[inline]
    pub fn token(&self) -> Option<Token> {
        decode_token(&self.payload)
    }

    /// Get the argument bytes following the token.
    ///
    /// Empty if the frame is shorter than 4 bytes.
    #[inline]
    pub fn args(&self) -> &[u8] {
        self.payload.get(TOKEN_SIZE..).unwrap_or(&[])
    }

    /// Split into token and argument bytes.
    ///
    /// Fails with `MalformedFrame` if the frame is shorter than 4 bytes.
    pub fn split(&self) -> Result<(Token, &[u8])> {
        split_frame(&self.payload)
    }
}

impl From<Vec<u8>> for Frame {
    fn from(payload: Vec<u8>) -> Self {
        Self::new(Bytes::from(payload))
    }
}

impl From<&[u8]> for Frame {
    fn from(payload: &[u8]) -> Self {
        Self::from_slice(payload)
    }
}

/// Build a complete frame as a single byte vector.
///
/// Encodes the token and appends already-encoded argument bytes.
///
/// # Example
///
/// ```
/// use tokenlog::protocol::build_frame;
///
/// let bytes = build_frame(42, &[0x2A, 0, 0, 0]);
/// assert_eq!(bytes, [0x2A, 0, 0, 0, 0x2A, 0, 0, 0]);
/// ```
pub fn build_frame(token: Token, args: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(TOKEN_SIZE + args.len());
    buf.extend_from_slice(&encode_token(token));
    buf.extend_from_slice(args);
    buf
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DetokenizeError;

    #[test]
    fn test_frame_creation() {
        let payload = Bytes::from_static(&[0x01, 0x00, 0x00, 0x00, b'h', b'i']);
        let frame = Frame::new(payload);

        assert_eq!(frame.token(), Some(1));
        assert_eq!(frame.args(), b"hi");
        assert_eq!(frame.payload_len(), 6);
    }

    #[test]
    fn test_frame_from_vec_and_slice() {
        let bytes = build_frame(7, b"xy");
        let from_vec = Frame::from(bytes.clone());
        let from_slice = Frame::from(&bytes[..]);

        assert_eq!(from_vec, from_slice);
        assert_eq!(from_vec.token(), Some(7));
    }

    #[test]
    fn test_frame_empty_payload() {
        let frame = Frame::new(Bytes::new());

        assert_eq!(frame.payload_len(), 0);
        assert!(frame.token().is_none());
        assert!(frame.args().is_empty());
        assert!(matches!(
            frame.split(),
            Err(DetokenizeError::MalformedFrame { len: 0 })
        ));
    }

    #[test]
    fn test_frame_short_payload_has_no_args() {
        let frame = Frame::from_slice(&[1, 2, 3]);
        assert!(frame.token().is_none());
        assert!(frame.args().is_empty());
    }

    #[test]
    fn test_payload_bytes_zero_copy() {
        let original = Bytes::from_static(b"\x01\x00\x00\x00data");
        let frame = Frame::new(original.clone());

        let cloned = frame.payload_bytes();
        assert_eq!(cloned, original);
        assert_eq!(cloned.as_ptr(), original.as_ptr());
    }

    #[test]
    fn test_build_frame_token_only() {
        let bytes = build_frame(0xDEAD_BEEF, &[]);
        assert_eq!(bytes, [0xEF, 0xBE, 0xAD, 0xDE]);
    }

    #[test]
    fn test_build_frame_split_roundtrip() {
        let bytes = build_frame(123_456, &[1, 2, 3, 4, 5]);
        let frame = Frame::from(bytes);
        let (token, args) = frame.split().unwrap();

        assert_eq!(token, 123_456);
        assert_eq!(args, &[1, 2, 3, 4, 5]);
    }
}
