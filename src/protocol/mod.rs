//! Protocol module - tokenized frame layout and extraction.
//!
//! This module implements the binary side of detokenization:
//! - 4-byte little-endian token prefix
//! - Token/argument splitting
//! - Frame struct with typed accessors
//! - Lossy text rendering for unresolved frames

mod frame;
mod wire_format;

pub use frame::{build_frame, Frame};
pub use wire_format::{
    decode_token, encode_token, lossy_text, split_frame, Token, TOKEN_SIZE,
};
