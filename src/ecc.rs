//! Error correction code implementation.
//!
//! This module provides the extended Hamming (SEC-DED) codec used throughout
//! the crate, together with helpers for rendering and parsing the words it
//! works on:
//! - `hamming`: encoding, fault injection, detection and correction
//! - `format`: binary/hex rendering and text parsing of data words and codewords
//!
//! # Examples
//!
//! ```rust
//! use secded::ecc::{format, HammingCodec};
//!
//! let codec = HammingCodec::new(8).unwrap();
//! let encoded = codec.encode(format::parse_word("0xB1").unwrap()).unwrap();
//! assert_eq!(format::to_bit_string(encoded, codec.total_bits()), "0101110001100");
//! ```

use crate::error::Error;

/// Result type for error correction operations
pub type Result<T> = std::result::Result<T, Error>;

pub mod format;
pub mod hamming;

pub use hamming::{BitKind, BitLayout, DataWidth, Decoded, ErrorKind, HammingCodec};
