//! Error types shared by the codec and the simulation layers.
//!
//! Every failure here is recoverable: the caller supplies a valid width,
//! word, position or address and tries again. Decoding a damaged codeword is
//! not an error; see [`crate::ecc::hamming::ErrorKind`].

use thiserror::Error;

/// Errors raised by the codec, the word parsers and the simulated memory.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Malformed input, such as a data word wider than the codec or text that
    /// is neither binary nor hex.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A bit position outside the codeword.
    #[error("bit position {position} out of range for a {total_bits}-bit codeword")]
    OutOfRange { position: usize, total_bits: usize },

    /// A data width the codec does not support.
    #[error("unsupported data width: {0} bits (expected 8, 16 or 32)")]
    UnsupportedWidth(usize),

    /// A memory address outside the simulated address space.
    #[error("address {address} out of range: valid addresses are 0..={max}")]
    AddressOutOfRange { address: usize, max: usize },

    /// A read from an address that was never written.
    #[error("no data stored at address {0}")]
    EmptyAddress(usize),

    /// Inject or check requested before any word was written or read.
    #[error("no active codeword: write or read a word first")]
    NoActiveWord,
}

/// Type alias for Result with our Error type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_range_message() {
        let err = Error::OutOfRange {
            position: 22,
            total_bits: 22,
        };
        assert_eq!(
            err.to_string(),
            "bit position 22 out of range for a 22-bit codeword"
        );
    }

    #[test]
    fn test_errors_compare() {
        assert_eq!(Error::EmptyAddress(7), Error::EmptyAddress(7));
        assert_ne!(Error::EmptyAddress(7), Error::NoActiveWord);
    }
}
