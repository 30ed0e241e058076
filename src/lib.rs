//! Hamming SEC-DED workbench.
//!
//! Encodes 8, 16 or 32 bit data words with an extended Hamming code, injects
//! bit faults, and diagnoses damaged codewords as clean, corrected single
//! errors or detected double errors. The `sim` layers add a simulated memory
//! and an operation history for exploring the code interactively.

pub mod ecc;
pub mod error;
pub mod sim;

pub use ecc::{DataWidth, Decoded, ErrorKind, HammingCodec};
pub use error::{Error, Result};
