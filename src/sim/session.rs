//! A stateful workbench over the codec, the memory and the history.
//!
//! The session tracks one *active word*: the codeword last written or read.
//! Fault injection and checks operate on it and are written back to memory.
//! Whether a word is active is tracked explicitly, so a stored value of zero
//! is as valid as any other.

use crate::ecc::format::{fit_to_width, parse_word};
use crate::ecc::hamming::{DataWidth, Decoded, ErrorKind, HammingCodec};
use crate::error::{Error, Result};
use crate::sim::history::{History, Operation};
use crate::sim::memory::{Memory, MemoryCell};
use log::{debug, info, warn};

/// The codeword the session is working on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveWord {
    pub address: usize,
    /// Data word as last written or corrected
    pub original: u64,
    /// Current codeword, possibly damaged
    pub encoded: u64,
    /// Last injected position since the word was loaded or corrected
    pub injected: Option<usize>,
}

/// Result of a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOutcome {
    pub address: usize,
    /// Data word actually encoded
    pub data: u64,
    pub encoded: u64,
    /// Whether the input was cut down to the data width
    pub truncated: bool,
}

#[derive(Debug, Clone)]
pub struct Session {
    codec: HammingCodec,
    memory: Memory,
    history: History,
    active: Option<ActiveWord>,
}

impl Session {
    /// Creates a session with empty memory and history.
    pub fn new(width: DataWidth) -> Self {
        Session {
            codec: HammingCodec::with_width(width),
            memory: Memory::new(),
            history: History::new(),
            active: None,
        }
    }

    /// Gets the codec for the current width
    pub fn codec(&self) -> &HammingCodec {
        &self.codec
    }

    /// Gets the simulated memory
    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    /// Gets the operation log
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Gets the active word, if one was written or read
    pub fn active(&self) -> Option<&ActiveWord> {
        self.active.as_ref()
    }

    /// Rebuilds the codec for another width.
    ///
    /// Stored codewords only decode under the width that produced them, so
    /// memory and the active word are cleared.
    pub fn set_width(&mut self, width: DataWidth) {
        if width == self.codec.width() {
            return;
        }
        info!(
            "switching from {} to {} data words, clearing {} stored cells",
            self.codec.width(),
            width,
            self.memory.len()
        );
        self.codec = HammingCodec::with_width(width);
        self.memory.clear();
        self.active = None;
        self.history.record(Operation::WidthChanged {
            data_bits: width.bits(),
        });
    }

    /// Parses `text` as a data word and writes it to `address`.
    pub fn write(&mut self, address: usize, text: &str) -> Result<WriteOutcome> {
        let value = parse_word(text)?;
        self.write_value(address, value)
    }

    /// Encodes `value` and stores it at `address`, making it the active word.
    ///
    /// Values wider than the codec lose their most significant bits.
    pub fn write_value(&mut self, address: usize, value: u64) -> Result<WriteOutcome> {
        let fitted = fit_to_width(value, self.codec.data_bits());
        let encoded = self.codec.encode(fitted.value)?;
        self.memory.write(
            address,
            MemoryCell {
                original: fitted.value,
                encoded,
            },
        )?;

        if fitted.truncated {
            warn!(
                "{:#x} exceeds {} bits, truncated to {:#x}",
                value,
                self.codec.data_bits(),
                fitted.value
            );
        }
        self.active = Some(ActiveWord {
            address,
            original: fitted.value,
            encoded,
            injected: None,
        });
        self.history.record(Operation::Write {
            address,
            data: fitted.value,
            encoded,
        });
        debug!("wrote {:#x} as {:#x} to address {}", fitted.value, encoded, address);

        Ok(WriteOutcome {
            address,
            data: fitted.value,
            encoded,
            truncated: fitted.truncated,
        })
    }

    /// Loads the cell at `address` as the active word.
    pub fn read(&mut self, address: usize) -> Result<ActiveWord> {
        let cell = self.memory.read(address)?;
        let active = ActiveWord {
            address,
            original: cell.original,
            encoded: cell.encoded,
            injected: None,
        };
        self.active = Some(active);
        self.history.record(Operation::Read {
            address,
            original: cell.original,
            encoded: cell.encoded,
        });
        Ok(active)
    }

    /// Flips one bit of the active word and writes it back to memory.
    pub fn inject(&mut self, position: usize) -> Result<ActiveWord> {
        let mut active = self.active.ok_or(Error::NoActiveWord)?;
        active.encoded = self.codec.inject_error(active.encoded, position)?;
        active.injected = Some(position);

        self.store(&active)?;
        self.active = Some(active);
        self.history.record(Operation::Inject { position });
        debug!(
            "flipped bit {} of address {}, now {:#x}",
            position, active.address, active.encoded
        );
        Ok(active)
    }

    /// Checks the active word, adopting the correction of a single error.
    pub fn check(&mut self) -> Result<Decoded> {
        let mut active = self.active.ok_or(Error::NoActiveWord)?;
        let decoded = self.codec.detect_and_correct(active.encoded);

        match decoded.kind {
            ErrorKind::Single { position } => {
                active.encoded = decoded.corrected;
                active.original = decoded.data;
                active.injected = None;
                self.store(&active)?;
                self.active = Some(active);
                self.history.record(Operation::Corrected {
                    position,
                    data: decoded.data,
                });
                info!(
                    "corrected bit {} at address {}, data {:#x}",
                    position, active.address, decoded.data
                );
            }
            ErrorKind::Double => {
                self.history.record(Operation::DoubleDetected);
                warn!(
                    "uncorrectable error at address {} (syndrome {:#b})",
                    active.address, decoded.syndrome
                );
            }
            ErrorKind::None => {
                self.history.record(Operation::Clean);
            }
        }
        Ok(decoded)
    }

    /// Mirrors the active word into memory if its address is still stored.
    fn store(&mut self, active: &ActiveWord) -> Result<bool> {
        self.memory.update(
            active.address,
            MemoryCell {
                original: active.original,
                encoded: active.encoded,
            },
        )
    }
}
