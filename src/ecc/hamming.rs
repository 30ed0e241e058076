//! Extended Hamming (SEC-DED) code over 8, 16 and 32 bit data words.
//!
//! Hamming codes are a family of linear error-correcting codes developed by Richard Hamming in 1950.
//! Parity bits sit at the power-of-two positions of the codeword (1, 2, 4, 8, ... counting from 1)
//! and parity bit `2^i` covers every position whose number has bit `i` set. When a single bit
//! flips, the failing parity groups spell out its position: the *syndrome*.
//!
//! The extended variant adds one global parity bit over the whole word. Together with the
//! syndrome it separates the four cases a receiver can see:
//!
//! | syndrome | overall parity | diagnosis                                  |
//! |----------|----------------|--------------------------------------------|
//! | 0        | even           | no error                                   |
//! | != 0     | odd            | single error at `syndrome - 1`, corrected  |
//! | != 0     | even           | double error, detected but not corrected   |
//! | 0        | odd            | single error in the global parity bit      |
//!
//! Codewords are plain `u64` values. Bit 0 is the least significant bit and the global parity
//! bit is the most significant used bit, at index `total_bits - 1`.
//!
//! # Example
//!
//! ```
//! use secded::ecc::hamming::{ErrorKind, HammingCodec};
//!
//! let codec = HammingCodec::new(16).unwrap();
//! let encoded = codec.encode(0x1A).unwrap();
//! let damaged = codec.inject_error(encoded, 3).unwrap();
//!
//! let decoded = codec.detect_and_correct(damaged);
//! assert_eq!(decoded.kind, ErrorKind::Single { position: 3 });
//! assert_eq!(decoded.corrected, encoded);
//! assert_eq!(decoded.data, 0x1A);
//! ```

use crate::ecc::Result;
use crate::error::Error;
use bitvec::prelude::*;
use bitvec::view::BitView;
use log::{debug, trace};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Data widths the codec supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DataWidth {
    Bits8,
    Bits16,
    Bits32,
}

impl DataWidth {
    /// All supported widths, narrowest first.
    pub const ALL: [DataWidth; 3] = [DataWidth::Bits8, DataWidth::Bits16, DataWidth::Bits32];

    /// Number of payload bits.
    pub fn bits(self) -> usize {
        match self {
            DataWidth::Bits8 => 8,
            DataWidth::Bits16 => 16,
            DataWidth::Bits32 => 32,
        }
    }
}

impl TryFrom<usize> for DataWidth {
    type Error = Error;

    fn try_from(bits: usize) -> Result<Self> {
        match bits {
            8 => Ok(DataWidth::Bits8),
            16 => Ok(DataWidth::Bits16),
            32 => Ok(DataWidth::Bits32),
            other => Err(Error::UnsupportedWidth(other)),
        }
    }
}

impl FromStr for DataWidth {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let bits = s
            .trim()
            .parse::<usize>()
            .map_err(|_| Error::InvalidInput(format!("not a data width: {:?}", s)))?;
        DataWidth::try_from(bits)
    }
}

impl Display for DataWidth {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}-bit", self.bits())
    }
}

/// Returns true if the 1-based codeword position holds an indexed parity bit.
///
/// This is the only place positions are classified. Encoding, decoding and the
/// layout queries all go through it so they can never disagree.
pub fn is_parity_position(position: usize) -> bool {
    position.is_power_of_two()
}

/// Smallest `r` with `2^r >= data_bits + r + 1`.
fn parity_bits_for(data_bits: usize) -> usize {
    let mut parity_bits = 0;
    while (1usize << parity_bits) < data_bits + parity_bits + 1 {
        parity_bits += 1;
    }
    parity_bits
}

/// Role of a single codeword bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BitKind {
    /// Carries payload bit `n` (bit 0 is the least significant data bit).
    Data(usize),
    /// Indexed parity bit `i`, stored at 1-based position `2^i`.
    Parity(usize),
    /// The overall parity bit.
    GlobalParity,
}

impl BitKind {
    /// Short label for renderers: `D3`, `P2`, `PG`.
    pub fn label(&self) -> String {
        match self {
            BitKind::Data(n) => format!("D{}", n),
            BitKind::Parity(i) => format!("P{}", i),
            BitKind::GlobalParity => "PG".to_string(),
        }
    }
}

/// Codeword positions grouped by role, all 0-based and ascending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitLayout {
    /// Data bit positions, in payload order
    pub data_positions: Vec<usize>,
    /// Indexed parity positions, `P0` first
    pub parity_positions: Vec<usize>,
    /// Index of the overall parity bit
    pub global_parity_position: usize,
}

/// Outcome of checking a codeword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Every parity group and the overall parity are even.
    None,
    /// One bit was flipped; `position` is its 0-based index and has been corrected.
    Single { position: usize },
    /// Uncorrectable error detected (two or more faults). Reported, not corrected.
    Double,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::None => write!(f, "none"),
            ErrorKind::Single { .. } => write!(f, "single"),
            ErrorKind::Double => write!(f, "double"),
        }
    }
}

/// Result of [`HammingCodec::detect_and_correct`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decoded {
    /// Diagnosis of the received word.
    pub kind: ErrorKind,
    /// The received word with a single error undone. Equal to the input for
    /// `None` and `Double`.
    pub corrected: u64,
    /// Data bits extracted from `corrected`. Not trustworthy for `Double`.
    pub data: u64,
    /// Bitmask of failing parity groups.
    pub syndrome: usize,
    /// Whether the whole received word had odd parity.
    pub overall_parity_odd: bool,
}

impl Decoded {
    /// Returns true for any diagnosis other than `None`.
    pub fn error_detected(&self) -> bool {
        self.kind != ErrorKind::None
    }

    /// 0-based index of the corrected bit, only for single errors.
    pub fn error_position(&self) -> Option<usize> {
        match self.kind {
            ErrorKind::Single { position } => Some(position),
            _ => None,
        }
    }
}

/// An extended Hamming code for one data width.
///
/// The configuration never changes after construction; build a new codec to
/// switch widths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HammingCodec {
    /// Supported width this codec was built for
    width: DataWidth,
    /// Number of payload bits per codeword
    data_bits: usize,
    /// Number of indexed parity bits
    parity_bits: usize,
    /// Data bits, parity bits and the global parity bit
    total_bits: usize,
}

impl HammingCodec {
    /// Creates a codec for `data_bits` of payload.
    ///
    /// # Arguments
    ///
    /// * `data_bits` - 8, 16 or 32
    ///
    /// # Returns
    ///
    /// A new `HammingCodec` or `Error::UnsupportedWidth` for any other width
    pub fn new(data_bits: usize) -> Result<Self> {
        DataWidth::try_from(data_bits).map(Self::with_width)
    }

    /// Creates a codec for a supported width.
    pub fn with_width(width: DataWidth) -> Self {
        let data_bits = width.bits();
        let parity_bits = parity_bits_for(data_bits);

        HammingCodec {
            width,
            data_bits,
            parity_bits,
            total_bits: data_bits + parity_bits + 1,
        }
    }

    /// Gets the number of payload bits per codeword
    pub fn data_bits(&self) -> usize {
        self.data_bits
    }

    /// Gets the number of indexed parity bits
    pub fn parity_bits(&self) -> usize {
        self.parity_bits
    }

    /// Gets the codeword length, global parity bit included
    pub fn total_bits(&self) -> usize {
        self.total_bits
    }

    /// Gets the data width this codec was built for
    pub fn width(&self) -> DataWidth {
        self.width
    }

    /// Mask selecting the payload bits of a data word.
    pub fn data_mask(&self) -> u64 {
        (1u64 << self.data_bits) - 1
    }

    /// Mask selecting the bits of a codeword.
    pub fn codeword_mask(&self) -> u64 {
        (1u64 << self.total_bits) - 1
    }

    /// Encodes a data word into a codeword.
    ///
    /// # Arguments
    ///
    /// * `data` - Payload; must fit in `data_bits`
    ///
    /// # Returns
    ///
    /// The codeword, or `Error::InvalidInput` if `data` is wider than the codec
    pub fn encode(&self, data: u64) -> Result<u64> {
        if data & !self.data_mask() != 0 {
            return Err(Error::InvalidInput(format!(
                "data {:#x} exceeds configured width of {} bits",
                data, self.data_bits
            )));
        }

        let mut codeword = 0u64;
        let bits = codeword.view_bits_mut::<Lsb0>();
        let payload = data.view_bits::<Lsb0>();

        for (data_index, index) in self.data_indices().enumerate() {
            bits.set(index, payload[data_index]);
        }

        // Each parity bit is still zero here, so the group parity is exactly
        // the value that makes the group even.
        for group in 0..self.parity_bits {
            let parity = self.group_parity(bits, group);
            bits.set((1 << group) - 1, parity);
        }

        let global = self.total_bits - 1;
        let overall = bits[..global].count_ones() % 2 == 1;
        bits.set(global, overall);

        trace!("encoded {:#x} as {:#x}", data, codeword);
        Ok(codeword)
    }

    /// Checks a codeword and corrects a single flipped bit.
    ///
    /// Never fails: a double error is a normal outcome. The codeword must come
    /// from a codec of the same width; bits above `total_bits` are ignored by
    /// the checks and carried through unchanged.
    pub fn detect_and_correct(&self, codeword: u64) -> Decoded {
        let bits = &codeword.view_bits::<Lsb0>()[..self.total_bits];

        let overall_parity_odd = bits.count_ones() % 2 == 1;
        let syndrome = (0..self.parity_bits)
            .filter(|&group| self.group_parity(bits, group))
            .fold(0usize, |syndrome, group| syndrome | (1 << group));

        let global = self.total_bits - 1;
        let kind = match (syndrome, overall_parity_odd) {
            (0, false) => ErrorKind::None,
            (0, true) => ErrorKind::Single { position: global },
            // Only three or more faults can point past the covered bits.
            (s, true) if s - 1 < global => ErrorKind::Single { position: s - 1 },
            _ => ErrorKind::Double,
        };

        let corrected = match kind {
            ErrorKind::Single { position } => codeword ^ (1u64 << position),
            _ => codeword,
        };

        match kind {
            ErrorKind::None => trace!("codeword {:#x} is clean", codeword),
            _ => debug!(
                "codeword {:#x}: syndrome {:#b}, overall parity {}, diagnosis {}",
                codeword,
                syndrome,
                if overall_parity_odd { "odd" } else { "even" },
                kind
            ),
        }

        Decoded {
            kind,
            corrected,
            data: self.extract_data(corrected),
            syndrome,
            overall_parity_odd,
        }
    }

    /// Flips the bit at `position` (0-based) to simulate a fault.
    pub fn inject_error(&self, codeword: u64, position: usize) -> Result<u64> {
        if position >= self.total_bits {
            return Err(Error::OutOfRange {
                position,
                total_bits: self.total_bits,
            });
        }
        Ok(codeword ^ (1u64 << position))
    }

    /// Returns true if the 0-based `position` holds an indexed parity bit.
    ///
    /// The global parity bit is not an indexed parity bit.
    pub fn is_parity_bit(&self, position: usize) -> bool {
        position + 1 < self.total_bits && is_parity_position(position + 1)
    }

    /// Returns true if the 0-based `position` holds the overall parity bit.
    pub fn is_global_parity_bit(&self, position: usize) -> bool {
        position == self.total_bits - 1
    }

    /// Role of the bit at the 0-based `position`, or `None` past the codeword.
    pub fn bit_kind(&self, position: usize) -> Option<BitKind> {
        if position >= self.total_bits {
            None
        } else if self.is_global_parity_bit(position) {
            Some(BitKind::GlobalParity)
        } else if self.is_parity_bit(position) {
            Some(BitKind::Parity((position + 1).trailing_zeros() as usize))
        } else {
            self.data_indices()
                .position(|index| index == position)
                .map(BitKind::Data)
        }
    }

    /// All codeword positions grouped by role.
    pub fn data_and_parity_positions(&self) -> BitLayout {
        BitLayout {
            data_positions: self.data_indices().collect(),
            parity_positions: (0..self.total_bits)
                .filter(|&index| self.is_parity_bit(index))
                .collect(),
            global_parity_position: self.total_bits - 1,
        }
    }

    /// 0-based positions covered by parity bit `group`, its own position included.
    ///
    /// Empty when `group >= parity_bits`.
    pub fn parity_group(&self, group: usize) -> Vec<usize> {
        if group >= self.parity_bits {
            return Vec::new();
        }
        self.group_members(group).collect()
    }

    /// 0-based indices of the data bits, in payload order.
    fn data_indices(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.total_bits - 1).filter(move |&index| !self.is_parity_bit(index))
    }

    fn group_members(&self, group: usize) -> impl Iterator<Item = usize> + '_ {
        let mask = 1usize << group;
        (1..self.total_bits)
            .filter(move |position| position & mask != 0)
            .map(|position| position - 1)
    }

    /// XOR of every bit in a parity group.
    fn group_parity(&self, bits: &BitSlice<u64, Lsb0>, group: usize) -> bool {
        self.group_members(group)
            .fold(false, |parity, index| parity ^ bits[index])
    }

    fn extract_data(&self, codeword: u64) -> u64 {
        let bits = codeword.view_bits::<Lsb0>();
        let mut data = 0u64;
        let payload = data.view_bits_mut::<Lsb0>();

        for (data_index, index) in self.data_indices().enumerate() {
            payload.set(data_index, bits[index]);
        }
        data
    }
}
