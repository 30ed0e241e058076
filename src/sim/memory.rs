//! Address-indexed memory holding encoded words.
//!
//! Each cell keeps the data word that was written and the codeword stored
//! for it. Faults are injected into the stored codeword; the original value
//! stays as a reference for the learner.

use crate::error::{Error, Result};
use std::collections::btree_map::{self, BTreeMap};

/// Number of addressable cells.
pub const ADDRESS_SPACE: usize = 1024;

/// Highest valid address.
pub const MAX_ADDRESS: usize = ADDRESS_SPACE - 1;

/// One stored word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryCell {
    /// Data word as written
    pub original: u64,
    /// Codeword currently held, possibly damaged
    pub encoded: u64,
}

/// Sparse memory over addresses `0..=MAX_ADDRESS`.
#[derive(Debug, Clone, Default)]
pub struct Memory {
    cells: BTreeMap<usize, MemoryCell>,
}

impl Memory {
    /// Creates an empty memory.
    pub fn new() -> Self {
        Self::default()
    }

    fn check_address(address: usize) -> Result<()> {
        if address > MAX_ADDRESS {
            return Err(Error::AddressOutOfRange {
                address,
                max: MAX_ADDRESS,
            });
        }
        Ok(())
    }

    /// Stores a cell, returning the one it replaced.
    pub fn write(&mut self, address: usize, cell: MemoryCell) -> Result<Option<MemoryCell>> {
        Self::check_address(address)?;
        Ok(self.cells.insert(address, cell))
    }

    /// Reads a cell; fails with `EmptyAddress` if nothing was written there.
    pub fn read(&self, address: usize) -> Result<MemoryCell> {
        Self::check_address(address)?;
        self.cells
            .get(&address)
            .copied()
            .ok_or(Error::EmptyAddress(address))
    }

    /// Replaces an existing cell. Returns false, leaving memory untouched, if
    /// the address was never written.
    pub fn update(&mut self, address: usize, cell: MemoryCell) -> Result<bool> {
        Self::check_address(address)?;
        match self.cells.get_mut(&address) {
            Some(slot) => {
                *slot = cell;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Returns true if `address` holds a cell.
    pub fn contains(&self, address: usize) -> bool {
        self.cells.contains_key(&address)
    }

    /// Number of written cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns true if nothing has been written.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Forgets every cell.
    pub fn clear(&mut self) {
        self.cells.clear();
    }

    /// Cells in ascending address order.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            inner: self.cells.iter(),
        }
    }
}

/// Iterator over `(address, cell)` pairs, lowest address first.
pub struct Iter<'a> {
    inner: btree_map::Iter<'a, usize, MemoryCell>,
}

impl Iterator for Iter<'_> {
    type Item = (usize, MemoryCell);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(&address, &cell)| (address, cell))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a> IntoIterator for &'a Memory {
    type Item = (usize, MemoryCell);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
