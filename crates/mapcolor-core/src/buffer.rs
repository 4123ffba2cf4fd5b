//! Shared atomic buffers
//!
//! Compute units run their work-items concurrently and communicate only
//! through buffers of `AtomicU32`. Every read-modify-write uses `AcqRel`,
//! loads use `Acquire` and stores use `Release`, so a value published by one
//! work-item is observed together with everything that work-item wrote
//! before it.

use crate::error::{Error, Result};
use std::sync::atomic::{AtomicU32, Ordering};

/// A fixed-size buffer of 32-bit cells shared between work-items.
#[derive(Debug)]
pub struct AtomicBuffer {
    cells: Box<[AtomicU32]>,
}

impl AtomicBuffer {
    /// Allocate `len` cells, all set to `init`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AllocationFailed`] if the allocation cannot be made.
    pub fn new(len: usize, init: u32) -> Result<Self> {
        let mut cells = Vec::new();
        cells
            .try_reserve_exact(len)
            .map_err(|_| Error::AllocationFailed {
                what: "atomic buffer",
                len,
            })?;
        cells.extend((0..len).map(|_| AtomicU32::new(init)));
        Ok(Self {
            cells: cells.into_boxed_slice(),
        })
    }

    /// Allocate a buffer holding a copy of `values`.
    pub fn from_slice(values: &[u32]) -> Result<Self> {
        let mut cells = Vec::new();
        cells
            .try_reserve_exact(values.len())
            .map_err(|_| Error::AllocationFailed {
                what: "atomic buffer",
                len: values.len(),
            })?;
        cells.extend(values.iter().map(|&v| AtomicU32::new(v)));
        Ok(Self {
            cells: cells.into_boxed_slice(),
        })
    }

    /// Number of cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the buffer has no cells.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Read cell `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    #[inline]
    pub fn load(&self, index: usize) -> u32 {
        self.cells[index].load(Ordering::Acquire)
    }

    /// Overwrite cell `index`.
    #[inline]
    pub fn store(&self, index: usize, value: u32) {
        self.cells[index].store(value, Ordering::Release);
    }

    /// Replace `current` with `new` if the cell still holds `current`.
    ///
    /// Returns `Ok(current)` when this call won the write, otherwise
    /// `Err(observed)` with the settled value another writer left behind.
    #[inline]
    pub fn compare_exchange(
        &self,
        index: usize,
        current: u32,
        new: u32,
    ) -> std::result::Result<u32, u32> {
        self.cells[index].compare_exchange(current, new, Ordering::AcqRel, Ordering::Acquire)
    }

    /// Atomically add `value`, returning the previous contents.
    #[inline]
    pub fn fetch_add(&self, index: usize, value: u32) -> u32 {
        self.cells[index].fetch_add(value, Ordering::AcqRel)
    }

    /// Atomically OR `bits` into the cell, returning the previous contents.
    #[inline]
    pub fn fetch_or(&self, index: usize, bits: u32) -> u32 {
        self.cells[index].fetch_or(bits, Ordering::AcqRel)
    }

    /// Atomically AND `bits` into the cell, returning the previous contents.
    #[inline]
    pub fn fetch_and(&self, index: usize, bits: u32) -> u32 {
        self.cells[index].fetch_and(bits, Ordering::AcqRel)
    }

    /// Set every cell to `value`.
    ///
    /// Requires exclusive access, so it can only run between dispatches.
    pub fn fill(&mut self, value: u32) {
        for cell in self.cells.iter_mut() {
            *cell.get_mut() = value;
        }
    }

    /// Copy the current contents into a plain vector.
    pub fn to_vec(&self) -> Vec<u32> {
        self.cells.iter().map(|c| c.load(Ordering::Acquire)).collect()
    }

    /// Consume the buffer, returning its contents.
    pub fn into_vec(self) -> Vec<u32> {
        self.cells
            .into_vec()
            .into_iter()
            .map(AtomicU32::into_inner)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_and_fill() {
        let mut buf = AtomicBuffer::new(5, 7).unwrap();
        assert_eq!(buf.len(), 5);
        assert_eq!(buf.to_vec(), vec![7; 5]);
        buf.fill(0);
        assert_eq!(buf.into_vec(), vec![0; 5]);
    }

    #[test]
    fn test_compare_exchange_reports_winner() {
        let buf = AtomicBuffer::new(1, 0).unwrap();
        assert_eq!(buf.compare_exchange(0, 0, 9), Ok(0));
        assert_eq!(buf.compare_exchange(0, 0, 4), Err(9));
        assert_eq!(buf.load(0), 9);
    }

    #[test]
    fn test_bit_ops() {
        let buf = AtomicBuffer::from_slice(&[0b0101]).unwrap();
        assert_eq!(buf.fetch_or(0, 0b0010), 0b0101);
        assert_eq!(buf.fetch_and(0, !0b0001), 0b0111);
        assert_eq!(buf.load(0), 0b0110);
        assert_eq!(buf.fetch_add(0, 1), 0b0110);
        assert_eq!(buf.load(0), 0b0111);
    }

    #[test]
    fn test_empty() {
        let buf = AtomicBuffer::new(0, 0).unwrap();
        assert!(buf.is_empty());
        assert!(buf.into_vec().is_empty());
    }
}
