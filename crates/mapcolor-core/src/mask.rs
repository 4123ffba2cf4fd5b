//! Mask store
//!
//! The per-pixel labeling state shared by every stage of the pipeline.
//!
//! Each cell holds one of:
//!
//! - [`GID_UNDEFINED`] (0): interior pixel that has no region id yet
//! - [`GID_BORDER`] (1): border pixel, never part of a region
//! - `2..`: a raw region id during labeling, the final id afterwards
//!
//! A cell only ever moves forward through those states. Alongside the
//! cells the store keeps a region key per pixel: two neighboring interior
//! pixels belong to the same region only when their keys are equal.

use crate::buffer::AtomicBuffer;
use crate::error::{Error, Result};

/// Cell value of an interior pixel without an id.
pub const GID_UNDEFINED: u32 = 0;

/// Cell value of a border pixel.
pub const GID_BORDER: u32 = 1;

/// Number of reserved ids; the first real region id equals this value.
pub const GID_RESERVED: u32 = 2;

/// Check whether a cell value names a region (raw or final).
#[inline]
pub fn is_region_id(cell: u32) -> bool {
    cell >= GID_RESERVED
}

/// Per-pixel labeling state plus region keys.
#[derive(Debug)]
pub struct MaskStore {
    width: u32,
    height: u32,
    cells: AtomicBuffer,
    keys: AtomicBuffer,
}

impl MaskStore {
    /// Allocate a store with every cell [`GID_UNDEFINED`] and every key 0.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimension`] for an empty grid and
    /// [`Error::AllocationFailed`] if the buffers cannot be allocated.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimension { width, height });
        }
        let len = (width as usize) * (height as usize);
        Ok(Self {
            width,
            height,
            cells: AtomicBuffer::new(len, GID_UNDEFINED)?,
            keys: AtomicBuffer::new(len, 0)?,
        })
    }

    /// Build a store from explicit cell values and keys.
    ///
    /// Mostly useful for tests and for re-running a single pass.
    pub fn from_cells(width: u32, height: u32, cells: &[u32], keys: &[u32]) -> Result<Self> {
        let expected = (width as usize) * (height as usize);
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimension { width, height });
        }
        for len in [cells.len(), keys.len()] {
            if len != expected {
                return Err(Error::BufferLength {
                    expected,
                    actual: len,
                });
            }
        }
        Ok(Self {
            width,
            height,
            cells: AtomicBuffer::from_slice(cells)?,
            keys: AtomicBuffer::from_slice(keys)?,
        })
    }

    /// Grid width.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Grid height.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always false; a store has at least one cell.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Linear index of `(x, y)`.
    #[inline]
    pub fn index(&self, x: u32, y: u32) -> usize {
        (y as usize) * (self.width as usize) + x as usize
    }

    /// The labeling cells.
    #[inline]
    pub fn cells(&self) -> &AtomicBuffer {
        &self.cells
    }

    /// The region keys.
    #[inline]
    pub fn keys(&self) -> &AtomicBuffer {
        &self.keys
    }

    /// Read the cell at `(x, y)`, `None` when out of bounds.
    pub fn get(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.cells.load(self.index(x, y)))
    }

    /// Copy the cells into a plain vector.
    pub fn snapshot(&self) -> Vec<u32> {
        self.cells.to_vec()
    }

    /// Number of cells holding a region id.
    pub fn region_pixel_count(&self) -> usize {
        (0..self.len())
            .filter(|&i| is_region_id(self.cells.load(i)))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_store_is_unlabeled() {
        let mask = MaskStore::new(3, 2).unwrap();
        assert_eq!(mask.len(), 6);
        assert!(mask.snapshot().iter().all(|&c| c == GID_UNDEFINED));
        assert_eq!(mask.region_pixel_count(), 0);
    }

    #[test]
    fn test_from_cells_and_get() {
        let mask = MaskStore::from_cells(2, 2, &[1, 2, 2, 3], &[0; 4]).unwrap();
        assert_eq!(mask.get(1, 0), Some(2));
        assert_eq!(mask.get(1, 1), Some(3));
        assert_eq!(mask.get(2, 0), None);
        assert_eq!(mask.region_pixel_count(), 3);
    }

    #[test]
    fn test_from_cells_length_mismatch() {
        assert!(MaskStore::from_cells(2, 2, &[0; 3], &[0; 4]).is_err());
        assert!(MaskStore::from_cells(2, 2, &[0; 4], &[0; 5]).is_err());
    }

    #[test]
    fn test_region_id_predicate() {
        assert!(!is_region_id(GID_UNDEFINED));
        assert!(!is_region_id(GID_BORDER));
        assert!(is_region_id(GID_RESERVED));
    }
}
