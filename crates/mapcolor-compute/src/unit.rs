//! Compute units and index spaces
//!
//! A compute unit is a kernel: a named piece of per-item work whose
//! positional arguments are the fields of the implementing struct. The
//! backend runs [`ComputeUnit::execute`] once for every item of an
//! [`IndexSpace`], in no particular order and possibly concurrently.

use crate::error::{ComputeError, ComputeResult};

/// One invocation of a compute unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkItem {
    /// Linear id in `0..space.len()`
    pub global_id: usize,
    /// Column for grid spaces, equal to `global_id` for linear spaces
    pub x: u32,
    /// Row for grid spaces, 0 for linear spaces
    pub y: u32,
}

/// The set of work-items a dispatch covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexSpace {
    /// `n` items numbered `0..n`
    Linear(usize),
    /// `width * height` items laid out row-major
    Grid { width: u32, height: u32 },
}

impl IndexSpace {
    /// A 2D space matching an image.
    pub fn grid(width: u32, height: u32) -> ComputeResult<Self> {
        (width as usize)
            .checked_mul(height as usize)
            .ok_or(ComputeError::IndexSpaceOverflow { width, height })?;
        Ok(IndexSpace::Grid { width, height })
    }

    /// Number of work-items.
    pub fn len(&self) -> usize {
        match *self {
            IndexSpace::Linear(n) => n,
            IndexSpace::Grid { width, height } => (width as usize) * (height as usize),
        }
    }

    /// Whether the space contains no items.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of dimensions (1 or 2).
    pub fn dimensions(&self) -> u8 {
        match self {
            IndexSpace::Linear(_) => 1,
            IndexSpace::Grid { .. } => 2,
        }
    }

    /// The work-item for linear id `global_id`.
    #[inline]
    pub fn item(&self, global_id: usize) -> WorkItem {
        match *self {
            IndexSpace::Linear(_) => WorkItem {
                global_id,
                x: global_id as u32,
                y: 0,
            },
            IndexSpace::Grid { width, .. } => WorkItem {
                global_id,
                x: (global_id % width as usize) as u32,
                y: (global_id / width as usize) as u32,
            },
        }
    }
}

/// A data-parallel kernel.
///
/// Implementations must be correct under any interleaving of their
/// work-items: shared state is only touched through atomics.
pub trait ComputeUnit: Sync {
    /// Name used in logs and error reports.
    fn name(&self) -> &'static str;

    /// Run one work-item.
    fn execute(&self, item: WorkItem);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_space() {
        let space = IndexSpace::Linear(5);
        assert_eq!(space.len(), 5);
        assert_eq!(space.dimensions(), 1);
        assert_eq!(
            space.item(3),
            WorkItem {
                global_id: 3,
                x: 3,
                y: 0
            }
        );
        assert!(IndexSpace::Linear(0).is_empty());
    }

    #[test]
    fn test_grid_space() {
        let space = IndexSpace::grid(4, 3).unwrap();
        assert_eq!(space.len(), 12);
        assert_eq!(space.dimensions(), 2);
        let item = space.item(9);
        assert_eq!((item.x, item.y), (1, 2));
    }
}
