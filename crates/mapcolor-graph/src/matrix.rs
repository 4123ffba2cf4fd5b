//! Bit-packed adjacency matrix
//!
//! A square bit matrix over vertex ids `0..=N` (row and column 0 are never
//! used), one row of `ceil((N + 1) / 32)` 32-bit words per vertex. Column
//! `v` lives in word `v / 32`, bit `v % 32`.
//!
//! The [`Polarity`] decides which bit value means "edge". A fresh matrix
//! has every bit, padding included, set to the no-edge value.

use crate::error::{GraphError, GraphResult};

/// Which bit value marks an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Polarity {
    /// Set bits are edges, the matrix starts zeroed
    #[default]
    EdgeIsOne,
    /// Cleared bits are edges, the matrix starts all ones
    EdgeIsZero,
}

impl Polarity {
    /// Word value of a row without edges.
    #[inline]
    pub fn empty_word(self) -> u32 {
        match self {
            Polarity::EdgeIsOne => 0,
            Polarity::EdgeIsZero => u32::MAX,
        }
    }

    /// Bits of `word` that are edges.
    #[inline]
    pub fn edge_bits(self, word: u32) -> u32 {
        match self {
            Polarity::EdgeIsOne => word,
            Polarity::EdgeIsZero => !word,
        }
    }
}

/// Number of 32-bit words per row for `vertex_count` vertices.
#[inline]
pub fn row_stride(vertex_count: usize) -> usize {
    (vertex_count + 1).div_ceil(32)
}

/// Square adjacency bit matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdjacencyMatrix {
    vertex_count: usize,
    stride: usize,
    polarity: Polarity,
    words: Vec<u32>,
}

impl AdjacencyMatrix {
    /// Allocate an edgeless matrix.
    ///
    /// # Errors
    ///
    /// Returns a core `AllocationFailed` error if the words cannot be
    /// allocated.
    pub fn new(vertex_count: usize, polarity: Polarity) -> GraphResult<Self> {
        let stride = row_stride(vertex_count);
        let len = word_count(vertex_count)?;
        let mut words = Vec::new();
        words
            .try_reserve_exact(len)
            .map_err(|_| mapcolor_core::Error::AllocationFailed {
                what: "adjacency matrix",
                len,
            })?;
        words.resize(len, polarity.empty_word());
        Ok(Self {
            vertex_count,
            stride,
            polarity,
            words,
        })
    }

    /// Wrap words produced elsewhere, e.g. by the matrix-building unit.
    pub fn from_words(vertex_count: usize, polarity: Polarity, words: Vec<u32>) -> GraphResult<Self> {
        let expected = word_count(vertex_count)?;
        if words.len() != expected {
            return Err(mapcolor_core::Error::BufferLength {
                expected,
                actual: words.len(),
            }
            .into());
        }
        Ok(Self {
            vertex_count,
            stride: row_stride(vertex_count),
            polarity,
            words,
        })
    }

    /// Number of vertices `N`.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    /// Words per row.
    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Edge polarity.
    #[inline]
    pub fn polarity(&self) -> Polarity {
        self.polarity
    }

    /// All words, row-major.
    #[inline]
    pub fn words(&self) -> &[u32] {
        &self.words
    }

    /// The row of vertex `u`.
    pub fn row(&self, u: usize) -> GraphResult<&[u32]> {
        self.check(u)?;
        Ok(&self.words[u * self.stride..(u + 1) * self.stride])
    }

    fn check(&self, id: usize) -> GraphResult<()> {
        if id == 0 || id > self.vertex_count {
            return Err(GraphError::VertexOutOfRange {
                id,
                count: self.vertex_count,
            });
        }
        Ok(())
    }

    #[inline]
    fn bit(&self, u: usize, v: usize) -> bool {
        let word = self.words[u * self.stride + v / 32];
        self.polarity.edge_bits(word) & (1 << (v % 32)) != 0
    }

    /// Whether `u` and `v` are adjacent. Out-of-range ids have no edges.
    pub fn has_edge(&self, u: usize, v: usize) -> bool {
        if self.check(u).is_err() || self.check(v).is_err() {
            return false;
        }
        self.bit(u, v)
    }

    /// Connect `u` and `v` in both directions. Self loops are ignored.
    pub fn add_edge(&mut self, u: usize, v: usize) -> GraphResult<()> {
        self.check(u)?;
        self.check(v)?;
        if u == v {
            return Ok(());
        }
        for (a, b) in [(u, v), (v, u)] {
            let word = &mut self.words[a * self.stride + b / 32];
            let mask = 1u32 << (b % 32);
            match self.polarity {
                Polarity::EdgeIsOne => *word |= mask,
                Polarity::EdgeIsZero => *word &= !mask,
            }
        }
        Ok(())
    }

    /// Number of edge bits in columns `1..=N` of row `u`.
    pub fn degree(&self, u: usize) -> GraphResult<u32> {
        self.check(u)?;
        Ok(self.neighbors(u).count() as u32)
    }

    /// Neighbors of `u` in ascending order; empty for out-of-range ids.
    pub fn neighbors(&self, u: usize) -> impl Iterator<Item = usize> + '_ {
        let n = if self.check(u).is_ok() {
            self.vertex_count
        } else {
            0
        };
        (1..=n).filter(move |&v| self.bit(u, v))
    }

    /// Number of undirected edges.
    pub fn edge_count(&self) -> usize {
        (1..=self.vertex_count)
            .map(|u| self.neighbors(u).filter(|&v| v > u).count())
            .sum()
    }

    /// Whether the matrix is symmetric with an edgeless diagonal.
    pub fn is_symmetric(&self) -> bool {
        (1..=self.vertex_count).all(|u| {
            !self.bit(u, u) && (1..=self.vertex_count).all(|v| self.bit(u, v) == self.bit(v, u))
        })
    }
}

fn word_count(vertex_count: usize) -> GraphResult<usize> {
    (vertex_count + 1)
        .checked_mul(row_stride(vertex_count))
        .ok_or_else(|| {
            GraphError::InvalidParameters(format!("{} vertices overflow the matrix size", vertex_count))
        })
}
