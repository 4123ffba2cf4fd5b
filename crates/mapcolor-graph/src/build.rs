//! Graph construction from a labeled mask
//!
//! Every pixel compares its final id with its right and lower neighbor;
//! two different region ids mark an edge between their vertices (see
//! [`vertex_of_region`]).
//! Each edge is written many times (once per touching pixel pair), which
//! is fine because setting a bit is idempotent.

use crate::error::GraphResult;
use crate::graph::{Graph, vertex_of_region};
use crate::matrix::{AdjacencyMatrix, Polarity, row_stride};
use mapcolor_compute::{ComputeBackend, ComputeUnit, IndexSpace, WorkItem};
use mapcolor_core::{AtomicBuffer, MaskStore, is_region_id};
use tracing::info;

/// Options for graph construction
#[derive(Debug, Clone, Default)]
pub struct GraphOptions {
    /// Which bit value marks an edge
    pub polarity: Polarity,
}

impl GraphOptions {
    /// Set the edge polarity
    pub fn with_polarity(mut self, polarity: Polarity) -> Self {
        self.polarity = polarity;
        self
    }
}

/// Mark adjacencies between different regions in the matrix.
pub struct BuildMatrixUnit<'a> {
    pub width: u32,
    pub height: u32,
    pub mask: &'a MaskStore,
    pub matrix: &'a AtomicBuffer,
    pub stride: usize,
    pub polarity: Polarity,
}

impl BuildMatrixUnit<'_> {
    fn mark(&self, u: usize, v: usize) {
        let index = u * self.stride + v / 32;
        let bit = 1u32 << (v % 32);
        match self.polarity {
            Polarity::EdgeIsOne => self.matrix.fetch_or(index, bit),
            Polarity::EdgeIsZero => self.matrix.fetch_and(index, !bit),
        };
    }
}

impl ComputeUnit for BuildMatrixUnit<'_> {
    fn name(&self) -> &'static str {
        "build_matrix"
    }

    fn execute(&self, item: WorkItem) {
        let cells = self.mask.cells();
        let i = item.global_id;
        let own = cells.load(i);
        if !is_region_id(own) {
            return;
        }
        let right = (item.x + 1 < self.width).then(|| i + 1);
        let down = (item.y + 1 < self.height).then(|| i + self.width as usize);
        for n in [right, down].into_iter().flatten() {
            let other = cells.load(n);
            if is_region_id(other) && other != own {
                let (u, v) = (vertex_of_region(own), vertex_of_region(other));
                self.mark(u, v);
                self.mark(v, u);
            }
        }
    }
}

/// Build the adjacency graph of a finalized mask with `region_count`
/// regions.
///
/// # Errors
///
/// Returns an allocation error if the matrix or the vertices cannot be
/// allocated.
pub fn build_graph(
    backend: &dyn ComputeBackend,
    mask: &MaskStore,
    region_count: usize,
    options: &GraphOptions,
) -> GraphResult<Graph> {
    let _span = tracing::debug_span!("build_graph", regions = region_count).entered();

    let polarity = options.polarity;
    let stride = row_stride(region_count);
    // Validates the size and yields the edgeless words
    let empty = AdjacencyMatrix::new(region_count, polarity)?;
    let matrix = AtomicBuffer::from_slice(empty.words())?;
    drop(empty);

    let unit = BuildMatrixUnit {
        width: mask.width(),
        height: mask.height(),
        mask,
        matrix: &matrix,
        stride,
        polarity,
    };
    backend.run(&unit, IndexSpace::grid(mask.width(), mask.height())?)?;

    let graph = Graph::new(AdjacencyMatrix::from_words(
        region_count,
        polarity,
        matrix.into_vec(),
    )?)?;
    info!(
        vertices = graph.vertex_count(),
        edges = graph.edge_count(),
        "graph built"
    );
    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mapcolor_compute::SerialBackend;

    #[test]
    fn test_build_from_cells() {
        // ids 2 and 3 touch, 4 is behind a border column
        let cells = [2, 3, 1, 4, 2, 3, 1, 4];
        let mask = MaskStore::from_cells(4, 2, &cells, &[0; 8]).unwrap();
        for polarity in [Polarity::EdgeIsOne, Polarity::EdgeIsZero] {
            let options = GraphOptions::default().with_polarity(polarity);
            let graph = build_graph(&SerialBackend::new(), &mask, 3, &options).unwrap();
            assert_eq!(graph.vertex_count(), 3);
            assert!(graph.has_edge(1, 2));
            assert!(graph.has_edge(2, 1));
            assert!(!graph.has_edge(1, 3));
            assert_eq!(graph.vertex(3).unwrap().degree, 0);
            // Vertex 3 is the region painted 4 in the mask
            assert_eq!(graph.vertex(3).unwrap().region_id(), cells[3]);
            assert!(graph.matrix().is_symmetric());
        }
    }

    #[test]
    fn test_no_regions() {
        let mask = MaskStore::from_cells(2, 1, &[1, 1], &[0, 0]).unwrap();
        let graph =
            build_graph(&SerialBackend::new(), &mask, 0, &GraphOptions::default()).unwrap();
        assert!(graph.is_empty());
    }
}
