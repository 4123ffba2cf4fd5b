//! Region adjacency graph
//!
//! One vertex per region. Final region ids start at [`GID_RESERVED`], vertex
//! ids at 1, so vertex `id` stands for the mask cells holding `id + 1`; use
//! [`Vertex::region_id`] and [`vertex_of_region`] rather than the offset.
//! Adjacency lives in a bit-packed [`AdjacencyMatrix`]. The graph also
//! keeps the visiting order used by the coloring engine: a permutation of
//! vertex ids that can be sorted and shuffled without moving vertices.

use crate::coloring::ColorToken;
use crate::error::{GraphError, GraphResult};
use crate::matrix::{AdjacencyMatrix, Polarity};
use mapcolor_core::GID_RESERVED;
use std::cmp::Ordering;
use std::fmt;

/// A region in the adjacency graph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Vertex {
    /// Vertex id in `1..=N`
    pub id: usize,
    /// Assigned color, [`ColorToken::NONE`] while uncolored
    pub color: ColorToken,
    /// Number of neighboring vertices
    pub degree: u32,
}

impl Vertex {
    /// Final region id (mask cell value) this vertex stands for.
    #[inline]
    pub fn region_id(&self) -> u32 {
        (self.id - 1) as u32 + GID_RESERVED
    }
}

/// Vertex id of final region id `region`.
///
/// `region` must be a region id (see [`mapcolor_core::is_region_id`]).
#[inline]
pub fn vertex_of_region(region: u32) -> usize {
    (region - GID_RESERVED) as usize + 1
}

/// Built-in vertex orderings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    /// Ascending vertex id
    Id,
    /// Descending degree (Welsh-Powell); ties keep their current order
    DegreeDescending,
}

/// Vertices plus adjacency matrix plus visiting order.
#[derive(Debug, Clone)]
pub struct Graph {
    vertices: Vec<Vertex>,
    matrix: AdjacencyMatrix,
    order: Vec<usize>,
}

impl Graph {
    /// Build a graph around `matrix`, computing degrees.
    pub fn new(matrix: AdjacencyMatrix) -> GraphResult<Self> {
        let n = matrix.vertex_count();
        let mut vertices = Vec::new();
        vertices
            .try_reserve_exact(n)
            .map_err(|_| mapcolor_core::Error::AllocationFailed {
                what: "vertices",
                len: n,
            })?;
        vertices.extend((1..=n).map(|id| Vertex {
            id,
            color: ColorToken::NONE,
            degree: 0,
        }));
        let mut graph = Self {
            vertices,
            matrix,
            order: (1..=n).collect(),
        };
        graph.calc_degrees();
        Ok(graph)
    }

    /// Build a graph from an edge list over vertices `1..=vertex_count`.
    ///
    /// # Examples
    ///
    /// ```
    /// use mapcolor_graph::{Graph, Polarity};
    ///
    /// let graph = Graph::from_edges(3, &[(1, 2), (2, 3)], Polarity::EdgeIsOne).unwrap();
    /// assert_eq!(graph.vertex(2).unwrap().degree, 2);
    /// ```
    pub fn from_edges(
        vertex_count: usize,
        edges: &[(usize, usize)],
        polarity: Polarity,
    ) -> GraphResult<Self> {
        let mut matrix = AdjacencyMatrix::new(vertex_count, polarity)?;
        for &(u, v) in edges {
            matrix.add_edge(u, v)?;
        }
        Self::new(matrix)
    }

    /// Number of vertices.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Whether the graph has no vertices.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// All vertices, ordered by id.
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Vertex `id`, `None` when out of range.
    pub fn vertex(&self, id: usize) -> Option<&Vertex> {
        id.checked_sub(1).and_then(|i| self.vertices.get(i))
    }

    /// The adjacency matrix.
    pub fn matrix(&self) -> &AdjacencyMatrix {
        &self.matrix
    }

    /// Edge polarity of the matrix.
    pub fn polarity(&self) -> Polarity {
        self.matrix.polarity()
    }

    /// The matrix row of vertex `id`.
    pub fn edges(&self, id: usize) -> GraphResult<&[u32]> {
        self.matrix.row(id)
    }

    /// Neighbors of `id` in ascending order.
    pub fn neighbors(&self, id: usize) -> impl Iterator<Item = usize> + '_ {
        self.matrix.neighbors(id)
    }

    /// Whether `u` and `v` are adjacent.
    pub fn has_edge(&self, u: usize, v: usize) -> bool {
        self.matrix.has_edge(u, v)
    }

    /// Number of undirected edges.
    pub fn edge_count(&self) -> usize {
        self.matrix.edge_count()
    }

    /// Recount every vertex degree from the matrix.
    pub fn calc_degrees(&mut self) {
        for vertex in &mut self.vertices {
            vertex.degree = self.matrix.neighbors(vertex.id).count() as u32;
        }
    }

    /// Current visiting order.
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    /// Swap two positions of the visiting order.
    ///
    /// # Panics
    ///
    /// Panics if a position is out of bounds.
    pub fn swap_order(&mut self, a: usize, b: usize) {
        self.order.swap(a, b);
    }

    /// Stable-sort the visiting order with `compare`.
    pub fn sort_order_by<F>(&mut self, mut compare: F)
    where
        F: FnMut(&Vertex, &Vertex) -> Ordering,
    {
        let vertices = &self.vertices;
        self.order
            .sort_by(|&a, &b| compare(&vertices[a - 1], &vertices[b - 1]));
    }

    /// Sort the visiting order by a built-in key.
    pub fn sort_order(&mut self, key: SortKey) {
        match key {
            SortKey::Id => self.sort_order_by(|a, b| a.id.cmp(&b.id)),
            SortKey::DegreeDescending => self.sort_order_by(|a, b| b.degree.cmp(&a.degree)),
        }
    }

    /// Color of vertex `id`.
    pub fn color(&self, id: usize) -> Option<ColorToken> {
        self.vertex(id).map(|v| v.color)
    }

    /// Assign a color to vertex `id`.
    pub fn set_color(&mut self, id: usize, color: ColorToken) -> GraphResult<()> {
        let count = self.vertices.len();
        let vertex = id
            .checked_sub(1)
            .and_then(|i| self.vertices.get_mut(i))
            .ok_or(GraphError::VertexOutOfRange { id, count })?;
        vertex.color = color;
        Ok(())
    }

    /// Reset every vertex to uncolored.
    pub fn clear_colors(&mut self) {
        for vertex in &mut self.vertices {
            vertex.color = ColorToken::NONE;
        }
    }

    /// OR of the colors of the neighbors of `id`.
    pub fn neighbor_colors(&self, id: usize) -> u32 {
        self.neighbors(id)
            .map(|n| self.vertices[n - 1].color.bits())
            .fold(0, |acc, bits| acc | bits)
    }

    /// Every vertex colored and no edge joining two equal colors.
    pub fn is_properly_colored(&self) -> bool {
        self.vertices.iter().all(|v| {
            !v.color.is_none() && self.neighbors(v.id).all(|n| self.vertices[n - 1].color != v.color)
        })
    }

    /// Number of distinct colors in use.
    pub fn colors_used(&self) -> u32 {
        self.vertices
            .iter()
            .fold(0u32, |acc, v| acc | v.color.bits())
            .count_ones()
    }
}

impl fmt::Display for Graph {
    /// One line per vertex: `vertex <id> (degree <d>): <neighbors>`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for vertex in &self.vertices {
            write!(f, "vertex {} (degree {}):", vertex.id, vertex.degree)?;
            for n in self.neighbors(vertex.id) {
                write!(f, " {}", n)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
