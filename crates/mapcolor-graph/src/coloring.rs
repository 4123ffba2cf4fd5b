//! Map coloring engine
//!
//! Greedy coloring in Welsh-Powell order with randomized restarts. Each
//! color is one bit of a 32-bit [`ColorToken`]; a vertex takes the lowest
//! bit not used by any colored neighbor.
//!
//! The engine is a small state machine:
//!
//! ```text
//! Reset -> Assign -> Evaluate -> Accept
//!   ^                   |
//!   +---- Perturb <-----+
//! ```
//!
//! `Evaluate` estimates the color count as the position of the lowest unset
//! bit of the OR of all assigned tokens. Lowest-available assignment keeps
//! that OR a contiguous run of low bits, so the estimate is exact. An
//! attempt outside `1..=max_colors` perturbs the visiting order with
//! `N / 3 + 1` random swaps and starts over.
//!
//! A vertex whose colored neighbors hold all 32 tokens stays
//! [`ColorToken::NONE`]; the rest of the attempt still runs, and the attempt
//! has no estimate.

use crate::error::{GraphError, GraphResult};
use crate::graph::{Graph, SortKey};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, trace};

/// A color: a single set bit, or no bit for "uncolored".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ColorToken(u32);

impl ColorToken {
    /// The uncolored token.
    pub const NONE: ColorToken = ColorToken(0);

    /// Token of color number `index` (`0..32`).
    ///
    /// # Panics
    ///
    /// Panics if `index >= 32`.
    #[inline]
    pub fn from_index(index: u32) -> Self {
        ColorToken(1 << index)
    }

    /// Lowest color not present in `used`, `None` when all 32 are taken.
    #[inline]
    pub fn lowest_free(used: u32) -> Option<Self> {
        let index = (!used).trailing_zeros();
        (index < 32).then(|| Self::from_index(index))
    }

    /// The token as a bit set.
    #[inline]
    pub fn bits(self) -> u32 {
        self.0
    }

    /// Color number, `None` for [`ColorToken::NONE`].
    #[inline]
    pub fn index(self) -> Option<u32> {
        (self.0 != 0).then(|| self.0.trailing_zeros())
    }

    /// Whether this is the uncolored token.
    #[inline]
    pub fn is_none(self) -> bool {
        self.0 == 0
    }
}

/// Options for the coloring engine
#[derive(Debug, Clone)]
pub struct ColoringOptions {
    /// Largest accepted color count
    pub max_colors: u32,
    /// Seed of the perturbation RNG, fresh entropy when `None`
    pub seed: Option<u64>,
    /// Give up after this many attempts; unbounded when `None`
    pub max_attempts: Option<u64>,
}

impl Default for ColoringOptions {
    fn default() -> Self {
        Self {
            max_colors: 4,
            seed: None,
            max_attempts: None,
        }
    }
}

impl ColoringOptions {
    /// Set the largest accepted color count
    pub fn with_max_colors(mut self, max_colors: u32) -> Self {
        self.max_colors = max_colors;
        self
    }

    /// Make perturbation deterministic
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Bound the number of attempts
    pub fn with_max_attempts(mut self, attempts: u64) -> Self {
        self.max_attempts = Some(attempts);
        self
    }
}

/// Engine state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColoringPhase {
    /// Clear colors and the used-colors accumulator
    Reset,
    /// Color every vertex in visiting order
    Assign,
    /// Estimate the color count and decide
    Evaluate,
    /// Shuffle the visiting order
    Perturb,
    /// Done
    Accept,
}

/// Outcome of an accepted coloring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColoringReport {
    /// Number of colors used
    pub colors: u32,
    /// Attempts made, the accepted one included
    pub attempts: u64,
}

/// Greedy coloring engine with randomized restarts.
pub struct ColoringEngine {
    options: ColoringOptions,
    rng: StdRng,
    phase: ColoringPhase,
    /// OR of every token assigned in the current attempt
    used: u32,
    /// Set when a vertex found no free color
    exhausted: bool,
    attempts: u64,
}

impl ColoringEngine {
    /// Create an engine.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidParameters`] unless
    /// `1 <= max_colors <= 32`.
    pub fn new(options: ColoringOptions) -> GraphResult<Self> {
        if !(1..=32).contains(&options.max_colors) {
            return Err(GraphError::InvalidParameters(format!(
                "max_colors must be in 1..=32, got {}",
                options.max_colors
            )));
        }
        let rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            options,
            rng,
            phase: ColoringPhase::Reset,
            used: 0,
            exhausted: false,
            attempts: 0,
        })
    }

    /// Current phase.
    pub fn phase(&self) -> ColoringPhase {
        self.phase
    }

    /// Used-colors accumulator of the current attempt.
    pub fn used_colors(&self) -> u32 {
        self.used
    }

    /// Attempts made so far.
    pub fn attempts(&self) -> u64 {
        self.attempts
    }

    /// Estimated color count of the current attempt, `None` after token
    /// exhaustion.
    pub fn estimate(&self) -> Option<u32> {
        (!self.exhausted).then(|| (!self.used).trailing_zeros())
    }

    /// Color `graph`, starting from degree-descending order.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::ColoringNotConverged`] when `max_attempts` is
    /// set and reached. The last attempt's colors stay in the graph; no two
    /// neighbors share a color, but after token exhaustion some vertices
    /// are uncolored.
    pub fn color(&mut self, graph: &mut Graph) -> GraphResult<ColoringReport> {
        let _span = tracing::debug_span!("coloring", vertices = graph.vertex_count()).entered();

        if graph.is_empty() {
            self.phase = ColoringPhase::Accept;
            return Ok(ColoringReport {
                colors: 0,
                attempts: 0,
            });
        }

        graph.sort_order(SortKey::DegreeDescending);
        self.phase = ColoringPhase::Reset;
        let mut best: Option<u32> = None;

        loop {
            match self.phase {
                ColoringPhase::Reset => {
                    graph.clear_colors();
                    self.used = 0;
                    self.exhausted = false;
                    self.attempts += 1;
                    self.phase = ColoringPhase::Assign;
                }
                ColoringPhase::Assign => {
                    self.assign(graph)?;
                    self.phase = ColoringPhase::Evaluate;
                }
                ColoringPhase::Evaluate => {
                    let estimate = self.estimate();
                    trace!(attempt = self.attempts, ?estimate, "evaluated attempt");
                    if let Some(count) = estimate {
                        best = Some(best.map_or(count, |b| b.min(count)));
                        if (1..=self.options.max_colors).contains(&count) {
                            self.phase = ColoringPhase::Accept;
                            continue;
                        }
                    }
                    if self
                        .options
                        .max_attempts
                        .is_some_and(|cap| self.attempts >= cap)
                    {
                        return Err(GraphError::ColoringNotConverged {
                            attempts: self.attempts,
                            best,
                        });
                    }
                    self.phase = ColoringPhase::Perturb;
                }
                ColoringPhase::Perturb => {
                    self.perturb(graph);
                    self.phase = ColoringPhase::Reset;
                }
                ColoringPhase::Accept => {
                    let colors = graph.colors_used();
                    info!(colors, attempts = self.attempts, "coloring accepted");
                    return Ok(ColoringReport {
                        colors,
                        attempts: self.attempts,
                    });
                }
            }
        }
    }

    fn assign(&mut self, graph: &mut Graph) -> GraphResult<()> {
        for pos in 0..graph.vertex_count() {
            let id = graph.order()[pos];
            match ColorToken::lowest_free(graph.neighbor_colors(id)) {
                Some(token) => {
                    graph.set_color(id, token)?;
                    self.used |= token.bits();
                }
                None => {
                    trace!(vertex = id, "no free color");
                    self.exhausted = true;
                }
            }
        }
        Ok(())
    }

    fn perturb(&mut self, graph: &mut Graph) {
        let n = graph.vertex_count();
        if n < 2 {
            return;
        }
        let swaps = n / 3 + 1;
        for _ in 0..swaps {
            let a = self.rng.gen_range(0..n);
            let mut b = self.rng.gen_range(0..n - 1);
            if b >= a {
                b += 1;
            }
            graph.swap_order(a, b);
        }
        debug!(attempt = self.attempts, swaps, "perturbed visiting order");
    }
}

/// Color `graph` with a fresh engine.
///
/// # Examples
///
/// ```
/// use mapcolor_graph::{ColoringOptions, Graph, Polarity, color_graph};
///
/// let mut graph = Graph::from_edges(3, &[(1, 2), (2, 3), (1, 3)], Polarity::EdgeIsOne).unwrap();
/// let report = color_graph(&mut graph, &ColoringOptions::default().with_seed(7)).unwrap();
/// assert_eq!(report.colors, 3);
/// assert!(graph.is_properly_colored());
/// ```
pub fn color_graph(graph: &mut Graph, options: &ColoringOptions) -> GraphResult<ColoringReport> {
    ColoringEngine::new(options.clone())?.color(graph)
}
