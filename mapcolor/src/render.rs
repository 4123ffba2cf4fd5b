//! Render-back of a colored map
//!
//! Region pixels are replaced with the palette entry of their vertex's
//! color; border pixels keep their source value. The debug mode paints each
//! region id with its own deterministic color instead, which makes labeling
//! problems visible independent of the coloring.

use crate::error::{Error, Result};
use mapcolor_compute::{ComputeBackend, ComputeUnit, IndexSpace, WorkItem};
use mapcolor_core::color::compose_rgb;
use mapcolor_core::{AtomicBuffer, GID_RESERVED, MaskStore, Raster, is_region_id};
use mapcolor_graph::Graph;
use tracing::debug;

/// Four light colors; dark borders stay readable on all of them.
pub const DEFAULT_PALETTE: [u32; 4] = [
    0xffb3_baff, // rose
    0xffff_baff, // cream
    0xbaff_c9ff, // mint
    0xbae1_ffff, // sky
];

/// Options for render-back
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Output color per color bit index; indexes past the end wrap around
    pub palette: Vec<u32>,
    /// Paint region ids instead of colors
    pub debug_mask: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            palette: DEFAULT_PALETTE.to_vec(),
            debug_mask: false,
        }
    }
}

impl RenderOptions {
    /// Replace the palette
    pub fn with_palette(mut self, palette: Vec<u32>) -> Self {
        self.palette = palette;
        self
    }

    /// Enable or disable debug mask rendering
    pub fn with_debug_mask(mut self, debug_mask: bool) -> Self {
        self.debug_mask = debug_mask;
        self
    }
}

/// Write per-region output colors into every region pixel.
///
/// `region_colors[id - 2]` is the output pixel of final id `id`.
pub struct ApplyColorsUnit<'a> {
    pub mask: &'a MaskStore,
    pub region_colors: &'a [u32],
    pub output: &'a AtomicBuffer,
}

impl ComputeUnit for ApplyColorsUnit<'_> {
    fn name(&self) -> &'static str {
        "apply_colors"
    }

    fn execute(&self, item: WorkItem) {
        let i = item.global_id;
        let id = self.mask.cells().load(i);
        if !is_region_id(id) {
            return;
        }
        if let Some(&pixel) = self.region_colors.get((id - GID_RESERVED) as usize) {
            self.output.store(i, pixel);
        }
    }
}

/// Paint every region id with [`debug_color`].
pub struct DebugMaskUnit<'a> {
    pub mask: &'a MaskStore,
    pub output: &'a AtomicBuffer,
}

impl ComputeUnit for DebugMaskUnit<'_> {
    fn name(&self) -> &'static str {
        "debug_mask"
    }

    fn execute(&self, item: WorkItem) {
        let i = item.global_id;
        let id = self.mask.cells().load(i);
        if is_region_id(id) {
            self.output.store(i, debug_color(id));
        }
    }
}

/// Deterministic, well spread color of a region id.
pub fn debug_color(id: u32) -> u32 {
    let h = id.wrapping_mul(0x9e37_79b1);
    compose_rgb(
        0x40 | (h >> 24) as u8,
        0x40 | (h >> 16) as u8,
        0x40 | (h >> 8) as u8,
    )
}

/// Render the colored map over `source`.
///
/// # Errors
///
/// Returns [`Error::EmptyPalette`] for an empty palette, a dimension
/// mismatch if `mask` and `source` differ in size, or a backend error.
pub fn render(
    backend: &dyn ComputeBackend,
    source: &Raster,
    mask: &MaskStore,
    graph: &Graph,
    options: &RenderOptions,
) -> Result<Raster> {
    let (w, h) = (source.width(), source.height());
    if (mask.width(), mask.height()) != (w, h) {
        return Err(mapcolor_core::Error::DimensionMismatch {
            expected: (w, h),
            actual: (mask.width(), mask.height()),
        }
        .into());
    }
    let output = AtomicBuffer::from_slice(source.data())?;
    let space = IndexSpace::grid(w, h)?;

    if options.debug_mask {
        debug!(regions = graph.vertex_count(), "rendering debug mask");
        backend.run(&DebugMaskUnit { mask, output: &output }, space)?;
    } else {
        let palette = &options.palette;
        if palette.is_empty() {
            return Err(Error::EmptyPalette);
        }
        let mut region_colors = vec![0u32; graph.vertex_count()];
        for v in graph.vertices() {
            let slot = (v.region_id() - GID_RESERVED) as usize;
            if let (Some(k), Some(pixel)) = (v.color.index(), region_colors.get_mut(slot)) {
                *pixel = palette[k as usize % palette.len()];
            }
        }
        backend.run(
            &ApplyColorsUnit {
                mask,
                region_colors: &region_colors,
                output: &output,
            },
            space,
        )?;
    }

    Ok(Raster::from_pixels(w, h, output.into_vec())?)
}
