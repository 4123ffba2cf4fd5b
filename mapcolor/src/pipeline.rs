//! End-to-end pipeline: read, label, build, color, render, write
//!
//! The output is written only after every stage has succeeded, and it is
//! staged in a sibling file that replaces the target once complete, so a
//! failed run never leaves a partial image behind.

use crate::error::Result;
use crate::render::{RenderOptions, render};
use mapcolor_compute::{ComputeBackend, RayonBackend, SerialBackend};
use mapcolor_core::Raster;
use mapcolor_graph::{ColoringOptions, Graph, GraphOptions, build_graph, color_graph};
use mapcolor_io::{read_bmp_file, write_bmp_file};
use mapcolor_region::{LabelOptions, Labeling, label_regions};
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::info;

/// Which compute backend runs the data-parallel passes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendKind {
    /// One thread, reproducible work-item order
    Serial,
    /// A rayon thread pool
    #[default]
    Rayon,
}

/// Options for a whole pipeline run
#[derive(Debug, Clone, Default)]
pub struct PipelineOptions {
    pub label: LabelOptions,
    pub graph: GraphOptions,
    pub coloring: ColoringOptions,
    pub render: RenderOptions,
    pub backend: BackendKind,
    /// Worker threads of the rayon backend; `None` uses rayon's default
    pub threads: Option<usize>,
}

impl PipelineOptions {
    pub fn with_label(mut self, label: LabelOptions) -> Self {
        self.label = label;
        self
    }

    pub fn with_graph(mut self, graph: GraphOptions) -> Self {
        self.graph = graph;
        self
    }

    pub fn with_coloring(mut self, coloring: ColoringOptions) -> Self {
        self.coloring = coloring;
        self
    }

    pub fn with_render(mut self, render: RenderOptions) -> Self {
        self.render = render;
        self
    }

    pub fn with_backend(mut self, backend: BackendKind) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    /// Create the configured backend.
    ///
    /// # Errors
    ///
    /// Returns a compute error if the thread pool cannot be built.
    pub fn create_backend(&self) -> Result<Box<dyn ComputeBackend>> {
        Ok(match self.backend {
            BackendKind::Serial => Box::new(SerialBackend::new()),
            BackendKind::Rayon => Box::new(RayonBackend::new(self.threads)?),
        })
    }
}

/// Summary of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Report {
    pub width: u32,
    pub height: u32,
    pub regions: usize,
    pub edges: usize,
    pub colors: u32,
    pub attempts: u64,
    /// Labeling and graph construction
    pub parse_time: Duration,
    pub color_time: Duration,
    pub total_time: Duration,
}

/// Everything produced from one raster
#[derive(Debug)]
pub struct ColoredMap {
    pub raster: Raster,
    pub labeling: Labeling,
    pub graph: Graph,
    pub report: Report,
}

/// Label, build, color and render `raster` in memory.
///
/// # Errors
///
/// Propagates the first failing stage.
pub fn color_map(
    backend: &dyn ComputeBackend,
    raster: &Raster,
    options: &PipelineOptions,
) -> Result<ColoredMap> {
    let _span = tracing::debug_span!("color_map", backend = backend.name()).entered();
    let start = Instant::now();

    let labeling = label_regions(backend, raster, &options.label)?;
    let mut graph = build_graph(
        backend,
        &labeling.mask,
        labeling.region_count,
        &options.graph,
    )?;
    let parse_time = start.elapsed();

    let coloring_start = Instant::now();
    let coloring = color_graph(&mut graph, &options.coloring)?;
    let color_time = coloring_start.elapsed();

    let rendered = render(backend, raster, &labeling.mask, &graph, &options.render)?;

    let report = Report {
        width: raster.width(),
        height: raster.height(),
        regions: labeling.region_count,
        edges: graph.edge_count(),
        colors: coloring.colors,
        attempts: coloring.attempts,
        parse_time,
        color_time,
        total_time: start.elapsed(),
    };
    Ok(ColoredMap {
        raster: rendered,
        labeling,
        graph,
        report,
    })
}

/// Color the BMP at `input` and write the result to `output`.
///
/// # Errors
///
/// Container validation errors carry the code of the failed check (see
/// [`crate::Error::format_code`]). No output is created on error.
pub fn run<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
    options: &PipelineOptions,
) -> Result<Report> {
    let (input, output) = (input.as_ref(), output.as_ref());
    info!(input = %input.display(), output = %output.display(), "coloring map");

    let mut bmp = read_bmp_file(input)?;
    let backend = options.create_backend()?;
    let colored = color_map(backend.as_ref(), bmp.raster(), options)?;
    bmp.set_raster(colored.raster)?;
    write_bmp_file(&bmp, output)?;

    let report = colored.report;
    info!(
        regions = report.regions,
        colors = report.colors,
        attempts = report.attempts,
        parse_ms = report.parse_time.as_millis() as u64,
        color_ms = report.color_time.as_millis() as u64,
        total_ms = report.total_time.as_millis() as u64,
        "map colored"
    );
    Ok(report)
}
