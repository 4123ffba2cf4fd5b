//! Graph construction and coloring regression test
//!
//! Labels synthetic maps, builds their adjacency graphs and colors them:
//!   - single block: one vertex, degree 0, one color (tests 0-3)
//!   - blocks split by a border column: no edges, lowest color twice (tests 4-7)
//!   - four mutually adjacent regions: K4, four colors (tests 8-11)
//!   - both polarities give the same graph (test 12)
//!   - textual dump (test 13)
//!
//! Run with:
//! ```
//! cargo test -p mapcolor-graph --test graph_reg -- --nocapture
//! ```

use mapcolor_compute::SerialBackend;
use mapcolor_graph::{
    ColorToken, ColoringOptions, Graph, GraphOptions, Polarity, build_graph, color_graph,
};
use mapcolor_region::{LabelOptions, label_regions};
use mapcolor_test::{RegParams, ascii_map};

fn graph_of(rows: &[&str], polarity: Polarity) -> Graph {
    let backend = SerialBackend::new();
    let raster = ascii_map(rows).expect("map");
    let labeling = label_regions(&backend, &raster, &LabelOptions::default()).expect("label");
    build_graph(
        &backend,
        &labeling.mask,
        labeling.region_count,
        &GraphOptions::default().with_polarity(polarity),
    )
    .expect("graph")
}

fn flag(ok: bool) -> f64 {
    if ok { 1.0 } else { 0.0 }
}

// ============================================================================
// Tests 0-3: 3x3 all-interior block
// ============================================================================
#[test]
fn graph_reg_single_block() {
    let mut rp = RegParams::new("graph_single");
    let mut graph = graph_of(&["AAA", "AAA", "AAA"], Polarity::EdgeIsOne);

    rp.compare_values(1.0, graph.vertex_count() as f64, 0.0);
    rp.compare_values(0.0, graph.vertices()[0].degree as f64, 0.0);
    let report = color_graph(&mut graph, &ColoringOptions::default()).expect("color");
    rp.compare_values(1.0, report.colors as f64, 0.0);
    rp.compare_values(1.0, flag(graph.is_properly_colored()), 0.0);

    assert!(rp.cleanup(), "graph_reg single block failed");
}

// ============================================================================
// Tests 4-7: two blocks split by a border column
// ============================================================================
#[test]
fn graph_reg_border_column() {
    let mut rp = RegParams::new("graph_split");
    let mut graph = graph_of(&["AA#AA", "AA#AA"], Polarity::EdgeIsOne);

    rp.compare_values(2.0, graph.vertex_count() as f64, 0.0);
    rp.compare_values(0.0, graph.edge_count() as f64, 0.0);
    color_graph(&mut graph, &ColoringOptions::default()).expect("color");
    let lowest = ColorToken::from_index(0);
    rp.compare_values(1.0, flag(graph.color(1) == Some(lowest)), 0.0);
    rp.compare_values(1.0, flag(graph.color(2) == Some(lowest)), 0.0);

    assert!(rp.cleanup(), "graph_reg border column failed");
}

// ============================================================================
// Tests 8-11: K4
// ============================================================================
#[test]
fn graph_reg_k4() {
    let mut rp = RegParams::new("graph_k4");
    let mut graph = graph_of(&["AAAA", "BDDC", "BBCC"], Polarity::EdgeIsOne);

    rp.compare_values(4.0, graph.vertex_count() as f64, 0.0);
    rp.compare_values(6.0, graph.edge_count() as f64, 0.0);
    let report =
        color_graph(&mut graph, &ColoringOptions::default().with_seed(11)).expect("color");
    rp.compare_values(4.0, report.colors as f64, 0.0);
    let mut bits: Vec<u32> = graph.vertices().iter().map(|v| v.color.bits()).collect();
    bits.sort_unstable();
    rp.compare_values(1.0, flag(bits == vec![1, 2, 4, 8]), 0.0);

    assert!(rp.cleanup(), "graph_reg K4 failed");
}

// ============================================================================
// Tests 12-13: polarity and dump
// ============================================================================
#[test]
fn graph_reg_polarity_and_dump() {
    let mut rp = RegParams::new("graph_polarity");
    let rows = ["AAB#C", "DAB#C", "DDBBB"];
    let one = graph_of(&rows, Polarity::EdgeIsOne);
    let zero = graph_of(&rows, Polarity::EdgeIsZero);

    let same = (1..=one.vertex_count())
        .all(|id| one.neighbors(id).eq(zero.neighbors(id)));
    rp.compare_values(1.0, flag(same && one.vertex_count() == zero.vertex_count()), 0.0);

    let dump = one.to_string();
    eprintln!("{}", dump);
    rp.compare_values(one.vertex_count() as f64, dump.lines().count() as f64, 0.0);
    rp.write_data_and_check(dump.as_bytes(), "txt")
        .expect("write dump");

    assert!(rp.cleanup(), "graph_reg polarity failed");
}
