//! Property-based invariant tests for region labeling.
//!
//! For random maps over a few colors and border pixels:
//!
//! 1. The partition equals a sequential breadth-first labeling.
//! 2. Final ids are exactly `2..=N + 1`.
//! 3. The result does not depend on the spread budget.

use mapcolor_compute::{RayonBackend, SerialBackend};
use mapcolor_core::{Raster, is_region_id};
use mapcolor_region::{LabelOptions, label_regions};
use mapcolor_test::{BORDER_PIXEL, letter_color, reference_labels, same_partition};
use proptest::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────────

fn map_strategy() -> impl Strategy<Value = Raster> {
    (1u32..=12, 1u32..=12).prop_flat_map(|(w, h)| {
        prop::collection::vec(0u8..4, (w * h) as usize).prop_map(move |cells| {
            let data = cells
                .into_iter()
                .map(|c| match c {
                    0 => BORDER_PIXEL,
                    1 => letter_color('A').unwrap_or(0),
                    2 => letter_color('B').unwrap_or(0),
                    _ => letter_color('C').unwrap_or(0),
                })
                .collect();
            Raster::from_pixels(w, h, data).expect("raster")
        })
    })
}

proptest! {
    #[test]
    fn partition_matches_reference(raster in map_strategy()) {
        let labeling = label_regions(&SerialBackend::new(), &raster, &LabelOptions::default())
            .expect("label");
        let reference = reference_labels(&raster, 128);
        prop_assert_eq!(labeling.region_count, reference.count);
        prop_assert!(same_partition(&labeling.mask.snapshot(), &reference.cells));
    }
}

proptest! {
    #[test]
    fn final_ids_are_dense(raster in map_strategy(), timeout in 0u32..4) {
        let options = LabelOptions::default().with_spread_timeout(timeout);
        let backend = RayonBackend::new(Some(3)).expect("pool");
        let labeling = label_regions(&backend, &raster, &options).expect("label");
        let mut ids: Vec<u32> = labeling
            .mask
            .snapshot()
            .into_iter()
            .filter(|&c| is_region_id(c))
            .collect();
        ids.sort_unstable();
        ids.dedup();
        let expected: Vec<u32> = (2..2 + labeling.region_count as u32).collect();
        prop_assert_eq!(ids, expected);
    }
}

proptest! {
    #[test]
    fn spread_budget_does_not_change_partition(raster in map_strategy()) {
        let backend = SerialBackend::new();
        let short = label_regions(&backend, &raster, &LabelOptions::default().with_spread_timeout(0))
            .expect("label");
        let long = label_regions(&backend, &raster, &LabelOptions::default())
            .expect("label");
        prop_assert_eq!(short.region_count, long.region_count);
        prop_assert!(same_partition(&short.mask.snapshot(), &long.mask.snapshot()));
    }
}
