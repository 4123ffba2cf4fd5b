//! Region labeling pipeline
//!
//! Turns a raster (or an already classified mask) into dense region ids:
//!
//! 1. border classification
//! 2. raw-id claim and bounded spread
//! 3. mapping-table init, line-wise union of adjacent raw ids, parent
//!    application
//! 4. id normalization, compaction, link resolution
//! 5. finalize
//!
//! Every pass is one dispatch on a [`ComputeBackend`], followed by a
//! barrier. The spread pass only shortens the union-find work; the result
//! does not depend on the spread budget or on the backend's scheduling.

use crate::error::{RegionError, RegionResult};
use crate::units::{
    ApplyParentUnit, BorderUnit, ClaimSpreadUnit, CompactUnit, FinalizeUnit, MappingInitUnit,
    NormalizeAreaUnit, NormalizeGidUnit, RAW_ID_LIMIT, ResolveLinkUnit,
};
use mapcolor_compute::{ComputeBackend, IndexSpace};
use mapcolor_core::{AtomicBuffer, GID_RESERVED, MaskStore, Raster, is_region_id};
use tracing::{debug, info};

/// Options for region labeling
#[derive(Debug, Clone)]
pub struct LabelOptions {
    /// Spread rounds per pixel work-item
    pub spread_timeout: u32,
    /// Pixels with a luma below this value are border
    pub border_threshold: u8,
}

impl Default for LabelOptions {
    fn default() -> Self {
        Self {
            spread_timeout: 1000,
            border_threshold: 128,
        }
    }
}

impl LabelOptions {
    /// Set the spread budget
    pub fn with_spread_timeout(mut self, rounds: u32) -> Self {
        self.spread_timeout = rounds;
        self
    }

    /// Set the border luma threshold
    pub fn with_border_threshold(mut self, threshold: u8) -> Self {
        self.border_threshold = threshold;
        self
    }
}

/// Result of labeling: the finalized mask plus its mapping table.
#[derive(Debug)]
pub struct Labeling {
    /// Cells hold final ids `2..=region_count + 1`, or the border value
    pub mask: MaskStore,
    /// Number of regions
    pub region_count: usize,
    /// Final id of every raw id, 0 for raw ids that ended up unused
    pub gid_row: Vec<u32>,
}

impl Labeling {
    /// Final id of the pixel at `(x, y)`, `None` for border pixels.
    pub fn region_at(&self, x: u32, y: u32) -> Option<u32> {
        self.mask.get(x, y).filter(|&c| is_region_id(c))
    }

    /// Number of raw ids handed out during the claim pass.
    pub fn raw_id_count(&self) -> usize {
        self.gid_row.len() - GID_RESERVED as usize
    }
}

/// Pass state of one labeling run.
///
/// The pass methods must be called in pipeline order; [`LabelState::run`]
/// does that. They are public so single passes can be observed in
/// isolation.
#[derive(Debug)]
pub struct LabelState {
    mask: MaskStore,
    options: LabelOptions,
    /// Next raw id
    raw_counter: AtomicBuffer,
    /// Next final id
    final_counter: AtomicBuffer,
    gid_row: Option<AtomicBuffer>,
}

impl LabelState {
    /// Fresh state for a `width x height` image.
    pub fn new(width: u32, height: u32, options: LabelOptions) -> RegionResult<Self> {
        Self::from_mask(MaskStore::new(width, height)?, options)
    }

    /// State over a mask whose cells are already classified as border
    /// or unlabeled, with region keys filled in.
    pub fn from_mask(mask: MaskStore, options: LabelOptions) -> RegionResult<Self> {
        Ok(Self {
            mask,
            options,
            raw_counter: AtomicBuffer::new(1, GID_RESERVED)?,
            final_counter: AtomicBuffer::new(1, GID_RESERVED)?,
            gid_row: None,
        })
    }

    /// The mask in its current state.
    pub fn mask(&self) -> &MaskStore {
        &self.mask
    }

    /// Number of raw ids handed out so far.
    pub fn raw_ids_claimed(&self) -> u32 {
        self.raw_counter.load(0).min(RAW_ID_LIMIT) - GID_RESERVED
    }

    /// Current mapping table, once initialized.
    pub fn gid_row(&self) -> Option<Vec<u32>> {
        self.gid_row.as_ref().map(AtomicBuffer::to_vec)
    }

    fn grid(&self) -> RegionResult<IndexSpace> {
        Ok(IndexSpace::grid(self.mask.width(), self.mask.height())?)
    }

    fn mapping(&self, pass: &'static str) -> RegionResult<&AtomicBuffer> {
        self.gid_row.as_ref().ok_or(RegionError::PassOrder {
            pass,
            requires: "init_mapping",
        })
    }

    /// Pass 1: classify border pixels of `raster` and record region keys.
    pub fn classify_borders(
        &mut self,
        backend: &dyn ComputeBackend,
        raster: &Raster,
    ) -> RegionResult<()> {
        if raster.width() != self.mask.width() || raster.height() != self.mask.height() {
            return Err(mapcolor_core::Error::DimensionMismatch {
                expected: (self.mask.width(), self.mask.height()),
                actual: (raster.width(), raster.height()),
            }
            .into());
        }
        let unit = BorderUnit {
            pixels: raster.data(),
            mask: &self.mask,
            threshold: self.options.border_threshold,
        };
        backend.run(&unit, self.grid()?)?;
        Ok(())
    }

    /// Pass 2: claim raw ids and spread minima.
    ///
    /// # Errors
    ///
    /// Returns [`RegionError::IdSpaceExhausted`] if more raw ids were needed
    /// than the mapping table can address.
    pub fn claim_and_spread(&self, backend: &dyn ComputeBackend) -> RegionResult<()> {
        let unit = ClaimSpreadUnit {
            width: self.mask.width(),
            height: self.mask.height(),
            mask: &self.mask,
            counter: &self.raw_counter,
            spread_timeout: self.options.spread_timeout,
        };
        backend.run(&unit, self.grid()?)?;

        let claimed = self.raw_counter.load(0);
        if claimed > RAW_ID_LIMIT {
            return Err(RegionError::IdSpaceExhausted {
                claimed: claimed - GID_RESERVED,
                limit: RAW_ID_LIMIT - GID_RESERVED,
            });
        }
        debug!(
            raw_ids = claimed - GID_RESERVED,
            converged = self.spread_converged(),
            "claim and spread finished"
        );
        Ok(())
    }

    /// Whether every interior pixel already holds the minimum id among its
    /// same-key neighbors, i.e. another spread pass would change nothing.
    pub fn spread_converged(&self) -> bool {
        let (w, h) = (self.mask.width(), self.mask.height());
        let cells = self.mask.cells();
        let keys = self.mask.keys();
        (0..h).all(|y| {
            (0..w).all(|x| {
                let i = self.mask.index(x, y);
                let own = cells.load(i);
                if !is_region_id(own) {
                    return true;
                }
                let right = (x + 1 < w).then(|| i + 1);
                let down = (y + 1 < h).then(|| i + w as usize);
                [right, down].into_iter().flatten().all(|n| {
                    let other = cells.load(n);
                    keys.load(n) != keys.load(i) || !is_region_id(other) || other == own
                })
            })
        })
    }

    /// Pass 3a: allocate `gid_row` as the identity over all raw ids.
    pub fn init_mapping(&mut self, backend: &dyn ComputeBackend) -> RegionResult<()> {
        let len = self.raw_counter.load(0).min(RAW_ID_LIMIT) as usize;
        let gid_row = AtomicBuffer::new(len, 0)?;
        backend.run(&MappingInitUnit { gid_row: &gid_row }, IndexSpace::Linear(len))?;
        self.gid_row = Some(gid_row);
        Ok(())
    }

    /// Pass 3b: merge adjacent raw ids line by line, then point every
    /// pixel at its representative.
    pub fn normalize_areas(&self, backend: &dyn ComputeBackend) -> RegionResult<()> {
        let gid_row = self.mapping("normalize_areas")?;
        let (w, h) = (self.mask.width(), self.mask.height());
        let unit = NormalizeAreaUnit {
            width: w,
            height: h,
            mask: &self.mask,
            gid_row,
        };
        backend.run(&unit, IndexSpace::Linear(w as usize + h as usize))?;

        let unit = ApplyParentUnit {
            mask: &self.mask,
            gid_row,
        };
        backend.run(&unit, self.grid()?)?;
        Ok(())
    }

    /// Pass 4: flatten, compact and resolve `gid_row`. Returns the region
    /// count.
    pub fn compact(&self, backend: &dyn ComputeBackend) -> RegionResult<usize> {
        let gid_row = self.mapping("compact")?;
        let space = IndexSpace::Linear(gid_row.len());
        backend.run(&NormalizeGidUnit { gid_row }, space)?;
        let unit = CompactUnit {
            gid_row,
            counter: &self.final_counter,
            reserved: GID_RESERVED,
        };
        backend.run(&unit, space)?;
        backend.run(&ResolveLinkUnit { gid_row }, space)?;
        Ok(self.region_count())
    }

    /// Pass 5: rewrite raw ids to final ids.
    pub fn finalize(&self, backend: &dyn ComputeBackend) -> RegionResult<()> {
        let gid_row = self.mapping("finalize")?;
        let unit = FinalizeUnit {
            mask: &self.mask,
            gid_row,
        };
        backend.run(&unit, self.grid()?)?;
        Ok(())
    }

    /// Regions counted by compaction so far.
    pub fn region_count(&self) -> usize {
        (self.final_counter.load(0) - GID_RESERVED) as usize
    }

    /// Run passes 2 to 5 over the current mask.
    pub fn run(mut self, backend: &dyn ComputeBackend) -> RegionResult<Labeling> {
        let _span = tracing::debug_span!(
            "label",
            backend = backend.name(),
            width = self.mask.width(),
            height = self.mask.height()
        )
        .entered();

        self.claim_and_spread(backend)?;
        self.init_mapping(backend)?;
        self.normalize_areas(backend)?;
        let region_count = self.compact(backend)?;
        self.finalize(backend)?;

        info!(
            regions = region_count,
            raw_ids = self.raw_ids_claimed(),
            "labeling finished"
        );
        let gid_row = self.gid_row.take().map(AtomicBuffer::into_vec).unwrap_or_default();
        Ok(Labeling {
            mask: self.mask,
            region_count,
            gid_row,
        })
    }
}

/// Label the regions of `raster`.
///
/// # Examples
///
/// ```
/// use mapcolor_compute::SerialBackend;
/// use mapcolor_core::Raster;
/// use mapcolor_region::{LabelOptions, label_regions};
///
/// let raster = Raster::filled(3, 3, 0xffffffff).unwrap();
/// let labeling = label_regions(&SerialBackend::new(), &raster, &LabelOptions::default()).unwrap();
/// assert_eq!(labeling.region_count, 1);
/// assert_eq!(labeling.region_at(1, 1), Some(2));
/// ```
pub fn label_regions(
    backend: &dyn ComputeBackend,
    raster: &Raster,
    options: &LabelOptions,
) -> RegionResult<Labeling> {
    let mut state = LabelState::new(raster.width(), raster.height(), options.clone())?;
    state.classify_borders(backend, raster)?;
    state.run(backend)
}

/// Label a mask whose cells are already border or unlabeled.
pub fn label_mask(
    backend: &dyn ComputeBackend,
    mask: MaskStore,
    options: &LabelOptions,
) -> RegionResult<Labeling> {
    LabelState::from_mask(mask, options.clone())?.run(backend)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mapcolor_compute::{RayonBackend, SerialBackend};
    use mapcolor_core::{GID_BORDER, GID_UNDEFINED};
    use mapcolor_test::{ascii_map, reference_labels, same_partition};

    fn final_ids(labeling: &Labeling) -> Vec<u32> {
        let mut ids: Vec<u32> = labeling
            .mask
            .snapshot()
            .into_iter()
            .filter(|&c| is_region_id(c))
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    #[test]
    fn test_single_block() {
        let raster = ascii_map(&["AAA", "AAA", "AAA"]).unwrap();
        let labeling =
            label_regions(&SerialBackend::new(), &raster, &LabelOptions::default()).unwrap();
        assert_eq!(labeling.region_count, 1);
        assert!(labeling.mask.snapshot().iter().all(|&c| c == 2));
    }

    #[test]
    fn test_border_column_splits_regions() {
        let raster = ascii_map(&["AA#AA", "AA#AA"]).unwrap();
        let labeling =
            label_regions(&SerialBackend::new(), &raster, &LabelOptions::default()).unwrap();
        assert_eq!(labeling.region_count, 2);
        assert_eq!(labeling.mask.get(2, 0), Some(GID_BORDER));
        assert_eq!(final_ids(&labeling), vec![2, 3]);
        assert_ne!(labeling.region_at(0, 0), labeling.region_at(4, 1));
    }

    #[test]
    fn test_all_border() {
        let raster = ascii_map(&["##", "##"]).unwrap();
        let labeling =
            label_regions(&SerialBackend::new(), &raster, &LabelOptions::default()).unwrap();
        assert_eq!(labeling.region_count, 0);
        assert_eq!(labeling.raw_id_count(), 0);
        assert_eq!(labeling.region_at(0, 0), None);
    }

    #[test]
    fn test_spiral_with_zero_budget() {
        // The spiral needs long propagation; union-find still joins it
        let raster = ascii_map(&[
            "AAAAAAA", "######A", "AAAAA#A", "A###A#A", "A#AAA#A", "A#####A", "AAAAAAA",
        ])
        .unwrap();
        let options = LabelOptions::default().with_spread_timeout(0);
        let labeling = label_regions(&SerialBackend::new(), &raster, &options).unwrap();
        let reference = reference_labels(&raster, 128);
        assert_eq!(labeling.region_count, reference.count);
        assert!(same_partition(&labeling.mask.snapshot(), &reference.cells));
    }

    #[test]
    fn test_pass_order_enforced() {
        let state = LabelState::new(2, 2, LabelOptions::default()).unwrap();
        let err = state.compact(&SerialBackend::new()).unwrap_err();
        assert!(matches!(err, RegionError::PassOrder { .. }));
    }

    #[test]
    fn test_dimension_mismatch() {
        let mut state = LabelState::new(2, 2, LabelOptions::default()).unwrap();
        let raster = Raster::new(3, 2).unwrap();
        assert!(
            state
                .classify_borders(&SerialBackend::new(), &raster)
                .is_err()
        );
    }

    #[test]
    fn test_label_preclassified_mask() {
        // Two interior columns split by a border column
        let (u, b) = (GID_UNDEFINED, GID_BORDER);
        let cells = [u, b, u, u, b, u];
        let mask = MaskStore::from_cells(3, 2, &cells, &[7; 6]).unwrap();
        let labeling = label_mask(&SerialBackend::new(), mask, &LabelOptions::default()).unwrap();
        assert_eq!(labeling.region_count, 2);
        assert_eq!(labeling.region_at(0, 0), labeling.region_at(0, 1));
    }

    #[test]
    fn test_rayon_matches_reference() {
        let raster = ascii_map(&["AABBA", "A#BBA", "CC#DD", "CCDDD"]).unwrap();
        let backend = RayonBackend::new(Some(4)).unwrap();
        let labeling = label_regions(&backend, &raster, &LabelOptions::default()).unwrap();
        let reference = reference_labels(&raster, 128);
        assert_eq!(labeling.region_count, reference.count);
        assert!(same_partition(&labeling.mask.snapshot(), &reference.cells));
        assert_eq!(final_ids(&labeling), (2..2 + reference.count as u32).collect::<Vec<_>>());
    }
}
