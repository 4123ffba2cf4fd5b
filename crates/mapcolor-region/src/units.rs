//! Labeling compute units
//!
//! Each struct is one kernel of the labeling pipeline; its fields are the
//! kernel arguments. The units only communicate through the mask store,
//! the raw-id counters and the mapping table `gid_row`, all of them atomic
//! buffers.
//!
//! During normalization `gid_row` is a union-find parent table over raw ids
//! in which every parent is smaller than its child, so linking can never
//! form a cycle. The two upper bits of an entry are tags:
//!
//! - [`PRESENT`]: set on a representative that owns at least one pixel
//! - [`LINKED`]: set on a flattened non-representative entry

use mapcolor_compute::{ComputeUnit, WorkItem};
use mapcolor_core::{
    AtomicBuffer, GID_BORDER, GID_RESERVED, GID_UNDEFINED, MaskStore, color, is_region_id,
};

/// Tag of a representative with pixels.
pub const PRESENT: u32 = 1 << 31;

/// Tag of a flattened non-representative entry.
pub const LINKED: u32 = 1 << 30;

/// Exclusive upper bound of raw ids.
pub const RAW_ID_LIMIT: u32 = LINKED;

const ID_MASK: u32 = RAW_ID_LIMIT - 1;

/// Linear indexes of the 4-neighbors of `(x, y)`.
#[inline]
fn neighbors4(x: u32, y: u32, width: u32, height: u32) -> impl Iterator<Item = usize> {
    let w = width as usize;
    let i = y as usize * w + x as usize;
    [
        (x > 0).then(|| i - 1),
        (x + 1 < width).then(|| i + 1),
        (y > 0).then(|| i - w),
        (y + 1 < height).then(|| i + w),
    ]
    .into_iter()
    .flatten()
}

/// Representative of `id`, halving the path on the way.
pub(crate) fn find_root(gid_row: &AtomicBuffer, mut id: u32) -> u32 {
    loop {
        let parent = gid_row.load(id as usize) & ID_MASK;
        if parent == id {
            return id;
        }
        let grandparent = gid_row.load(parent as usize) & ID_MASK;
        if grandparent != parent {
            // Untagged entries only; losing the race is harmless
            let _ = gid_row.compare_exchange(id as usize, parent, grandparent);
        }
        id = parent;
    }
}

/// Merge the sets of `a` and `b`, linking the larger root under the smaller.
fn union(gid_row: &AtomicBuffer, a: u32, b: u32) {
    loop {
        let ra = find_root(gid_row, a);
        let rb = find_root(gid_row, b);
        if ra == rb {
            return;
        }
        let (high, low) = if ra > rb { (ra, rb) } else { (rb, ra) };
        if gid_row.compare_exchange(high as usize, high, low).is_ok() {
            return;
        }
    }
}

/// Classify pixels as border or interior and record region keys.
pub struct BorderUnit<'a> {
    pub pixels: &'a [u32],
    pub mask: &'a MaskStore,
    pub threshold: u8,
}

impl ComputeUnit for BorderUnit<'_> {
    fn name(&self) -> &'static str {
        "border"
    }

    fn execute(&self, item: WorkItem) {
        let i = item.global_id;
        let pixel = self.pixels[i];
        if color::luma(pixel) < self.threshold {
            self.mask.cells().store(i, GID_BORDER);
            self.mask.keys().store(i, 0);
        } else {
            self.mask.cells().store(i, GID_UNDEFINED);
            self.mask.keys().store(i, color::region_key(pixel));
        }
    }
}

/// Claim a raw id for each unlabeled pixel, then spread the minimum id
/// among same-key neighbors for at most `spread_timeout` rounds.
pub struct ClaimSpreadUnit<'a> {
    pub width: u32,
    pub height: u32,
    pub mask: &'a MaskStore,
    pub counter: &'a AtomicBuffer,
    pub spread_timeout: u32,
}

impl ComputeUnit for ClaimSpreadUnit<'_> {
    fn name(&self) -> &'static str {
        "claim_spread"
    }

    fn execute(&self, item: WorkItem) {
        let cells = self.mask.cells();
        let i = item.global_id;
        if cells.load(i) == GID_BORDER {
            return;
        }

        if cells.load(i) == GID_UNDEFINED {
            // Past the limit the counter only grows by in-flight claims
            if self.counter.load(0) > RAW_ID_LIMIT {
                return;
            }
            let id = self.counter.fetch_add(0, 1);
            if id >= RAW_ID_LIMIT {
                return;
            }
            // A lost claim leaves `id` unused
            let _ = cells.compare_exchange(i, GID_UNDEFINED, id);
        }

        let key = self.mask.keys().load(i);
        for _ in 0..self.spread_timeout {
            let own = cells.load(i);
            let min = neighbors4(item.x, item.y, self.width, self.height)
                .filter(|&n| self.mask.keys().load(n) == key)
                .map(|n| cells.load(n))
                .filter(|&c| is_region_id(c))
                .fold(own, u32::min);
            if min == own || cells.compare_exchange(i, own, min).is_err() {
                break;
            }
        }
    }
}

/// Start `gid_row` as the identity mapping.
pub struct MappingInitUnit<'a> {
    pub gid_row: &'a AtomicBuffer,
}

impl ComputeUnit for MappingInitUnit<'_> {
    fn name(&self) -> &'static str {
        "mapping_init"
    }

    fn execute(&self, item: WorkItem) {
        self.gid_row.store(item.global_id, item.global_id as u32);
    }
}

/// Union the raw ids of adjacent same-key pixels, one work-item per row
/// (ids `0..height`) and per column (ids `height..height + width`).
pub struct NormalizeAreaUnit<'a> {
    pub width: u32,
    pub height: u32,
    pub mask: &'a MaskStore,
    pub gid_row: &'a AtomicBuffer,
}

impl NormalizeAreaUnit<'_> {
    fn merge(&self, a: usize, b: usize) {
        let cells = self.mask.cells();
        let (ca, cb) = (cells.load(a), cells.load(b));
        if is_region_id(ca)
            && is_region_id(cb)
            && ca != cb
            && self.mask.keys().load(a) == self.mask.keys().load(b)
        {
            union(self.gid_row, ca, cb);
        }
    }
}

impl ComputeUnit for NormalizeAreaUnit<'_> {
    fn name(&self) -> &'static str {
        "normalize_area"
    }

    fn execute(&self, item: WorkItem) {
        let w = self.width as usize;
        let h = self.height as usize;
        let line = item.global_id;
        if line < h {
            let row = line * w;
            for x in 1..w {
                self.merge(row + x - 1, row + x);
            }
        } else {
            let x = line - h;
            for y in 1..h {
                self.merge((y - 1) * w + x, y * w + x);
            }
        }
    }
}

/// Rewrite every pixel to its representative and tag the representative.
pub struct ApplyParentUnit<'a> {
    pub mask: &'a MaskStore,
    pub gid_row: &'a AtomicBuffer,
}

impl ComputeUnit for ApplyParentUnit<'_> {
    fn name(&self) -> &'static str {
        "apply_parent"
    }

    fn execute(&self, item: WorkItem) {
        let i = item.global_id;
        let cell = self.mask.cells().load(i);
        if is_region_id(cell) {
            let root = find_root(self.gid_row, cell);
            self.mask.cells().store(i, root);
            self.gid_row.fetch_or(root as usize, PRESENT);
        }
    }
}

/// Point every non-representative raw id straight at its representative.
pub struct NormalizeGidUnit<'a> {
    pub gid_row: &'a AtomicBuffer,
}

impl ComputeUnit for NormalizeGidUnit<'_> {
    fn name(&self) -> &'static str {
        "normalize_gid"
    }

    fn execute(&self, item: WorkItem) {
        let id = item.global_id as u32;
        if id < GID_RESERVED {
            return;
        }
        if self.gid_row.load(id as usize) & ID_MASK != id {
            let root = find_root(self.gid_row, id);
            self.gid_row.store(id as usize, root | LINKED);
        }
    }
}

/// Hand out dense final ids to the representatives that own pixels.
pub struct CompactUnit<'a> {
    pub gid_row: &'a AtomicBuffer,
    pub counter: &'a AtomicBuffer,
    pub reserved: u32,
}

impl ComputeUnit for CompactUnit<'_> {
    fn name(&self) -> &'static str {
        "compact"
    }

    fn execute(&self, item: WorkItem) {
        let id = item.global_id as u32;
        if id < self.reserved {
            return;
        }
        let entry = self.gid_row.load(id as usize);
        if entry == id | PRESENT {
            let final_id = self.counter.fetch_add(0, 1);
            self.gid_row.store(id as usize, final_id);
        } else if entry == id {
            self.gid_row.store(id as usize, 0);
        }
    }
}

/// Replace every link by its representative's final id.
pub struct ResolveLinkUnit<'a> {
    pub gid_row: &'a AtomicBuffer,
}

impl ComputeUnit for ResolveLinkUnit<'_> {
    fn name(&self) -> &'static str {
        "resolve_link"
    }

    fn execute(&self, item: WorkItem) {
        let entry = self.gid_row.load(item.global_id);
        if entry & LINKED != 0 {
            let root = (entry & ID_MASK) as usize;
            self.gid_row
                .store(item.global_id, self.gid_row.load(root));
        }
    }
}

/// Rewrite raw ids to final ids.
pub struct FinalizeUnit<'a> {
    pub mask: &'a MaskStore,
    pub gid_row: &'a AtomicBuffer,
}

impl ComputeUnit for FinalizeUnit<'_> {
    fn name(&self) -> &'static str {
        "finalize"
    }

    fn execute(&self, item: WorkItem) {
        let i = item.global_id;
        let cell = self.mask.cells().load(i);
        if is_region_id(cell) {
            self.mask
                .cells()
                .store(i, self.gid_row.load(cell as usize));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mapcolor_compute::{ComputeBackend, IndexSpace, SerialBackend};

    #[test]
    fn test_neighbors4() {
        let mut n: Vec<usize> = neighbors4(0, 0, 3, 3).collect();
        n.sort();
        assert_eq!(n, vec![1, 3]);
        let mut n: Vec<usize> = neighbors4(1, 1, 3, 3).collect();
        n.sort();
        assert_eq!(n, vec![1, 3, 5, 7]);
        assert_eq!(neighbors4(0, 0, 1, 1).count(), 0);
    }

    #[test]
    fn test_union_links_larger_under_smaller() {
        let gid_row = AtomicBuffer::from_slice(&[0, 1, 2, 3, 4, 5]).unwrap();
        union(&gid_row, 5, 3);
        union(&gid_row, 4, 5);
        assert_eq!(gid_row.load(5), 3);
        assert_eq!(find_root(&gid_row, 4), 3);
        assert_eq!(find_root(&gid_row, 2), 2);
        union(&gid_row, 2, 4);
        for id in 2..6 {
            assert_eq!(find_root(&gid_row, id), 2);
        }
    }

    #[test]
    fn test_find_root_ignores_tags() {
        let gid_row = AtomicBuffer::from_slice(&[0, 1, 2 | PRESENT, 2, 3]).unwrap();
        assert_eq!(find_root(&gid_row, 4), 2);
        assert_eq!(find_root(&gid_row, 2), 2);
    }

    #[test]
    fn test_compaction_and_resolution() {
        // 2 present root, 3 linked to 2, 4 empty root, 5 present root
        let gid_row =
            AtomicBuffer::from_slice(&[0, 1, 2 | PRESENT, 2, 4, 5 | PRESENT]).unwrap();
        let counter = AtomicBuffer::new(1, GID_RESERVED).unwrap();
        let backend = SerialBackend::new();
        let space = IndexSpace::Linear(gid_row.len());
        backend
            .run(&NormalizeGidUnit { gid_row: &gid_row }, space)
            .unwrap();
        assert_eq!(gid_row.load(3), 2 | LINKED);
        backend
            .run(
                &CompactUnit {
                    gid_row: &gid_row,
                    counter: &counter,
                    reserved: GID_RESERVED,
                },
                space,
            )
            .unwrap();
        backend
            .run(&ResolveLinkUnit { gid_row: &gid_row }, space)
            .unwrap();
        assert_eq!(gid_row.to_vec(), vec![0, 1, 2, 2, 0, 3]);
        assert_eq!(counter.load(0), 4);
    }
}
