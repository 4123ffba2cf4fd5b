//! Synthetic maps
//!
//! Builders for small test images written as ASCII art, plus a plain
//! breadth-first labeler the parallel pipeline is checked against.
//!
//! ```text
//! AA#BB
//! AA#BB
//! ```
//!
//! `#` is a black border pixel. Every letter is a distinct light color, so
//! equal letters connect and different letters form adjacent regions.

use crate::error::{TestError, TestResult};
use mapcolor_core::{GID_BORDER, GID_RESERVED, Raster, color};
use std::collections::{HashMap, VecDeque};

/// The border pixel used by [`ascii_map`].
pub const BORDER_PIXEL: u32 = 0x0000_00ff;

/// Light color of a map letter, `None` for anything but `A-Z` / `a-z`.
pub fn letter_color(c: char) -> Option<u32> {
    let i: u8 = match c {
        'A'..='Z' => (c as u32 - 'A' as u32) as u8,
        'a'..='z' => (26 + c as u32 - 'a' as u32) as u8,
        _ => return None,
    };
    Some(color::compose_rgb(0x80 + 2 * i, 0xf0, 0xff - 2 * i))
}

/// Build a raster from rows of map characters.
pub fn ascii_map(rows: &[&str]) -> TestResult<Raster> {
    let height = rows.len();
    let width = rows.first().map_or(0, |r| r.chars().count());
    let mut data = Vec::with_capacity(width * height);
    for (y, row) in rows.iter().enumerate() {
        if row.chars().count() != width {
            return Err(TestError::InvalidMap {
                row: y,
                message: format!("expected {} columns", width),
            });
        }
        for c in row.chars() {
            let pixel = match c {
                '#' => BORDER_PIXEL,
                _ => letter_color(c).ok_or_else(|| TestError::InvalidMap {
                    row: y,
                    message: format!("unknown map character {:?}", c),
                })?,
            };
            data.push(pixel);
        }
    }
    Ok(Raster::from_pixels(width as u32, height as u32, data)?)
}

/// Connected components computed by breadth-first search.
#[derive(Debug, Clone)]
pub struct ReferenceLabels {
    /// `GID_BORDER` for border pixels, ids from `GID_RESERVED` in scan order
    pub cells: Vec<u32>,
    /// Number of regions
    pub count: usize,
}

/// Label `raster` sequentially: luma below `border_threshold` is border,
/// 4-adjacent pixels with equal RGB connect.
pub fn reference_labels(raster: &Raster, border_threshold: u8) -> ReferenceLabels {
    let w = raster.width() as usize;
    let h = raster.height() as usize;
    let data = raster.data();
    let is_border = |i: usize| color::luma(data[i]) < border_threshold;

    let mut cells = vec![0u32; w * h];
    let mut next = GID_RESERVED;
    let mut queue = VecDeque::new();
    for start in 0..w * h {
        if is_border(start) {
            cells[start] = GID_BORDER;
            continue;
        }
        if cells[start] != 0 {
            continue;
        }
        let key = color::region_key(data[start]);
        cells[start] = next;
        queue.push_back(start);
        while let Some(i) = queue.pop_front() {
            let (x, y) = (i % w, i / w);
            let mut neighbors = Vec::with_capacity(4);
            if x > 0 {
                neighbors.push(i - 1);
            }
            if x + 1 < w {
                neighbors.push(i + 1);
            }
            if y > 0 {
                neighbors.push(i - w);
            }
            if y + 1 < h {
                neighbors.push(i + w);
            }
            for n in neighbors {
                if cells[n] == 0 && !is_border(n) && color::region_key(data[n]) == key {
                    cells[n] = next;
                    queue.push_back(n);
                }
            }
        }
        next += 1;
    }

    ReferenceLabels {
        cells,
        count: (next - GID_RESERVED) as usize,
    }
}

/// Whether two labelings describe the same partition: identical border
/// cells and a one-to-one correspondence between region ids.
pub fn same_partition(a: &[u32], b: &[u32]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut forward = HashMap::new();
    let mut backward = HashMap::new();
    for (&x, &y) in a.iter().zip(b) {
        if (x < GID_RESERVED || y < GID_RESERVED) && x != y {
            return false;
        }
        if *forward.entry(x).or_insert(y) != y || *backward.entry(y).or_insert(x) != x {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letters_are_light_and_distinct() {
        let colors: Vec<u32> = ('A'..='Z')
            .chain('a'..='z')
            .filter_map(letter_color)
            .collect();
        assert_eq!(colors.len(), 52);
        for (i, &c) in colors.iter().enumerate() {
            assert!(color::luma(c) >= 128);
            assert!(!colors[..i].contains(&c));
        }
        assert!(color::luma(BORDER_PIXEL) < 128);
        assert_eq!(letter_color('#'), None);
    }

    #[test]
    fn test_ascii_map() {
        let raster = ascii_map(&["AB", "#A"]).unwrap();
        assert_eq!((raster.width(), raster.height()), (2, 2));
        assert_eq!(raster.data()[2], BORDER_PIXEL);
        assert_eq!(raster.data()[0], raster.data()[3]);
        assert!(ascii_map(&["AB", "A"]).is_err());
        assert!(ascii_map(&["A?"]).is_err());
    }

    #[test]
    fn test_reference_labels() {
        let raster = ascii_map(&["AA#A", "BA#A", "BB#C"]).unwrap();
        let labels = reference_labels(&raster, 128);
        assert_eq!(labels.count, 4);
        assert_eq!(labels.cells[2], GID_BORDER);
        assert_eq!(labels.cells[0], labels.cells[5]);
        assert_ne!(labels.cells[0], labels.cells[3]);
    }

    #[test]
    fn test_same_partition() {
        assert!(same_partition(&[1, 2, 2, 3], &[1, 5, 5, 4]));
        assert!(!same_partition(&[1, 2, 2, 3], &[1, 5, 4, 4]));
        assert!(!same_partition(&[1, 2], &[2, 2]));
        assert!(!same_partition(&[2, 3], &[4, 4]));
    }
}
