//! mapcolor-core - Basic data structures for region map coloring
//!
//! This crate provides the fundamental data structures shared by the
//! mapcolor crates:
//!
//! - [`Raster`] - The immutable 32-bit image container
//! - [`MaskStore`] - Per-pixel labeling state and region keys
//! - [`AtomicBuffer`] - Shared 32-bit cells written by concurrent work-items

pub mod buffer;
pub mod error;
pub mod mask;
pub mod raster;

pub use buffer::AtomicBuffer;
pub use error::{Error, Result};
pub use mask::{GID_BORDER, GID_RESERVED, GID_UNDEFINED, MaskStore, is_region_id};
pub use raster::Raster;

/// Color channel helpers for 32-bit RGBA pixels.
///
/// # Pixel format
///
/// 32-bit pixels are stored as `0xRRGGBBAA` (red in MSB, alpha in LSB).
pub mod color {
    /// Shift amounts for extracting color channels
    pub const RED_SHIFT: u32 = 24;
    pub const GREEN_SHIFT: u32 = 16;
    pub const BLUE_SHIFT: u32 = 8;
    pub const ALPHA_SHIFT: u32 = 0;

    /// Mask selecting the RGB channels of a pixel.
    pub const RGB_MASK: u32 = 0xffff_ff00;

    /// Extract red component from a 32-bit pixel.
    #[inline]
    pub fn red(pixel: u32) -> u8 {
        ((pixel >> RED_SHIFT) & 0xff) as u8
    }

    /// Extract green component from a 32-bit pixel.
    #[inline]
    pub fn green(pixel: u32) -> u8 {
        ((pixel >> GREEN_SHIFT) & 0xff) as u8
    }

    /// Extract blue component from a 32-bit pixel.
    #[inline]
    pub fn blue(pixel: u32) -> u8 {
        ((pixel >> BLUE_SHIFT) & 0xff) as u8
    }

    /// Extract alpha component from a 32-bit pixel.
    #[inline]
    pub fn alpha(pixel: u32) -> u8 {
        ((pixel >> ALPHA_SHIFT) & 0xff) as u8
    }

    /// Compose a 32-bit RGB pixel (alpha = 255).
    #[inline]
    pub fn compose_rgb(r: u8, g: u8, b: u8) -> u32 {
        compose_rgba(r, g, b, 255)
    }

    /// Compose a 32-bit RGBA pixel.
    #[inline]
    pub fn compose_rgba(r: u8, g: u8, b: u8, a: u8) -> u32 {
        ((r as u32) << RED_SHIFT)
            | ((g as u32) << GREEN_SHIFT)
            | ((b as u32) << BLUE_SHIFT)
            | ((a as u32) << ALPHA_SHIFT)
    }

    /// Extract RGB values from a 32-bit pixel.
    #[inline]
    pub fn extract_rgb(pixel: u32) -> (u8, u8, u8) {
        (red(pixel), green(pixel), blue(pixel))
    }

    /// Extract RGBA values from a 32-bit pixel.
    #[inline]
    pub fn extract_rgba(pixel: u32) -> (u8, u8, u8, u8) {
        (red(pixel), green(pixel), blue(pixel), alpha(pixel))
    }

    /// Integer luma in `0..=255` using the Rec. 601 weights.
    #[inline]
    pub fn luma(pixel: u32) -> u8 {
        let (r, g, b) = extract_rgb(pixel);
        ((299 * r as u32 + 587 * g as u32 + 114 * b as u32) / 1000) as u8
    }

    /// The part of a pixel that identifies its region: RGB, alpha ignored.
    #[inline]
    pub fn region_key(pixel: u32) -> u32 {
        pixel & RGB_MASK
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_compose_extract() {
            let p = compose_rgba(1, 2, 3, 4);
            assert_eq!(p, 0x01020304);
            assert_eq!(extract_rgba(p), (1, 2, 3, 4));
            assert_eq!(extract_rgb(compose_rgb(9, 8, 7)), (9, 8, 7));
        }

        #[test]
        fn test_luma() {
            assert_eq!(luma(compose_rgb(0, 0, 0)), 0);
            assert_eq!(luma(compose_rgb(255, 255, 255)), 255);
            assert_eq!(luma(compose_rgb(128, 128, 128)), 128);
            // Pure blue is dark, pure green is bright
            assert!(luma(compose_rgb(0, 0, 255)) < 64);
            assert!(luma(compose_rgb(0, 255, 0)) > 128);
        }

        #[test]
        fn test_region_key_ignores_alpha() {
            assert_eq!(
                region_key(compose_rgba(10, 20, 30, 0)),
                region_key(compose_rgba(10, 20, 30, 255))
            );
            assert_ne!(
                region_key(compose_rgb(10, 20, 30)),
                region_key(compose_rgb(10, 20, 31))
            );
        }
    }
}
