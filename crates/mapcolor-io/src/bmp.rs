//! BMP container support
//!
//! Reads and writes 32-bit Windows Bitmap files. Only the fields the
//! pipeline needs are interpreted; everything in front of the pixel array
//! (file header, info header, masks, color profile) and everything after it
//! is carried along verbatim, so a processed file differs from its source
//! in pixel values only.
//!
//! Rows stay in file order. A bottom-up file is therefore loaded upside
//! down, which does not matter to segmentation and is undone on write.

use crate::{IoError, IoResult};
use mapcolor_core::{Raster, color};
use std::fs::{self, File};
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Signature `BM`, little-endian
const BMP_SIGNATURE: u16 = 0x4d42;

/// Byte offsets of the header fields
const POS_TYPE: usize = 0x00;
const POS_SIZE: usize = 0x02;
const POS_OFF_BITS: usize = 0x0A;
const POS_WIDTH: usize = 0x12;
const POS_HEIGHT: usize = 0x16;
const POS_BITS_PER_PIXEL: usize = 0x1C;

/// BMP file header size
const BMP_FILE_HEADER_SIZE: usize = 14;

/// BMP info header size (BITMAPINFOHEADER)
const BMP_INFO_HEADER_SIZE: u32 = 40;

const BYTES_PER_PIXEL: usize = 4;

/// A decoded 32-bit BMP file.
#[derive(Debug, Clone)]
pub struct BmpFile {
    /// Bytes `0..data_offset` of the source
    header: Vec<u8>,
    /// Pixels in file row order
    raster: Raster,
    /// Bytes following the pixel array
    trailer: Vec<u8>,
}

// Header fields past the end of the file read as zero, so a truncated
// header fails the offset or depth check instead of a separate one.
fn field_u16(bytes: &[u8], pos: usize) -> u16 {
    match bytes.get(pos..pos + 2) {
        Some(b) => u16::from_le_bytes([b[0], b[1]]),
        None => 0,
    }
}

fn field_u32(bytes: &[u8], pos: usize) -> u32 {
    match bytes.get(pos..pos + 4) {
        Some(b) => u32::from_le_bytes([b[0], b[1], b[2], b[3]]),
        None => 0,
    }
}

impl BmpFile {
    /// Wrap a raster in a fresh top-down BITMAPINFOHEADER file.
    pub fn from_raster(raster: Raster) -> Self {
        let width = raster.width();
        let height = raster.height();
        let pixel_data_size = row_pitch(width) * height as usize;
        let pixel_offset = BMP_FILE_HEADER_SIZE + BMP_INFO_HEADER_SIZE as usize;
        let file_size = pixel_offset + pixel_data_size;

        let mut header = Vec::with_capacity(pixel_offset);
        header.extend_from_slice(b"BM");
        header.extend_from_slice(&(file_size as u32).to_le_bytes());
        header.extend_from_slice(&[0u8; 4]); // Reserved
        header.extend_from_slice(&(pixel_offset as u32).to_le_bytes());

        header.extend_from_slice(&BMP_INFO_HEADER_SIZE.to_le_bytes());
        header.extend_from_slice(&(width as i32).to_le_bytes());
        header.extend_from_slice(&(-(height as i32)).to_le_bytes()); // Top-down
        header.extend_from_slice(&1u16.to_le_bytes()); // Planes
        header.extend_from_slice(&32u16.to_le_bytes());
        header.extend_from_slice(&0u32.to_le_bytes()); // Compression
        header.extend_from_slice(&(pixel_data_size as u32).to_le_bytes());
        header.extend_from_slice(&0i32.to_le_bytes()); // X pixels per meter
        header.extend_from_slice(&0i32.to_le_bytes()); // Y pixels per meter
        header.extend_from_slice(&0u32.to_le_bytes()); // Colors used
        header.extend_from_slice(&0u32.to_le_bytes()); // Important colors

        Self {
            header,
            raster,
            trailer: Vec::new(),
        }
    }

    /// Decode a complete file held in memory.
    ///
    /// Checks run in this order: signature, data offset, bit depth,
    /// dimensions, pixel array length.
    pub fn decode(bytes: &[u8]) -> IoResult<Self> {
        let signature = field_u16(bytes, POS_TYPE);
        if signature != BMP_SIGNATURE {
            return Err(IoError::Signature { found: signature });
        }

        let data_offset = field_u32(bytes, POS_OFF_BITS);
        if data_offset == 0 || data_offset as usize > bytes.len() {
            return Err(IoError::DataOffset {
                offset: data_offset,
                file_len: bytes.len(),
            });
        }

        let bits_per_pixel = field_u16(bytes, POS_BITS_PER_PIXEL);
        if bits_per_pixel != 32 {
            return Err(IoError::BitDepth { bits_per_pixel });
        }

        let width = field_u32(bytes, POS_WIDTH) as i32;
        let height = field_u32(bytes, POS_HEIGHT) as i32;
        if width <= 0 || height == 0 {
            return Err(IoError::Dimensions { width, height });
        }
        let (w, h) = (width as u32, height.unsigned_abs());

        let offset = data_offset as usize;
        let pitch = row_pitch(w);
        let expected = pitch
            .checked_mul(h as usize)
            .ok_or(IoError::Dimensions { width, height })?;
        let available = bytes.len() - offset;
        if available < expected {
            return Err(IoError::ShortRead {
                expected,
                actual: available,
            });
        }

        let declared_size = field_u32(bytes, POS_SIZE);
        debug!(
            width = w,
            height = h,
            data_offset,
            declared_size,
            "decoded bmp header"
        );

        let pixel_bytes = &bytes[offset..offset + expected];
        let mut data = Vec::new();
        data.try_reserve_exact(w as usize * h as usize)
            .map_err(|_| mapcolor_core::Error::AllocationFailed {
                what: "raster",
                len: w as usize * h as usize,
            })?;
        for row in pixel_bytes.chunks_exact(pitch) {
            for px in row[..w as usize * BYTES_PER_PIXEL].chunks_exact(BYTES_PER_PIXEL) {
                let (b, g, r, a) = (px[0], px[1], px[2], px[3]);
                data.push(color::compose_rgba(r, g, b, a));
            }
        }
        let raster = Raster::from_pixels(w, h, data)?;

        Ok(Self {
            header: bytes[..offset].to_vec(),
            raster,
            trailer: bytes[offset + expected..].to_vec(),
        })
    }

    /// Encode the file: header, pixel array, trailer.
    pub fn encode(&self) -> Vec<u8> {
        let pitch = row_pitch(self.raster.width());
        let mut out = Vec::with_capacity(
            self.header.len() + pitch * self.raster.height() as usize + self.trailer.len(),
        );
        out.extend_from_slice(&self.header);
        for y in 0..self.raster.height() {
            for &pixel in self.raster.row_data(y) {
                let (r, g, b, a) = color::extract_rgba(pixel);
                out.extend_from_slice(&[b, g, r, a]);
            }
        }
        out.extend_from_slice(&self.trailer);
        out
    }

    /// Image width.
    pub fn width(&self) -> u32 {
        self.raster.width()
    }

    /// Image height (magnitude of the header value).
    pub fn height(&self) -> u32 {
        self.raster.height()
    }

    /// Row pitch in bytes.
    pub fn row_pitch(&self) -> usize {
        row_pitch(self.raster.width())
    }

    /// Offset of the pixel array, equal to the header length.
    pub fn data_offset(&self) -> usize {
        self.header.len()
    }

    /// Header bytes, kept verbatim.
    pub fn header(&self) -> &[u8] {
        &self.header
    }

    /// Bytes after the pixel array, kept verbatim.
    pub fn trailer(&self) -> &[u8] {
        &self.trailer
    }

    /// The pixels.
    pub fn raster(&self) -> &Raster {
        &self.raster
    }

    /// Replace the pixels, keeping header and trailer.
    ///
    /// # Errors
    ///
    /// Returns a core `DimensionMismatch` error when the new raster has a
    /// different size.
    pub fn set_raster(&mut self, raster: Raster) -> IoResult<()> {
        if !raster.sizes_equal(&self.raster) {
            return Err(mapcolor_core::Error::DimensionMismatch {
                expected: (self.raster.width(), self.raster.height()),
                actual: (raster.width(), raster.height()),
            }
            .into());
        }
        self.raster = raster;
        Ok(())
    }

    /// Consume the file, returning the pixels.
    pub fn into_raster(self) -> Raster {
        self.raster
    }
}

/// Bytes per row of a 32-bit image, padded to a 4-byte boundary.
#[inline]
pub fn row_pitch(width: u32) -> usize {
    (width as usize * BYTES_PER_PIXEL + 3) & !3
}

/// Read a 32-bit BMP image
pub fn read_bmp<R: Read>(mut reader: R) -> IoResult<BmpFile> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes).map_err(IoError::Open)?;
    BmpFile::decode(&bytes)
}

/// Write a 32-bit BMP image
pub fn write_bmp<W: Write>(bmp: &BmpFile, mut writer: W) -> IoResult<()> {
    writer.write_all(&bmp.encode())?;
    writer.flush()?;
    Ok(())
}

/// Read a 32-bit BMP image from a file path.
pub fn read_bmp_file<P: AsRef<Path>>(path: P) -> IoResult<BmpFile> {
    let file = File::open(path.as_ref()).map_err(IoError::Open)?;
    read_bmp(file)
}

/// Write a 32-bit BMP image to a file path.
///
/// The bytes go to `<path>.tmp` first, which replaces `path` only after it
/// is flushed and synced. On error `path` is left as it was and the
/// temporary file is removed.
pub fn write_bmp_file<P: AsRef<Path>>(bmp: &BmpFile, path: P) -> IoResult<()> {
    replace_file(path.as_ref(), |writer| write_bmp(bmp, writer))
}

/// Sibling path the output is staged in.
fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

fn replace_file<F>(path: &Path, write: F) -> IoResult<()>
where
    F: FnOnce(&mut BufWriter<File>) -> IoResult<()>,
{
    let staging = staging_path(path);
    let result = write_staged(&staging, path, write);
    if let Err(e) = &result {
        debug!(path = %path.display(), error = %e, "discarding staged output");
        let _ = fs::remove_file(&staging);
    }
    result
}

fn write_staged<F>(staging: &Path, path: &Path, write: F) -> IoResult<()>
where
    F: FnOnce(&mut BufWriter<File>) -> IoResult<()>,
{
    let mut writer = BufWriter::new(File::create(staging)?);
    write(&mut writer)?;
    writer.flush()?;
    writer.get_ref().sync_all()?;
    drop(writer);
    fs::rename(staging, path)?;
    Ok(())
}
