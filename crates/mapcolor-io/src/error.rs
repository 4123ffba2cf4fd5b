//! I/O error types
//!
//! Every validation failure of the BMP reader has its own variant and a
//! stable numeric code (see [`IoError::code`]), so the command line front
//! end can report which check rejected the input.

use thiserror::Error;

/// Error type for container I/O.
#[derive(Error, Debug)]
pub enum IoError {
    /// The source could not be opened or read (code 1)
    #[error("cannot open source bmp file: {0}")]
    Open(#[source] std::io::Error),

    /// The first two bytes are not `BM` (code 2)
    #[error("source bmp file has wrong signature 0x{found:04x}")]
    Signature { found: u16 },

    /// The pixel data offset is zero or lies past the end of the file (code 3)
    #[error("wrong bmp data offset {offset} (file is {file_len} bytes)")]
    DataOffset { offset: u32, file_len: usize },

    /// Only 32-bit pixels are supported (code 4)
    #[error("32-bit bmp files only, found {bits_per_pixel} bits per pixel")]
    BitDepth { bits_per_pixel: u16 },

    /// The file ends before the pixel array does (code 5)
    #[error("short read of pixel data: expected {expected} bytes, got {actual}")]
    ShortRead { expected: usize, actual: usize },

    /// Width or height is zero or negative width (code 6)
    #[error("invalid bmp dimensions {width}x{height}")]
    Dimensions { width: i32, height: i32 },

    /// Output file could not be created or written
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An error from the core library
    #[error("core error: {0}")]
    Core(#[from] mapcolor_core::Error),
}

impl IoError {
    /// Validation code of the error, `None` for failures that are not
    /// about the input format.
    pub fn code(&self) -> Option<u8> {
        match self {
            IoError::Open(_) => Some(1),
            IoError::Signature { .. } => Some(2),
            IoError::DataOffset { .. } => Some(3),
            IoError::BitDepth { .. } => Some(4),
            IoError::ShortRead { .. } => Some(5),
            IoError::Dimensions { .. } => Some(6),
            IoError::Io(_) | IoError::Core(_) => None,
        }
    }
}

/// Convenience alias for I/O results.
pub type IoResult<T> = Result<T, IoError>;
