//! # rgbablit
//!
//! Raw RGBA8 pixel buffers and the four things you do to them in a hurry:
//! fill, blit, alpha-blend and resize.
//!
//! Every operation has a scalar reference implementation plus x86-64 AVX2
//! and ARM NEON kernels. All three produce byte-identical output, and the
//! fastest one the running CPU supports is picked at runtime.
//!
//! ## Byte layout
//!
//! Buffers are tightly packed RGBA8: 4 bytes per pixel in R, G, B, A order,
//! row-major, no row padding. A `width × height` image is exactly
//! `width * height * 4` bytes.
//!
//! ## Core operations (always available)
//!
//! Free functions in the crate root work on raw `&[u8]` / `&mut [u8]` slices
//! and validate only slice lengths. Clipped operations accept signed
//! placement offsets; whatever falls outside the destination is skipped.
//!
//! [`PixelBuffer`] owns a 32-byte aligned allocation and exposes the same
//! operations as methods that cannot fail.
//!
//! ## Backends
//!
//! The plain functions dispatch automatically. The `*_with` forms take an
//! explicit [`Backend`] and refuse one the CPU cannot run.
//!
//! ## Feature flags
//!
//! - **`rgb`** — typed views over [`rgb::Rgba<u8>`] pixels.
//! - **`imgref`** — conversions between [`PixelBuffer`] and [`imgref`]
//!   images. Implies `rgb`.

#![no_std]
#![forbid(unsafe_code)]

#[cfg(any(feature = "std", test))]
extern crate std;

extern crate alloc;

mod backend;
mod buffer;
mod composite;
mod geometry;
mod raster;

pub use backend::Backend;
pub use buffer::PixelBuffer;
pub use composite::{CompositeMode, composite, composite_with};
pub use geometry::{Clip, clip};
pub use raster::*;

#[cfg(feature = "rgb")]
pub mod typed;

#[cfg(feature = "imgref")]
pub mod img;

use core::fmt;

/// Bytes per RGBA8 pixel.
pub const BYTES_PER_PIXEL: usize = 4;

/// Everything that can go wrong at the call boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelError {
    /// `width * height * 4` does not fit in `usize`.
    DimensionsOverflow { width: u32, height: u32 },
    /// The allocator could not reserve the buffer.
    AllocationFailed { bytes: usize },
    /// A slice is shorter than its declared dimensions require.
    BufferTooSmall { needed: usize, actual: usize },
    /// Two images that must share dimensions do not.
    DimensionMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },
    /// The requested backend cannot run on this CPU.
    UnsupportedBackend(Backend),
}

impl fmt::Display for PixelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PixelError::DimensionsOverflow { width, height } => {
                write!(f, "{width}x{height} RGBA8 image overflows the address space")
            }
            PixelError::AllocationFailed { bytes } => {
                write!(f, "failed to allocate {bytes} bytes for pixel buffer")
            }
            PixelError::BufferTooSmall { needed, actual } => {
                write!(f, "buffer holds {actual} bytes but {needed} are required")
            }
            PixelError::DimensionMismatch { expected, actual } => write!(
                f,
                "expected a {}x{} image, got {}x{}",
                expected.0, expected.1, actual.0, actual.1
            ),
            PixelError::UnsupportedBackend(backend) => {
                write!(f, "{backend} backend is not supported on this CPU")
            }
        }
    }
}

impl core::error::Error for PixelError {}

/// Byte length of a tightly packed `width × height` RGBA8 image.
#[inline]
pub fn image_len(width: u32, height: u32) -> Result<usize, PixelError> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|px| px.checked_mul(BYTES_PER_PIXEL))
        .ok_or(PixelError::DimensionsOverflow { width, height })
}
