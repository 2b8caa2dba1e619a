// ---------------------------------------------------------------------------
// PixelBuffer — an owned, 32-byte aligned RGBA8 image.
// ---------------------------------------------------------------------------

use alloc::vec::Vec;
use core::fmt;

use bytemuck::{Pod, Zeroable};

use crate::composite::{self, CompositeMode};
use crate::raster::{fill_auto, resize_auto};
use crate::{PixelError, image_len};

/// Storage unit. Keeps every row start reachable with aligned 32-byte loads
/// when the width is a multiple of 8.
#[derive(Clone, Copy, Pod, Zeroable)]
#[repr(C, align(32))]
struct Block([u8; 32]);

const BLOCK: usize = core::mem::size_of::<Block>();

/// An owned `width × height` RGBA8 image.
///
/// The byte view is exactly `width * height * 4` bytes, zero-initialised and
/// 32-byte aligned. The buffer is move-only: release it with
/// [`release`](Self::release) or let it drop.
pub struct PixelBuffer {
    blocks: Vec<Block>,
    width: u32,
    height: u32,
    len: usize,
}

impl PixelBuffer {
    /// Allocate a zeroed `width × height` buffer.
    ///
    /// Zero-sized buffers are valid and own no memory. Allocation failure is
    /// reported rather than aborting.
    pub fn allocate(width: u32, height: u32) -> Result<Self, PixelError> {
        let len = image_len(width, height)?;
        let mut blocks = Vec::new();
        if blocks.try_reserve_exact(len.div_ceil(BLOCK)).is_err() {
            log::warn!("rgbablit: failed to allocate {len} bytes for {width}x{height} buffer");
            return Err(PixelError::AllocationFailed { bytes: len });
        }
        blocks.resize(len.div_ceil(BLOCK), Block::zeroed());
        log::trace!("rgbablit: allocated {width}x{height} buffer ({len} bytes)");
        Ok(Self {
            blocks,
            width,
            height,
            len,
        })
    }

    /// Give the memory back. Equivalent to dropping the buffer.
    pub fn release(self) {
        drop(self);
    }

    /// Allocate a buffer, hand it to `f`, and release it when `f` returns.
    pub fn scoped<R>(
        width: u32,
        height: u32,
        f: impl FnOnce(&mut PixelBuffer) -> R,
    ) -> Result<R, PixelError> {
        let mut buf = Self::allocate(width, height)?;
        Ok(f(&mut buf))
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// `(width, height)`.
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Byte length, `width * height * 4`.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Packed RGBA8 bytes, row-major.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &bytemuck::cast_slice::<Block, u8>(&self.blocks)[..self.len]
    }

    #[inline]
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut bytemuck::cast_slice_mut::<Block, u8>(&mut self.blocks)[..self.len]
    }

    /// The pixel at `(x, y)`, or `None` outside the image.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        let b = self.as_bytes();
        Some([b[i], b[i + 1], b[i + 2], b[i + 3]])
    }

    /// Set every pixel to `(r, g, b, a)`.
    pub fn fill(&mut self, r: u8, g: u8, b: u8, a: u8) {
        fill_auto(self.as_bytes_mut(), [r, g, b, a]);
    }

    /// Overwrite this buffer with `src`, which must have the same dimensions.
    pub fn copy_from(&mut self, src: &PixelBuffer) -> Result<(), PixelError> {
        if src.dimensions() != self.dimensions() {
            return Err(PixelError::DimensionMismatch {
                expected: self.dimensions(),
                actual: src.dimensions(),
            });
        }
        self.as_bytes_mut().copy_from_slice(src.as_bytes());
        Ok(())
    }

    /// Place `src` at `(x, y)` and combine overlapping pixels per `mode`.
    pub fn composite_from(&mut self, mode: CompositeMode, src: &PixelBuffer, x: i32, y: i32) {
        let (width, height) = self.dimensions();
        composite::place(
            mode,
            self.as_bytes_mut(),
            width,
            height,
            src.as_bytes(),
            src.width,
            src.height,
            x,
            y,
        );
    }

    /// Copy `src` onto this buffer at `(x, y)`, clipped.
    pub fn blit_from(&mut self, src: &PixelBuffer, x: i32, y: i32) {
        self.composite_from(CompositeMode::Opaque, src, x, y);
    }

    /// Copy the colour channels of `src` at `(x, y)`, keeping this buffer's alpha.
    pub fn copy_rgb_from(&mut self, src: &PixelBuffer, x: i32, y: i32) {
        self.composite_from(CompositeMode::RgbOnly, src, x, y);
    }

    /// Alpha-blend `overlay` onto this buffer at `(x, y)`, clipped.
    pub fn blend_from(&mut self, overlay: &PixelBuffer, x: i32, y: i32) {
        self.composite_from(CompositeMode::AlphaBlend, overlay, x, y);
    }

    /// Nearest-neighbour resample of this buffer into `dst` at `dst`'s size.
    pub fn resize_into(&self, dst: &mut PixelBuffer) {
        let (dw, dh) = dst.dimensions();
        resize_auto(
            self.as_bytes(),
            dst.as_bytes_mut(),
            self.width as usize,
            self.height as usize,
            dw as usize,
            dh as usize,
        );
    }

    /// A new `width × height` buffer holding a nearest-neighbour resample.
    pub fn resized(&self, width: u32, height: u32) -> Result<PixelBuffer, PixelError> {
        let mut out = PixelBuffer::allocate(width, height)?;
        self.resize_into(&mut out);
        Ok(out)
    }
}

impl Drop for PixelBuffer {
    fn drop(&mut self) {
        log::trace!(
            "rgbablit: released {}x{} buffer ({} bytes)",
            self.width,
            self.height,
            self.len
        );
    }
}

impl fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("len", &self.len)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn allocates_zeroed_and_aligned() {
        let buf = PixelBuffer::allocate(13, 7).unwrap();
        assert_eq!(buf.len(), 13 * 7 * 4);
        assert_eq!(buf.as_bytes().len(), buf.len());
        assert!(buf.as_bytes().iter().all(|&b| b == 0));
        assert_eq!(buf.as_bytes().as_ptr() as usize % 32, 0);
        buf.release();
    }

    #[test_log::test]
    fn zero_sized_buffers() {
        for (w, h) in [(0, 0), (0, 5), (5, 0)] {
            let mut buf = PixelBuffer::allocate(w, h).unwrap();
            assert!(buf.is_empty());
            buf.fill(1, 2, 3, 4);
            assert_eq!(buf.pixel(0, 0), None);
        }
    }

    #[test_log::test]
    fn oversized_allocation_is_an_error() {
        let err = PixelBuffer::allocate(u32::MAX, u32::MAX).unwrap_err();
        assert!(matches!(
            err,
            PixelError::DimensionsOverflow { .. } | PixelError::AllocationFailed { .. }
        ));
    }

    #[test_log::test]
    fn scoped_releases_after_closure() {
        let corner = PixelBuffer::scoped(4, 4, |buf| {
            buf.fill(10, 20, 30, 40);
            buf.pixel(3, 3)
        })
        .unwrap();
        assert_eq!(corner, Some([10, 20, 30, 40]));
    }

    #[test_log::test]
    fn copy_from_requires_matching_dimensions() {
        let mut a = PixelBuffer::allocate(3, 2).unwrap();
        let mut b = PixelBuffer::allocate(3, 2).unwrap();
        b.fill(9, 8, 7, 6);
        a.copy_from(&b).unwrap();
        assert_eq!(a.as_bytes(), b.as_bytes());

        let c = PixelBuffer::allocate(2, 3).unwrap();
        assert_eq!(
            a.copy_from(&c),
            Err(PixelError::DimensionMismatch {
                expected: (3, 2),
                actual: (2, 3)
            })
        );
    }

    #[test_log::test]
    fn blend_and_blit_clip_to_destination() {
        let mut dest = PixelBuffer::allocate(4, 4).unwrap();
        dest.fill(255, 0, 0, 255);
        let mut overlay = PixelBuffer::allocate(4, 4).unwrap();
        overlay.fill(0, 255, 0, 128);

        dest.blend_from(&overlay, 2, 2);
        assert_eq!(dest.pixel(3, 3), Some([127, 128, 0, 191]));
        assert_eq!(dest.pixel(1, 3), Some([255, 0, 0, 255]));

        dest.blit_from(&overlay, -3, -3);
        assert_eq!(dest.pixel(0, 0), Some([0, 255, 0, 128]));
        assert_eq!(dest.pixel(1, 0), Some([255, 0, 0, 255]));

        dest.copy_rgb_from(&overlay, 3, 0);
        assert_eq!(dest.pixel(3, 0), Some([0, 255, 0, 255]));
    }

    #[test_log::test]
    fn resized_keeps_source_dimensions() {
        let mut src = PixelBuffer::allocate(2, 1).unwrap();
        src.as_bytes_mut().copy_from_slice(&[1, 1, 1, 1, 2, 2, 2, 2]);
        let big = src.resized(4, 2).unwrap();
        assert_eq!(src.dimensions(), (2, 1));
        assert_eq!(big.dimensions(), (4, 2));
        assert_eq!(big.pixel(1, 1), Some([1, 1, 1, 1]));
        assert_eq!(big.pixel(2, 0), Some([2, 2, 2, 2]));

        let empty = src.resized(0, 3).unwrap();
        assert!(empty.is_empty());
    }

    #[test_log::test]
    fn debug_shows_dimensions() {
        use alloc::format;
        let buf = PixelBuffer::allocate(2, 3).unwrap();
        assert_eq!(format!("{buf:?}"), "PixelBuffer { width: 2, height: 3, len: 24, .. }");
    }
}
