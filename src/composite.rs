// ---------------------------------------------------------------------------
// Clipped compositing — one entry point behind blit, blend and RGB-only copy.
// ---------------------------------------------------------------------------

use crate::geometry::{Clip, clip};
use crate::raster::{check_image, composite_auto, composite_on, require};
use crate::{Backend, PixelError};

/// How source pixels combine with the destination pixels they land on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CompositeMode {
    /// Replace all four channels.
    Opaque,
    /// Straight-alpha blend using the source pixel's alpha.
    AlphaBlend,
    /// Replace R, G and B; keep the destination alpha.
    RgbOnly,
}

/// Place `src` at `(start_x, start_y)` on `dest` and combine the overlapping
/// pixels according to `mode`.
///
/// Offsets may be negative or beyond the destination; only the intersection
/// is touched. An empty intersection is not an error.
#[allow(clippy::too_many_arguments)]
pub fn composite(
    mode: CompositeMode,
    dest: &mut [u8],
    dest_width: u32,
    dest_height: u32,
    src: &[u8],
    src_width: u32,
    src_height: u32,
    start_x: i32,
    start_y: i32,
) -> Result<(), PixelError> {
    check_image(dest.len(), dest_width, dest_height)?;
    check_image(src.len(), src_width, src_height)?;
    place(
        mode,
        dest,
        dest_width,
        dest_height,
        src,
        src_width,
        src_height,
        start_x,
        start_y,
    );
    Ok(())
}

/// [`composite`] for slices whose lengths are already known to be right.
#[allow(clippy::too_many_arguments)]
pub(crate) fn place(
    mode: CompositeMode,
    dest: &mut [u8],
    dest_width: u32,
    dest_height: u32,
    src: &[u8],
    src_width: u32,
    src_height: u32,
    start_x: i32,
    start_y: i32,
) {
    if let Some(c) = clip(dest_width, dest_height, src_width, src_height, start_x, start_y) {
        let c = coalesce(c, dest_width as usize, src_width as usize);
        composite_auto(mode, dest, dest_width as usize, src, src_width as usize, c);
    }
}

/// [`composite`] on an explicit backend.
#[allow(clippy::too_many_arguments)]
pub fn composite_with(
    backend: Backend,
    mode: CompositeMode,
    dest: &mut [u8],
    dest_width: u32,
    dest_height: u32,
    src: &[u8],
    src_width: u32,
    src_height: u32,
    start_x: i32,
    start_y: i32,
) -> Result<(), PixelError> {
    require(backend)?;
    check_image(dest.len(), dest_width, dest_height)?;
    check_image(src.len(), src_width, src_height)?;
    match clip(dest_width, dest_height, src_width, src_height, start_x, start_y) {
        Some(c) => {
            let c = coalesce(c, dest_width as usize, src_width as usize);
            composite_on(backend, mode, dest, dest_width as usize, src, src_width as usize, c)
        }
        None => Ok(()),
    }
}

/// Full-width rows that are contiguous in both images become one long row.
#[inline]
fn coalesce(c: Clip, dest_width: usize, src_width: usize) -> Clip {
    if c.height > 1 && c.width == dest_width && c.width == src_width {
        Clip {
            width: c.width * c.height,
            height: 1,
            ..c
        }
    } else {
        c
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coalesces_full_width_rows() {
        let c = clip(8, 8, 8, 3, 0, 2).unwrap();
        let merged = coalesce(c, 8, 8);
        assert_eq!(merged.height, 1);
        assert_eq!(merged.width, 24);
        assert_eq!(merged.dst_offset(8, 0), c.dst_offset(8, 0));
        assert_eq!(merged.src_offset(8, 0), c.src_offset(8, 0));
    }

    #[test]
    fn keeps_partial_rows() {
        let c = clip(8, 8, 4, 4, 2, 2).unwrap();
        assert_eq!(coalesce(c, 8, 4), c);
        let c = clip(8, 8, 10, 4, -1, 0).unwrap();
        assert_eq!(coalesce(c, 8, 10), c);
    }

    #[test]
    fn empty_intersection_is_ok() {
        let mut dest = [7u8; 16];
        let src = [1u8; 16];
        for mode in [CompositeMode::Opaque, CompositeMode::AlphaBlend, CompositeMode::RgbOnly] {
            composite(mode, &mut dest, 2, 2, &src, 2, 2, 5, 5).unwrap();
            composite_with(Backend::Scalar, mode, &mut dest, 2, 2, &src, 2, 2, -2, 0).unwrap();
        }
        assert_eq!(dest, [7u8; 16]);
    }

    #[test]
    fn validates_lengths_even_when_off_canvas() {
        let mut dest = [0u8; 16];
        let err = composite(CompositeMode::Opaque, &mut dest, 2, 2, &[0u8; 8], 2, 2, 100, 100);
        assert_eq!(err, Err(PixelError::BufferTooSmall { needed: 16, actual: 8 }));
    }
}
