// ---------------------------------------------------------------------------
// Placement clipping — projects a source rectangle onto a destination.
// ---------------------------------------------------------------------------

/// The region a clipped operation actually touches.
///
/// All coordinates are in pixels. `dst_x`/`dst_y` locate the region in the
/// destination, `src_x`/`src_y` locate the same region in the source.
/// `width` and `height` are never zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Clip {
    pub dst_x: usize,
    pub dst_y: usize,
    pub src_x: usize,
    pub src_y: usize,
    pub width: usize,
    pub height: usize,
}

impl Clip {
    /// Byte offset of the first pixel of clipped row `row` in the destination.
    #[inline]
    pub(crate) fn dst_offset(&self, dst_width: usize, row: usize) -> usize {
        ((self.dst_y + row) * dst_width + self.dst_x) * 4
    }

    /// Byte offset of the first pixel of clipped row `row` in the source.
    #[inline]
    pub(crate) fn src_offset(&self, src_width: usize, row: usize) -> usize {
        ((self.src_y + row) * src_width + self.src_x) * 4
    }

    /// Bytes per clipped row.
    #[inline]
    pub(crate) fn row_bytes(&self) -> usize {
        self.width * 4
    }
}

/// Intersect a `src_width × src_height` rectangle placed at
/// `(start_x, start_y)` with `[0, dst_width) × [0, dst_height)`.
///
/// Returns `None` when the intersection is empty, which callers treat as a
/// no-op. The arithmetic is done in `i64`, so extreme offsets such as
/// `i32::MIN` or `i32::MAX` with `u32::MAX` extents cannot overflow.
pub fn clip(
    dst_width: u32,
    dst_height: u32,
    src_width: u32,
    src_height: u32,
    start_x: i32,
    start_y: i32,
) -> Option<Clip> {
    let (dst_x, src_x, width) = clip_axis(dst_width, src_width, start_x)?;
    let (dst_y, src_y, height) = clip_axis(dst_height, src_height, start_y)?;
    Some(Clip {
        dst_x,
        dst_y,
        src_x,
        src_y,
        width,
        height,
    })
}

#[inline]
fn clip_axis(dst_len: u32, src_len: u32, start: i32) -> Option<(usize, usize, usize)> {
    let start = i64::from(start);
    let lo = start.max(0);
    let hi = (start + i64::from(src_len)).min(i64::from(dst_len));
    if lo >= hi {
        return None;
    }
    // lo, hi and lo - start all lie within [0, u32::MAX].
    Some((lo as usize, (lo - start) as usize, (hi - lo) as usize))
}
