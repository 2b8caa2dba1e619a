use archmage::prelude::*;

use super::{blend_px, column_map, source_index};
use crate::composite::CompositeMode;
use crate::geometry::Clip;

// ===========================================================================
// Scalar row implementations
// ===========================================================================

pub(super) fn fill_row_scalar(_token: ScalarToken, row: &mut [u8], px: [u8; 4]) {
    let (pixels, _) = row.as_chunks_mut::<4>();
    for d in pixels {
        *d = px;
    }
}

pub(super) fn copy_row_scalar(_token: ScalarToken, src: &[u8], dst: &mut [u8]) {
    dst.copy_from_slice(src);
}

pub(super) fn copy_rgb_row_scalar(_token: ScalarToken, src: &[u8], dst: &mut [u8]) {
    for (s, d) in src.chunks_exact(4).zip(dst.chunks_exact_mut(4)) {
        d[..3].copy_from_slice(&s[..3]);
    }
}

pub(super) fn blend_row_scalar(_token: ScalarToken, overlay: &[u8], dst: &mut [u8]) {
    for (ov, d) in overlay.chunks_exact(4).zip(dst.chunks_exact_mut(4)) {
        blend_px(ov, d);
    }
}

pub(super) fn resize_row_scalar(
    _token: ScalarToken,
    src_row: &[u8],
    dst: &mut [u8],
    cols: &[usize],
) {
    for (&sx, d) in cols.iter().zip(dst.chunks_exact_mut(4)) {
        d.copy_from_slice(&src_row[sx..sx + 4]);
    }
}

// ===========================================================================
// Scalar whole-operation wrappers
// ===========================================================================

pub(super) fn fill_impl_scalar(t: ScalarToken, buf: &mut [u8], px: [u8; 4]) {
    fill_row_scalar(t, buf, px);
}

pub(super) fn composite_impl_scalar(
    t: ScalarToken,
    mode: CompositeMode,
    dest: &mut [u8],
    dest_width: usize,
    src: &[u8],
    src_width: usize,
    clip: Clip,
) {
    let n = clip.row_bytes();
    for y in 0..clip.height {
        let s = &src[clip.src_offset(src_width, y)..][..n];
        let d = &mut dest[clip.dst_offset(dest_width, y)..][..n];
        match mode {
            CompositeMode::Opaque => copy_row_scalar(t, s, d),
            CompositeMode::AlphaBlend => blend_row_scalar(t, s, d),
            CompositeMode::RgbOnly => copy_rgb_row_scalar(t, s, d),
        }
    }
}

pub(super) fn resize_impl_scalar(
    t: ScalarToken,
    src: &[u8],
    dst: &mut [u8],
    sw: usize,
    sh: usize,
    dw: usize,
    dh: usize,
) {
    let src_stride = sw * 4;
    let dst_stride = dw * 4;
    let cols = column_map(sw, dw);
    let mut prev = usize::MAX;
    for y in 0..dh {
        let sy = source_index(y, sh, dh);
        let start = y * dst_stride;
        if sy == prev {
            dst.copy_within(start - dst_stride..start, start);
            continue;
        }
        let src_row = &src[sy * src_stride..][..src_stride];
        let dst_row = &mut dst[start..][..dst_stride];
        if sw == dw {
            copy_row_scalar(t, src_row, dst_row);
        } else {
            resize_row_scalar(t, src_row, dst_row, &cols);
        }
        prev = sy;
    }
}
