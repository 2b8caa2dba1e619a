use core::arch::aarch64::{
    uint8x16_t, vaddq_u16, vbslq_u8, vcombine_u8, vdupq_n_u16, vdupq_n_u32, vget_low_u8,
    vmlal_high_u8, vmlal_u8, vmovn_u16, vmull_high_u8, vmull_u8, vmvnq_u8, vqtbl1q_u8,
    vreinterpretq_u8_u32, vsetq_lane_u32, vshrq_n_u16,
};

use archmage::prelude::*;
use safe_unaligned_simd::aarch64::{vld1q_u8, vst1q_u8};

use super::{blend_px, column_map, load_px, source_index};
use crate::composite::CompositeMode;
use crate::geometry::Clip;

// ===========================================================================
// SIMD constants
// ===========================================================================

const ALPHA_BROADCAST_IDX: [u8; 16] = [3, 3, 3, 3, 7, 7, 7, 7, 11, 11, 11, 11, 15, 15, 15, 15];

const RGB_SELECT_MASK: [u8; 16] = [
    0xFF, 0xFF, 0xFF, 0, 0xFF, 0xFF, 0xFF, 0, 0xFF, 0xFF, 0xFF, 0, 0xFF, 0xFF, 0xFF, 0,
];

// ===========================================================================
// ARM NEON — rite row implementations
// ===========================================================================

#[rite]
pub(super) fn fill_row_arm_v2(_token: Arm64V2Token, row: &mut [u8], px: [u8; 4]) {
    let mut pattern = [0u8; 16];
    for d in pattern.as_chunks_mut::<4>().0 {
        *d = px;
    }
    let v = vld1q_u8(&pattern);
    let (blocks, tail) = row.as_chunks_mut::<16>();
    for out in blocks {
        vst1q_u8(out, v);
    }
    for d in tail.as_chunks_mut::<4>().0 {
        *d = px;
    }
}

#[rite]
pub(super) fn copy_row_arm_v2(_token: Arm64V2Token, src: &[u8], dst: &mut [u8]) {
    let (s_blocks, s_tail) = src.as_chunks::<16>();
    let (d_blocks, d_tail) = dst.as_chunks_mut::<16>();
    for (s, d) in s_blocks.iter().zip(d_blocks) {
        vst1q_u8(d, vld1q_u8(s));
    }
    d_tail.copy_from_slice(s_tail);
}

#[rite]
pub(super) fn copy_rgb_row_arm_v2(_token: Arm64V2Token, src: &[u8], dst: &mut [u8]) {
    let mask = vld1q_u8(&RGB_SELECT_MASK);
    let (s_blocks, s_tail) = src.as_chunks::<16>();
    let (d_blocks, d_tail) = dst.as_chunks_mut::<16>();
    for (s, d) in s_blocks.iter().zip(d_blocks) {
        let sv = vld1q_u8(s);
        let dv = vld1q_u8(&*d);
        vst1q_u8(d, vbslq_u8(mask, sv, dv));
    }
    for (s, d) in s_tail.chunks_exact(4).zip(d_tail.chunks_exact_mut(4)) {
        d[..3].copy_from_slice(&s[..3]);
    }
}

/// Four pixels at once. `a` holds each overlay pixel's alpha in all four
/// of its channels.
#[rite]
fn blend_block_arm_v2(
    _token: Arm64V2Token,
    ov: uint8x16_t,
    d: uint8x16_t,
    a: uint8x16_t,
) -> uint8x16_t {
    let inv = vmvnq_u8(a);
    let bias = vdupq_n_u16(127);
    let one = vdupq_n_u16(1);

    let lo = vmull_u8(vget_low_u8(ov), vget_low_u8(a));
    let lo = vaddq_u16(vmlal_u8(lo, vget_low_u8(d), vget_low_u8(inv)), bias);
    let hi = vmull_high_u8(ov, a);
    let hi = vaddq_u16(vmlal_high_u8(hi, d, inv), bias);

    // v / 255 for v <= 65152
    let lo = vshrq_n_u16::<8>(vaddq_u16(vaddq_u16(lo, one), vshrq_n_u16::<8>(lo)));
    let hi = vshrq_n_u16::<8>(vaddq_u16(vaddq_u16(hi, one), vshrq_n_u16::<8>(hi)));
    vcombine_u8(vmovn_u16(lo), vmovn_u16(hi))
}

#[rite]
pub(super) fn blend_row_arm_v2(token: Arm64V2Token, overlay: &[u8], dst: &mut [u8]) {
    let idx = vld1q_u8(&ALPHA_BROADCAST_IDX);
    let (o_blocks, o_tail) = overlay.as_chunks::<16>();
    let (d_blocks, d_tail) = dst.as_chunks_mut::<16>();
    for (o, d) in o_blocks.iter().zip(d_blocks) {
        let ov = vld1q_u8(o);
        let dv = vld1q_u8(&*d);
        let a = vqtbl1q_u8(ov, idx);
        vst1q_u8(d, blend_block_arm_v2(token, ov, dv, a));
    }
    for (ov, d) in o_tail.chunks_exact(4).zip(d_tail.chunks_exact_mut(4)) {
        blend_px(ov, d);
    }
}

#[rite]
pub(super) fn resize_row_arm_v2(
    _token: Arm64V2Token,
    src_row: &[u8],
    dst: &mut [u8],
    cols: &[usize],
) {
    let px = |i: usize| u32::from_ne_bytes(load_px(src_row, cols[i]));
    let (d_blocks, d_tail) = dst.as_chunks_mut::<16>();
    let mut x = 0;
    for d in d_blocks {
        let v = vdupq_n_u32(px(x));
        let v = vsetq_lane_u32::<1>(px(x + 1), v);
        let v = vsetq_lane_u32::<2>(px(x + 2), v);
        let v = vsetq_lane_u32::<3>(px(x + 3), v);
        vst1q_u8(d, vreinterpretq_u8_u32(v));
        x += 4;
    }
    for (&sx, d) in cols[x..].iter().zip(d_tail.chunks_exact_mut(4)) {
        d.copy_from_slice(&src_row[sx..sx + 4]);
    }
}

// ===========================================================================
// ARM arcane whole-operation wrappers
// ===========================================================================

#[arcane]
pub(super) fn fill_impl_arm_v2(t: Arm64V2Token, buf: &mut [u8], px: [u8; 4]) {
    fill_row_arm_v2(t, buf, px);
}

#[arcane]
pub(super) fn composite_impl_arm_v2(
    t: Arm64V2Token,
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
            CompositeMode::Opaque => copy_row_arm_v2(t, s, d),
            CompositeMode::AlphaBlend => blend_row_arm_v2(t, s, d),
            CompositeMode::RgbOnly => copy_rgb_row_arm_v2(t, s, d),
        }
    }
}

#[arcane]
pub(super) fn resize_impl_arm_v2(
    t: Arm64V2Token,
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
            copy_row_arm_v2(t, src_row, dst_row);
        } else {
            resize_row_arm_v2(t, src_row, dst_row, &cols);
        }
        prev = sy;
    }
}
