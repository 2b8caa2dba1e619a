use core::arch::x86_64::__m256i;

use archmage::prelude::*;
use safe_unaligned_simd::x86_64::{_mm256_loadu_si256, _mm256_storeu_si256};

use super::{blend_px, column_map, load_px, source_index};
use crate::composite::CompositeMode;
use crate::geometry::Clip;

// ===========================================================================
// SIMD constants
// ===========================================================================

// High bit set on every alpha byte: blendv picks the destination there.
const ALPHA_SELECT_MASK_AVX: [i8; 32] = [
    0, 0, 0, -1, 0, 0, 0, -1, 0, 0, 0, -1, 0, 0, 0, -1, 0, 0, 0, -1, 0, 0, 0, -1, 0, 0, 0, -1, 0,
    0, 0, -1,
];

// ===========================================================================
// x86-64 AVX2 — rite row implementations
// ===========================================================================

#[rite]
pub(super) fn fill_row_v3(_token: X64V3Token, row: &mut [u8], px: [u8; 4]) {
    let mut pattern = [0u8; 32];
    for d in pattern.as_chunks_mut::<4>().0 {
        *d = px;
    }
    let v = _mm256_loadu_si256(&pattern);
    let (blocks, tail) = row.as_chunks_mut::<32>();
    for out in blocks {
        _mm256_storeu_si256(out, v);
    }
    for d in tail.as_chunks_mut::<4>().0 {
        *d = px;
    }
}

#[rite]
pub(super) fn copy_row_v3(_token: X64V3Token, src: &[u8], dst: &mut [u8]) {
    let (s_blocks, s_tail) = src.as_chunks::<32>();
    let (d_blocks, d_tail) = dst.as_chunks_mut::<32>();
    for (s, d) in s_blocks.iter().zip(d_blocks) {
        _mm256_storeu_si256(d, _mm256_loadu_si256(s));
    }
    d_tail.copy_from_slice(s_tail);
}

#[rite]
pub(super) fn copy_rgb_row_v3(_token: X64V3Token, src: &[u8], dst: &mut [u8]) {
    let mask = _mm256_loadu_si256(&ALPHA_SELECT_MASK_AVX);
    let (s_blocks, s_tail) = src.as_chunks::<32>();
    let (d_blocks, d_tail) = dst.as_chunks_mut::<32>();
    for (s, d) in s_blocks.iter().zip(d_blocks) {
        let sv = _mm256_loadu_si256(s);
        let dv = _mm256_loadu_si256(&*d);
        _mm256_storeu_si256(d, _mm256_blendv_epi8(sv, dv, mask));
    }
    for (s, d) in s_tail.chunks_exact(4).zip(d_tail.chunks_exact_mut(4)) {
        d[..3].copy_from_slice(&s[..3]);
    }
}

/// Blend one register of eight pixels, widened to 16 bits per channel.
///
/// `ov` and `d` hold two pixels per 128-bit lane, one channel per word.
#[rite]
fn blend_words_v3(_token: X64V3Token, ov: __m256i, d: __m256i) -> __m256i {
    // Broadcast word 3 of each 64-bit half (the pixel's alpha) across it.
    let a = _mm256_shufflehi_epi16(_mm256_shufflelo_epi16(ov, 0xFF), 0xFF);
    let inv = _mm256_sub_epi16(_mm256_set1_epi16(255), a);
    let v = _mm256_add_epi16(
        _mm256_add_epi16(_mm256_mullo_epi16(ov, a), _mm256_mullo_epi16(d, inv)),
        _mm256_set1_epi16(127),
    );
    // v / 255 for v <= 65152
    let v = _mm256_add_epi16(_mm256_add_epi16(v, _mm256_set1_epi16(1)), _mm256_srli_epi16(v, 8));
    _mm256_srli_epi16(v, 8)
}

#[rite]
pub(super) fn blend_row_v3(token: X64V3Token, overlay: &[u8], dst: &mut [u8]) {
    let zero = _mm256_setzero_si256();
    let (o_blocks, o_tail) = overlay.as_chunks::<32>();
    let (d_blocks, d_tail) = dst.as_chunks_mut::<32>();
    for (o, d) in o_blocks.iter().zip(d_blocks) {
        let ov = _mm256_loadu_si256(o);
        let dv = _mm256_loadu_si256(&*d);
        let lo = blend_words_v3(
            token,
            _mm256_unpacklo_epi8(ov, zero),
            _mm256_unpacklo_epi8(dv, zero),
        );
        let hi = blend_words_v3(
            token,
            _mm256_unpackhi_epi8(ov, zero),
            _mm256_unpackhi_epi8(dv, zero),
        );
        _mm256_storeu_si256(d, _mm256_packus_epi16(lo, hi));
    }
    for (ov, d) in o_tail.chunks_exact(4).zip(d_tail.chunks_exact_mut(4)) {
        blend_px(ov, d);
    }
}

#[rite]
pub(super) fn resize_row_v3(
    _token: X64V3Token,
    src_row: &[u8],
    dst: &mut [u8],
    cols: &[usize],
) {
    let px = |i: usize| i32::from_ne_bytes(load_px(src_row, cols[i]));
    let (d_blocks, d_tail) = dst.as_chunks_mut::<32>();
    let mut x = 0;
    for d in d_blocks {
        let v = _mm256_setr_epi32(
            px(x),
            px(x + 1),
            px(x + 2),
            px(x + 3),
            px(x + 4),
            px(x + 5),
            px(x + 6),
            px(x + 7),
        );
        _mm256_storeu_si256(d, v);
        x += 8;
    }
    for (&sx, d) in cols[x..].iter().zip(d_tail.chunks_exact_mut(4)) {
        d.copy_from_slice(&src_row[sx..sx + 4]);
    }
}

// ===========================================================================
// x86-64 arcane whole-operation wrappers
// ===========================================================================

#[arcane]
pub(super) fn fill_impl_v3(t: X64V3Token, buf: &mut [u8], px: [u8; 4]) {
    fill_row_v3(t, buf, px);
}

#[arcane]
pub(super) fn composite_impl_v3(
    t: X64V3Token,
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
            CompositeMode::Opaque => copy_row_v3(t, s, d),
            CompositeMode::AlphaBlend => blend_row_v3(t, s, d),
            CompositeMode::RgbOnly => copy_rgb_row_v3(t, s, d),
        }
    }
}

#[arcane]
pub(super) fn resize_impl_v3(
    t: X64V3Token,
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
            copy_row_v3(t, src_row, dst_row);
        } else {
            resize_row_v3(t, src_row, dst_row, &cols);
        }
        prev = sy;
    }
}
