// ---------------------------------------------------------------------------
// Fill, blit, blend and resize over packed RGBA8 buffers with SIMD dispatch.
//
// Architecture: #[rite] row functions contain the SIMD loops.
// #[arcane] wrappers walk the rows of one operation and are the dispatch
// targets: incant! for automatic selection, on_backend! for an explicit
// Backend.
// ---------------------------------------------------------------------------

use alloc::vec::Vec;

use archmage::incant;
use archmage::prelude::*;

use crate::composite::{self, CompositeMode};
use crate::geometry::Clip;
use crate::{Backend, PixelError, image_len};

mod scalar;
use scalar::*;

#[cfg(target_arch = "x86_64")]
mod avx2;
#[cfg(target_arch = "x86_64")]
use avx2::*;

#[cfg(target_arch = "aarch64")]
mod neon;
#[cfg(target_arch = "aarch64")]
use neon::*;


// ===========================================================================
// Explicit-backend dispatch
// ===========================================================================

/// Run `<func>_scalar`, `<func>_v3` or `<func>_arm_v2` for `$backend`,
/// summoning the matching token. Evaluates to `Result<(), PixelError>`.
macro_rules! on_backend {
    ($backend:expr, $func:ident($($arg:expr),* $(,)?)) => {
        paste::paste! {
            match $backend {
                Backend::Scalar => {
                    [<$func _scalar>](ScalarToken, $($arg),*);
                    Ok(())
                }
                #[cfg(target_arch = "x86_64")]
                Backend::WideX86 => match <archmage::X64V3Token as archmage::SimdToken>::summon() {
                    Some(token) => {
                        [<$func _v3>](token, $($arg),*);
                        Ok(())
                    }
                    None => Err(PixelError::UnsupportedBackend(Backend::WideX86)),
                },
                #[cfg(target_arch = "aarch64")]
                Backend::WideArm => match <archmage::Arm64V2Token as archmage::SimdToken>::summon() {
                    Some(token) => {
                        [<$func _arm_v2>](token, $($arg),*);
                        Ok(())
                    }
                    None => Err(PixelError::UnsupportedBackend(Backend::WideArm)),
                },
                #[allow(unreachable_patterns)]
                other => Err(PixelError::UnsupportedBackend(other)),
            }
        }
    };
}

/// Refuse a backend the running CPU cannot execute.
#[inline]
pub(crate) fn require(backend: Backend) -> Result<(), PixelError> {
    if backend.is_supported() {
        Ok(())
    } else {
        log::warn!("rgbablit: refusing to run on unsupported {backend} backend");
        Err(PixelError::UnsupportedBackend(backend))
    }
}

// ===========================================================================
// Validation helpers
// ===========================================================================

/// Check that `len` covers a packed `width × height` image and return the
/// exact byte length of that image.
#[inline]
pub(crate) fn check_image(len: usize, width: u32, height: u32) -> Result<usize, PixelError> {
    let needed = image_len(width, height)?;
    if len < needed {
        return Err(PixelError::BufferTooSmall {
            needed,
            actual: len,
        });
    }
    Ok(needed)
}

// ===========================================================================
// Per-pixel arithmetic shared by every backend's scalar tail
// ===========================================================================

/// Straight-alpha blend of one channel: `(ov*a + d*(255-a) + 127) / 255`.
///
/// Applied to all four channels, alpha included, with `a` the overlay's
/// alpha byte. SIMD kernels evaluate the same quotient as
/// `(v + 1 + (v >> 8)) >> 8`, which is exact for every `v` this can produce.
#[inline(always)]
pub const fn blend_channel(ov: u8, d: u8, a: u8) -> u8 {
    let a = a as u32;
    let v = ov as u32 * a + d as u32 * (255 - a) + 127;
    (v / 255) as u8
}

#[inline(always)]
fn blend_px(ov: &[u8], d: &mut [u8]) {
    let a = ov[3];
    match a {
        0 => {}
        255 => d[..4].copy_from_slice(&ov[..4]),
        _ => {
            for c in 0..4 {
                d[c] = blend_channel(ov[c], d[c], a);
            }
        }
    }
}

#[inline(always)]
fn load_px(row: &[u8], offset: usize) -> [u8; 4] {
    [row[offset], row[offset + 1], row[offset + 2], row[offset + 3]]
}

/// Byte offset in a source row for every destination column.
fn column_map(src_width: usize, dst_width: usize) -> Vec<usize> {
    (0..dst_width)
        .map(|x| source_index(x, src_width, dst_width) * 4)
        .collect()
}

/// `(i * src_len) / dst_len` without overflow.
#[inline(always)]
fn source_index(i: usize, src_len: usize, dst_len: usize) -> usize {
    ((i as u64 * src_len as u64) / dst_len as u64) as usize
}

// ===========================================================================
// Crate-internal entry points (sizes already validated)
// ===========================================================================

pub(crate) fn fill_auto(buf: &mut [u8], px: [u8; 4]) {
    incant!(fill_impl(buf, px), [v3, arm_v2, scalar]);
}

pub(crate) fn fill_on(backend: Backend, buf: &mut [u8], px: [u8; 4]) -> Result<(), PixelError> {
    on_backend!(backend, fill_impl(buf, px))
}

pub(crate) fn composite_auto(
    mode: CompositeMode,
    dest: &mut [u8],
    dest_width: usize,
    src: &[u8],
    src_width: usize,
    clip: Clip,
) {
    incant!(
        composite_impl(mode, dest, dest_width, src, src_width, clip),
        [v3, arm_v2, scalar]
    );
}

pub(crate) fn composite_on(
    backend: Backend,
    mode: CompositeMode,
    dest: &mut [u8],
    dest_width: usize,
    src: &[u8],
    src_width: usize,
    clip: Clip,
) -> Result<(), PixelError> {
    on_backend!(
        backend,
        composite_impl(mode, dest, dest_width, src, src_width, clip)
    )
}

pub(crate) fn resize_auto(
    src: &[u8],
    dst: &mut [u8],
    src_width: usize,
    src_height: usize,
    dst_width: usize,
    dst_height: usize,
) {
    if src_width == 0 || src_height == 0 || dst_width == 0 || dst_height == 0 {
        return;
    }
    incant!(
        resize_impl(src, dst, src_width, src_height, dst_width, dst_height),
        [v3, arm_v2, scalar]
    );
}

pub(crate) fn resize_on(
    backend: Backend,
    src: &[u8],
    dst: &mut [u8],
    src_width: usize,
    src_height: usize,
    dst_width: usize,
    dst_height: usize,
) -> Result<(), PixelError> {
    if src_width == 0 || src_height == 0 || dst_width == 0 || dst_height == 0 {
        return Ok(());
    }
    on_backend!(
        backend,
        resize_impl(src, dst, src_width, src_height, dst_width, dst_height)
    )
}

// ===========================================================================
// Public API — fill
// ===========================================================================

/// Write the pixel `(r, g, b, a)` to all `width × height` pixels of `buf`.
///
/// Bytes past `width * height * 4` are left alone.
pub fn fill(
    buf: &mut [u8],
    width: u32,
    height: u32,
    r: u8,
    g: u8,
    b: u8,
    a: u8,
) -> Result<(), PixelError> {
    let n = check_image(buf.len(), width, height)?;
    fill_auto(&mut buf[..n], [r, g, b, a]);
    Ok(())
}

/// [`fill`] on an explicit backend.
#[allow(clippy::too_many_arguments)]
pub fn fill_with(
    backend: Backend,
    buf: &mut [u8],
    width: u32,
    height: u32,
    r: u8,
    g: u8,
    b: u8,
    a: u8,
) -> Result<(), PixelError> {
    require(backend)?;
    let n = check_image(buf.len(), width, height)?;
    fill_on(backend, &mut buf[..n], [r, g, b, a])
}

// ===========================================================================
// Public API — same-size copies
// ===========================================================================

/// Copy a whole `width × height` RGBA8 image from `src` into `dest`.
pub fn copy(dest: &mut [u8], src: &[u8], width: u32, height: u32) -> Result<(), PixelError> {
    blit_same_size(src, dest, width, height, 4)
}

/// Copy `width * height * channels` bytes from `src` to `dst`.
///
/// `channels` is the byte stride of one pixel, so the same call serves RGBA,
/// RGB or single-channel images of identical shape.
pub fn blit_same_size(
    src: &[u8],
    dst: &mut [u8],
    width: u32,
    height: u32,
    channels: u32,
) -> Result<(), PixelError> {
    let n = (width as usize)
        .checked_mul(height as usize)
        .and_then(|px| px.checked_mul(channels as usize))
        .ok_or(PixelError::DimensionsOverflow { width, height })?;
    for len in [src.len(), dst.len()] {
        if len < n {
            return Err(PixelError::BufferTooSmall {
                needed: n,
                actual: len,
            });
        }
    }
    dst[..n].copy_from_slice(&src[..n]);
    Ok(())
}

// ===========================================================================
// Public API — clipped operations
// ===========================================================================

/// Copy every pixel of `src` placed at `(start_x, start_y)` that lands
/// inside `dest`, all four channels.
#[allow(clippy::too_many_arguments)]
pub fn blit(
    dest: &mut [u8],
    dest_width: u32,
    dest_height: u32,
    src: &[u8],
    src_width: u32,
    src_height: u32,
    start_x: i32,
    start_y: i32,
) -> Result<(), PixelError> {
    composite::composite(
        CompositeMode::Opaque,
        dest,
        dest_width,
        dest_height,
        src,
        src_width,
        src_height,
        start_x,
        start_y,
    )
}

/// [`blit`] on an explicit backend.
#[allow(clippy::too_many_arguments)]
pub fn blit_with(
    backend: Backend,
    dest: &mut [u8],
    dest_width: u32,
    dest_height: u32,
    src: &[u8],
    src_width: u32,
    src_height: u32,
    start_x: i32,
    start_y: i32,
) -> Result<(), PixelError> {
    composite::composite_with(
        backend,
        CompositeMode::Opaque,
        dest,
        dest_width,
        dest_height,
        src,
        src_width,
        src_height,
        start_x,
        start_y,
    )
}

/// Like [`blit`], but only R, G and B are written; every destination
/// pixel keeps its alpha byte.
#[allow(clippy::too_many_arguments)]
pub fn copy_diff_size_no_alpha(
    dest: &mut [u8],
    dest_width: u32,
    dest_height: u32,
    src: &[u8],
    src_width: u32,
    src_height: u32,
    start_x: i32,
    start_y: i32,
) -> Result<(), PixelError> {
    composite::composite(
        CompositeMode::RgbOnly,
        dest,
        dest_width,
        dest_height,
        src,
        src_width,
        src_height,
        start_x,
        start_y,
    )
}

/// [`copy_diff_size_no_alpha`] on an explicit backend.
#[allow(clippy::too_many_arguments)]
pub fn copy_diff_size_no_alpha_with(
    backend: Backend,
    dest: &mut [u8],
    dest_width: u32,
    dest_height: u32,
    src: &[u8],
    src_width: u32,
    src_height: u32,
    start_x: i32,
    start_y: i32,
) -> Result<(), PixelError> {
    composite::composite_with(
        backend,
        CompositeMode::RgbOnly,
        dest,
        dest_width,
        dest_height,
        src,
        src_width,
        src_height,
        start_x,
        start_y,
    )
}

/// Alpha-blend `overlay` onto `dest` at `(start_x, start_y)`.
///
/// Straight (non-premultiplied) alpha. Each channel, alpha included,
/// becomes [`blend_channel`]`(overlay, dest, overlay_alpha)`. Overlay
/// pixels with alpha 0 leave the destination untouched; alpha 255 replaces it.
#[allow(clippy::too_many_arguments)]
pub fn blend(
    dest: &mut [u8],
    overlay: &[u8],
    dest_width: u32,
    dest_height: u32,
    overlay_width: u32,
    overlay_height: u32,
    start_x: i32,
    start_y: i32,
) -> Result<(), PixelError> {
    composite::composite(
        CompositeMode::AlphaBlend,
        dest,
        dest_width,
        dest_height,
        overlay,
        overlay_width,
        overlay_height,
        start_x,
        start_y,
    )
}

/// [`blend`] on an explicit backend.
#[allow(clippy::too_many_arguments)]
pub fn blend_with(
    backend: Backend,
    dest: &mut [u8],
    overlay: &[u8],
    dest_width: u32,
    dest_height: u32,
    overlay_width: u32,
    overlay_height: u32,
    start_x: i32,
    start_y: i32,
) -> Result<(), PixelError> {
    composite::composite_with(
        backend,
        CompositeMode::AlphaBlend,
        dest,
        dest_width,
        dest_height,
        overlay,
        overlay_width,
        overlay_height,
        start_x,
        start_y,
    )
}

// ===========================================================================
// Public API — resize
// ===========================================================================

/// Nearest-neighbour resample of `src` into `dst`.
///
/// Destination pixel `(x, y)` takes source pixel
/// `(x * src_width / dst_width, y * src_height / dst_height)`, integer
/// division. Any zero dimension makes this a no-op.
pub fn nearest_neighbor_resize(
    src: &[u8],
    dst: &mut [u8],
    src_width: u32,
    src_height: u32,
    dst_width: u32,
    dst_height: u32,
) -> Result<(), PixelError> {
    check_image(src.len(), src_width, src_height)?;
    let n = check_image(dst.len(), dst_width, dst_height)?;
    resize_auto(
        src,
        &mut dst[..n],
        src_width as usize,
        src_height as usize,
        dst_width as usize,
        dst_height as usize,
    );
    Ok(())
}

/// [`nearest_neighbor_resize`] on an explicit backend.
pub fn nearest_neighbor_resize_with(
    backend: Backend,
    src: &[u8],
    dst: &mut [u8],
    src_width: u32,
    src_height: u32,
    dst_width: u32,
    dst_height: u32,
) -> Result<(), PixelError> {
    require(backend)?;
    check_image(src.len(), src_width, src_height)?;
    let n = check_image(dst.len(), dst_width, dst_height)?;
    resize_on(
        backend,
        src,
        &mut dst[..n],
        src_width as usize,
        src_height as usize,
        dst_width as usize,
        dst_height as usize,
    )
}

// ===========================================================================
// Aliases — named backend variants
// ===========================================================================

/// Alias for [`fill_with`]`(Backend::Scalar, ..)`.
#[inline(always)]
pub fn fill_scalar(
    buf: &mut [u8],
    width: u32,
    height: u32,
    r: u8,
    g: u8,
    b: u8,
    a: u8,
) -> Result<(), PixelError> {
    fill_with(Backend::Scalar, buf, width, height, r, g, b, a)
}

/// Alias for [`fill_with`]`(Backend::WideX86, ..)`.
#[inline(always)]
pub fn fill_avx2(
    buf: &mut [u8],
    width: u32,
    height: u32,
    r: u8,
    g: u8,
    b: u8,
    a: u8,
) -> Result<(), PixelError> {
    fill_with(Backend::WideX86, buf, width, height, r, g, b, a)
}

/// Alias for [`fill_with`]`(Backend::WideArm, ..)`.
#[inline(always)]
pub fn fill_neon(
    buf: &mut [u8],
    width: u32,
    height: u32,
    r: u8,
    g: u8,
    b: u8,
    a: u8,
) -> Result<(), PixelError> {
    fill_with(Backend::WideArm, buf, width, height, r, g, b, a)
}

/// Alias for [`blit_with`]`(Backend::Scalar, ..)`.
#[inline(always)]
#[allow(clippy::too_many_arguments)]
pub fn blit_scalar(
    dest: &mut [u8],
    dest_width: u32,
    dest_height: u32,
    src: &[u8],
    src_width: u32,
    src_height: u32,
    start_x: i32,
    start_y: i32,
) -> Result<(), PixelError> {
    blit_with(
        Backend::Scalar,
        dest,
        dest_width,
        dest_height,
        src,
        src_width,
        src_height,
        start_x,
        start_y,
    )
}

/// Alias for [`blit_with`]`(Backend::WideX86, ..)`.
#[inline(always)]
#[allow(clippy::too_many_arguments)]
pub fn blit_avx2(
    dest: &mut [u8],
    dest_width: u32,
    dest_height: u32,
    src: &[u8],
    src_width: u32,
    src_height: u32,
    start_x: i32,
    start_y: i32,
) -> Result<(), PixelError> {
    blit_with(
        Backend::WideX86,
        dest,
        dest_width,
        dest_height,
        src,
        src_width,
        src_height,
        start_x,
        start_y,
    )
}

/// Alias for [`blit_with`]`(Backend::WideArm, ..)`.
#[inline(always)]
#[allow(clippy::too_many_arguments)]
pub fn blit_neon(
    dest: &mut [u8],
    dest_width: u32,
    dest_height: u32,
    src: &[u8],
    src_width: u32,
    src_height: u32,
    start_x: i32,
    start_y: i32,
) -> Result<(), PixelError> {
    blit_with(
        Backend::WideArm,
        dest,
        dest_width,
        dest_height,
        src,
        src_width,
        src_height,
        start_x,
        start_y,
    )
}

/// Alias for [`copy_diff_size_no_alpha_with`]`(Backend::Scalar, ..)`.
#[inline(always)]
#[allow(clippy::too_many_arguments)]
pub fn copy_diff_size_no_alpha_scalar(
    dest: &mut [u8],
    dest_width: u32,
    dest_height: u32,
    src: &[u8],
    src_width: u32,
    src_height: u32,
    start_x: i32,
    start_y: i32,
) -> Result<(), PixelError> {
    copy_diff_size_no_alpha_with(
        Backend::Scalar,
        dest,
        dest_width,
        dest_height,
        src,
        src_width,
        src_height,
        start_x,
        start_y,
    )
}

/// Alias for [`copy_diff_size_no_alpha_with`]`(Backend::WideX86, ..)`.
#[inline(always)]
#[allow(clippy::too_many_arguments)]
pub fn copy_diff_size_no_alpha_avx2(
    dest: &mut [u8],
    dest_width: u32,
    dest_height: u32,
    src: &[u8],
    src_width: u32,
    src_height: u32,
    start_x: i32,
    start_y: i32,
) -> Result<(), PixelError> {
    copy_diff_size_no_alpha_with(
        Backend::WideX86,
        dest,
        dest_width,
        dest_height,
        src,
        src_width,
        src_height,
        start_x,
        start_y,
    )
}

/// Alias for [`copy_diff_size_no_alpha_with`]`(Backend::WideArm, ..)`.
#[inline(always)]
#[allow(clippy::too_many_arguments)]
pub fn copy_diff_size_no_alpha_neon(
    dest: &mut [u8],
    dest_width: u32,
    dest_height: u32,
    src: &[u8],
    src_width: u32,
    src_height: u32,
    start_x: i32,
    start_y: i32,
) -> Result<(), PixelError> {
    copy_diff_size_no_alpha_with(
        Backend::WideArm,
        dest,
        dest_width,
        dest_height,
        src,
        src_width,
        src_height,
        start_x,
        start_y,
    )
}

/// Alias for [`blend_with`]`(Backend::Scalar, ..)`.
#[inline(always)]
#[allow(clippy::too_many_arguments)]
pub fn blend_scalar(
    dest: &mut [u8],
    overlay: &[u8],
    dest_width: u32,
    dest_height: u32,
    overlay_width: u32,
    overlay_height: u32,
    start_x: i32,
    start_y: i32,
) -> Result<(), PixelError> {
    blend_with(
        Backend::Scalar,
        dest,
        overlay,
        dest_width,
        dest_height,
        overlay_width,
        overlay_height,
        start_x,
        start_y,
    )
}

/// Alias for [`blend_with`]`(Backend::WideX86, ..)`.
#[inline(always)]
#[allow(clippy::too_many_arguments)]
pub fn blend_avx2(
    dest: &mut [u8],
    overlay: &[u8],
    dest_width: u32,
    dest_height: u32,
    overlay_width: u32,
    overlay_height: u32,
    start_x: i32,
    start_y: i32,
) -> Result<(), PixelError> {
    blend_with(
        Backend::WideX86,
        dest,
        overlay,
        dest_width,
        dest_height,
        overlay_width,
        overlay_height,
        start_x,
        start_y,
    )
}

/// Alias for [`blend_with`]`(Backend::WideArm, ..)`.
#[inline(always)]
#[allow(clippy::too_many_arguments)]
pub fn blend_neon(
    dest: &mut [u8],
    overlay: &[u8],
    dest_width: u32,
    dest_height: u32,
    overlay_width: u32,
    overlay_height: u32,
    start_x: i32,
    start_y: i32,
) -> Result<(), PixelError> {
    blend_with(
        Backend::WideArm,
        dest,
        overlay,
        dest_width,
        dest_height,
        overlay_width,
        overlay_height,
        start_x,
        start_y,
    )
}

/// Alias for [`nearest_neighbor_resize_with`]`(Backend::Scalar, ..)`.
#[inline(always)]
pub fn nearest_neighbor_resize_scalar(
    src: &[u8],
    dst: &mut [u8],
    src_width: u32,
    src_height: u32,
    dst_width: u32,
    dst_height: u32,
) -> Result<(), PixelError> {
    nearest_neighbor_resize_with(
        Backend::Scalar,
        src,
        dst,
        src_width,
        src_height,
        dst_width,
        dst_height,
    )
}

/// Alias for [`nearest_neighbor_resize_with`]`(Backend::WideX86, ..)`.
#[inline(always)]
pub fn nearest_neighbor_resize_avx2(
    src: &[u8],
    dst: &mut [u8],
    src_width: u32,
    src_height: u32,
    dst_width: u32,
    dst_height: u32,
) -> Result<(), PixelError> {
    nearest_neighbor_resize_with(
        Backend::WideX86,
        src,
        dst,
        src_width,
        src_height,
        dst_width,
        dst_height,
    )
}

/// Alias for [`nearest_neighbor_resize_with`]`(Backend::WideArm, ..)`.
#[inline(always)]
pub fn nearest_neighbor_resize_neon(
    src: &[u8],
    dst: &mut [u8],
    src_width: u32,
    src_height: u32,
    dst_width: u32,
    dst_height: u32,
) -> Result<(), PixelError> {
    nearest_neighbor_resize_with(
        Backend::WideArm,
        src,
        dst,
        src_width,
        src_height,
        dst_width,
        dst_height,
    )
}
