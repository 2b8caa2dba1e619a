//! Typed entry points over [`rgb::Rgba<u8>`] pixels.
//!
//! Every function here reinterprets its slices as bytes with bytemuck and
//! forwards to the byte-level operation of the same name, so the same SIMD
//! kernels run underneath. Dimensions are still in pixels.
//!
//! ```rust
//! use rgb::Rgba;
//! use rgbablit::typed;
//!
//! let mut canvas = vec![Rgba::new(255u8, 0, 0, 255); 16];
//! let overlay = vec![Rgba::new(0u8, 255, 0, 128); 4];
//! typed::blend_pixels(&mut canvas, &overlay, 4, 4, 2, 2, 2, 2).unwrap();
//! assert_eq!(canvas[15], Rgba::new(127, 128, 0, 191));
//! ```

use rgb::Rgba;

use crate::{PixelBuffer, PixelError};

impl PixelBuffer {
    /// The buffer as typed pixels.
    pub fn pixels(&self) -> &[Rgba<u8>] {
        bytemuck::cast_slice(self.as_bytes())
    }

    pub fn pixels_mut(&mut self) -> &mut [Rgba<u8>] {
        bytemuck::cast_slice_mut(self.as_bytes_mut())
    }

    /// [`fill`](Self::fill) with a typed colour.
    pub fn fill_rgba(&mut self, color: Rgba<u8>) {
        self.fill(color.r, color.g, color.b, color.a);
    }
}

/// Set every pixel of a `width × height` image to `color`.
pub fn fill_pixels(
    pixels: &mut [Rgba<u8>],
    width: u32,
    height: u32,
    color: Rgba<u8>,
) -> Result<(), PixelError> {
    crate::fill(
        bytemuck::cast_slice_mut(pixels),
        width,
        height,
        color.r,
        color.g,
        color.b,
        color.a,
    )
}

/// Typed [`crate::blit`].
#[allow(clippy::too_many_arguments)]
pub fn blit_pixels(
    dest: &mut [Rgba<u8>],
    dest_width: u32,
    dest_height: u32,
    src: &[Rgba<u8>],
    src_width: u32,
    src_height: u32,
    start_x: i32,
    start_y: i32,
) -> Result<(), PixelError> {
    crate::blit(
        bytemuck::cast_slice_mut(dest),
        dest_width,
        dest_height,
        bytemuck::cast_slice(src),
        src_width,
        src_height,
        start_x,
        start_y,
    )
}

/// Typed [`crate::copy_diff_size_no_alpha`].
#[allow(clippy::too_many_arguments)]
pub fn copy_rgb_pixels(
    dest: &mut [Rgba<u8>],
    dest_width: u32,
    dest_height: u32,
    src: &[Rgba<u8>],
    src_width: u32,
    src_height: u32,
    start_x: i32,
    start_y: i32,
) -> Result<(), PixelError> {
    crate::copy_diff_size_no_alpha(
        bytemuck::cast_slice_mut(dest),
        dest_width,
        dest_height,
        bytemuck::cast_slice(src),
        src_width,
        src_height,
        start_x,
        start_y,
    )
}

/// Typed [`crate::blend`].
#[allow(clippy::too_many_arguments)]
pub fn blend_pixels(
    dest: &mut [Rgba<u8>],
    overlay: &[Rgba<u8>],
    dest_width: u32,
    dest_height: u32,
    overlay_width: u32,
    overlay_height: u32,
    start_x: i32,
    start_y: i32,
) -> Result<(), PixelError> {
    crate::blend(
        bytemuck::cast_slice_mut(dest),
        bytemuck::cast_slice(overlay),
        dest_width,
        dest_height,
        overlay_width,
        overlay_height,
        start_x,
        start_y,
    )
}

/// Typed [`crate::nearest_neighbor_resize`].
pub fn resize_pixels(
    src: &[Rgba<u8>],
    dst: &mut [Rgba<u8>],
    src_width: u32,
    src_height: u32,
    dst_width: u32,
    dst_height: u32,
) -> Result<(), PixelError> {
    crate::nearest_neighbor_resize(
        bytemuck::cast_slice(src),
        bytemuck::cast_slice_mut(dst),
        src_width,
        src_height,
        dst_width,
        dst_height,
    )
}
