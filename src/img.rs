//! [`imgref`] interop for [`PixelBuffer`].
//!
//! A `PixelBuffer` is always tightly packed, so it can be viewed as an
//! [`ImgRef`] without copying. Going the other way copies row by row, which
//! drops any stride padding the source image carries.
//!
//! ```rust
//! use imgref::ImgVec;
//! use rgb::Rgba;
//! use rgbablit::PixelBuffer;
//!
//! let img = ImgVec::new(vec![Rgba::new(0u8, 0, 255, 255); 6], 3, 2);
//! let mut buf = PixelBuffer::from_img(img.as_ref()).unwrap();
//! buf.fill(1, 2, 3, 4);
//! assert_eq!(buf.as_img().width(), 3);
//! ```

use alloc::vec::Vec;

use imgref::{ImgRef, ImgVec};
use rgb::Rgba;

use crate::{PixelBuffer, PixelError};

impl PixelBuffer {
    /// Borrow the buffer as an `ImgRef` with `stride == width`.
    pub fn as_img(&self) -> ImgRef<'_, Rgba<u8>> {
        ImgRef::new(self.pixels(), self.width() as usize, self.height() as usize)
    }

    /// Copy the pixels out into an owned `ImgVec`.
    pub fn to_img_vec(&self) -> ImgVec<Rgba<u8>> {
        let pixels: Vec<Rgba<u8>> = self.pixels().to_vec();
        ImgVec::new(pixels, self.width() as usize, self.height() as usize)
    }

    /// Allocate a buffer and copy `img` into it, honouring its stride.
    pub fn from_img(img: ImgRef<'_, Rgba<u8>>) -> Result<PixelBuffer, PixelError> {
        let (w, h) = (img.width(), img.height());
        let (Ok(width), Ok(height)) = (u32::try_from(w), u32::try_from(h)) else {
            return Err(PixelError::DimensionsOverflow {
                width: u32::try_from(w).unwrap_or(u32::MAX),
                height: u32::try_from(h).unwrap_or(u32::MAX),
            });
        };
        let mut buf = PixelBuffer::allocate(width, height)?;
        if w > 0 {
            for (src, dst) in img.rows().zip(buf.pixels_mut().chunks_exact_mut(w)) {
                dst.copy_from_slice(src);
            }
        }
        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    extern crate alloc;
    use super::*;
    use alloc::vec;

    #[test]
    fn round_trips_through_imgvec() {
        let mut buf = PixelBuffer::allocate(5, 3).unwrap();
        buf.fill(10, 20, 30, 40);
        buf.pixels_mut()[7] = Rgba::new(1, 2, 3, 4);

        let img = buf.to_img_vec();
        assert_eq!((img.width(), img.height()), (5, 3));
        let back = PixelBuffer::from_img(img.as_ref()).unwrap();
        assert_eq!(back.as_bytes(), buf.as_bytes());
    }

    #[test]
    fn from_img_drops_stride_padding() {
        let pad = Rgba::new(0xEEu8, 0xEE, 0xEE, 0xEE);
        let px = Rgba::new(1u8, 2, 3, 4);
        // 2x2 image with stride 3
        let data = vec![px, px, pad, px, px, pad];
        let img = ImgRef::new_stride(&data[..], 2, 2, 3);

        let buf = PixelBuffer::from_img(img).unwrap();
        assert_eq!(buf.len(), 16);
        assert!(buf.pixels().iter().all(|&p| p == px));
    }

    #[test]
    fn as_img_views_the_same_pixels() {
        let mut buf = PixelBuffer::allocate(4, 2).unwrap();
        buf.fill(7, 7, 7, 7);
        let view = buf.as_img();
        assert_eq!(view.stride(), 4);
        assert_eq!(view.rows().nth(1).unwrap()[3], Rgba::new(7, 7, 7, 7));
    }
}
