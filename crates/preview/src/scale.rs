//! Bitmap downsampling.

use crate::{Bitmap, PIXEL_STRIDE};

impl Bitmap {
    /// Downsamples so neither dimension exceeds `cap`.
    ///
    /// Each dimension is clamped independently, so a 512x64 bitmap becomes
    /// 128x64 rather than 128x16; previews trade exact proportions for a
    /// bounded footprint. Nearest-neighbor sampling is plenty for thumbnail
    /// sizes. Bitmaps already within the cap are returned unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use bale_preview::Bitmap;
    ///
    /// let large = Bitmap::new(512, 64, vec![0u8; 512 * 64 * 4]).unwrap();
    /// let small = large.downsample(128);
    /// assert_eq!((small.width(), small.height()), (128, 64));
    /// ```
    #[must_use]
    pub fn downsample(&self, cap: u32) -> Bitmap {
        let width = self.width.min(cap);
        let height = self.height.min(cap);
        if width == self.width && height == self.height {
            return self.clone();
        }
        let mut rgba = Vec::with_capacity(width as usize * height as usize * PIXEL_STRIDE);
        for y in 0..height {
            let source_y = (y as u64 * self.height as u64 / height as u64) as usize;
            for x in 0..width {
                let source_x = (x as u64 * self.width as u64 / width as u64) as usize;
                let offset = (source_y * self.width as usize + source_x) * PIXEL_STRIDE;
                rgba.extend_from_slice(&self.rgba[offset..offset + PIXEL_STRIDE]);
            }
        }
        Bitmap { width, height, rgba }
    }
}

#[cfg(test)]
mod tests {
    use crate::Bitmap;
    use rstest::rstest;

    #[rstest]
    #[case(64, 64, 64, 64)]
    #[case(128, 128, 128, 128)]
    #[case(256, 256, 128, 128)]
    #[case(512, 64, 128, 64)]
    #[case(64, 512, 64, 128)]
    #[case(1, 1000, 1, 128)]
    fn dimensions_clamp_independently(#[case] w: u32, #[case] h: u32, #[case] ew: u32, #[case] eh: u32) {
        let bitmap = Bitmap::new(w, h, vec![0xAB; (w * h * 4) as usize]).unwrap();
        let scaled = bitmap.downsample(128);
        assert_eq!((scaled.width(), scaled.height()), (ew, eh));
        assert_eq!(scaled.pixels().len(), (ew * eh * 4) as usize);
    }

    #[test]
    fn within_cap_is_untouched() {
        let bitmap = Bitmap::new(3, 2, (0..24).collect()).unwrap();
        assert_eq!(bitmap.downsample(128), bitmap);
    }

    #[test]
    fn sampling_keeps_corner_pixels_from_the_source() {
        // 2x2 checkerboard scaled down from 4x4: each quadrant is uniform,
        // so nearest-neighbor must pick the quadrant colors exactly.
        let mut rgba = Vec::new();
        for y in 0..4u8 {
            for x in 0..4u8 {
                let color = if (x < 2) == (y < 2) { 0xFF } else { 0x00 };
                rgba.extend_from_slice(&[color, color, color, 0xFF]);
            }
        }
        let scaled = Bitmap::new(4, 4, rgba).unwrap().downsample(2);
        assert_eq!(scaled.pixels()[0], 0xFF); // top-left
        assert_eq!(scaled.pixels()[4], 0x00); // top-right
    }
}
