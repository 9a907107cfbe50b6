//! Preview images for archived assets.
//!
//! Three concerns live here, all of them deliberately renderer-agnostic:
//!
//! - [`should_attempt_preview`] — the extension denylist deciding whether a
//!   preview is even meaningful for an asset,
//! - [`Bitmap`] plus [`Bitmap::downsample`] and [`encode_png`] — the
//!   uncompressed RGBA representation handed over by a renderer, and its
//!   conversion into the lossless bytes stored in a record,
//! - [`PreviewRenderer`] — the capability trait an actual rendering backend
//!   implements. Headless environments use [`NullRenderer`].
//!
//! Previews are best-effort everywhere: a renderer returns `None` instead of
//! erroring, and encoding failures downgrade to "no preview".

mod encode;
pub mod error;
mod policy;
mod scale;

pub use self::encode::encode_png;
pub use self::policy::should_attempt_preview;
use crate::error::{ErrorKind, Result};
use bale_index::AssetId;

/// Bytes per RGBA pixel.
const PIXEL_STRIDE: usize = 4;

/// An uncompressed RGBA8 image with alpha, as produced by a renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl Bitmap {
    /// Wraps a pixel buffer, validating that its length is exactly
    /// `width * height * 4`.
    ///
    /// # Examples
    ///
    /// ```
    /// use bale_preview::Bitmap;
    ///
    /// let bitmap = Bitmap::new(2, 1, vec![0u8; 8]).unwrap();
    /// assert_eq!((bitmap.width(), bitmap.height()), (2, 1));
    /// assert!(Bitmap::new(2, 1, vec![0u8; 7]).is_err());
    /// ```
    pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * PIXEL_STRIDE;
        if rgba.len() != expected {
            exn::bail!(ErrorKind::Dimensions { width, height, actual: rgba.len() });
        }
        Ok(Self { width, height, rgba })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA8 pixel data, row-major, no padding.
    pub fn pixels(&self) -> &[u8] {
        &self.rgba
    }

    /// A bitmap with either dimension zero carries no pixels and is treated
    /// as "no preview" by consumers.
    pub fn is_empty(&self) -> bool {
        self.rgba.is_empty()
    }
}

/// Source of preview bitmaps for assets, keyed by identifier.
///
/// `None` always means "no preview available" and is never an error: the
/// backend may be headless, the asset type unsupported, or rendering may
/// simply have produced nothing.
pub trait PreviewRenderer {
    fn render(&self, id: &AssetId) -> Option<Bitmap>;
}

/// Renderer for headless contexts; never produces a preview.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRenderer;

impl PreviewRenderer for NullRenderer {
    fn render(&self, _id: &AssetId) -> Option<Bitmap> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bitmap_validates_buffer_length() {
        assert!(Bitmap::new(4, 4, vec![0; 64]).is_ok());
        assert!(Bitmap::new(4, 4, vec![0; 63]).is_err());
        assert!(Bitmap::new(0, 0, Vec::new()).unwrap().is_empty());
    }

    #[test]
    fn null_renderer_never_renders() {
        assert!(NullRenderer.render(&AssetId::new("anything")).is_none());
    }
}
