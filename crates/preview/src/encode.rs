//! Lossless PNG encoding for preview bitmaps.

use crate::Bitmap;

/// Encodes a bitmap as an RGBA8 PNG.
///
/// Returns `None` for empty bitmaps and on encoder failure; preview encoding
/// is best-effort by contract, so there is no error to propagate. The reason
/// is logged at debug level for anyone chasing a missing preview.
///
/// # Examples
///
/// ```
/// use bale_preview::{Bitmap, encode_png};
///
/// let bitmap = Bitmap::new(2, 2, vec![0x7F; 16]).unwrap();
/// let bytes = encode_png(&bitmap).unwrap();
/// assert!(bytes.starts_with(&[0x89, b'P', b'N', b'G']));
/// ```
#[must_use]
pub fn encode_png(bitmap: &Bitmap) -> Option<Vec<u8>> {
    if bitmap.is_empty() {
        tracing::debug!("empty bitmap, nothing to encode");
        return None;
    }
    let mut bytes = Vec::new();
    let mut encoder = png::Encoder::new(&mut bytes, bitmap.width(), bitmap.height());
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let result = encoder.write_header().and_then(|mut writer| {
        writer.write_image_data(bitmap.pixels())?;
        writer.finish()
    });
    match result {
        Ok(()) => Some(bytes),
        Err(error) => {
            tracing::debug!(%error, "preview encoding failed, dropping preview");
            None
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_round_trippable_rgba() {
        let pixels: Vec<u8> = (0..=255).collect();
        let bitmap = Bitmap::new(8, 8, pixels.clone()).unwrap();
        let bytes = encode_png(&bitmap).unwrap();

        let decoder = png::Decoder::new(bytes.as_slice());
        let mut reader = decoder.read_info().unwrap();
        let mut decoded = vec![0; reader.output_buffer_size()];
        let info = reader.next_frame(&mut decoded).unwrap();
        assert_eq!((info.width, info.height), (8, 8));
        assert_eq!(info.color_type, png::ColorType::Rgba);
        assert_eq!(&decoded[..info.buffer_size()], pixels.as_slice());
    }

    #[test]
    fn empty_bitmap_is_no_preview() {
        let bitmap = Bitmap::new(0, 0, Vec::new()).unwrap();
        assert!(encode_png(&bitmap).is_none());
    }
}
