//! Response encoding.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat};

/// Encode an image to lossless PNG bytes for the response body.
pub fn encode_png(image: &DynamicImage) -> Result<Vec<u8>, image::ImageError> {
    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}
