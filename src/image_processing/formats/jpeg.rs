use image::{DynamicImage, ImageEncoder, codecs::jpeg::JpegEncoder};

use super::OutputFormat;
use crate::image_processing::ImageError;

/// Encode image as JPEG at the given quality (1-100)
pub fn encode(image: &DynamicImage, quality: u8) -> Result<Vec<u8>, ImageError> {
    // JPEG doesn't support alpha channel, so convert to RGB
    let rgb_image = image.to_rgb8();
    let mut buffer = Vec::new();

    let encoder = JpegEncoder::new_with_quality(&mut buffer, quality);
    encoder
        .write_image(
            rgb_image.as_raw(),
            rgb_image.width(),
            rgb_image.height(),
            image::ExtendedColorType::Rgb8,
        )
        .map_err(|e| ImageError::encode_failed(OutputFormat::Jpeg, e))?;

    Ok(buffer)
}
