use image::{DynamicImage, codecs::png::PngEncoder};

use super::OutputFormat;
use crate::image_processing::ImageError;

/// Encode image as PNG with the encoder's default (lossless) settings
pub fn encode(image: &DynamicImage) -> Result<Vec<u8>, ImageError> {
    let mut buffer = Vec::new();
    let encoder = PngEncoder::new(&mut buffer);
    image
        .write_with_encoder(encoder)
        .map_err(|e| ImageError::encode_failed(OutputFormat::Png, e))?;
    Ok(buffer)
}
