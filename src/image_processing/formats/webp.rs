use image::DynamicImage;
use tracing::error;

use super::OutputFormat;
use crate::image_processing::ImageError;
use crate::webp_encoder::{PixelLayout, WebPEncoder};

/// Encode image as lossy WebP
pub fn encode(image: &DynamicImage, quality: f32) -> Result<Vec<u8>, ImageError> {
    let (width, height) = (image.width(), image.height());
    let has_alpha = image.color().has_alpha();

    let (layout, pixels) = if has_alpha {
        (PixelLayout::Rgba, image.to_rgba8().into_raw())
    } else {
        (PixelLayout::Rgb, image.to_rgb8().into_raw())
    };

    let result = WebPEncoder::new(width, height, layout, pixels)
        .and_then(|encoder| encoder.encode(quality));

    match result {
        Ok(webp_data) => Ok(webp_data),
        Err(e) => {
            error!(
                "WebP encoding error: {}, falling back to basic webp crate",
                e
            );
            encode_fallback(image, quality)
        }
    }
}

/// Fallback WebP encoder using the basic webp crate
fn encode_fallback(image: &DynamicImage, quality: f32) -> Result<Vec<u8>, ImageError> {
    let (width, height) = (image.width(), image.height());

    let encoded = if image.color().has_alpha() {
        let rgba = image.to_rgba8();
        webp::Encoder::from_rgba(rgba.as_raw(), width, height)
            .encode_simple(false, quality)
            .map_err(|e| ImageError::encode_failed(OutputFormat::WebP, format!("{:?}", e)))?
    } else {
        let rgb = image.to_rgb8();
        webp::Encoder::from_rgb(rgb.as_raw(), width, height)
            .encode_simple(false, quality)
            .map_err(|e| ImageError::encode_failed(OutputFormat::WebP, format!("{:?}", e)))?
    };

    Ok(encoded.to_vec())
}
