use image::{DynamicImage, imageops::FilterType};
use tracing::debug;

/// Output dimensions for a width-bound resize.
///
/// The width is clamped to the source width so images are never upscaled, and
/// the height keeps the aspect ratio (rounded, at least one pixel).
pub fn resized_dimensions(orig_width: u32, orig_height: u32, target_width: u32) -> (u32, u32) {
    if target_width == 0 || orig_width == 0 {
        return (orig_width, orig_height);
    }

    let width = target_width.min(orig_width);
    let height = (width as f64 * orig_height as f64 / orig_width as f64).round() as u32;

    (width, height.max(1))
}

/// Resize to `target_width` preserving aspect ratio; 0 leaves the image untouched
pub fn resize(image: DynamicImage, target_width: u32) -> DynamicImage {
    let (orig_width, orig_height) = (image.width(), image.height());
    let (width, height) = resized_dimensions(orig_width, orig_height, target_width);

    // Only resize if dimensions are different
    if width == orig_width && height == orig_height {
        return image;
    }

    debug!(
        "Resizing {}x{} -> {}x{}",
        orig_width, orig_height, width, height
    );
    image.resize_exact(width, height, FilterType::Lanczos3)
}
