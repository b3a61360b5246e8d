use crate::image_processing::{resize, resized_dimensions};
use image::{DynamicImage, ImageBuffer, Rgb};

fn test_image(width: u32, height: u32) -> DynamicImage {
    let img = ImageBuffer::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    DynamicImage::ImageRgb8(img)
}

#[test]
fn test_zero_width_is_a_no_op() {
    let resized = resize(test_image(120, 80), 0);
    assert_eq!((resized.width(), resized.height()), (120, 80));
}

#[test]
fn test_downscale_keeps_aspect_ratio() {
    let resized = resize(test_image(1000, 600), 200);
    assert_eq!((resized.width(), resized.height()), (200, 120));
}

#[test]
fn test_never_upscales() {
    let resized = resize(test_image(300, 200), 1200);
    assert_eq!((resized.width(), resized.height()), (300, 200));
}

#[test]
fn test_same_width_is_untouched() {
    let original = test_image(64, 48);
    let resized = resize(original.clone(), 64);
    assert_eq!(resized.as_bytes(), original.as_bytes());
}

#[test]
fn test_height_is_rounded() {
    // 333 * 100 / 1000 = 33.3
    assert_eq!(resized_dimensions(1000, 333, 100), (100, 33));
    // 335 * 100 / 1000 = 33.5
    assert_eq!(resized_dimensions(1000, 335, 100), (100, 34));
}

#[test]
fn test_height_never_drops_to_zero() {
    assert_eq!(resized_dimensions(4000, 10, 10), (10, 1));
}

#[test]
fn test_width_is_clamped_for_every_request_above_source() {
    for requested in [301, 500, 10_000, u32::MAX] {
        assert_eq!(resized_dimensions(300, 200, requested), (300, 200));
    }
}

#[test]
fn test_requested_width_is_honoured_up_to_source() {
    for requested in 1..=300 {
        let (width, height) = resized_dimensions(300, 150, requested);
        assert_eq!(width, requested);
        assert_eq!(height, ((requested as f64) / 2.0).round().max(1.0) as u32);
    }
}

#[test]
fn test_portrait_images() {
    let resized = resize(test_image(400, 1000), 100);
    assert_eq!((resized.width(), resized.height()), (100, 250));
}
