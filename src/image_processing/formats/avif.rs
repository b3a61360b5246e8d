use image::DynamicImage;
use libavif_sys as sys;
use tracing::debug;

use super::OutputFormat;
use crate::image_processing::ImageError;

fn encode_error(message: impl ToString) -> ImageError {
    ImageError::encode_failed(OutputFormat::Avif, message)
}

/// Encode image as 8-bit AVIF.
///
/// `quantizer` is the inverted 0-63 scale (0 = best) and is used as both the
/// minimum and maximum quantizer so the output quality is fixed.
pub fn encode(image: &DynamicImage, quantizer: u8, speed: u8) -> Result<Vec<u8>, ImageError> {
    let (width, height) = (image.width(), image.height());
    let has_alpha = image.color().has_alpha();
    let quantizer = quantizer.min(super::AVIF_MAX_QUANTIZER) as i32;

    debug!(
        "Encoding AVIF: {}x{}, quantizer={}, speed={}, has_alpha={}",
        width, height, quantizer, speed, has_alpha
    );

    unsafe {
        let avif_image = sys::avifImageCreate(
            width,
            height,
            8,
            if has_alpha {
                sys::AVIF_PIXEL_FORMAT_YUV444
            } else {
                sys::AVIF_PIXEL_FORMAT_YUV420
            },
        );

        if avif_image.is_null() {
            return Err(encode_error("Failed to create AVIF image"));
        }

        (*avif_image).colorPrimaries = sys::AVIF_COLOR_PRIMARIES_BT709 as u16;
        (*avif_image).transferCharacteristics = sys::AVIF_TRANSFER_CHARACTERISTICS_SRGB as u16;
        (*avif_image).matrixCoefficients = sys::AVIF_MATRIX_COEFFICIENTS_BT709 as u16;
        (*avif_image).yuvRange = sys::AVIF_RANGE_FULL;

        sys::avifImageAllocatePlanes(avif_image, sys::AVIF_PLANES_YUV);
        if has_alpha {
            sys::avifImageAllocatePlanes(avif_image, sys::AVIF_PLANES_A);
        }

        let mut rgb = sys::avifRGBImage::default();
        sys::avifRGBImageSetDefaults(&mut rgb, avif_image);
        rgb.depth = 8;
        rgb.format = if has_alpha {
            sys::AVIF_RGB_FORMAT_RGBA
        } else {
            sys::AVIF_RGB_FORMAT_RGB
        };

        if sys::avifRGBImageAllocatePixels(&mut rgb) != sys::AVIF_RESULT_OK {
            sys::avifImageDestroy(avif_image);
            return Err(encode_error("Failed to allocate RGB pixels"));
        }

        // Copy row by row, the libavif buffer rows may be padded
        let source = if has_alpha {
            image.to_rgba8().into_raw()
        } else {
            image.to_rgb8().into_raw()
        };
        let channels = if has_alpha { 4 } else { 3 };
        let src_row_bytes = width as usize * channels;
        let dst_row_bytes = rgb.rowBytes as usize;
        for (y, src_row) in source.chunks_exact(src_row_bytes).enumerate() {
            let dst_row =
                std::slice::from_raw_parts_mut(rgb.pixels.add(y * dst_row_bytes), src_row_bytes);
            dst_row.copy_from_slice(src_row);
        }

        if sys::avifImageRGBToYUV(avif_image, &rgb) != sys::AVIF_RESULT_OK {
            sys::avifRGBImageFreePixels(&mut rgb);
            sys::avifImageDestroy(avif_image);
            return Err(encode_error("Failed to convert RGB to YUV"));
        }

        sys::avifRGBImageFreePixels(&mut rgb);

        let encoder = sys::avifEncoderCreate();
        if encoder.is_null() {
            sys::avifImageDestroy(avif_image);
            return Err(encode_error("Failed to create encoder"));
        }

        (*encoder).speed = speed as i32;
        (*encoder).maxThreads = 1;
        (*encoder).minQuantizer = quantizer;
        (*encoder).maxQuantizer = quantizer;
        (*encoder).minQuantizerAlpha = quantizer;
        (*encoder).maxQuantizerAlpha = quantizer;

        let mut output = sys::avifRWData::default();
        let result = sys::avifEncoderWrite(encoder, avif_image, &mut output);

        if result != sys::AVIF_RESULT_OK {
            sys::avifRWDataFree(&mut output);
            sys::avifEncoderDestroy(encoder);
            sys::avifImageDestroy(avif_image);
            return Err(encode_error(format!(
                "Failed to encode AVIF: error {}",
                result
            )));
        }

        let data = std::slice::from_raw_parts(output.data, output.size).to_vec();

        sys::avifRWDataFree(&mut output);
        sys::avifEncoderDestroy(encoder);
        sys::avifImageDestroy(avif_image);

        Ok(data)
    }
}
