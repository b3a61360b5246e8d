use std::ffi::c_void;

/// Channel layout of the pixel buffer handed to the encoder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelLayout {
    Rgb,
    Rgba,
}

impl PixelLayout {
    fn channels(&self) -> u32 {
        match self {
            PixelLayout::Rgb => 3,
            PixelLayout::Rgba => 4,
        }
    }
}

/// High-level wrapper around libwebp-sys for lossy WebP encoding of RGB/RGBA buffers
pub struct WebPEncoder {
    width: u32,
    height: u32,
    layout: PixelLayout,
    pixels: Vec<u8>,
}

#[derive(Debug)]
pub enum WebPError {
    EncodingFailed,
    InvalidDimensions,
    InvalidData,
}

impl std::fmt::Display for WebPError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WebPError::EncodingFailed => write!(f, "WebP encoding failed"),
            WebPError::InvalidDimensions => write!(f, "Invalid image dimensions"),
            WebPError::InvalidData => write!(f, "Invalid image data"),
        }
    }
}

impl std::error::Error for WebPError {}

impl WebPEncoder {
    /// Create a new WebP encoder over a tightly packed pixel buffer
    pub fn new(
        width: u32,
        height: u32,
        layout: PixelLayout,
        pixels: Vec<u8>,
    ) -> Result<Self, WebPError> {
        if width == 0 || height == 0 {
            return Err(WebPError::InvalidDimensions);
        }

        let expected_size = width as usize * height as usize * layout.channels() as usize;
        if pixels.len() != expected_size {
            return Err(WebPError::InvalidData);
        }

        Ok(WebPEncoder {
            width,
            height,
            layout,
            pixels,
        })
    }

    /// Encode to lossy WebP with a 0-100 quality setting
    pub fn encode(&self, quality: f32) -> Result<Vec<u8>, WebPError> {
        unsafe {
            let mut config =
                libwebp_sys::WebPConfig::new().map_err(|_| WebPError::EncodingFailed)?;

            config.lossless = 0;
            config.quality = quality;
            config.method = 4;

            if libwebp_sys::WebPValidateConfig(&config) == 0 {
                return Err(WebPError::EncodingFailed);
            }

            let mut picture =
                libwebp_sys::WebPPicture::new().map_err(|_| WebPError::EncodingFailed)?;

            picture.width = self.width as i32;
            picture.height = self.height as i32;
            picture.use_argb = 0; // Use YUV format

            let stride = (self.width * self.layout.channels()) as i32;
            let imported = match self.layout {
                PixelLayout::Rgb => {
                    libwebp_sys::WebPPictureImportRGB(&mut picture, self.pixels.as_ptr(), stride)
                }
                PixelLayout::Rgba => {
                    libwebp_sys::WebPPictureImportRGBA(&mut picture, self.pixels.as_ptr(), stride)
                }
            };
            if imported == 0 {
                libwebp_sys::WebPPictureFree(&mut picture);
                return Err(WebPError::EncodingFailed);
            }

            let mut memory_writer = WebPMemoryWriter::new();
            picture.writer = Some(webp_memory_write);
            picture.custom_ptr = &mut memory_writer as *mut _ as *mut c_void;

            let encode_result = libwebp_sys::WebPEncode(&config, &mut picture);

            libwebp_sys::WebPPictureFree(&mut picture);

            if encode_result == 0 {
                return Err(WebPError::EncodingFailed);
            }

            Ok(memory_writer.into_data())
        }
    }
}

/// Custom memory writer for capturing WebP output
struct WebPMemoryWriter {
    data: Vec<u8>,
}

impl WebPMemoryWriter {
    fn new() -> Self {
        Self { data: Vec::new() }
    }

    fn write(&mut self, data: &[u8]) -> bool {
        self.data.extend_from_slice(data);
        true
    }

    fn into_data(self) -> Vec<u8> {
        self.data
    }
}

/// C callback function for writing WebP data to memory
unsafe extern "C" fn webp_memory_write(
    data: *const u8,
    data_size: usize,
    picture: *const libwebp_sys::WebPPicture,
) -> i32 {
    unsafe {
        if data.is_null() || picture.is_null() {
            return 0;
        }

        let writer = (*picture).custom_ptr as *mut WebPMemoryWriter;
        if writer.is_null() {
            return 0;
        }

        let slice = std::slice::from_raw_parts(data, data_size);
        if (*writer).write(slice) { 1 } else { 0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_webp_signature(data: &[u8]) {
        assert!(data.len() >= 12);
        assert_eq!(&data[0..4], b"RIFF");
        assert_eq!(&data[8..12], b"WEBP");
    }

    #[test]
    fn test_invalid_dimensions() {
        let pixels = vec![255u8; 10 * 10 * 3];
        let encoder = WebPEncoder::new(0, 10, PixelLayout::Rgb, pixels);
        assert!(matches!(encoder, Err(WebPError::InvalidDimensions)));
    }

    #[test]
    fn test_invalid_data_size() {
        // Sized for RGB but declared as RGBA
        let pixels = vec![255u8; 10 * 10 * 3];
        let encoder = WebPEncoder::new(10, 10, PixelLayout::Rgba, pixels);
        assert!(matches!(encoder, Err(WebPError::InvalidData)));
    }

    #[test]
    fn test_rgb_encoding() {
        let pixels = vec![128u8; 10 * 10 * 3];
        let encoder = WebPEncoder::new(10, 10, PixelLayout::Rgb, pixels).unwrap();

        let webp_data = encoder.encode(80.0).unwrap();
        assert_webp_signature(&webp_data);
    }

    #[test]
    fn test_rgba_encoding() {
        let pixels: Vec<u8> = (0..16 * 8)
            .flat_map(|i| [200u8, 100, 50, (i % 256) as u8])
            .collect();
        let encoder = WebPEncoder::new(16, 8, PixelLayout::Rgba, pixels).unwrap();

        let webp_data = encoder.encode(75.0).unwrap();
        assert_webp_signature(&webp_data);
    }

    #[test]
    fn test_lower_quality_is_not_larger() {
        // Noisy content so quality actually changes the output size
        let pixels: Vec<u8> = (0..64u32 * 64 * 3)
            .map(|i| (i.wrapping_mul(2654435761) >> 24) as u8)
            .collect();
        let encoder = WebPEncoder::new(64, 64, PixelLayout::Rgb, pixels).unwrap();

        let low = encoder.encode(10.0).unwrap();
        let high = encoder.encode(95.0).unwrap();
        assert!(low.len() <= high.len());
    }
}
