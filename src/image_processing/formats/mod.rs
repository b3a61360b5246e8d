#[cfg(feature = "avif")]
pub mod avif;
pub mod jpeg;
pub mod png;
pub mod webp;

pub use super::types::OutputFormat;

use super::error::ImageError;
use image::DynamicImage;
use tracing::debug;

/// libaom speed preset used when none is configured
pub const DEFAULT_AVIF_SPEED: u8 = 6;

/// Highest (worst) AVIF quantizer
pub const AVIF_MAX_QUANTIZER: u8 = 63;

/// Map a 1-100 quality onto the inverted 0-63 AVIF quantizer scale (0 is best).
pub fn avif_quantizer(quality: u8) -> u8 {
    let quality = quality.min(100) as f64;
    ((1.0 - quality / 100.0) * AVIF_MAX_QUANTIZER as f64).round() as u8
}

/// Encoding strategy for one output format, bound to its settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Encoder {
    Jpeg { quality: u8 },
    /// Lossless, takes no options
    Png,
    WebP { quality: f32 },
    Avif { quantizer: u8, speed: u8 },
}

impl Encoder {
    pub fn new(format: OutputFormat, quality: u8) -> Result<Self, ImageError> {
        let encoder = match format {
            OutputFormat::Jpeg => Encoder::Jpeg { quality },
            OutputFormat::Png => Encoder::Png,
            OutputFormat::WebP => Encoder::WebP {
                quality: quality as f32,
            },
            OutputFormat::Avif => {
                if !cfg!(feature = "avif") {
                    return Err(ImageError::UnsupportedFormat(format!(
                        "{} (built without AVIF support)",
                        format
                    )));
                }
                Encoder::Avif {
                    quantizer: avif_quantizer(quality),
                    speed: DEFAULT_AVIF_SPEED,
                }
            }
        };

        Ok(encoder)
    }

    /// Same as [`Encoder::new`] for a textual format token
    pub fn from_token(token: &str, quality: u8) -> Result<Self, ImageError> {
        Self::new(token.parse()?, quality)
    }

    /// Override the AVIF speed preset; other formats are unaffected
    pub fn with_avif_speed(self, speed: u8) -> Self {
        match self {
            Encoder::Avif { quantizer, .. } => Encoder::Avif { quantizer, speed },
            other => other,
        }
    }

    pub fn format(&self) -> OutputFormat {
        match self {
            Encoder::Jpeg { .. } => OutputFormat::Jpeg,
            Encoder::Png => OutputFormat::Png,
            Encoder::WebP { .. } => OutputFormat::WebP,
            Encoder::Avif { .. } => OutputFormat::Avif,
        }
    }

    pub fn encode(&self, image: &DynamicImage) -> Result<Vec<u8>, ImageError> {
        let data = match *self {
            Encoder::Jpeg { quality } => jpeg::encode(image, quality)?,
            Encoder::Png => png::encode(image)?,
            Encoder::WebP { quality } => webp::encode(image, quality)?,
            #[cfg(feature = "avif")]
            Encoder::Avif { quantizer, speed } => avif::encode(image, quantizer, speed)?,
            #[cfg(not(feature = "avif"))]
            Encoder::Avif { .. } => {
                return Err(ImageError::UnsupportedFormat(
                    "avif (built without AVIF support)".to_string(),
                ));
            }
        };

        debug!(
            "Encoded {}x{} image as {}: {} bytes",
            image.width(),
            image.height(),
            self.format(),
            data.len()
        );
        Ok(data)
    }
}
