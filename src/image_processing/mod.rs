// Image processing module - handles parameter negotiation, loading, resizing and encoding
mod error;
pub mod formats;
mod load;
mod negotiate;
mod resize;
mod serve;
mod types;

// Re-export public items
pub use error::{ImageError, LoadErrorStatus};
pub use formats::Encoder;
pub use load::ImageLoader;
pub use negotiate::{ImageDefaults, ImageQuery, RequestParams, parse};
pub use resize::{resize, resized_dimensions};
pub use serve::{ImageService, image_handler};
pub use types::OutputFormat;
