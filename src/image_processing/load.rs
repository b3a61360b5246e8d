use image::{DynamicImage, ImageReader};
use std::fs::File;
use std::io::{BufReader, ErrorKind};
use std::path::{Component, Path, PathBuf};
use tracing::debug;

use super::error::ImageError;

/// Resolves request paths under the static root and decodes the files found there.
#[derive(Debug, Clone)]
pub struct ImageLoader {
    static_root: PathBuf,
}

impl ImageLoader {
    pub fn new(static_root: PathBuf) -> Self {
        Self { static_root }
    }

    /// Join `request_path` onto the static root and make it absolute.
    ///
    /// Paths that are empty or would leave the root (`..`, absolute or
    /// prefixed components) are rejected.
    pub fn resolve(&self, request_path: &str) -> Result<PathBuf, ImageError> {
        let relative = Path::new(request_path.trim_start_matches('/'));

        if relative.as_os_str().is_empty() {
            return Err(ImageError::InvalidPath(request_path.to_string()));
        }

        let escapes_root = relative
            .components()
            .any(|component| !matches!(component, Component::Normal(_) | Component::CurDir));
        if escapes_root {
            return Err(ImageError::InvalidPath(request_path.to_string()));
        }

        std::path::absolute(self.static_root.join(relative))
            .map_err(|_| ImageError::InvalidPath(request_path.to_string()))
    }

    /// Open and decode an image, detecting the format from its content.
    pub fn load(&self, path: &Path) -> Result<DynamicImage, ImageError> {
        if path.is_dir() {
            return Err(ImageError::NotFound(path.to_path_buf()));
        }

        let file = File::open(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => ImageError::NotFound(path.to_path_buf()),
            _ => ImageError::LoadFailure(e),
        })?;

        let reader = ImageReader::new(BufReader::new(file)).with_guessed_format()?;
        debug!(
            "Decoding image: {:?}, detected format: {:?}",
            path,
            reader.format()
        );

        let image = reader.decode()?;
        Ok(image)
    }
}
