use crate::Config;
use crate::image_processing::OutputFormat;
use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Debug, Error)]
pub enum StartupCheckError {
    #[error("Static files directory does not exist: {0}")]
    StaticDirectoryMissing(String),

    #[error("Static files directory is not accessible: {0}")]
    StaticDirectoryUnreadable(#[from] std::io::Error),

    #[error("Default quality must be between 1 and 100, got {0}")]
    InvalidDefaultQuality(u8),

    #[error("AVIF speed must be between 0 and 10, got {0}")]
    InvalidAvifSpeed(u8),

    #[error("Default format {0} is not available in this build")]
    DefaultFormatUnavailable(OutputFormat),
}

impl StartupCheckError {
    /// Critical errors stop the server; the rest only affect individual requests
    pub fn is_critical(&self) -> bool {
        matches!(
            self,
            StartupCheckError::InvalidDefaultQuality(_)
                | StartupCheckError::InvalidAvifSpeed(_)
                | StartupCheckError::DefaultFormatUnavailable(_)
        )
    }
}

pub async fn perform_startup_checks(config: &Config) -> Result<(), Vec<StartupCheckError>> {
    let mut errors = Vec::new();

    info!("Performing startup checks...");

    let quality = config.image.default_quality;
    if !(1..=100).contains(&quality) {
        error!("Invalid default quality: {}", quality);
        errors.push(StartupCheckError::InvalidDefaultQuality(quality));
    }

    let speed = config.image.avif_speed;
    if speed > 10 {
        error!("Invalid AVIF speed: {}", speed);
        errors.push(StartupCheckError::InvalidAvifSpeed(speed));
    }

    let format = config.image.default_format;
    if format == OutputFormat::Avif && !cfg!(feature = "avif") {
        error!("Default format {} requires the avif feature", format);
        errors.push(StartupCheckError::DefaultFormatUnavailable(format));
    }

    let static_dir = &config.static_files.directory;
    if !static_dir.exists() {
        warn!("Static files directory does not exist: {:?}", static_dir);
        errors.push(StartupCheckError::StaticDirectoryMissing(
            static_dir.display().to_string(),
        ));
    } else {
        match tokio::fs::read_dir(static_dir).await {
            Ok(_) => info!("Static files directory is accessible: {:?}", static_dir),
            Err(e) => {
                warn!("Static files directory is not accessible: {}", e);
                errors.push(StartupCheckError::StaticDirectoryUnreadable(e));
            }
        }
    }

    if errors.is_empty() {
        info!("All startup checks passed");
        Ok(())
    } else {
        error!("Startup checks failed with {} errors", errors.len());
        Err(errors)
    }
}
