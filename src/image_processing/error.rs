use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

use super::types::OutputFormat;

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("{param}: {message}")]
    InvalidParameter { param: &'static str, message: String },

    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),

    #[error("Image not found: {0:?}")]
    NotFound(PathBuf),

    #[error("IO error: {0}")]
    LoadFailure(#[from] std::io::Error),

    #[error("Image error: {0}")]
    DecodeError(#[from] image::ImageError),

    #[error("Failed to encode {format}: {message}")]
    EncodeError {
        format: OutputFormat,
        message: String,
    },

    #[error("Image task failed: {0}")]
    TaskFailed(String),
}

/// How a missing source file is reported to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadErrorStatus {
    /// 404 for a missing file, 500 for everything else
    #[default]
    Distinguish,
    /// Every load failure is a 500
    Legacy,
}

impl ImageError {
    pub fn invalid_param(param: &'static str, message: impl ToString) -> Self {
        ImageError::InvalidParameter {
            param,
            message: message.to_string(),
        }
    }

    pub fn encode_failed(format: OutputFormat, message: impl ToString) -> Self {
        ImageError::EncodeError {
            format,
            message: message.to_string(),
        }
    }

    pub fn status_code(&self, policy: LoadErrorStatus) -> StatusCode {
        match self {
            ImageError::InvalidPath(_)
            | ImageError::InvalidParameter { .. }
            | ImageError::UnsupportedFormat(_) => StatusCode::BAD_REQUEST,

            ImageError::NotFound(_) => match policy {
                LoadErrorStatus::Distinguish => StatusCode::NOT_FOUND,
                LoadErrorStatus::Legacy => StatusCode::INTERNAL_SERVER_ERROR,
            },

            ImageError::LoadFailure(_)
            | ImageError::DecodeError(_)
            | ImageError::EncodeError { .. }
            | ImageError::TaskFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
