use crate::{AppState, ImageConfig};
use axum::{
    body::Body,
    extract::{Path, RawQuery, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use image::DynamicImage;
use std::path::PathBuf;
use tracing::{debug, error};

use super::error::{ImageError, LoadErrorStatus};
use super::formats::Encoder;
use super::load::ImageLoader;
use super::negotiate::{self, ImageDefaults, ImageQuery, RequestParams};
use super::resize::resize;

/// Loads, transforms and encodes images; one instance is shared by all requests.
#[derive(Debug, Clone)]
pub struct ImageService {
    loader: ImageLoader,
    defaults: ImageDefaults,
    avif_speed: u8,
    load_error_status: LoadErrorStatus,
}

impl ImageService {
    pub fn new(loader: ImageLoader, config: &ImageConfig) -> Self {
        Self {
            loader,
            defaults: ImageDefaults {
                quality: config.default_quality,
                format: config.default_format,
            },
            avif_speed: config.avif_speed,
            load_error_status: config.load_error_status,
        }
    }

    pub fn resolve(&self, request_path: &str) -> Result<PathBuf, ImageError> {
        self.loader.resolve(request_path)
    }

    pub fn parse_params(
        &self,
        query: &ImageQuery,
        accept_header: &str,
    ) -> Result<RequestParams, ImageError> {
        negotiate::parse(query, accept_header, &self.defaults)
    }

    pub fn load_image(&self, path: &std::path::Path) -> Result<DynamicImage, ImageError> {
        self.loader.load(path)
    }

    /// Resize (when a width is requested) and encode an already decoded image
    pub fn process_image(
        &self,
        image: DynamicImage,
        params: &RequestParams,
    ) -> Result<Vec<u8>, ImageError> {
        let image = if params.width > 0 {
            resize(image, params.width)
        } else {
            image
        };

        let encoder =
            Encoder::new(params.format, params.quality)?.with_avif_speed(self.avif_speed);
        encoder.encode(&image)
    }

    /// Load, transform and encode on the blocking thread pool
    pub async fn render(
        &self,
        path: PathBuf,
        params: RequestParams,
    ) -> Result<Vec<u8>, ImageError> {
        let service = self.clone();

        tokio::task::spawn_blocking(move || -> Result<Vec<u8>, ImageError> {
            let image = service.load_image(&path)?;
            service.process_image(image, &params)
        })
        .await
        .map_err(|e| ImageError::TaskFailed(e.to_string()))?
    }

    /// Turn an error into a response: client errors carry their message, server errors are logged
    pub fn error_response(&self, err: &ImageError) -> Response {
        let status = err.status_code(self.load_error_status);

        if status.is_client_error() {
            debug!("Rejecting image request ({}): {}", status, err);
            (status, err.to_string()).into_response()
        } else {
            error!("Failed to serve image: {}", err);
            (status, status.canonical_reason().unwrap_or("Error")).into_response()
        }
    }
}

/// `GET /image/{*path}`
pub async fn image_handler(
    State(app_state): State<AppState>,
    Path(path): Path<String>,
    RawQuery(raw_query): RawQuery,
    headers: HeaderMap,
) -> Response {
    let service = &app_state.image_service;
    let query = ImageQuery::from_query_string(raw_query.as_deref().unwrap_or(""));

    let image_path = match service.resolve(&path) {
        Ok(image_path) => image_path,
        Err(e) => return service.error_response(&e),
    };
    debug!("Resolved image path: {:?}", image_path);

    let accept_header = headers
        .get(header::ACCEPT)
        .and_then(|h| h.to_str().ok())
        .unwrap_or("");

    let params = match service.parse_params(&query, accept_header) {
        Ok(params) => params,
        Err(e) => return service.error_response(&e),
    };
    debug!(
        "Serving image: {}, width={}, quality={}, format={}",
        path, params.width, params.quality, params.format
    );

    match service.render(image_path, params).await {
        Ok(data) => {
            let mut headers = HeaderMap::new();
            headers.insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static(params.format.mime_type()),
            );
            headers.insert(header::CONTENT_LENGTH, HeaderValue::from(data.len()));

            (StatusCode::OK, headers, Body::from(data)).into_response()
        }
        Err(e) => service.error_response(&e),
    }
}
