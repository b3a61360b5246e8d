use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub mod image_processing;
pub mod startup_checks;
pub mod webp_encoder;

use image_processing::{ImageLoader, ImageService, LoadErrorStatus, OutputFormat};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub static_files: StaticConfig,
    pub image: ImageConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StaticConfig {
    pub directory: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ImageConfig {
    /// Quality used when the request has no `q` parameter (1-100)
    pub default_quality: u8,
    /// Format used when neither `f` nor the Accept header picks one
    pub default_format: OutputFormat,
    /// Whether a missing source file answers 404 or the legacy 500
    pub load_error_status: LoadErrorStatus,
    /// libaom speed preset, 0 (slowest) to 10 (fastest)
    pub avif_speed: u8,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

impl Default for StaticConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("static"),
        }
    }
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            default_quality: 75,
            default_format: OutputFormat::Jpeg,
            load_error_status: LoadErrorStatus::Distinguish,
            avif_speed: image_processing::formats::DEFAULT_AVIF_SPEED,
        }
    }
}

use axum::Router;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub image_service: ImageService,
}

pub fn create_app(config: Config) -> Router {
    let loader = ImageLoader::new(config.static_files.directory.clone());
    let image_service = ImageService::new(loader, &config.image);

    let app_state = AppState { image_service };

    Router::new()
        .route(
            "/image/{*path}",
            axum::routing::get(image_processing::image_handler),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    let method = request.method();
                    let uri = request.uri();
                    let matched_path = request
                        .extensions()
                        .get::<axum::extract::MatchedPath>()
                        .map(|matched_path| matched_path.as_str());

                    tracing::info_span!(
                        "http_request",
                        method = %method,
                        uri = %uri,
                        matched_path,
                    )
                })
                .on_request(|request: &axum::http::Request<_>, _span: &tracing::Span| {
                    let method = request.method();
                    let uri = request.uri();
                    let headers = request.headers();
                    let user_agent = headers
                        .get("user-agent")
                        .and_then(|h| h.to_str().ok())
                        .unwrap_or("-");
                    let accept = headers
                        .get("accept")
                        .and_then(|h| h.to_str().ok())
                        .unwrap_or("-");

                    tracing::info!(
                        target: "access_log",
                        method = %method,
                        path = %uri.path(),
                        query = ?uri.query(),
                        user_agent = %user_agent,
                        accept = %accept,
                        "request"
                    );
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     _span: &tracing::Span| {
                        let status = response.status();
                        let size = response
                            .headers()
                            .get("content-length")
                            .and_then(|h| h.to_str().ok())
                            .unwrap_or("-");
                        let content_type = response
                            .headers()
                            .get("content-type")
                            .and_then(|h| h.to_str().ok())
                            .unwrap_or("-");

                        tracing::info!(
                            target: "access_log",
                            status = %status,
                            size = %size,
                            content_type = %content_type,
                            latency_ms = %latency.as_millis(),
                            "response"
                        );
                    },
                ),
        )
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_values() {
        let config = Config::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.static_files.directory, PathBuf::from("static"));
        assert_eq!(config.image.default_quality, 75);
        assert_eq!(config.image.default_format, OutputFormat::Jpeg);
        assert_eq!(
            config.image.load_error_status,
            LoadErrorStatus::Distinguish
        );
    }

    #[test]
    fn test_partial_toml_fills_in_defaults() {
        let toml = r#"
            [server]
            port = 9000

            [image]
            default_format = "webp"
            load_error_status = "legacy"
        "#;

        let config: Config = toml_edit::de::from_str(toml).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.image.default_format, OutputFormat::WebP);
        assert_eq!(config.image.default_quality, 75);
        assert_eq!(config.image.load_error_status, LoadErrorStatus::Legacy);
        assert_eq!(config.static_files.directory, PathBuf::from("static"));
    }

    #[test]
    fn test_unknown_default_format_is_rejected() {
        let toml = r#"
            [image]
            default_format = "bmp"
        "#;

        assert!(toml_edit::de::from_str::<Config>(toml).is_err());
    }
}
