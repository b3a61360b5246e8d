use tracing::debug;

use super::error::ImageError;
use super::types::OutputFormat;

/// Raw query string values, kept as strings so validation errors carry our own messages
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageQuery {
    pub w: Option<String>,
    pub q: Option<String>,
    pub f: Option<String>,
}

impl ImageQuery {
    /// Decode a raw query string. When a parameter repeats, the first value wins.
    pub fn from_query_string(raw: &str) -> Self {
        let mut query = Self::default();

        for (key, value) in url::form_urlencoded::parse(raw.as_bytes()) {
            let slot = match &*key {
                "w" => &mut query.w,
                "q" => &mut query.q,
                "f" => &mut query.f,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into_owned());
            }
        }

        query
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageDefaults {
    pub quality: u8,
    pub format: OutputFormat,
}

/// Validated per-request parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestParams {
    /// Target width, 0 means keep the source size
    pub width: u32,
    pub quality: u8,
    pub format: OutputFormat,
}

/// Accept header media types mapped to output formats
const ACCEPT_FORMATS: [(&str, OutputFormat); 5] = [
    ("image/webp", OutputFormat::WebP),
    ("image/avif", OutputFormat::Avif),
    ("image/png", OutputFormat::Png),
    ("image/apng", OutputFormat::Png),
    ("image/jpeg", OutputFormat::Jpeg),
];

/// Parse width, quality and format for one request.
///
/// The format comes from the `f` parameter when present, otherwise from the
/// first supported media type listed in `accept_header`, otherwise from the
/// configured default. Accept header q-values are ignored: listing order alone
/// decides.
pub fn parse(
    query: &ImageQuery,
    accept_header: &str,
    defaults: &ImageDefaults,
) -> Result<RequestParams, ImageError> {
    let width = parse_width(query.w.as_deref())?;
    let quality = parse_quality(query.q.as_deref(), defaults.quality)?;
    let format = determine_format(query.f.as_deref(), accept_header, defaults.format)?;

    Ok(RequestParams {
        width,
        quality,
        format,
    })
}

fn parse_width(value: Option<&str>) -> Result<u32, ImageError> {
    match value {
        None | Some("") => Ok(0),
        // Anything above u32::MAX is clamped to the source width later anyway
        Some(raw) => raw
            .parse::<u64>()
            .map(|width| u32::try_from(width).unwrap_or(u32::MAX))
            .map_err(|e| ImageError::invalid_param("width", e)),
    }
}

fn parse_quality(value: Option<&str>, default: u8) -> Result<u8, ImageError> {
    let raw = match value {
        None | Some("") => return Ok(default),
        Some(raw) => raw,
    };

    let quality = raw
        .parse::<i64>()
        .map_err(|e| ImageError::invalid_param("quality", e))?;

    if !(1..=100).contains(&quality) {
        return Err(ImageError::invalid_param(
            "quality",
            "quality must be between 1 and 100",
        ));
    }

    Ok(quality as u8)
}

fn determine_format(
    format_param: Option<&str>,
    accept_header: &str,
    default: OutputFormat,
) -> Result<OutputFormat, ImageError> {
    if let Some(param) = format_param {
        return format_from_param(param);
    }

    match format_from_accept_header(accept_header) {
        Some(format) => Ok(format),
        None => {
            debug!(
                "No supported format in Accept header {:?}, using default {}",
                accept_header, default
            );
            Ok(default)
        }
    }
}

fn format_from_param(param: &str) -> Result<OutputFormat, ImageError> {
    if param.is_empty() {
        return Err(ImageError::invalid_param(
            "format",
            "no image format specified",
        ));
    }
    param.parse()
}

/// First supported media type in header order, or `None` when nothing matches
pub(crate) fn format_from_accept_header(accept_header: &str) -> Option<OutputFormat> {
    accept_header.split(',').find_map(|candidate| {
        let media_type = candidate.split(';').next().unwrap_or("").trim();
        ACCEPT_FORMATS
            .iter()
            .find(|(name, _)| *name == media_type)
            .map(|(_, format)| *format)
    })
}
