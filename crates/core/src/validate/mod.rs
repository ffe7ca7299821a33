//! Candidate validation.
//!
//! Every candidate is sniffed from its bytes; whatever the provider or the HTTP
//! response claimed is ignored. A candidate either becomes a `ValidatedAsset`
//! ready to persist, or is rejected with a reason that ends up in the run report.

use std::io::Cursor;

use image::{GenericImageView, ImageFormat};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{Candidate, LogoFormat};

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];
const ICO_SIGNATURE: [u8; 4] = [0x00, 0x00, 0x01, 0x00];

/// How far into a markup document we look for HTML markers.
const MARKUP_HEAD_BYTES: usize = 1024;

/// Any of these in the markup head makes the candidate an HTML page, even when
/// it embeds an inline `<svg>`.
const HTML_MARKERS: &[&str] = &["<!doctype html", "<html", "<head", "<body"];

/// Thresholds used to tell a real logo from a placeholder or an error page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationRules {
    pub svg_min_bytes: usize,
    /// Oversized "SVG" responses are usually mis-served pages or icon bundles.
    pub svg_max_bytes: usize,
    /// Floor for PNG, WebP, JPEG, GIF and ICO candidates.
    pub raster_min_bytes: usize,
    /// Decode PNGs and require an alpha channel, real transparency and a minimum size.
    pub strict_png: bool,
    pub min_dimension: u32,
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            svg_min_bytes: 200,
            svg_max_bytes: 200 * 1024,
            raster_min_bytes: 500,
            strict_png: false,
            min_dimension: 100,
        }
    }
}

/// What the bytes look like.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sniffed {
    Html,
    Image(LogoFormat),
}

/// Why a candidate was discarded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("response is an HTML document")]
    Html,
    #[error("unrecognized content")]
    Unrecognized,
    #[error("{format} too small ({size} < {min} bytes)")]
    TooSmall { format: LogoFormat, size: usize, min: usize },
    #[error("{format} too large ({size} > {max} bytes)")]
    TooLarge { format: LogoFormat, size: usize, max: usize },
    #[error("svg is missing an opening or closing <svg> tag")]
    MissingSvgTags,
    #[error("png has no alpha channel")]
    NoAlpha,
    #[error("png has no transparent pixels")]
    Opaque,
    #[error("image is {width}x{height}, below {min}px")]
    TooFewPixels { width: u32, height: u32, min: u32 },
    #[error("failed to decode {format}: {reason}")]
    Decode { format: LogoFormat, reason: String },
}

/// A candidate that passed validation, ready to be written as `<slug>.<format>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedAsset {
    pub bytes: Vec<u8>,
    /// Format of `bytes`; always an asset format.
    pub format: LogoFormat,
    /// Format the candidate was sniffed as (differs from `format` for re-encoded ICOs).
    pub sniffed: LogoFormat,
}

/// Identify candidate bytes by magic numbers and markup markers.
pub fn sniff_format(bytes: &[u8]) -> Option<Sniffed> {
    if bytes.starts_with(&PNG_SIGNATURE) {
        return Some(Sniffed::Image(LogoFormat::Png));
    }
    if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        return Some(Sniffed::Image(LogoFormat::Jpg));
    }
    if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        return Some(Sniffed::Image(LogoFormat::Gif));
    }
    if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        return Some(Sniffed::Image(LogoFormat::Webp));
    }
    if bytes.starts_with(&ICO_SIGNATURE) {
        return Some(Sniffed::Image(LogoFormat::Ico));
    }
    sniff_markup(bytes)
}

fn sniff_markup(bytes: &[u8]) -> Option<Sniffed> {
    let text = String::from_utf8_lossy(bytes);
    let trimmed = text.trim_start_matches(|c: char| c.is_whitespace() || c == '\u{feff}');
    if !trimmed.starts_with('<') {
        return None;
    }

    let head: String = trimmed.chars().take(MARKUP_HEAD_BYTES).collect::<String>().to_lowercase();
    if HTML_MARKERS.iter().any(|marker| head.contains(marker)) {
        return Some(Sniffed::Html);
    }
    match root_element(&head) {
        Some(name) if name == "svg" || name.ends_with(":svg") => {
            Some(Sniffed::Image(LogoFormat::Svg))
        }
        _ => None,
    }
}

/// Name of the first element, skipping the XML prolog, comments and doctypes.
fn root_element(markup: &str) -> Option<&str> {
    let mut rest = markup.trim_start();
    loop {
        if let Some(after) = rest.strip_prefix("<!--") {
            rest = &after[after.find("-->")? + 3..];
        } else if rest.starts_with("<?") || rest.starts_with("<!") {
            rest = &rest[rest.find('>')? + 1..];
        } else {
            let tag = rest.strip_prefix('<')?;
            let end = tag
                .find(|c: char| c.is_whitespace() || c == '>' || c == '/')
                .unwrap_or(tag.len());
            return Some(&tag[..end]);
        }
        rest = rest.trim_start();
    }
}

/// Validate a candidate against `rules`.
///
/// ICO candidates are re-encoded to PNG; everything else is passed through as-is.
pub fn validate_candidate(
    candidate: &Candidate,
    rules: &ValidationRules,
) -> Result<ValidatedAsset, Rejection> {
    let bytes = &candidate.bytes;
    let format = match sniff_format(bytes) {
        Some(Sniffed::Html) => return Err(Rejection::Html),
        Some(Sniffed::Image(format)) => format,
        None => return Err(Rejection::Unrecognized),
    };

    if let Some(declared) = candidate.declared {
        if declared != format {
            tracing::debug!(
                origin = %candidate.origin,
                %declared,
                sniffed = %format,
                "declared format differs from content"
            );
        }
    }

    let raster_floor = rules.raster_min_bytes.max(candidate.min_bytes.unwrap_or(0));
    match format {
        LogoFormat::Svg => {
            check_svg(bytes, rules)?;
            Ok(ValidatedAsset { bytes: bytes.clone(), format, sniffed: format })
        }
        LogoFormat::Png => {
            check_floor(format, bytes.len(), raster_floor)?;
            if rules.strict_png {
                check_png_quality(bytes, rules.min_dimension)?;
            }
            Ok(ValidatedAsset { bytes: bytes.clone(), format, sniffed: format })
        }
        LogoFormat::Webp | LogoFormat::Jpg | LogoFormat::Gif => {
            check_floor(format, bytes.len(), raster_floor)?;
            Ok(ValidatedAsset { bytes: bytes.clone(), format, sniffed: format })
        }
        LogoFormat::Ico => {
            check_floor(format, bytes.len(), raster_floor)?;
            let png = ico_to_png(bytes)?;
            Ok(ValidatedAsset { bytes: png, format: LogoFormat::Png, sniffed: format })
        }
    }
}

fn check_floor(format: LogoFormat, size: usize, min: usize) -> Result<(), Rejection> {
    if size < min {
        return Err(Rejection::TooSmall { format, size, min });
    }
    Ok(())
}

fn check_svg(bytes: &[u8], rules: &ValidationRules) -> Result<(), Rejection> {
    let size = bytes.len();
    check_floor(LogoFormat::Svg, size, rules.svg_min_bytes)?;
    if size > rules.svg_max_bytes {
        return Err(Rejection::TooLarge { format: LogoFormat::Svg, size, max: rules.svg_max_bytes });
    }
    let text = String::from_utf8_lossy(bytes).to_lowercase();
    if !text.contains("<svg") || !text.contains("</svg>") {
        return Err(Rejection::MissingSvgTags);
    }
    Ok(())
}

fn check_png_quality(bytes: &[u8], min_dimension: u32) -> Result<(), Rejection> {
    let image = image::load_from_memory_with_format(bytes, ImageFormat::Png)
        .map_err(|e| Rejection::Decode { format: LogoFormat::Png, reason: e.to_string() })?;

    if !image.color().has_alpha() {
        return Err(Rejection::NoAlpha);
    }
    let (width, height) = image.dimensions();
    if width < min_dimension || height < min_dimension {
        return Err(Rejection::TooFewPixels { width, height, min: min_dimension });
    }
    if !image.to_rgba8().pixels().any(|p| p.0[3] < u8::MAX) {
        return Err(Rejection::Opaque);
    }
    Ok(())
}

/// Decode an ICO (largest entry) and re-encode it as RGBA PNG.
pub fn ico_to_png(bytes: &[u8]) -> Result<Vec<u8>, Rejection> {
    let image = image::load_from_memory_with_format(bytes, ImageFormat::Ico)
        .map_err(|e| Rejection::Decode { format: LogoFormat::Ico, reason: e.to_string() })?;
    let rgba = image::DynamicImage::ImageRgba8(image.to_rgba8());

    let mut out = Cursor::new(Vec::new());
    rgba.write_to(&mut out, ImageFormat::Png)
        .map_err(|e| Rejection::Decode { format: LogoFormat::Ico, reason: e.to_string() })?;
    Ok(out.into_inner())
}
