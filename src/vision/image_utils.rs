// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image intake for pasted, uploaded and encoded screenshots
//!
//! The container format is sniffed from the leading bytes; any format hint a
//! client sends is advisory only.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{DynamicImage, ImageFormat};
use serde::Serialize;
use thiserror::Error;

/// Largest accepted image, after base64 decoding (10MB)
pub const MAX_IMAGE_SIZE: usize = 10 * 1024 * 1024;

/// Leading bytes of every accepted container except WebP
const SIGNATURES: &[(&[u8], ImageFormat)] = &[
    (b"\x89PNG", ImageFormat::Png),
    (b"\xFF\xD8\xFF", ImageFormat::Jpeg),
    (b"GIF87a", ImageFormat::Gif),
    (b"GIF89a", ImageFormat::Gif),
    (b"II*\x00", ImageFormat::Tiff),
    (b"MM\x00*", ImageFormat::Tiff),
    (b"BM", ImageFormat::Bmp),
];

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Image data is too large: {0} bytes (max: {1} bytes)")]
    TooLarge(usize, usize),

    #[error("Invalid base64 encoding: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    #[error("Unsupported image format (expected PNG, JPEG, WebP, GIF, BMP or TIFF)")]
    UnsupportedFormat,

    #[error("Failed to decode image: {0}")]
    DecodeFailed(String),

    #[error("Image data is empty")]
    EmptyData,
}

/// Metadata of a decoded image, echoed back to API clients
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    #[serde(serialize_with = "serialize_format")]
    pub format: ImageFormat,
    /// Encoded size in bytes
    pub size_bytes: usize,
}

fn serialize_format<S: serde::Serializer>(format: &ImageFormat, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(format_to_extension(*format))
}

/// Drop a `data:image/...;base64,` prefix as produced by browser paste events
pub fn strip_data_url(input: &str) -> &str {
    let trimmed = input.trim();
    match trimmed.strip_prefix("data:") {
        Some(rest) => rest.split_once(',').map(|(_, data)| data).unwrap_or(rest),
        None => trimmed,
    }
}

/// Decode a base64 string or `data:` URL into an image
pub fn decode_base64_image(encoded: &str) -> Result<(DynamicImage, ImageInfo), ImageError> {
    let payload = strip_data_url(encoded);
    if payload.is_empty() {
        return Err(ImageError::EmptyData);
    }

    decode_image_bytes(&STANDARD.decode(payload)?)
}

/// Decode raw image bytes such as a multipart upload
pub fn decode_image_bytes(bytes: &[u8]) -> Result<(DynamicImage, ImageInfo), ImageError> {
    match bytes.len() {
        0 => return Err(ImageError::EmptyData),
        len if len > MAX_IMAGE_SIZE => return Err(ImageError::TooLarge(len, MAX_IMAGE_SIZE)),
        _ => {}
    }

    let format = detect_format(bytes)?;
    let image = image::load_from_memory_with_format(bytes, format)
        .map_err(|e| ImageError::DecodeFailed(e.to_string()))?;

    let info = ImageInfo {
        width: image.width(),
        height: image.height(),
        format,
        size_bytes: bytes.len(),
    };
    Ok((image, info))
}

/// Identify the container from its magic bytes
pub fn detect_format(bytes: &[u8]) -> Result<ImageFormat, ImageError> {
    if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        return Ok(ImageFormat::WebP);
    }

    SIGNATURES
        .iter()
        .find(|(magic, _)| bytes.len() >= 4 && bytes.starts_with(magic))
        .map(|&(_, format)| format)
        .ok_or(ImageError::UnsupportedFormat)
}

/// File extension used when reporting a format
fn format_to_extension(format: ImageFormat) -> &'static str {
    match format {
        ImageFormat::Png => "png",
        ImageFormat::Jpeg => "jpg",
        ImageFormat::WebP => "webp",
        ImageFormat::Gif => "gif",
        ImageFormat::Bmp => "bmp",
        ImageFormat::Tiff => "tiff",
        _ => "unknown",
    }
}
