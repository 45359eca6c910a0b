// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Extraction request types and validation

use serde::{Deserialize, Serialize};

use crate::api::errors::ApiError;
use crate::vision::MAX_IMAGE_SIZE;

/// Supported image formats
pub const SUPPORTED_FORMATS: &[&str] = &["png", "jpg", "jpeg", "webp", "gif", "bmp", "tiff"];

/// Base64 inflates by 4/3, plus room for a `data:` URL prefix
const MAX_ENCODED_IMAGE_SIZE: usize = MAX_IMAGE_SIZE / 3 * 4 + 64;

fn default_format() -> String {
    "png".to_string()
}

/// Request for text extraction from an image
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractRequest {
    /// Base64-encoded image data or a `data:image/...;base64,` URL
    #[serde(default)]
    pub image: Option<String>,

    /// Image format hint; the real format is sniffed from the bytes
    #[serde(default = "default_format")]
    pub format: String,
}

impl ExtractRequest {
    /// Validate the extraction request
    pub fn validate(&self) -> Result<(), ApiError> {
        let image = match self.image.as_deref() {
            Some(image) if !image.trim().is_empty() => image,
            _ => return Err(ApiError::validation("image", "image is required")),
        };

        if image.len() > MAX_ENCODED_IMAGE_SIZE {
            return Err(ApiError::PayloadTooLarge(format!(
                "image exceeds maximum size of {} bytes",
                MAX_IMAGE_SIZE
            )));
        }

        if !SUPPORTED_FORMATS.contains(&self.format.to_lowercase().as_str()) {
            return Err(ApiError::validation(
                "format",
                format!(
                    "unsupported format '{}', supported: {:?}",
                    self.format, SUPPORTED_FORMATS
                ),
            ));
        }

        Ok(())
    }
}
