// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Extraction response types

use serde::Serialize;

use crate::service::Extraction;
use crate::vision::ImageInfo;

/// Response from an extraction
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractResponse {
    #[serde(flatten)]
    pub extraction: Extraction,
    /// Decoded image metadata, absent for clipboard captures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageInfo>,
    /// User-facing notice when nothing could be extracted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

impl ExtractResponse {
    pub fn new(extraction: Extraction, image: Option<ImageInfo>) -> Self {
        Self {
            extraction,
            image,
            notice: None,
        }
    }

    /// Empty extraction carrying only a notice
    pub fn notice(message: impl Into<String>) -> Self {
        Self {
            extraction: Extraction::default(),
            image: None,
            notice: Some(message.into()),
        }
    }
}
