// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Seam between the extraction service and whatever performs OCR

use image::DynamicImage;

use crate::layout::TextFragment;

/// Something that turns an image into positioned text fragments
///
/// Implementations are blocking and CPU-bound; async callers should go
/// through `spawn_blocking`. Fragment order is unspecified.
#[cfg_attr(test, mockall::automock)]
pub trait OcrProvider: Send + Sync {
    fn recognize(&self, image: &DynamicImage) -> anyhow::Result<Vec<TextFragment>>;
}
