// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Clipboard image capture for the paste workflow

use arboard::Clipboard;
use image::{DynamicImage, RgbaImage};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("No image found in clipboard. Please copy an image and try again.")]
    NoImage,

    #[error("Error accessing clipboard: {0}")]
    Access(String),

    #[error("Clipboard image has inconsistent dimensions {width}x{height} for {len} bytes")]
    InvalidImage {
        width: usize,
        height: usize,
        len: usize,
    },
}

/// Read the current clipboard image
///
/// Blocking; call from `spawn_blocking` inside async code.
pub fn capture_clipboard_image() -> Result<DynamicImage, ClipboardError> {
    let mut clipboard = Clipboard::new().map_err(|e| ClipboardError::Access(e.to_string()))?;

    match clipboard.get_image() {
        Ok(data) => {
            debug!("Clipboard image {}x{}", data.width, data.height);
            image_from_rgba(data.width, data.height, data.bytes.into_owned())
        }
        Err(arboard::Error::ContentNotAvailable) => Err(ClipboardError::NoImage),
        Err(e) => Err(ClipboardError::Access(e.to_string())),
    }
}

/// Wrap raw RGBA8 clipboard pixels into an image
pub fn image_from_rgba(
    width: usize,
    height: usize,
    bytes: Vec<u8>,
) -> Result<DynamicImage, ClipboardError> {
    let len = bytes.len();
    let invalid = || ClipboardError::InvalidImage { width, height, len };

    let w = u32::try_from(width).map_err(|_| invalid())?;
    let h = u32::try_from(height).map_err(|_| invalid())?;

    RgbaImage::from_raw(w, h, bytes)
        .map(DynamicImage::ImageRgba8)
        .ok_or_else(invalid)
}
