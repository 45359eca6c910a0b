// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Vision processing module for CPU-based image analysis
//!
//! This module provides:
//! - Image intake from base64, data URLs, raw bytes and the clipboard
//! - OCR (Optical Character Recognition) via PaddleOCR

pub mod clipboard;
pub mod image_utils;
pub mod model_manager;
pub mod ocr;
pub mod provider;

pub use clipboard::{capture_clipboard_image, ClipboardError};
pub use image_utils::{
    decode_base64_image, decode_image_bytes, detect_format, ImageError, ImageInfo, MAX_IMAGE_SIZE,
};
pub use model_manager::{VisionModelConfig, VisionModelManager};
pub use provider::OcrProvider;
