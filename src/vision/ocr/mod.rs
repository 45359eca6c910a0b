// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Chinese OCR on PP-OCR ONNX models, CPU only
//!
//! An image goes through `preprocessing`, then `detection` finds text
//! regions, each region is cropped and read by `recognition`, and `model`
//! ties the stages together into positioned fragments.

pub mod detection;
pub mod model;
pub mod preprocessing;
pub mod recognition;
pub mod runtime;

pub use detection::{DetectionOptions, OcrDetectionModel, TextRegion};
pub use model::{BoundingBox, PaddleOcrModel, PaddleOcrOptions};
pub use recognition::{OcrRecognitionModel, RecognizedText};
