// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! PaddleOCR model wrapper for text detection and recognition

use anyhow::{Context, Result};
use image::DynamicImage;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

use super::detection::{DetectionOptions, OcrDetectionModel};
use super::preprocessing::{
    crop_region, preprocess_for_detection, preprocess_for_recognition, Letterbox, OCR_INPUT_SIZE,
};
use super::recognition::OcrRecognitionModel;
use crate::layout::TextFragment;
use crate::vision::provider::OcrProvider;

/// Detection model file name inside the model directory
pub const DETECTION_MODEL_FILE: &str = "det_model.onnx";
/// Recognition model file name inside the model directory
pub const RECOGNITION_MODEL_FILE: &str = "rec_model.onnx";
/// Character dictionary file name inside the model directory
pub const DICTIONARY_FILE: &str = "ppocr_keys_v1.txt";

/// Bounding box for detected text, in original image pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    /// Four-corner fragment (TL, TR, BR, BL) carrying the recognized text
    pub fn to_fragment(&self, text: String, confidence: f32) -> TextFragment {
        TextFragment::from_rect(
            self.x as f64,
            self.y as f64,
            self.width as f64,
            self.height as f64,
            text,
            confidence,
        )
    }
}

/// Options used when loading the PaddleOCR models
#[derive(Debug, Clone, Copy)]
pub struct PaddleOcrOptions {
    pub detection: DetectionOptions,
    /// Threads per ONNX session
    pub intra_threads: usize,
}

impl Default for PaddleOcrOptions {
    fn default() -> Self {
        Self {
            detection: DetectionOptions::default(),
            intra_threads: 4,
        }
    }
}

/// PaddleOCR model for text extraction
///
/// Combines text detection and recognition models for end-to-end OCR.
/// Runs on CPU only.
#[derive(Debug)]
pub struct PaddleOcrModel {
    detector: OcrDetectionModel,
    recognizer: OcrRecognitionModel,
    model_dir: PathBuf,
}

impl PaddleOcrModel {
    /// Load PaddleOCR models from the specified directory
    ///
    /// Expected files:
    /// - det_model.onnx (text detection)
    /// - rec_model.onnx (text recognition)
    /// - ppocr_keys_v1.txt (character dictionary)
    pub async fn new<P: AsRef<Path>>(model_dir: P, options: PaddleOcrOptions) -> Result<Self> {
        let model_dir = model_dir.as_ref();
        debug!("Loading PaddleOCR models from {}", model_dir.display());

        if !model_dir.is_dir() {
            anyhow::bail!("OCR model directory not found: {}", model_dir.display());
        }

        let detector =
            OcrDetectionModel::new(model_dir.join(DETECTION_MODEL_FILE), options.intra_threads)
                .await
                .context("Failed to load detection model")?
                .with_options(options.detection);

        let recognizer = OcrRecognitionModel::new(
            model_dir.join(RECOGNITION_MODEL_FILE),
            model_dir.join(DICTIONARY_FILE),
            options.intra_threads,
        )
        .await
        .context("Failed to load recognition model")?;

        info!(
            "PaddleOCR ready ({} dictionary entries)",
            recognizer.dictionary_size()
        );

        Ok(Self {
            detector,
            recognizer,
            model_dir: model_dir.to_path_buf(),
        })
    }

    pub fn model_dir(&self) -> &Path {
        &self.model_dir
    }

    /// Process an image and extract positioned text fragments
    ///
    /// Fragments come back in detection order; reading order is the line
    /// reconstructor's job. Regions that recognize to nothing are dropped.
    pub fn process(&self, image: &DynamicImage) -> Result<Vec<TextFragment>> {
        let start = Instant::now();

        let fit = Letterbox::new(image, OCR_INPUT_SIZE);
        let input = preprocess_for_detection(image);
        let regions = self.detector.detect(&input)?;

        let mut fragments = Vec::with_capacity(regions.len());
        for detected in regions.iter().filter(|r| r.has_extent()) {
            let Some(region) =
                fit.map_rect(detected.x, detected.y, detected.width, detected.height)
            else {
                continue;
            };

            let crop = crop_region(image, &region);
            let recognized = self
                .recognizer
                .recognize(&preprocess_for_recognition(&crop))?;
            if recognized.is_empty() {
                continue;
            }

            fragments.push(region.to_fragment(recognized.text, recognized.confidence));
        }

        debug!(
            "OCR produced {} fragments from {} regions in {}ms",
            fragments.len(),
            regions.len(),
            start.elapsed().as_millis()
        );

        Ok(fragments)
    }
}

impl OcrProvider for PaddleOcrModel {
    fn recognize(&self, image: &DynamicImage) -> Result<Vec<TextFragment>> {
        self.process(image)
    }
}
