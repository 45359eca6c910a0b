// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Startup loading of the OCR models

use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use crate::vision::ocr::{DetectionOptions, PaddleOcrModel, PaddleOcrOptions};
use crate::vision::provider::OcrProvider;

/// Default location of the PaddleOCR ONNX files
pub const DEFAULT_OCR_MODEL_DIR: &str = "./models/paddleocr-onnx";

#[derive(Debug, Clone)]
pub struct VisionModelConfig {
    /// `None` runs without OCR
    pub ocr_model_dir: Option<String>,
    pub detection: DetectionOptions,
    /// Threads per ONNX session
    pub intra_threads: usize,
}

impl Default for VisionModelConfig {
    fn default() -> Self {
        Self {
            ocr_model_dir: Some(DEFAULT_OCR_MODEL_DIR.to_string()),
            detection: DetectionOptions::default(),
            intra_threads: 4,
        }
    }
}

/// Holds whatever OCR backend could be loaded
///
/// A missing or broken model directory is logged and leaves OCR off; the
/// rest of the service keeps working without it.
#[derive(Default)]
pub struct VisionModelManager {
    ocr: Option<Arc<PaddleOcrModel>>,
}

impl VisionModelManager {
    pub async fn new(config: VisionModelConfig) -> anyhow::Result<Self> {
        let Some(dir) = config.ocr_model_dir.as_deref() else {
            info!("No OCR model directory configured");
            return Ok(Self::default());
        };

        let options = PaddleOcrOptions {
            detection: config.detection,
            intra_threads: config.intra_threads.max(1),
        };
        let ocr = match PaddleOcrModel::new(Path::new(dir), options).await {
            Ok(model) => Some(Arc::new(model)),
            Err(e) => {
                warn!("OCR unavailable, could not load models from {}: {:#}", dir, e);
                None
            }
        };

        Ok(Self { ocr })
    }

    pub fn has_ocr(&self) -> bool {
        self.ocr.is_some()
    }

    /// The loaded model as the service sees it
    pub fn get_ocr_provider(&self) -> Option<Arc<dyn OcrProvider>> {
        let model = self.ocr.clone()?;
        Some(model as Arc<dyn OcrProvider>)
    }
}
