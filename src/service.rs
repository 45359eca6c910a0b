// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image to pinyin pipeline
//!
//! `ImageToPinyin` wires the OCR provider, the line reconstructor, the
//! transliterator and the optional translator together. The HTTP server and
//! the CLI both drive it.

use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::layout::{LineReconstructor, ReconstructError, ReconstructedLine, TextFragment};
use crate::translation::{GoogleTranslateClient, TargetLanguage, Translator};
use crate::transliteration::Transliterator;
use crate::vision::{OcrProvider, VisionModelManager};

/// Shown instead of a translation when there is nothing to translate
pub const NO_TEXT_MESSAGE: &str = "No text to translate.";

/// Prefix of the message shown when the translator fails
pub const TRANSLATION_ERROR_PREFIX: &str = "Error during translation: ";

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("OCR model is not available")]
    OcrUnavailable,

    #[error("OCR failed: {0:#}")]
    Ocr(anyhow::Error),

    #[error(transparent)]
    Reconstruct(#[from] ReconstructError),

    #[error("OCR task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Result of one extraction
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Extraction {
    /// Lines in reading order separated by newlines
    pub text: String,
    /// Pinyin of each line, joined with newlines
    pub pinyin: String,
    pub lines: Vec<ReconstructedLine>,
    pub fragment_count: usize,
    pub processing_time_ms: u64,
}

impl Extraction {
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

pub struct ImageToPinyin {
    ocr: Option<Arc<dyn OcrProvider>>,
    reconstructor: LineReconstructor,
    transliterator: Arc<dyn Transliterator>,
    translator: Option<Arc<dyn Translator>>,
}

impl ImageToPinyin {
    pub fn new(reconstructor: LineReconstructor, transliterator: Arc<dyn Transliterator>) -> Self {
        Self {
            ocr: None,
            reconstructor,
            transliterator,
            translator: None,
        }
    }

    pub fn with_ocr(mut self, ocr: Arc<dyn OcrProvider>) -> Self {
        self.ocr = Some(ocr);
        self
    }

    pub fn with_translator(mut self, translator: Arc<dyn Translator>) -> Self {
        self.translator = Some(translator);
        self
    }

    /// Build the service from configuration
    ///
    /// OCR models that fail to load leave the service without OCR; the
    /// server still starts and reports it through `/health`.
    pub async fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        config.validate()?;

        let mut service = Self::new(
            config.line_reconstructor()?,
            Arc::new(config.transliterator()),
        );

        let models = VisionModelManager::new(config.vision_model_config()).await?;
        if let Some(ocr) = models.get_ocr_provider() {
            service = service.with_ocr(ocr);
        }

        if config.translation.enabled {
            let client = GoogleTranslateClient::new(
                &config.translation.endpoint,
                config.translation.timeout(),
            )?;
            service = service.with_translator(Arc::new(client));
        } else {
            info!("Translation disabled by configuration");
        }

        Ok(service)
    }

    pub fn has_ocr(&self) -> bool {
        self.ocr.is_some()
    }

    pub fn has_translator(&self) -> bool {
        self.translator.is_some()
    }

    pub fn reconstructor(&self) -> &LineReconstructor {
        &self.reconstructor
    }

    pub fn transliterator(&self) -> &dyn Transliterator {
        self.transliterator.as_ref()
    }

    /// Turn already recognized fragments into text and pinyin
    pub fn extract_fragments(
        &self,
        fragments: &[TextFragment],
    ) -> Result<Extraction, ReconstructError> {
        self.extract_fragments_with(&self.reconstructor, fragments)
    }

    /// Same as `extract_fragments` with a caller-chosen reconstructor
    pub fn extract_fragments_with(
        &self,
        reconstructor: &LineReconstructor,
        fragments: &[TextFragment],
    ) -> Result<Extraction, ReconstructError> {
        let start = Instant::now();
        let lines =
            reconstructor.reconstruct_transliterated(fragments, self.transliterator.as_ref())?;

        let text = lines
            .iter()
            .map(|line| line.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
            .trim()
            .to_string();
        // Per line, so the delimiter never wraps the line breaks
        let pinyin = lines
            .iter()
            .filter_map(|line| line.transliteration.as_deref())
            .collect::<Vec<_>>()
            .join("\n")
            .trim()
            .to_string();

        Ok(Extraction {
            text,
            pinyin,
            lines,
            fragment_count: fragments.len(),
            processing_time_ms: start.elapsed().as_millis() as u64,
        })
    }

    /// Run OCR on an image and reconstruct its text
    ///
    /// Inference runs on the blocking pool.
    pub async fn extract(&self, image: DynamicImage) -> Result<Extraction, ServiceError> {
        let ocr = self.ocr.clone().ok_or(ServiceError::OcrUnavailable)?;
        let start = Instant::now();
        let (width, height) = (image.width(), image.height());

        let fragments = tokio::task::spawn_blocking(move || ocr.recognize(&image))
            .await?
            .map_err(ServiceError::Ocr)?;

        let mut extraction = self.extract_fragments(&fragments)?;
        extraction.processing_time_ms = start.elapsed().as_millis() as u64;

        info!(
            "Extracted {} lines from {}x{} image ({} fragments) in {}ms",
            extraction.lines.len(),
            width,
            height,
            extraction.fragment_count,
            extraction.processing_time_ms
        );

        Ok(extraction)
    }

    /// Translate text into a user-facing message
    ///
    /// Never fails: empty input and provider errors come back as text.
    pub async fn translate(&self, text: &str, target: TargetLanguage) -> String {
        if text.trim().is_empty() {
            return NO_TEXT_MESSAGE.to_string();
        }

        let Some(translator) = self.translator.as_ref() else {
            return format!(
                "{}translation service is not configured",
                TRANSLATION_ERROR_PREFIX
            );
        };

        match translator.translate(text, target).await {
            Ok(translation) => {
                debug!(
                    "Translated to {} (source {:?})",
                    target, translation.detected_source
                );
                translation.text
            }
            Err(e) => {
                warn!("Translation to {} failed: {}", target, e);
                format!("{}{}", TRANSLATION_ERROR_PREFIX, e)
            }
        }
    }
}

impl Default for ImageToPinyin {
    fn default() -> Self {
        Self::new(
            LineReconstructor::default(),
            Arc::new(crate::transliteration::PinyinTransliterator::default()),
        )
    }
}
