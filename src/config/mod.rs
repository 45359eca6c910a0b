// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Application configuration
//!
//! Values come from, in increasing precedence: built-in defaults, a TOML
//! file, environment variables (a `.env` file is honored by the binaries)
//! and finally command-line flags.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::layout::{LineReconstructor, DEFAULT_QUANTIZATION_STEP};
use crate::transliteration::{PinyinTransliterator, ToneStyle};
use crate::translation::DEFAULT_TRANSLATE_ENDPOINT;
use crate::vision::model_manager::DEFAULT_OCR_MODEL_DIR;
use crate::vision::ocr::DetectionOptions;
use crate::vision::VisionModelConfig;

/// Default HTTP listen address
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8501";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value '{value}' for {key}")]
    InvalidEnv { key: String, value: String },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Directory holding det_model.onnx, rec_model.onnx and ppocr_keys_v1.txt
    pub model_dir: Option<String>,
    pub pixel_threshold: f32,
    pub box_threshold: f32,
    pub min_region_pixels: usize,
    pub unclip_ratio: f32,
    pub intra_threads: usize,
}

impl Default for OcrConfig {
    fn default() -> Self {
        let detection = DetectionOptions::default();
        Self {
            model_dir: Some(DEFAULT_OCR_MODEL_DIR.to_string()),
            pixel_threshold: detection.pixel_threshold,
            box_threshold: detection.box_threshold,
            min_region_pixels: detection.min_region_pixels,
            unclip_ratio: detection.unclip_ratio,
            intra_threads: 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Vertical bucket size in pixels
    pub quantization_step: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            quantization_step: DEFAULT_QUANTIZATION_STEP,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PinyinConfig {
    pub delimiter: String,
    pub tone_style: ToneStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationConfig {
    pub enabled: bool,
    pub endpoint: String,
    pub timeout_secs: u64,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: DEFAULT_TRANSLATE_ENDPOINT.to_string(),
            timeout_secs: 10,
        }
    }
}

impl TranslationConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub ocr: OcrConfig,
    pub layout: LayoutConfig,
    pub pinyin: PinyinConfig,
    pub translation: TranslationConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Defaults overridden by environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Override fields from the process environment
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_env_with(|key| env::var(key).ok())
    }

    /// Override fields from an arbitrary variable lookup
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup("LISTEN_ADDR") {
            self.server.listen_addr = addr;
        }

        if let Some(dir) = lookup("OCR_MODEL_DIR") {
            self.ocr.model_dir = if dir.is_empty() { None } else { Some(dir) };
        }
        if let Some(v) = parsed(&lookup, "OCR_PIXEL_THRESHOLD")? {
            self.ocr.pixel_threshold = v;
        }
        if let Some(v) = parsed(&lookup, "OCR_BOX_THRESHOLD")? {
            self.ocr.box_threshold = v;
        }
        if let Some(v) = parsed(&lookup, "OCR_MIN_REGION_PIXELS")? {
            self.ocr.min_region_pixels = v;
        }
        if let Some(v) = parsed(&lookup, "OCR_THREADS")? {
            self.ocr.intra_threads = v;
        }

        if let Some(v) = parsed(&lookup, "QUANTIZATION_STEP")? {
            self.layout.quantization_step = v;
        }

        if let Some(delimiter) = lookup("PINYIN_DELIMITER") {
            self.pinyin.delimiter = delimiter;
        }
        if let Some(v) = parsed(&lookup, "PINYIN_TONE_STYLE")? {
            self.pinyin.tone_style = v;
        }

        if let Some(value) = lookup("TRANSLATION_ENABLED") {
            self.translation.enabled = value.to_lowercase() != "false";
        }
        if let Some(endpoint) = lookup("TRANSLATE_ENDPOINT") {
            self.translation.endpoint = endpoint;
        }
        if let Some(v) = parsed(&lookup, "TRANSLATE_TIMEOUT_SECS")? {
            self.translation.timeout_secs = v;
        }

        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.listen_addr.trim().is_empty() {
            return Err(ConfigError::Invalid("listen address is empty".into()));
        }
        if !self.layout.quantization_step.is_finite() || self.layout.quantization_step <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "quantization step must be positive, got {}",
                self.layout.quantization_step
            )));
        }
        for (name, value) in [
            ("pixel threshold", self.ocr.pixel_threshold),
            ("box threshold", self.ocr.box_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Invalid(format!(
                    "{} must be within 0..=1, got {}",
                    name, value
                )));
            }
        }
        if self.translation.enabled && self.translation.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "translation timeout must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    pub fn line_reconstructor(&self) -> Result<LineReconstructor, ConfigError> {
        LineReconstructor::new(self.layout.quantization_step)
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    pub fn transliterator(&self) -> PinyinTransliterator {
        PinyinTransliterator::new(self.pinyin.delimiter.clone(), self.pinyin.tone_style)
    }

    pub fn vision_model_config(&self) -> VisionModelConfig {
        VisionModelConfig {
            ocr_model_dir: self.ocr.model_dir.clone(),
            detection: DetectionOptions {
                pixel_threshold: self.ocr.pixel_threshold,
                box_threshold: self.ocr.box_threshold,
                min_region_pixels: self.ocr.min_region_pixels,
                unclip_ratio: self.ocr.unclip_ratio,
            },
            intra_threads: self.ocr.intra_threads,
        }
    }
}

fn parsed<F, T>(lookup: &F, key: &str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    let Some(value) = lookup(key) else {
        return Ok(None);
    };
    match value.trim().parse::<T>() {
        Ok(parsed) => Ok(Some(parsed)),
        Err(_) => Err(ConfigError::InvalidEnv {
            key: key.to_string(),
            value,
        }),
    }
}
