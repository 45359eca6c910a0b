// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Machine translation of extracted text
//!
//! Components:
//! - `client` - HTTP client for the public Google Translate endpoint
//!
//! Translation is fallible and network-bound; callers decide how failures
//! are surfaced to the user.

pub mod client;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub use client::{GoogleTranslateClient, DEFAULT_TRANSLATE_ENDPOINT};

#[derive(Debug, Error)]
pub enum TranslationError {
    #[error("unsupported target language '{0}', supported: en, vi")]
    UnsupportedLanguage(String),

    #[error("invalid translation endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("translation request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("translation service returned HTTP {0}")]
    Status(u16),

    #[error("unexpected translation response: {0}")]
    MalformedResponse(String),
}

/// Languages the UI offers as translation targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetLanguage {
    #[serde(rename = "en")]
    English,
    #[serde(rename = "vi")]
    Vietnamese,
}

impl TargetLanguage {
    pub const ALL: [TargetLanguage; 2] = [TargetLanguage::English, TargetLanguage::Vietnamese];

    /// ISO 639-1 code sent to the translation service
    pub fn code(&self) -> &'static str {
        match self {
            TargetLanguage::English => "en",
            TargetLanguage::Vietnamese => "vi",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            TargetLanguage::English => "English",
            TargetLanguage::Vietnamese => "Vietnamese",
        }
    }
}

impl FromStr for TargetLanguage {
    type Err = TranslationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" | "english" => Ok(TargetLanguage::English),
            "vi" | "vietnamese" => Ok(TargetLanguage::Vietnamese),
            _ => Err(TranslationError::UnsupportedLanguage(s.to_string())),
        }
    }
}

impl fmt::Display for TargetLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A successful translation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Translation {
    pub text: String,
    pub target: TargetLanguage,
    /// Source language as detected by the service, when reported
    pub detected_source: Option<String>,
}

/// Remote translation provider
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(
        &self,
        text: &str,
        target: TargetLanguage,
    ) -> Result<Translation, TranslationError>;
}
