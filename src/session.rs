// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! What the page currently shows
//!
//! Only the latest result is kept: a new extraction replaces the text and
//! pinyin and clears any translation of the previous text.

use serde::{Deserialize, Serialize};

use crate::service::Extraction;
use crate::translation::TargetLanguage;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub text: String,
    pub pinyin: String,
    pub translation: Option<String>,
    pub translation_target: Option<TargetLanguage>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_extraction(&mut self, extraction: &Extraction) {
        self.text = extraction.text.clone();
        self.pinyin = extraction.pinyin.clone();
        self.translation = None;
        self.translation_target = None;
    }

    pub fn record_translation(&mut self, target: TargetLanguage, translation: String) {
        self.translation = Some(translation);
        self.translation_target = Some(target);
    }

    /// Whether the translate buttons should be offered
    pub fn has_text(&self) -> bool {
        !self.text.is_empty()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
