// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Pinyin transliteration backed by the `pinyin` lookup tables

use ::pinyin::{Pinyin, ToPinyin};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::Transliterator;

/// How tones are rendered in the pinyin output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToneStyle {
    /// Tone marks on the vowel: `nǐ hǎo`
    #[default]
    Diacritical,
    /// Tone number after the syllable: `ni3 hao3`
    Numerical,
    /// No tone information: `ni hao`
    Strip,
}

impl ToneStyle {
    fn render(self, reading: Pinyin) -> &'static str {
        match self {
            ToneStyle::Diacritical => reading.with_tone(),
            ToneStyle::Numerical => reading.with_tone_num_end(),
            ToneStyle::Strip => reading.plain(),
        }
    }
}

impl FromStr for ToneStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "diacritical" | "tone" | "marks" => Ok(ToneStyle::Diacritical),
            "numerical" | "number" | "numbers" => Ok(ToneStyle::Numerical),
            "strip" | "plain" | "none" => Ok(ToneStyle::Strip),
            other => Err(format!(
                "unknown tone style '{}', expected diacritical, numerical or strip",
                other
            )),
        }
    }
}

impl fmt::Display for ToneStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ToneStyle::Diacritical => "diacritical",
            ToneStyle::Numerical => "numerical",
            ToneStyle::Strip => "strip",
        };
        f.write_str(name)
    }
}

/// Character-by-character pinyin conversion
///
/// Han characters are replaced by their most common reading; everything
/// else (latin text, digits, punctuation, spaces) passes through unchanged.
/// Each character's output is joined with `delimiter`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PinyinTransliterator {
    delimiter: String,
    style: ToneStyle,
}

impl PinyinTransliterator {
    pub fn new(delimiter: impl Into<String>, style: ToneStyle) -> Self {
        Self {
            delimiter: delimiter.into(),
            style,
        }
    }

    pub fn delimiter(&self) -> &str {
        &self.delimiter
    }

    pub fn style(&self) -> ToneStyle {
        self.style
    }
}

impl Transliterator for PinyinTransliterator {
    fn transliterate(&self, text: &str) -> String {
        let mut output = String::with_capacity(text.len() * 2);

        for (position, (ch, reading)) in text.chars().zip(text.to_pinyin()).enumerate() {
            if position > 0 {
                output.push_str(&self.delimiter);
            }
            match reading {
                Some(reading) => output.push_str(self.style.render(reading)),
                None => output.push(ch),
            }
        }

        output
    }
}
