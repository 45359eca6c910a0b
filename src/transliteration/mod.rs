// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Phonetic transliteration of recognized text
//!
//! Components:
//! - `pinyin` - Han character to pinyin lookup with configurable tone style

pub mod pinyin;

pub use self::pinyin::{PinyinTransliterator, ToneStyle};

/// Converts source-script text into a phonetic romanization
///
/// Implementations are pure: the same input always yields the same output.
pub trait Transliterator: Send + Sync {
    fn transliterate(&self, text: &str) -> String;
}
