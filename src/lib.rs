// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod cli;
pub mod config;
pub mod layout;
pub mod service;
pub mod session;
pub mod translation;
pub mod transliteration;
pub mod version;
pub mod vision;

// Re-export main types
pub use config::AppConfig;
pub use layout::{LineReconstructor, ReconstructedLine, TextFragment};
pub use service::{Extraction, ImageToPinyin, ServiceError};
pub use session::SessionState;
pub use translation::{GoogleTranslateClient, TargetLanguage, Translator};
pub use transliteration::{PinyinTransliterator, ToneStyle, Transliterator};
