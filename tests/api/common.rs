// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Shared fakes and request helpers for the HTTP tests

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use image::{DynamicImage, ImageFormat};
use img_to_pinyin::{
    api::{create_router, AppState},
    layout::TextFragment,
    service::ImageToPinyin,
    translation::{TargetLanguage, Translation, TranslationError, Translator},
    vision::OcrProvider,
};
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tower::util::ServiceExt;

/// OCR provider that always "sees" the same fragments
pub struct FixedOcr {
    pub fragments: Vec<TextFragment>,
    pub calls: AtomicUsize,
}

impl FixedOcr {
    pub fn new(fragments: Vec<TextFragment>) -> Self {
        Self {
            fragments,
            calls: AtomicUsize::new(0),
        }
    }
}

impl OcrProvider for FixedOcr {
    fn recognize(&self, _image: &DynamicImage) -> anyhow::Result<Vec<TextFragment>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.fragments.clone())
    }
}

/// Translator that tags the input with the target code
pub struct TaggingTranslator;

#[async_trait]
impl Translator for TaggingTranslator {
    async fn translate(
        &self,
        text: &str,
        target: TargetLanguage,
    ) -> Result<Translation, TranslationError> {
        Ok(Translation {
            text: format!("[{}] {}", target.code(), text),
            target,
            detected_source: Some("zh-CN".to_string()),
        })
    }
}

/// Translator whose upstream always answers 502
pub struct FailingTranslator;

#[async_trait]
impl Translator for FailingTranslator {
    async fn translate(
        &self,
        _text: &str,
        _target: TargetLanguage,
    ) -> Result<Translation, TranslationError> {
        Err(TranslationError::Status(502))
    }
}

/// "你好" and "世界" on one visual line, given right-to-left
pub fn hello_world_fragments() -> Vec<TextFragment> {
    vec![
        TextFragment::from_rect(100.0, 10.0, 40.0, 10.0, "世界", 0.92),
        TextFragment::from_rect(10.0, 12.0, 40.0, 10.0, "你好", 0.97),
    ]
}

pub fn state_with(ocr: Option<Arc<FixedOcr>>, translator: Option<Arc<dyn Translator>>) -> AppState {
    let mut service = ImageToPinyin::default();
    if let Some(ocr) = ocr {
        service = service.with_ocr(ocr);
    }
    if let Some(translator) = translator {
        service = service.with_translator(translator);
    }
    AppState::new(service)
}

pub fn router(state: &AppState) -> Router {
    create_router(state.clone())
}

pub fn png_bytes() -> Vec<u8> {
    let mut bytes = Vec::new();
    DynamicImage::new_rgb8(32, 16)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .expect("encode png");
    bytes
}

pub fn png_base64() -> String {
    STANDARD.encode(png_bytes())
}

pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.expect("router error");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    let value = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| serde_json::Value::String(String::from_utf8_lossy(&bytes).into()))
    };
    (status, value)
}

pub async fn post_json(
    app: Router,
    uri: &str,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("build request");
    send(app, request).await
}

pub async fn get(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .expect("build request");
    send(app, request).await
}
