// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! POST /v1/translate tests
//!
//! Translation failures are part of the normal response, never an HTTP error.

use super::common::*;
use axum::http::StatusCode;
use img_to_pinyin::service::{NO_TEXT_MESSAGE, TRANSLATION_ERROR_PREFIX};
use serde_json::json;
use std::sync::Arc;

#[tokio::test]
async fn test_translate_extracted_text() {
    let state = state_with(
        Some(Arc::new(FixedOcr::new(hello_world_fragments()))),
        Some(Arc::new(TaggingTranslator)),
    );
    post_json(router(&state), "/v1/extract", json!({ "image": png_base64() })).await;

    let (status, body) =
        post_json(router(&state), "/v1/translate", json!({ "target": "en" })).await;

    assert_eq!(status, StatusCode::OK, "body: {}", body);
    assert_eq!(body["translation"], "[en] 你好 世界");
    assert_eq!(body["target"], "en");

    let (_, page) = get(router(&state), "/v1/state").await;
    assert_eq!(page["translation"], "[en] 你好 世界");
    assert_eq!(page["translationTarget"], "en");
}

#[tokio::test]
async fn test_translate_explicit_text_to_vietnamese() {
    let state = state_with(None, Some(Arc::new(TaggingTranslator)));

    let (status, body) = post_json(
        router(&state),
        "/v1/translate",
        json!({ "target": "vi", "text": "谢谢" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["translation"], "[vi] 谢谢");
    assert_eq!(body["target"], "vi");
}

#[tokio::test]
async fn test_translate_without_text() {
    let state = state_with(None, Some(Arc::new(TaggingTranslator)));

    let (status, body) =
        post_json(router(&state), "/v1/translate", json!({ "target": "en" })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["translation"], NO_TEXT_MESSAGE);
}

#[tokio::test]
async fn test_translate_upstream_failure_is_reported_inline() {
    let state = state_with(None, Some(Arc::new(FailingTranslator)));

    let (status, body) = post_json(
        router(&state),
        "/v1/translate",
        json!({ "target": "en", "text": "你好" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let translation = body["translation"].as_str().unwrap();
    assert!(translation.starts_with(TRANSLATION_ERROR_PREFIX));
    assert!(translation.contains("502"));
}

#[tokio::test]
async fn test_translate_unknown_target() {
    let state = state_with(None, Some(Arc::new(TaggingTranslator)));

    let (status, body) = post_json(
        router(&state),
        "/v1/translate",
        json!({ "target": "fr", "text": "你好" }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["field"], "target");
}

#[tokio::test]
async fn test_new_extraction_clears_translation() {
    let state = state_with(
        Some(Arc::new(FixedOcr::new(hello_world_fragments()))),
        Some(Arc::new(TaggingTranslator)),
    );
    post_json(router(&state), "/v1/extract", json!({ "image": png_base64() })).await;
    post_json(router(&state), "/v1/translate", json!({ "target": "vi" })).await;

    post_json(router(&state), "/v1/extract", json!({ "image": png_base64() })).await;
    let (_, page) = get(router(&state), "/v1/state").await;

    assert_eq!(page["text"], "你好 世界");
    assert!(page["translation"].is_null());
}
