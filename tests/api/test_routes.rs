// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Route registration tests

use super::common::*;
use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
};
use std::sync::Arc;

#[tokio::test]
async fn test_index_page_served() {
    let state = state_with(None, None);

    let (status, body) = get(router(&state), "/").await;

    assert_eq!(status, StatusCode::OK);
    let page = body.as_str().unwrap();
    assert!(page.contains("Image to Pinyin Translator"));
}

#[tokio::test]
async fn test_health_reports_components() {
    let healthy = state_with(
        Some(Arc::new(FixedOcr::new(vec![]))),
        Some(Arc::new(TaggingTranslator)),
    );
    let (status, body) = get(router(&healthy), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["ocrAvailable"], true);
    assert!(body.get("issues").is_none());

    let degraded = state_with(None, None);
    let (_, body) = get(router(&degraded), "/health").await;
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["translatorConfigured"], false);
}

#[tokio::test]
async fn test_state_starts_empty() {
    let state = state_with(None, None);

    let (status, body) = get(router(&state), "/v1/state").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["text"], "");
    assert_eq!(body["pinyin"], "");
}

#[tokio::test]
async fn test_extract_rejects_get() {
    let state = state_with(None, None);
    let request = Request::builder()
        .method(Method::GET)
        .uri("/v1/extract")
        .body(Body::empty())
        .unwrap();

    let (status, _) = send(router(&state), request).await;

    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_unknown_route() {
    let state = state_with(None, None);

    let (status, _) = get(router(&state), "/v1/ocr").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_version_endpoint() {
    let state = state_with(None, None);

    let (status, body) = get(router(&state), "/v1/version").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert!(body["features"].as_array().is_some());
}
