// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Extraction endpoint tests for POST /v1/extract and /v1/extract/upload
//!
//! OCR is replaced by a provider returning fixed fragments, so these tests
//! cover decoding, reading-order reconstruction, pinyin and the session.

use super::common::*;
use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
};
use serde_json::json;
use std::sync::atomic::Ordering;
use std::sync::Arc;

const BOUNDARY: &str = "img-to-pinyin-test-boundary";

fn multipart_body(field: &str, filename: &str, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            field, filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: image/png\r\n\r\n");
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn upload_request(field: &str, data: &[u8]) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/v1/extract/upload")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(field, "shot.png", data)))
        .unwrap()
}

#[tokio::test]
async fn test_extract_base64_image() {
    let ocr = Arc::new(FixedOcr::new(hello_world_fragments()));
    let state = state_with(Some(ocr.clone()), None);

    let (status, body) = post_json(
        router(&state),
        "/v1/extract",
        json!({ "image": png_base64(), "format": "png" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "body: {}", body);
    assert_eq!(body["text"], "你好 世界");
    assert_eq!(body["pinyin"], "nǐhǎo shìjiè");
    assert_eq!(body["fragmentCount"], 2);
    assert_eq!(body["lines"].as_array().map(|l| l.len()), Some(1));
    assert_eq!(body["image"]["width"], 32);
    assert_eq!(body["image"]["height"], 16);
    assert_eq!(ocr.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_extract_accepts_data_url() {
    let state = state_with(Some(Arc::new(FixedOcr::new(hello_world_fragments()))), None);

    let (status, body) = post_json(
        router(&state),
        "/v1/extract",
        json!({ "image": format!("data:image/png;base64,{}", png_base64()) }),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "body: {}", body);
    assert_eq!(body["text"], "你好 世界");
}

#[tokio::test]
async fn test_extract_updates_page_state() {
    let state = state_with(Some(Arc::new(FixedOcr::new(hello_world_fragments()))), None);

    post_json(router(&state), "/v1/extract", json!({ "image": png_base64() })).await;
    let (status, page) = get(router(&state), "/v1/state").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["text"], "你好 世界");
    assert_eq!(page["pinyin"], "nǐhǎo shìjiè");
    assert!(page["translation"].is_null());
}

#[tokio::test]
async fn test_extract_image_without_text() {
    let state = state_with(Some(Arc::new(FixedOcr::new(vec![]))), None);

    let (status, body) =
        post_json(router(&state), "/v1/extract", json!({ "image": png_base64() })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["text"], "");
    assert_eq!(body["pinyin"], "");
    assert_eq!(body["lines"], json!([]));
}

#[tokio::test]
async fn test_extract_missing_image() {
    let state = state_with(Some(Arc::new(FixedOcr::new(vec![]))), None);

    let (status, body) = post_json(router(&state), "/v1/extract", json!({})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errorType"], "validation_error");
    assert_eq!(body["details"]["field"], "image");
}

#[tokio::test]
async fn test_extract_unsupported_format_hint() {
    let state = state_with(Some(Arc::new(FixedOcr::new(vec![]))), None);

    let (status, body) = post_json(
        router(&state),
        "/v1/extract",
        json!({ "image": png_base64(), "format": "svg" }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["field"], "format");
}

#[tokio::test]
async fn test_extract_garbage_base64() {
    let ocr = Arc::new(FixedOcr::new(hello_world_fragments()));
    let state = state_with(Some(ocr.clone()), None);

    let (status, body) = post_json(
        router(&state),
        "/v1/extract",
        json!({ "image": "not base64 at all!!" }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errorType"], "validation_error");
    assert_eq!(ocr.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_extract_without_ocr_model() {
    let state = state_with(None, None);

    let (status, body) =
        post_json(router(&state), "/v1/extract", json!({ "image": png_base64() })).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["errorType"], "service_unavailable");
}

#[tokio::test]
async fn test_upload_png() {
    let state = state_with(Some(Arc::new(FixedOcr::new(hello_world_fragments()))), None);

    let (status, body) = send(router(&state), upload_request("file", &png_bytes())).await;

    assert_eq!(status, StatusCode::OK, "body: {}", body);
    assert_eq!(body["text"], "你好 世界");
    assert_eq!(body["image"]["format"], "png");

    let (_, page) = get(router(&state), "/v1/state").await;
    assert_eq!(page["text"], "你好 世界");
}

#[tokio::test]
async fn test_upload_wrong_field_name() {
    let state = state_with(Some(Arc::new(FixedOcr::new(hello_world_fragments()))), None);

    let (status, body) = send(router(&state), upload_request("picture", &png_bytes())).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["field"], "file");
}

#[tokio::test]
async fn test_upload_not_an_image() {
    let state = state_with(Some(Arc::new(FixedOcr::new(hello_world_fragments()))), None);

    let (status, body) = send(
        router(&state),
        upload_request("file", b"plain text pretending to be a screenshot"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errorType"], "validation_error");
}
