// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! POST /v1/reconstruct tests
//!
//! Reconstruction needs no model, so these run against a bare state.

use super::common::*;
use axum::http::StatusCode;
use serde_json::json;

fn quad(x: f64, top: f64, bottom: f64) -> serde_json::Value {
    json!([[x, top], [x + 40.0, top], [x + 40.0, bottom], [x, bottom]])
}

#[tokio::test]
async fn test_same_line_left_to_right() {
    let state = state_with(None, None);

    let (status, body) = post_json(
        router(&state),
        "/v1/reconstruct",
        json!({
            "fragments": [
                { "box": quad(100.0, 10.0, 20.0), "text": "世界", "confidence": 0.9 },
                { "box": quad(10.0, 12.0, 22.0), "text": "你好", "confidence": 0.95 }
            ]
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "body: {}", body);
    assert_eq!(body["text"], "你好 世界");
    assert_eq!(body["pinyin"], "nǐhǎo shìjiè");
    assert_eq!(body["quantizationStep"], 10.0);
    assert_eq!(body["lines"][0]["fragmentCount"], 2);
}

#[tokio::test]
async fn test_lines_top_to_bottom() {
    let state = state_with(None, None);

    let (status, body) = post_json(
        router(&state),
        "/v1/reconstruct",
        json!({
            "fragments": [
                { "box": quad(10.0, 50.0, 60.0), "text": "再见", "confidence": 0.9 },
                { "box": quad(10.0, 0.0, 10.0), "text": "你好", "confidence": 0.9 }
            ]
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["text"], "你好\n再见");
    assert_eq!(body["pinyin"], "nǐhǎo\nzàijiàn");
    assert_eq!(body["lines"].as_array().map(|l| l.len()), Some(2));
}

#[tokio::test]
async fn test_custom_step_merges_lines() {
    let state = state_with(None, None);
    let fragments = json!([
        { "box": quad(60.0, 0.0, 10.0), "text": "界", "confidence": 0.9 },
        { "box": quad(10.0, 14.0, 24.0), "text": "世", "confidence": 0.9 }
    ]);

    let (_, default_step) = post_json(
        router(&state),
        "/v1/reconstruct",
        json!({ "fragments": fragments.clone() }),
    )
    .await;
    assert_eq!(default_step["text"], "界\n世");

    let (status, wide_step) = post_json(
        router(&state),
        "/v1/reconstruct",
        json!({ "fragments": fragments, "quantizationStep": 40 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(wide_step["text"], "世 界");
    assert_eq!(wide_step["quantizationStep"], 40.0);
}

#[tokio::test]
async fn test_empty_fragment_list() {
    let state = state_with(None, None);

    let (status, body) =
        post_json(router(&state), "/v1/reconstruct", json!({ "fragments": [] })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["text"], "");
    assert_eq!(body["lines"], json!([]));
}

#[tokio::test]
async fn test_malformed_box_reports_index() {
    let state = state_with(None, None);

    let (status, body) = post_json(
        router(&state),
        "/v1/reconstruct",
        json!({
            "fragments": [
                { "box": quad(10.0, 0.0, 10.0), "text": "好", "confidence": 0.9 },
                { "box": [[0, 0], [10, 0], [10, 10]], "text": "坏", "confidence": 0.9 }
            ]
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errorType"], "invalid_fragment");
    assert_eq!(body["details"]["index"], 1);
}

#[tokio::test]
async fn test_confidence_outside_unit_range_rejected() {
    let state = state_with(None, None);

    let (status, body) = post_json(
        router(&state),
        "/v1/reconstruct",
        json!({
            "fragments": [
                { "box": quad(10.0, 0.0, 10.0), "text": "好", "confidence": 7.0 }
            ]
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errorType"], "invalid_fragment");
    assert_eq!(body["details"]["index"], 0);
}

#[tokio::test]
async fn test_non_positive_step_rejected() {
    let state = state_with(None, None);

    let (status, body) = post_json(
        router(&state),
        "/v1/reconstruct",
        json!({ "fragments": [], "quantizationStep": -5 }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["field"], "quantizationStep");
}

#[tokio::test]
async fn test_reconstruct_leaves_page_state_alone() {
    let state = state_with(None, None);

    post_json(
        router(&state),
        "/v1/reconstruct",
        json!({ "fragments": [{ "box": quad(0.0, 0.0, 10.0), "text": "你", "confidence": 1.0 }] }),
    )
    .await;
    let (_, page) = get(router(&state), "/v1/state").await;

    assert_eq!(page["text"], "");
}
