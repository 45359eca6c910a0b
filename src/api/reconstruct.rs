// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! POST /v1/reconstruct - reading-order reconstruction of recorded OCR output
//!
//! Pure: does not touch the OCR model or the session.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::errors::ApiError;
use crate::api::http_server::AppState;
use crate::layout::{LineReconstructor, ReconstructedLine, TextFragment};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconstructRequest {
    pub fragments: Vec<TextFragment>,
    /// Overrides the configured bucket size for this request
    #[serde(default)]
    pub quantization_step: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconstructResponse {
    pub lines: Vec<ReconstructedLine>,
    pub text: String,
    pub pinyin: String,
    pub quantization_step: f64,
}

pub async fn reconstruct_handler(
    State(state): State<AppState>,
    Json(request): Json<ReconstructRequest>,
) -> Result<Json<ReconstructResponse>, ApiError> {
    let reconstructor = match request.quantization_step {
        Some(step) => LineReconstructor::new(step)?,
        None => *state.service.reconstructor(),
    };

    let extraction = state
        .service
        .extract_fragments_with(&reconstructor, &request.fragments)?;

    debug!(
        "Reconstructed {} fragments into {} lines",
        request.fragments.len(),
        extraction.lines.len()
    );

    Ok(Json(ReconstructResponse {
        lines: extraction.lines,
        text: extraction.text,
        pinyin: extraction.pinyin,
        quantization_step: reconstructor.quantization_step(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_fragments() {
        let request = ReconstructRequest {
            fragments: vec![],
            quantization_step: None,
        };
        let response = reconstruct_handler(State(AppState::new_for_test()), Json(request))
            .await
            .unwrap();
        assert!(response.lines.is_empty());
        assert_eq!(response.text, "");
        assert_eq!(response.quantization_step, 10.0);
    }

    #[tokio::test]
    async fn test_rejects_zero_step() {
        let request = ReconstructRequest {
            fragments: vec![],
            quantization_step: Some(0.0),
        };
        let err = reconstruct_handler(State(AppState::new_for_test()), Json(request))
            .await
            .unwrap_err();
        assert_eq!(err.to_response(None).error_type, "validation_error");
    }

    #[test]
    fn test_request_wire_format() {
        let request: ReconstructRequest = serde_json::from_str(
            r#"{"fragments":[{"box":[[0,0],[10,0],[10,10],[0,10]],"text":"你","confidence":0.9}],"quantizationStep":5}"#,
        )
        .unwrap();
        assert_eq!(request.fragments.len(), 1);
        assert_eq!(request.quantization_step, Some(5.0));
    }
}
