// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! POST /v1/translate - translate the extracted text
//!
//! Always answers 200 once the target is valid; a failed or skipped
//! translation is reported inside `translation` as a readable message.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::errors::ApiError;
use crate::api::http_server::AppState;
use crate::translation::TargetLanguage;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateRequest {
    /// "en" or "vi" (names are accepted too)
    pub target: String,
    /// Text to translate; defaults to the session's extracted text
    #[serde(default)]
    pub text: Option<String>,
}

impl TranslateRequest {
    pub fn target_language(&self) -> Result<TargetLanguage, ApiError> {
        self.target
            .parse::<TargetLanguage>()
            .map_err(|e| ApiError::validation("target", e.to_string()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateResponse {
    pub translation: String,
    pub target: TargetLanguage,
}

pub async fn translate_handler(
    State(state): State<AppState>,
    Json(request): Json<TranslateRequest>,
) -> Result<Json<TranslateResponse>, ApiError> {
    let target = request.target_language()?;

    let text = match request.text {
        Some(text) => text,
        None => state.session.read().await.text.clone(),
    };
    debug!("Translating {} chars to {}", text.chars().count(), target);

    let translation = state.service.translate(&text, target).await;
    state
        .session
        .write()
        .await
        .record_translation(target, translation.clone());

    Ok(Json(TranslateResponse {
        translation,
        target,
    }))
}
