// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::api::http_server::AppState;
use crate::session::SessionState;
use crate::version::{get_version_info, VERSION_NUMBER};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub ocr_available: bool,
    pub translator_configured: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issues: Option<Vec<String>>,
}

/// GET /health
///
/// Reports "degraded" when OCR is unavailable; reconstruction and
/// translation still work in that state.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let ocr_available = state.service.has_ocr();
    let translator_configured = state.service.has_translator();

    let mut issues = Vec::new();
    if !ocr_available {
        issues.push("OCR model not loaded".to_string());
    }
    if !translator_configured {
        issues.push("translation disabled".to_string());
    }

    Json(HealthResponse {
        status: if ocr_available { "healthy" } else { "degraded" }.to_string(),
        version: VERSION_NUMBER.to_string(),
        ocr_available,
        translator_configured,
        issues: if issues.is_empty() { None } else { Some(issues) },
    })
}

/// GET /v1/version
pub async fn version_handler() -> Json<serde_json::Value> {
    Json(get_version_info())
}

/// GET /v1/state - what the page should currently display
pub async fn state_handler(State(state): State<AppState>) -> Json<SessionState> {
    Json(state.session.read().await.clone())
}
