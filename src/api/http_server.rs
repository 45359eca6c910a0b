// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::{net::SocketAddr, sync::Arc};
use tokio::sync::RwLock;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::{
    clipboard_extract_handler, extract_handler, health_handler, index_handler,
    reconstruct_handler, state_handler, translate_handler, upload_extract_handler,
    version_handler,
};
use crate::service::ImageToPinyin;
use crate::session::SessionState;
use crate::vision::MAX_IMAGE_SIZE;

/// Request body ceiling: a base64 image at the size limit plus JSON framing
const MAX_BODY_SIZE: usize = MAX_IMAGE_SIZE * 2;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ImageToPinyin>,
    pub session: Arc<RwLock<SessionState>>,
}

impl AppState {
    pub fn new(service: ImageToPinyin) -> Self {
        Self {
            service: Arc::new(service),
            session: Arc::new(RwLock::new(SessionState::new())),
        }
    }

    /// State with no OCR model and no translator
    pub fn new_for_test() -> Self {
        Self::new(ImageToPinyin::default())
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_handler))
        .route("/v1/version", get(version_handler))
        .route("/v1/state", get(state_handler))
        .route("/v1/extract", post(extract_handler))
        .route("/v1/extract/upload", post(upload_extract_handler))
        .route("/v1/extract/clipboard", post(clipboard_extract_handler))
        .route("/v1/reconstruct", post(reconstruct_handler))
        .route("/v1/translate", post(translate_handler))
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the API until Ctrl-C
pub async fn start_server(state: AppState, addr: SocketAddr) -> anyhow::Result<()> {
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("HTTP server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown signal received");
        })
        .await?;

    Ok(())
}
