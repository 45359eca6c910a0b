// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod errors;
pub mod extract;
pub mod handlers;
pub mod http_server;
pub mod reconstruct;
pub mod translate;
pub mod ui;

pub use errors::{ApiError, ErrorResponse};
pub use extract::{
    clipboard_extract_handler, extract_handler, upload_extract_handler, ExtractRequest,
    ExtractResponse,
};
pub use handlers::{health_handler, state_handler, version_handler, HealthResponse};
pub use http_server::{create_router, start_server, AppState};
pub use reconstruct::{reconstruct_handler, ReconstructRequest, ReconstructResponse};
pub use translate::{translate_handler, TranslateRequest, TranslateResponse};
pub use ui::index_handler;
