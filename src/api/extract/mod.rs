// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Extraction API endpoint module
//!
//! Provides:
//! - POST /v1/extract (base64 or data URL image in JSON)
//! - POST /v1/extract/upload (multipart `file` field)
//! - POST /v1/extract/clipboard (image currently on the server clipboard)

pub mod handler;
pub mod request;
pub mod response;

pub use handler::{clipboard_extract_handler, extract_handler, upload_extract_handler};
pub use request::ExtractRequest;
pub use response::ExtractResponse;
