// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Extraction endpoint handlers

use axum::{extract::State, Json};
use axum_extra::extract::Multipart;
use image::DynamicImage;
use tracing::{debug, info, warn};

use super::request::ExtractRequest;
use super::response::ExtractResponse;
use crate::api::errors::ApiError;
use crate::api::http_server::AppState;
use crate::vision::{
    capture_clipboard_image, decode_base64_image, decode_image_bytes, ClipboardError, ImageInfo,
};

/// Multipart field carrying the uploaded image
pub const UPLOAD_FIELD: &str = "file";

fn ensure_ocr(state: &AppState) -> Result<(), ApiError> {
    if state.service.has_ocr() {
        Ok(())
    } else {
        warn!("OCR model not loaded");
        Err(ApiError::ServiceUnavailable("OCR model not loaded".to_string()))
    }
}

/// Run OCR on a decoded image and make it the page's current result
async fn run_extraction(
    state: &AppState,
    image: DynamicImage,
    info: Option<ImageInfo>,
) -> Result<Json<ExtractResponse>, ApiError> {
    let extraction = state.service.extract(image).await.map_err(|e| {
        warn!("Extraction failed: {}", e);
        ApiError::from(e)
    })?;

    state.session.write().await.record_extraction(&extraction);

    Ok(Json(ExtractResponse::new(extraction, info)))
}

/// POST /v1/extract - Extract text and pinyin from a base64 image
///
/// # Request
/// - `image`: Base64-encoded image data or data URL (required)
/// - `format`: Image format hint (png, jpg, webp, gif, bmp, tiff) - defaults to "png"
///
/// # Response
/// - `text`: Lines in reading order, newline separated
/// - `pinyin`: Pinyin of `text`
/// - `lines`: Per-line text and pinyin
/// - `fragmentCount`, `processingTimeMs`, `image`
///
/// # Errors
/// - 400 Bad Request: missing image, unsupported format, undecodable data
/// - 413 Payload Too Large: image over 10MB
/// - 503 Service Unavailable: OCR model not loaded
/// - 500 Internal Server Error: OCR processing failed
pub async fn extract_handler(
    State(state): State<AppState>,
    Json(request): Json<ExtractRequest>,
) -> Result<Json<ExtractResponse>, ApiError> {
    debug!("Extract request received (format hint {})", request.format);

    request.validate().map_err(|e| {
        warn!("Extract validation failed: {}", e);
        e
    })?;
    ensure_ocr(&state)?;

    let image_data = request
        .image
        .as_deref()
        .ok_or_else(|| ApiError::validation("image", "image is required"))?;

    let (image, info) = decode_base64_image(image_data).map_err(|e| {
        warn!("Failed to decode image: {}", e);
        ApiError::from(e)
    })?;

    debug!(
        "Decoded image: {}x{}, {} bytes",
        info.width, info.height, info.size_bytes
    );

    run_extraction(&state, image, Some(info)).await
}

/// POST /v1/extract/upload - Extract text from a multipart upload
///
/// Reads the first `file` field; other fields are ignored.
pub async fn upload_extract_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ExtractResponse>, ApiError> {
    ensure_ocr(&state)?;

    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::InvalidRequest(format!("Multipart error: {}", e)))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or("upload").to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::InvalidRequest(format!("Read error: {}", e)))?;
        upload = Some((filename, data));
        break;
    }

    let (filename, data) = upload.ok_or_else(|| {
        ApiError::validation(UPLOAD_FIELD, format!("multipart field '{}' is required", UPLOAD_FIELD))
    })?;

    let (image, info) = decode_image_bytes(&data)?;
    info!(
        "Received upload {} ({}x{}, {} bytes)",
        filename, info.width, info.height, info.size_bytes
    );

    run_extraction(&state, image, Some(info)).await
}

/// POST /v1/extract/clipboard - Extract text from the clipboard image
///
/// An empty clipboard is not an error: the response is an empty extraction
/// with a notice and the session is left untouched.
pub async fn clipboard_extract_handler(
    State(state): State<AppState>,
) -> Result<Json<ExtractResponse>, ApiError> {
    ensure_ocr(&state)?;

    let captured = tokio::task::spawn_blocking(capture_clipboard_image)
        .await
        .map_err(|e| ApiError::InternalError(format!("Clipboard task failed: {}", e)))?;

    match captured {
        Ok(image) => run_extraction(&state, image, None).await,
        Err(ClipboardError::NoImage) => {
            info!("Clipboard holds no image");
            Ok(Json(ExtractResponse::notice(
                ClipboardError::NoImage.to_string(),
            )))
        }
        Err(e) => {
            warn!("{}", e);
            Err(ApiError::ServiceUnavailable(e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_extract_without_ocr_is_unavailable() {
        let state = AppState::new_for_test();
        let request = ExtractRequest {
            image: Some("iVBORw0KGgo=".to_string()),
            format: "png".to_string(),
        };
        let err = extract_handler(State(state), Json(request))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 503);
    }

    #[tokio::test]
    async fn test_extract_validation_runs_first() {
        let state = AppState::new_for_test();
        let request = ExtractRequest {
            image: None,
            format: "png".to_string(),
        };
        let err = extract_handler(State(state), Json(request))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[tokio::test]
    async fn test_clipboard_without_ocr_is_unavailable() {
        let err = clipboard_extract_handler(State(AppState::new_for_test()))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 503);
    }
}
