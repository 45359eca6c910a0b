// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Google Translate client using the public `translate_a/single` endpoint

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

use super::{TargetLanguage, Translation, TranslationError, Translator};

/// Public endpoint used by the web translator widget
pub const DEFAULT_TRANSLATE_ENDPOINT: &str = "https://translate.googleapis.com";

/// Client for the keyless `translate_a/single` API
///
/// The response is a nested JSON array: `[[["translated", "source", ...], ...], null, "zh-CN", ...]`.
pub struct GoogleTranslateClient {
    client: Client,
    endpoint: String,
}

impl GoogleTranslateClient {
    /// Create a new client
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, TranslationError> {
        let endpoint = endpoint.trim_end_matches('/').to_string();
        Url::parse(&endpoint).map_err(|e| TranslationError::InvalidEndpoint(e.to_string()))?;

        let client = Client::builder().timeout(timeout).build()?;

        info!("Translation client configured: endpoint={}", endpoint);

        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn request_url(&self, text: &str, target: TargetLanguage) -> Result<Url, TranslationError> {
        Url::parse_with_params(
            &format!("{}/translate_a/single", self.endpoint),
            &[
                ("client", "gtx"),
                ("sl", "auto"),
                ("tl", target.code()),
                ("dt", "t"),
                ("q", text),
            ],
        )
        .map_err(|e| TranslationError::InvalidEndpoint(e.to_string()))
    }
}

/// Extract translated text and detected source language from a response body
fn parse_response(body: &Value) -> Result<(String, Option<String>), TranslationError> {
    let segments = body
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| TranslationError::MalformedResponse("missing translation segments".into()))?;

    let pieces: Vec<&str> = segments
        .iter()
        .filter_map(|segment| segment.get(0).and_then(Value::as_str))
        .collect();
    if pieces.is_empty() {
        return Err(TranslationError::MalformedResponse(
            "no translated text in segments".into(),
        ));
    }
    let text = pieces.concat();

    let detected_source = body.get(2).and_then(Value::as_str).map(str::to_string);

    Ok((text, detected_source))
}

#[async_trait]
impl Translator for GoogleTranslateClient {
    async fn translate(
        &self,
        text: &str,
        target: TargetLanguage,
    ) -> Result<Translation, TranslationError> {
        let start = std::time::Instant::now();
        let url = self.request_url(text, target)?;

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(TranslationError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        let value: Value = serde_json::from_str(&body)
            .map_err(|e| TranslationError::MalformedResponse(e.to_string()))?;
        let (translated, detected_source) = parse_response(&value)?;

        debug!(
            "Translated {} chars to {} in {}ms",
            text.chars().count(),
            target,
            start.elapsed().as_millis()
        );

        Ok(Translation {
            text: translated,
            target,
            detected_source,
        })
    }
}
