//! LingoCloud (Caiyun) translator API

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tracing::debug;

use super::{http_client, BackendSpec, TranslationBackend};
use crate::core::errors::{ConfigError, Result, TranslationError};

/// Registry identifier
pub const NAME: &str = "lingocloud";

/// Public endpoint
pub const ENDPOINT: &str = "http://api.interpreter.caiyunai.com/v1/translator";

const REQUEST_ID: &str = "demo";

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    source: &'a str,
    trans_type: String,
    request_id: &'a str,
    detect: bool,
}

impl<'a> TranslateRequest<'a> {
    fn new(text: &'a str, source_lang: &str, target_lang: &str) -> Self {
        Self {
            source: text,
            trans_type: format!("{}2{}", source_lang, target_lang),
            request_id: REQUEST_ID,
            detect: source_lang == "auto",
        }
    }
}

/// Token-authenticated backend
pub struct LingoCloudBackend {
    client: reqwest::Client,
    endpoint: String,
    token: String,
}

impl LingoCloudBackend {
    /// Create a backend talking to the public endpoint
    pub fn new(token: impl Into<String>) -> std::result::Result<Self, ConfigError> {
        Ok(Self {
            client: http_client()?,
            endpoint: ENDPOINT.to_string(),
            token: token.into(),
        })
    }

    /// Send requests to `endpoint` instead of the public one
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Registry constructor; needs `token`
    pub fn from_spec(
        spec: &BackendSpec,
    ) -> std::result::Result<Arc<dyn TranslationBackend>, ConfigError> {
        let mut backend = Self::new(spec.require("token")?)?;
        if let Some(endpoint) = spec.field("endpoint") {
            backend = backend.with_endpoint(endpoint);
        }
        Ok(Arc::new(backend))
    }
}

impl fmt::Debug for LingoCloudBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LingoCloudBackend")
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl TranslationBackend for LingoCloudBackend {
    async fn translate_chunk(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<String> {
        let request = TranslateRequest::new(text, source_lang, target_lang);
        debug!("LingoCloud request: {}", request.trans_type);

        let response = self
            .client
            .post(&self.endpoint)
            .header("content-type", "application/json")
            .header("x-authorization", format!("token {}", self.token))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(TranslationError::http_status(status.as_u16()));
        }

        let body: serde_json::Value = response.json().await?;
        parse_response(&body)
    }
}

/// The translation is the `target` string, returned as-is
fn parse_response(body: &serde_json::Value) -> Result<String> {
    body.get("target")
        .and_then(|t| t.as_str())
        .map(str::to_string)
        .ok_or_else(|| TranslationError::unexpected_response(body))
}
