//! Baidu general translation API
//!
//! Requests are plain GETs authenticated by an `appid` and a per-request
//! signature `md5(appid + q + salt + appkey)`.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use md5::{Digest, Md5};
use rand::Rng;
use serde::Deserialize;
use tracing::debug;

use super::{http_client, BackendSpec, TranslationBackend};
use crate::core::errors::{ConfigError, Result, TranslationError};

/// Registry identifier
pub const NAME: &str = "baidu";

/// Public endpoint
pub const ENDPOINT: &str = "https://fanyi-api.baidu.com/api/trans/vip/translate";

/// Salt is drawn from this inclusive range for every request
const SALT_RANGE: std::ops::RangeInclusive<u32> = 32768..=65536;

#[derive(Debug, Deserialize)]
struct TransResult {
    dst: String,
}

/// AppID-authenticated backend
pub struct BaiduBackend {
    client: reqwest::Client,
    endpoint: String,
    appid: String,
    appkey: String,
}

impl BaiduBackend {
    /// Create a backend talking to the public endpoint
    pub fn new(
        appid: impl Into<String>,
        appkey: impl Into<String>,
    ) -> std::result::Result<Self, ConfigError> {
        Ok(Self {
            client: http_client()?,
            endpoint: ENDPOINT.to_string(),
            appid: appid.into(),
            appkey: appkey.into(),
        })
    }

    /// Send requests to `endpoint` instead of the public one
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Registry constructor; needs `appid` and `appkey`
    pub fn from_spec(
        spec: &BackendSpec,
    ) -> std::result::Result<Arc<dyn TranslationBackend>, ConfigError> {
        let appid = spec.require("appid")?;
        let appkey = spec.require("appkey")?;

        let mut backend = Self::new(appid, appkey)?;
        if let Some(endpoint) = spec.field("endpoint") {
            backend = backend.with_endpoint(endpoint);
        }
        Ok(Arc::new(backend))
    }
}

impl fmt::Debug for BaiduBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BaiduBackend")
            .field("endpoint", &self.endpoint)
            .field("appid", &self.appid)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl TranslationBackend for BaiduBackend {
    async fn translate_chunk(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<String> {
        let salt = rand::thread_rng().gen_range(SALT_RANGE).to_string();
        let sign = sign(&self.appid, text, &salt, &self.appkey);

        debug!(
            "Baidu request: {} chars, {} -> {}",
            text.chars().count(),
            source_lang,
            target_lang
        );

        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("q", text),
                ("from", source_lang),
                ("to", target_lang),
                ("appid", self.appid.as_str()),
                ("salt", salt.as_str()),
                ("sign", sign.as_str()),
            ])
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

/// Lowercase hex MD5 over `appid + q + salt + appkey`
pub fn sign(appid: &str, q: &str, salt: &str, appkey: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(appid.as_bytes());
    hasher.update(q.as_bytes());
    hasher.update(salt.as_bytes());
    hasher.update(appkey.as_bytes());
    hex::encode(hasher.finalize())
}

/// Join every `dst` of `trans_result`, each followed by a newline.
///
/// A body without `trans_result` is a provider error (`error_code`,
/// `error_msg`) and is reported verbatim.
fn parse_response(body: &serde_json::Value) -> Result<String> {
    let Some(results) = body.get("trans_result") else {
        return Err(TranslationError::unexpected_response(body));
    };

    let results: Vec<TransResult> = serde_json::from_value(results.clone())
        .map_err(|_| TranslationError::unexpected_response(body))?;

    Ok(results.iter().map(|r| format!("{}\n", r.dst)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::backends::stub;
    use serde_json::json;

    #[test]
    fn test_sign_is_md5_of_concatenation() {
        // md5("abc")
        assert_eq!(sign("a", "b", "c", ""), "900150983cd24fb0d6963f7d28e17f72");
        // md5("")
        assert_eq!(sign("", "", "", ""), "d41d8cd98f00b204e9800998ecf8427e");
    }

    #[test]
    fn test_sign_changes_with_salt() {
        let a = sign("id", "text", "32768", "key");
        let b = sign("id", "text", "32769", "key");
        assert_ne!(a, b);
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_parse_joins_results_with_newlines() {
        let body = json!({
            "from": "en",
            "to": "zh",
            "trans_result": [
                {"src": "Hello", "dst": "你好"},
                {"src": "World", "dst": "世界"}
            ]
        });
        assert_eq!(parse_response(&body).unwrap(), "你好\n世界\n");
    }

    #[test]
    fn test_parse_surfaces_provider_error() {
        let body = json!({"error_code": "54001", "error_msg": "Invalid Sign"});
        let err = parse_response(&body).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Unknown error when translating"));
        assert!(message.contains("54001"));
        assert!(message.contains("Invalid Sign"));
    }

    #[test]
    fn test_parse_rejects_malformed_results() {
        let body = json!({"trans_result": [{"src": "only source"}]});
        assert!(matches!(
            parse_response(&body),
            Err(TranslationError::Backend { .. })
        ));
    }

    #[test]
    fn test_from_spec_requires_appkey() {
        let spec = BackendSpec::new(NAME).with_appid("20240101");
        let err = BaiduBackend::from_spec(&spec).err().unwrap();
        assert_eq!(
            err,
            ConfigError::MissingField {
                field: "appkey".to_string()
            }
        );
    }

    #[test]
    fn test_from_spec_checks_appid_first() {
        let err = BaiduBackend::from_spec(&BackendSpec::new(NAME)).err().unwrap();
        assert_eq!(
            err,
            ConfigError::MissingField {
                field: "appid".to_string()
            }
        );
    }

    #[test]
    fn test_debug_hides_appkey() {
        let backend = BaiduBackend::new("id", "s3cret").unwrap();
        assert!(!format!("{:?}", backend).contains("s3cret"));
    }

    #[tokio::test]
    async fn test_transport_failure_is_backend_error() {
        // nothing listens on port 9 of the loopback interface
        let backend = BaiduBackend::new("id", "key")
            .unwrap()
            .with_endpoint("http://127.0.0.1:9/translate");
        let err = backend.translate_chunk("hi", "auto", "zh").await.unwrap_err();
        assert!(matches!(err, TranslationError::Backend { .. }));
    }

    #[tokio::test]
    async fn test_request_carries_signed_query() {
        let (endpoint, request) =
            stub::serve_once(200, r#"{"trans_result":[{"src":"Hello, 世界","dst":"你好，世界"}]}"#).await;
        let backend = BaiduBackend::new("20240101", "s3cret")
            .unwrap()
            .with_endpoint(endpoint);

        let out = backend.translate_chunk("Hello, 世界", "en", "zh").await.unwrap();
        assert_eq!(out, "你好，世界\n");

        let request = request.await.unwrap();
        assert!(request.request_line().starts_with("GET /translate?"));

        let query = request.query();
        let value = |key: &str| {
            query
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
                .unwrap()
        };
        let keys: Vec<&str> = query.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["q", "from", "to", "appid", "salt", "sign"]);
        assert_eq!(value("q"), "Hello, 世界");
        assert_eq!(value("from"), "en");
        assert_eq!(value("to"), "zh");
        assert_eq!(value("appid"), "20240101");

        let salt = value("salt");
        assert!(SALT_RANGE.contains(&salt.parse::<u32>().unwrap()));
        assert_eq!(value("sign"), sign("20240101", "Hello, 世界", salt, "s3cret"));
    }

    #[tokio::test]
    async fn test_non_ok_status_is_backend_error() {
        let (endpoint, request) = stub::serve_once(500, "internal error").await;
        let backend = BaiduBackend::new("id", "key").unwrap().with_endpoint(endpoint);

        let err = backend.translate_chunk("hi", "auto", "zh").await.unwrap_err();
        assert_eq!(err, TranslationError::http_status(500));
        request.await.unwrap();
    }

    #[tokio::test]
    async fn test_ok_status_without_results_is_backend_error() {
        let (endpoint, request) =
            stub::serve_once(200, r#"{"error_code":"52003","error_msg":"UNAUTHORIZED USER"}"#).await;
        let backend = BaiduBackend::new("id", "key").unwrap().with_endpoint(endpoint);

        let err = backend.translate_chunk("hi", "auto", "zh").await.unwrap_err();
        assert!(matches!(err, TranslationError::Backend { ref message } if message.contains("52003")));
        request.await.unwrap();
    }
}
