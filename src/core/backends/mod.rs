//! Translation backends
//!
//! Every provider implements [`TranslationBackend`]. Callers only ever hold
//! an `Arc<dyn TranslationBackend>` produced by a [`BackendRegistry`], so a
//! new provider needs a module here and one line in
//! [`BackendRegistry::builtin`].

pub mod baidu;
pub mod lingocloud;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::errors::{ConfigError, Result};

/// Per-request timeout for provider HTTP clients
pub const REQUEST_TIMEOUT_MS: u64 = 30_000;

/// A translation provider
///
/// Implementations translate one chunk per call and report every failure
/// (transport, status, response shape) as a single
/// [`TranslationError::Backend`](crate::core::errors::TranslationError::Backend).
#[async_trait]
pub trait TranslationBackend: Send + Sync {
    /// Translate `text` from `source_lang` to `target_lang`
    async fn translate_chunk(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<String>;
}

/// The `backend` section of a config source
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendSpec {
    /// Registry identifier, e.g. `baidu`
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Baidu application id
    #[serde(default)]
    pub appid: Option<String>,
    /// Baidu signing key
    #[serde(default)]
    pub appkey: Option<String>,
    /// LingoCloud API token
    #[serde(default)]
    pub token: Option<String>,
    /// Overrides the provider's public endpoint
    #[serde(default)]
    pub endpoint: Option<String>,
}

impl BackendSpec {
    /// Spec for provider `kind` with no secrets set
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            ..Default::default()
        }
    }

    /// Set the application id
    pub fn with_appid(mut self, appid: impl Into<String>) -> Self {
        self.appid = Some(appid.into());
        self
    }

    /// Set the signing key
    pub fn with_appkey(mut self, appkey: impl Into<String>) -> Self {
        self.appkey = Some(appkey.into());
        self
    }

    /// Set the API token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the endpoint override
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Look up a field by its config name. Empty values count as absent.
    pub fn field(&self, name: &str) -> Option<&str> {
        let value = match name {
            "type" => Some(self.kind.as_str()),
            "appid" => self.appid.as_deref(),
            "appkey" => self.appkey.as_deref(),
            "token" => self.token.as_deref(),
            "endpoint" => self.endpoint.as_deref(),
            _ => None,
        };
        value.map(str::trim).filter(|v| !v.is_empty())
    }

    /// Like [`field`](Self::field) but a missing value is an error naming it
    pub fn require(&self, name: &str) -> std::result::Result<&str, ConfigError> {
        self.field(name).ok_or_else(|| ConfigError::MissingField {
            field: name.to_string(),
        })
    }
}

impl fmt::Debug for BackendSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendSpec")
            .field("kind", &self.kind)
            .field("appid", &self.appid)
            .field("appkey", &self.appkey.as_ref().map(|_| "***"))
            .field("token", &self.token.as_ref().map(|_| "***"))
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

/// Builds a backend from its config section
pub type BackendConstructor =
    fn(&BackendSpec) -> std::result::Result<Arc<dyn TranslationBackend>, ConfigError>;

/// Maps backend identifiers to constructors
#[derive(Clone)]
pub struct BackendRegistry {
    constructors: BTreeMap<String, BackendConstructor>,
}

impl BackendRegistry {
    /// An empty registry
    pub fn new() -> Self {
        Self {
            constructors: BTreeMap::new(),
        }
    }

    /// Registry with every provider shipped in this crate
    pub fn builtin() -> Self {
        let mut constructors: BTreeMap<String, BackendConstructor> = BTreeMap::new();
        constructors.insert(baidu::NAME.to_string(), baidu::BaiduBackend::from_spec);
        constructors.insert(
            lingocloud::NAME.to_string(),
            lingocloud::LingoCloudBackend::from_spec,
        );
        Self { constructors }
    }

    /// Add a provider. Names are case-insensitive and must be unique.
    pub fn register(
        &mut self,
        name: &str,
        constructor: BackendConstructor,
    ) -> std::result::Result<(), ConfigError> {
        let key = name.trim().to_ascii_lowercase();
        if key.is_empty() || key.chars().any(char::is_whitespace) {
            return Err(ConfigError::InvalidBackendName {
                name: name.to_string(),
            });
        }
        if self.constructors.contains_key(&key) {
            return Err(ConfigError::DuplicateBackend { name: key });
        }

        self.constructors.insert(key, constructor);
        Ok(())
    }

    /// Check whether `name` is registered
    pub fn contains(&self, name: &str) -> bool {
        self.constructors
            .contains_key(&name.trim().to_ascii_lowercase())
    }

    /// Registered identifiers in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.constructors.keys().map(String::as_str)
    }

    /// Instantiate the backend selected by `spec.kind`
    pub fn create(
        &self,
        spec: &BackendSpec,
    ) -> std::result::Result<Arc<dyn TranslationBackend>, ConfigError> {
        let kind = spec.require("type")?.to_ascii_lowercase();
        let constructor = self
            .constructors
            .get(&kind)
            .ok_or_else(|| ConfigError::UnknownBackend {
                kind: spec.kind.clone(),
            })?;
        constructor(spec)
    }
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl fmt::Debug for BackendRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

/// HTTP client shared by the provider adapters
///
/// System proxy variables are ignored.
pub(crate) fn http_client() -> std::result::Result<reqwest::Client, ConfigError> {
    reqwest::Client::builder()
        .timeout(Duration::from_millis(REQUEST_TIMEOUT_MS))
        .no_proxy()
        .build()
        .map_err(|e| ConfigError::Source {
            message: format!("failed to build HTTP client: {}", e),
        })
}

/// One-shot local HTTP server for exercising the provider adapters
#[cfg(test)]
pub(crate) mod stub {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::task::JoinHandle;

    /// A request as it arrived on the wire
    pub(crate) struct Recorded {
        pub head: String,
        pub body: String,
    }

    impl Recorded {
        /// Request line, e.g. `GET /translate?q=... HTTP/1.1`
        pub fn request_line(&self) -> &str {
            self.head.lines().next().unwrap_or_default()
        }

        /// Value of header `name`, compared case-insensitively
        pub fn header(&self, name: &str) -> Option<&str> {
            self.head.lines().skip(1).find_map(|line| {
                let (key, value) = line.split_once(':')?;
                key.trim()
                    .eq_ignore_ascii_case(name)
                    .then(|| value.trim())
            })
        }

        /// Decoded query pairs of the request target
        pub fn query(&self) -> Vec<(String, String)> {
            let target = self.request_line().split(' ').nth(1).unwrap_or_default();
            let url = reqwest::Url::parse(&format!("http://stub{}", target)).unwrap();
            url.query_pairs().into_owned().collect()
        }
    }

    /// Answer one request with `status` and `body`; the handle yields what was received
    pub(crate) async fn serve_once(status: u16, body: &str) -> (String, JoinHandle<Recorded>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let body = body.to_string();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let recorded = read_request(&mut socket).await;
            let response = format!(
                "HTTP/1.1 {} Stub\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
            recorded
        });

        (format!("http://{}/translate", addr), handle)
    }

    async fn read_request(socket: &mut TcpStream) -> Recorded {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];

        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);

            if let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                let head = String::from_utf8_lossy(&buf[..end]).into_owned();
                let length = head
                    .lines()
                    .find_map(|line| {
                        let (key, value) = line.split_once(':')?;
                        if key.trim().eq_ignore_ascii_case("content-length") {
                            value.trim().parse::<usize>().ok()
                        } else {
                            None
                        }
                    })
                    .unwrap_or(0);

                if buf.len() >= end + 4 + length {
                    let body = String::from_utf8_lossy(&buf[end + 4..end + 4 + length]).into_owned();
                    return Recorded { head, body };
                }
            }
        }

        panic!("connection closed before a full request arrived");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Nop;

    #[async_trait]
    impl TranslationBackend for Nop {
        async fn translate_chunk(&self, text: &str, _: &str, _: &str) -> Result<String> {
            Ok(text.to_string())
        }
    }

    fn nop(_: &BackendSpec) -> std::result::Result<Arc<dyn TranslationBackend>, ConfigError> {
        Ok(Arc::new(Nop))
    }

    #[test]
    fn test_builtin_names() {
        let registry = BackendRegistry::builtin();
        let names: Vec<&str> = registry.names().collect();
        assert_eq!(names, vec!["baidu", "lingocloud"]);
    }

    #[test]
    fn test_register_rejects_duplicates_and_blank_names() {
        let mut registry = BackendRegistry::builtin();

        assert_eq!(
            registry.register("Baidu", nop),
            Err(ConfigError::DuplicateBackend {
                name: "baidu".to_string()
            })
        );
        assert!(matches!(
            registry.register("  ", nop),
            Err(ConfigError::InvalidBackendName { .. })
        ));
        assert!(matches!(
            registry.register("deep l", nop),
            Err(ConfigError::InvalidBackendName { .. })
        ));

        registry.register("echo", nop).unwrap();
        assert!(registry.contains("ECHO"));
    }

    #[tokio::test]
    async fn test_create_custom_backend() {
        let mut registry = BackendRegistry::new();
        registry.register("echo", nop).unwrap();

        let backend = registry.create(&BackendSpec::new("echo")).unwrap();
        let out = backend.translate_chunk("hi", "auto", "zh").await.unwrap();
        assert_eq!(out, "hi");
    }

    #[test]
    fn test_create_unknown_backend() {
        let registry = BackendRegistry::builtin();
        let err = registry.create(&BackendSpec::new("google")).err().unwrap();
        assert_eq!(
            err,
            ConfigError::UnknownBackend {
                kind: "google".to_string()
            }
        );
    }

    #[test]
    fn test_create_without_type() {
        let registry = BackendRegistry::builtin();
        let err = registry.create(&BackendSpec::default()).err().unwrap();
        assert_eq!(
            err,
            ConfigError::MissingField {
                field: "type".to_string()
            }
        );
    }

    #[test]
    fn test_blank_fields_count_as_missing() {
        let spec = BackendSpec::new("baidu").with_appid("  ");
        assert_eq!(spec.field("appid"), None);
        assert!(spec.require("appid").is_err());
    }

    #[test]
    fn test_debug_hides_secrets() {
        let spec = BackendSpec::new("baidu")
            .with_appid("id")
            .with_appkey("s3cret");
        let printed = format!("{:?}", spec);
        assert!(!printed.contains("s3cret"));
        assert!(printed.contains("id"));
    }
}
