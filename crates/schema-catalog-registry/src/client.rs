// crates/schema-catalog-registry/src/client.rs
// ============================================================================
// Module: HTTP Registry Client
// Description: Confluent REST client implementing SchemaRegistryClient.
// Purpose: Fetch subjects, versions, compatibility config, and modes.
// Dependencies: reqwest, url, serde_json, schema-catalog-core
// ============================================================================

//! ## Overview
//! [`HttpRegistryClient`] issues `GET` requests against a registry base URL.
//! Subject names are percent-encoded as single path segments. Non-2xx
//! answers are classified by status: 404 means not found, 404/405/501 on the
//! mode endpoint mean the registry has no mode support, anything else is a
//! transport failure. Bodies that fail to decode are protocol errors.

// ============================================================================
// SECTION: Imports
// ============================================================================

use async_trait::async_trait;
use reqwest::Client;
use reqwest::StatusCode;
use reqwest::header::ACCEPT;
use reqwest::header::HeaderValue;
use reqwest::redirect::Policy;
use schema_catalog_core::RegisteredSchema;
use schema_catalog_core::RegistryError;
use schema_catalog_core::SchemaRegistryClient;
use schema_catalog_core::SubjectConfig;
use schema_catalog_core::SubjectMode;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::wire::WireConfig;
use crate::wire::WireError;
use crate::wire::WireMode;
use crate::wire::WireSchema;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default maximum registry response size.
pub const DEFAULT_MAX_RESPONSE_BYTES: usize = 16 * 1024 * 1024;
/// Default user agent sent with registry requests.
pub const DEFAULT_USER_AGENT: &str = concat!("schema-catalog/", env!("CARGO_PKG_VERSION"));
/// Accept header understood by Confluent registries.
const REGISTRY_ACCEPT: &str = "application/vnd.schemaregistry.v1+json, application/json";

// ============================================================================
// SECTION: Config
// ============================================================================

/// Registry client configuration.
///
/// # Invariants
/// - `base_url` uses `http` or `https`.
/// - `username` and `password` are both set or both unset.
#[derive(Clone)]
pub struct HttpRegistryConfig {
    /// Registry base URL.
    pub base_url: String,
    /// Basic auth username.
    pub username: Option<String>,
    /// Basic auth password.
    pub password: Option<String>,
    /// User agent header value.
    pub user_agent: String,
    /// Maximum response body size in bytes.
    pub max_response_bytes: usize,
}

impl HttpRegistryConfig {
    /// Creates a config for `base_url` without credentials.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            username: None,
            password: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
        }
    }
}

impl std::fmt::Debug for HttpRegistryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpRegistryConfig")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("user_agent", &self.user_agent)
            .field("max_response_bytes", &self.max_response_bytes)
            .finish()
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Registry client errors.
///
/// # Invariants
/// - String payloads may include untrusted registry text.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HttpRegistryError {
    /// Invalid client configuration.
    #[error("registry client config error: {0}")]
    Config(String),
    /// Request could not be sent or the body could not be read.
    #[error("registry transport error: {0}")]
    Transport(String),
    /// Registry answered with a non-success status.
    #[error("registry http status {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Registry error message.
        message: String,
    },
    /// Response body could not be decoded.
    #[error("registry protocol error: {0}")]
    Protocol(String),
    /// Response body exceeded the configured limit.
    #[error("registry response exceeds size limit ({actual} > {limit})")]
    ResponseTooLarge {
        /// Observed size in bytes.
        actual: usize,
        /// Maximum size in bytes.
        limit: usize,
    },
}

impl From<HttpRegistryError> for RegistryError {
    fn from(error: HttpRegistryError) -> Self {
        match error {
            HttpRegistryError::Status {
                status: 404,
                message,
            } => Self::NotFound(message),
            HttpRegistryError::Protocol(message) => Self::Protocol(message),
            other @ HttpRegistryError::ResponseTooLarge {
                ..
            } => Self::Protocol(other.to_string()),
            other => Self::Transport(other.to_string()),
        }
    }
}

// ============================================================================
// SECTION: Client
// ============================================================================

/// HTTP client for Confluent-compatible registries.
#[derive(Clone)]
pub struct HttpRegistryClient {
    /// Underlying HTTP client.
    client: Client,
    /// Parsed base URL.
    base_url: Url,
    /// Basic auth credentials.
    credentials: Option<(String, String)>,
    /// Maximum response body size.
    max_response_bytes: usize,
}

impl HttpRegistryClient {
    /// Builds a registry client.
    ///
    /// # Errors
    ///
    /// Returns [`HttpRegistryError::Config`] when the base URL or credentials
    /// are invalid, or the HTTP client cannot be constructed.
    pub fn new(config: HttpRegistryConfig) -> Result<Self, HttpRegistryError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|err| HttpRegistryError::Config(format!("invalid registry url: {err}")))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(HttpRegistryError::Config(format!(
                "unsupported registry url scheme: {}",
                base_url.scheme()
            )));
        }
        if base_url.cannot_be_a_base() {
            return Err(HttpRegistryError::Config("registry url cannot be a base".to_string()));
        }
        let credentials = match (config.username, config.password) {
            (Some(username), Some(password)) => Some((username, password)),
            (None, None) => None,
            _ => {
                return Err(HttpRegistryError::Config(
                    "registry username and password must be set together".to_string(),
                ));
            }
        };
        if config.max_response_bytes == 0 {
            return Err(HttpRegistryError::Config(
                "max_response_bytes must be greater than zero".to_string(),
            ));
        }
        let client = Client::builder()
            .user_agent(config.user_agent)
            .redirect(Policy::none())
            .build()
            .map_err(|err| HttpRegistryError::Config(err.to_string()))?;
        Ok(Self {
            client,
            base_url,
            credentials,
            max_response_bytes: config.max_response_bytes,
        })
    }

    /// Returns the registry base URL.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Builds an endpoint URL from raw path segments.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, HttpRegistryError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| HttpRegistryError::Config("registry url cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Issues a `GET` and decodes a JSON body.
    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, HttpRegistryError> {
        debug!(path = url.path(), "registry request");
        let mut request =
            self.client.get(url).header(ACCEPT, HeaderValue::from_static(REGISTRY_ACCEPT));
        if let Some((username, password)) = &self.credentials {
            request = request.basic_auth(username, Some(password));
        }
        let response =
            request.send().await.map_err(|err| HttpRegistryError::Transport(err.to_string()))?;
        let status = response.status();
        let body = read_response_body_with_limit(response, self.max_response_bytes).await?;
        if !status.is_success() {
            return Err(status_error(status, &body));
        }
        serde_json::from_slice(&body)
            .map_err(|err| HttpRegistryError::Protocol(format!("invalid registry response: {err}")))
    }

    /// Fetches a version selector (`latest` or a number) for a subject.
    async fn fetch_schema(
        &self,
        subject: &str,
        selector: &str,
    ) -> Result<RegisteredSchema, RegistryError> {
        let url = self.endpoint(&["subjects", subject, "versions", selector])?;
        let wire: WireSchema = self.get_json(url).await?;
        wire.into_registered(subject).ok_or_else(|| {
            RegistryError::Protocol(format!("unknown schema type for subject {subject}"))
        })
    }
}

#[async_trait]
impl SchemaRegistryClient for HttpRegistryClient {
    async fn list_subjects(&self) -> Result<Vec<String>, RegistryError> {
        let url = self.endpoint(&["subjects"])?;
        Ok(self.get_json(url).await?)
    }

    async fn get_latest_version(&self, subject: &str) -> Result<RegisteredSchema, RegistryError> {
        self.fetch_schema(subject, "latest").await
    }

    async fn get_version(
        &self,
        subject: &str,
        version: u32,
    ) -> Result<RegisteredSchema, RegistryError> {
        self.fetch_schema(subject, &version.to_string()).await
    }

    async fn get_config(&self, subject: &str) -> Result<Option<SubjectConfig>, RegistryError> {
        let mut url = self.endpoint(&["config", subject])?;
        url.query_pairs_mut().append_pair("defaultToGlobal", "true");
        let wire: WireConfig = self.get_json(url).await?;
        Ok(Some(SubjectConfig {
            compatibility_level: wire.compatibility_level,
        }))
    }

    async fn get_mode(&self, subject: &str) -> Result<SubjectMode, RegistryError> {
        let url = self.endpoint(&["mode", subject])?;
        match self.get_json::<WireMode>(url).await {
            Ok(wire) => Ok(SubjectMode::from_label(&wire.mode)),
            Err(HttpRegistryError::Status {
                status: 404 | 405 | 501,
                message,
            }) => Err(RegistryError::Unsupported(message)),
            Err(err) => Err(err.into()),
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Builds a status error from a non-success response body.
fn status_error(status: StatusCode, body: &[u8]) -> HttpRegistryError {
    let message = serde_json::from_slice::<WireError>(body)
        .ok()
        .and_then(|wire| match (wire.error_code, wire.message) {
            (Some(code), Some(message)) => Some(format!("{code}: {message}")),
            (None, Some(message)) => Some(message),
            (Some(code), None) => Some(code.to_string()),
            (None, None) => None,
        })
        .unwrap_or_else(|| String::from_utf8_lossy(body).trim().to_string());
    HttpRegistryError::Status {
        status: status.as_u16(),
        message,
    }
}

/// Reads a response body while enforcing a hard byte limit.
async fn read_response_body_with_limit(
    mut response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, HttpRegistryError> {
    let mut body = Vec::new();
    let mut total: usize = 0;
    while let Some(chunk) =
        response.chunk().await.map_err(|err| HttpRegistryError::Transport(err.to_string()))?
    {
        let next_total =
            total.checked_add(chunk.len()).ok_or(HttpRegistryError::ResponseTooLarge {
                actual: usize::MAX,
                limit,
            })?;
        if next_total > limit {
            return Err(HttpRegistryError::ResponseTooLarge {
                actual: next_total,
                limit,
            });
        }
        body.extend_from_slice(&chunk);
        total = next_total;
    }
    Ok(body)
}
