use std::borrow::Cow;
use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use tracing::{debug, warn};

use crate::envelope;
use crate::error::{DocValError, Result};
use crate::keyword::{self, Keyword};
use crate::result::ValidationResult;

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 35792;
pub const VALIDATE_PATH: &str = "/api/validate";

/// Configuration for the validation client
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Host the validation service listens on
    pub host: String,
    /// Port the validation service listens on
    pub port: u16,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            timeout_seconds: 30,
            user_agent: format!("docval-client/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpClientConfig {
    /// URL of the validation endpoint
    pub fn endpoint(&self) -> String {
        format!("http://{}:{}{}", self.host, self.port, VALIDATE_PATH)
    }
}

/// How the keyword of a request was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeywordSource {
    /// Supplied by the caller; sent to the service
    Explicit,
    /// Derived locally for display; the service derives its own
    Derived,
}

/// A document ready to be sent, together with its keyword
#[derive(Debug, Clone)]
pub struct ValidationRequest<'a> {
    pub document: Cow<'a, [u8]>,
    pub keyword: Keyword,
    pub keyword_source: KeywordSource,
}

impl<'a> ValidationRequest<'a> {
    /// Build a request from raw document bytes.
    ///
    /// With `strip_sbdh` the document inside an SBDH envelope is sent
    /// instead of the envelope. An explicit keyword always wins; otherwise
    /// one is derived from the (unwrapped) document. Parse and unwrap
    /// failures are returned here, before anything touches the network.
    pub fn prepare(
        bytes: &'a [u8],
        strip_sbdh: bool,
        explicit_keyword: Option<Keyword>,
    ) -> Result<Self> {
        let document = if strip_sbdh {
            envelope::unwrap(bytes)?
        } else {
            Cow::Borrowed(bytes)
        };

        let (keyword, keyword_source) = match explicit_keyword {
            Some(keyword) => (keyword, KeywordSource::Explicit),
            None => (
                keyword::derive_from_bytes(&document)?,
                KeywordSource::Derived,
            ),
        };

        Ok(Self {
            document,
            keyword,
            keyword_source,
        })
    }
}

/// Client for the remote validation service.
///
/// Each submission is one request/response exchange: no retries, and the
/// connection is released when the exchange ends, whatever the outcome.
pub struct ValidationClient {
    client: Client,
    config: HttpClientConfig,
}

impl ValidationClient {
    /// Create a new validation client with the given configuration
    pub fn new(config: HttpClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(&config.user_agent)
            .pool_max_idle_per_host(0)
            .build()
            .map_err(|source| DocValError::NetworkFailure {
                url: config.endpoint(),
                source,
            })?;

        Ok(Self { client, config })
    }

    /// Submit a prepared request and decode the service's verdict.
    ///
    /// Transport failures and timeouts come back as network failures; any
    /// status other than 200, or a body that is not a validation result,
    /// comes back as a server error. A clean document is only ever an
    /// `Ok` result.
    pub async fn submit(&self, request: &ValidationRequest<'_>) -> Result<ValidationResult> {
        let url = self.config.endpoint();
        debug!(
            %url,
            bytes = request.document.len(),
            keyword = %request.keyword,
            source = ?request.keyword_source,
            "sending document to validation service"
        );

        let result = self.exchange(&url, request).await?;

        if !result.is_consistent() {
            warn!(
                error_count = result.error_count,
                errors = result.errors.len(),
                warning_count = result.warning_count,
                warnings = result.warnings.len(),
                "validation result counts disagree with reported issues"
            );
        }

        Ok(result)
    }

    /// Convenience wrapper: prepare and submit in one call
    pub async fn validate(
        &self,
        bytes: &[u8],
        strip_sbdh: bool,
        explicit_keyword: Option<Keyword>,
    ) -> Result<ValidationResult> {
        let request = ValidationRequest::prepare(bytes, strip_sbdh, explicit_keyword)?;
        self.submit(&request).await
    }

    async fn exchange(&self, url: &str, request: &ValidationRequest<'_>) -> Result<ValidationResult> {
        let mut builder = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/xml")
            .header(ACCEPT, "application/json")
            .body(request.document.to_vec());

        if request.keyword_source == KeywordSource::Explicit {
            builder = builder.query(&[("keyword", request.keyword.as_str())]);
        }

        let response = builder
            .send()
            .await
            .map_err(|source| self.transport_error(url, source))?;

        let status = response.status();
        debug!(%url, status = status.as_u16(), "validation service responded");

        let body = response
            .bytes()
            .await
            .map_err(|source| self.transport_error(url, source))?;

        if status != StatusCode::OK {
            let detail = String::from_utf8_lossy(&body);
            let detail = detail.trim();
            return Err(DocValError::ServerError {
                url: url.to_string(),
                status: status.as_u16(),
                message: if detail.is_empty() {
                    status.canonical_reason().unwrap_or("Unknown").to_string()
                } else {
                    detail.to_string()
                },
            });
        }

        serde_json::from_slice(&body).map_err(|e| DocValError::ServerError {
            url: url.to_string(),
            status: status.as_u16(),
            message: format!("undecodable validation result: {}", e),
        })
    }

    fn transport_error(&self, url: &str, source: reqwest::Error) -> DocValError {
        if source.is_timeout() {
            DocValError::Timeout {
                url: url.to_string(),
                timeout_seconds: self.config.timeout_seconds,
            }
        } else {
            DocValError::NetworkFailure {
                url: url.to_string(),
                source,
            }
        }
    }
}
