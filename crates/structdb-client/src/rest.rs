//! REST transport
//!
//! Request/response types, transport errors and the reqwest-backed client the
//! [`Rester`](crate::Rester) dispatches through. Every call is exactly one
//! round trip; nothing here retries.

use async_trait::async_trait;
use reqwest::{Client as ReqwestClient, Response as ReqwestResponse, StatusCode};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::time::{Duration, Instant};

// =============================================================================
// Error Types
// =============================================================================

/// Transport-level error with HTTP status and message
///
/// A status of `0` means no usable HTTP response was received (connection
/// refused, timeout, unreadable or malformed body).
///
/// # Examples
/// ```
/// use structdb_client::rest::RestError;
///
/// let error = RestError::new(404, "Not Found", "no such resource");
/// assert_eq!(error.status(), 404);
/// assert!(error.is_not_found());
/// assert!(!error.is_network_error());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestError {
    /// HTTP status code
    status: u16,
    /// Error code (e.g., "Unauthorized", "ParseError")
    error: String,
    /// Human-readable error message
    message: String,
}

impl RestError {
    /// Create a new REST error
    pub fn new(status: u16, error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            error: error.into(),
            message: message.into(),
        }
    }

    /// Get the HTTP status code
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Get the error code
    pub fn error(&self) -> &str {
        &self.error
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// True when no HTTP response was received
    pub fn is_network_error(&self) -> bool {
        self.status == 0
    }

    /// True when the service rejected the credential
    pub fn is_auth_error(&self) -> bool {
        matches!(self.status, 401 | 403)
    }

    /// True when the resource does not exist
    pub fn is_not_found(&self) -> bool {
        self.status == 404
    }
}

impl std::fmt::Display for RestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "REST error {}: {} - {}", self.status, self.error, self.message)
    }
}

impl std::error::Error for RestError {}

// =============================================================================
// Request Types
// =============================================================================

/// HTTP method for REST requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    /// GET request, parameters travel in the query string
    Get,
    /// POST request, parameters travel in the body
    Post,
}

impl HttpMethod {
    /// Method name as sent on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

/// REST request parameters
///
/// Represents a request to an endpoint path with method, headers,
/// query parameters, and optional body.
#[derive(Debug, Clone)]
pub struct RestRequest {
    /// HTTP method
    pub method: HttpMethod,
    /// Path relative to the service URL (e.g., "/api/v1.0/properties")
    pub path: String,
    /// Query parameters
    pub params: BTreeMap<String, String>,
    /// Request headers
    pub headers: HashMap<String, String>,
    /// Request body (for POST)
    pub body: Option<Vec<u8>>,
    /// Encoding type (e.g., "application/json")
    pub encoding: Option<String>,
}

impl RestRequest {
    /// Create a new GET request
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            path: path.into(),
            params: BTreeMap::new(),
            headers: HashMap::new(),
            body: None,
            encoding: None,
        }
    }

    /// Create a new POST request
    pub fn post(path: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Post,
            path: path.into(),
            params: BTreeMap::new(),
            headers: HashMap::new(),
            body: None,
            encoding: Some("application/json".to_string()),
        }
    }

    /// Add a query parameter
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Add a header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Set the request body from JSON
    pub fn json_body<T: Serialize>(mut self, value: &T) -> Result<Self, serde_json::Error> {
        let body = serde_json::to_vec(value)?;
        self.body = Some(body);
        self.encoding = Some("application/json".to_string());
        Ok(self)
    }
}

// =============================================================================
// Response Types
// =============================================================================

/// REST response with status, headers and decoded data
#[derive(Debug, Clone)]
pub struct RestResponse<T> {
    /// HTTP status code
    pub status: u16,
    /// Response headers (lowercase names)
    pub headers: HashMap<String, String>,
    /// Response data
    pub data: T,
}

impl<T> RestResponse<T> {
    /// Create a new response
    pub fn new(status: u16, headers: HashMap<String, String>, data: T) -> Self {
        Self {
            status,
            headers,
            data,
        }
    }

    /// Get a header value
    pub fn header(&self, key: &str) -> Option<&String> {
        self.headers.get(key)
    }

    /// Check if the response is successful (2xx status)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

// =============================================================================
// Client Configuration
// =============================================================================

/// Configuration for the REST client
#[derive(Debug, Clone)]
pub struct RestClientConfig {
    /// Base service URL (e.g., "https://atomistictools.org")
    pub service_url: String,
    /// Request timeout
    pub timeout: Duration,
    /// User agent string
    pub user_agent: String,
    /// Custom headers to include in all requests
    pub default_headers: HashMap<String, String>,
    /// Skip TLS certificate verification
    pub accept_invalid_certs: bool,
}

impl Default for RestClientConfig {
    fn default() -> Self {
        Self {
            service_url: crate::rester::DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
            user_agent: format!("structdb-rest/{}", env!("CARGO_PKG_VERSION")),
            default_headers: HashMap::new(),
            accept_invalid_certs: false,
        }
    }
}

impl RestClientConfig {
    /// Create a new config with a service URL
    pub fn new(service_url: impl Into<String>) -> Self {
        Self {
            service_url: service_url.into(),
            ..Default::default()
        }
    }

    /// Set the timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Add a default header
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.insert(key.into(), value.into());
        self
    }

    /// Accept self-signed or otherwise invalid TLS certificates
    pub fn with_accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }
}

// =============================================================================
// Error Response Format
// =============================================================================

/// JSON error body some endpoints return alongside a failure status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestErrorResponse {
    /// Error code
    pub error: String,
    /// Error message
    pub message: String,
}

// =============================================================================
// Transport
// =============================================================================

/// Anything that can carry a [`RestRequest`] to the service
///
/// [`RestClient`] is the HTTP implementation; tests substitute their own.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform one round trip and decode the JSON body
    async fn execute(
        &self,
        request: RestRequest,
    ) -> Result<RestResponse<serde_json::Value>, RestError>;
}

/// HTTP client for the structure database service
///
/// # Examples
/// ```
/// use structdb_client::rest::{RestClient, RestClientConfig, RestRequest};
///
/// async fn example() -> Result<(), Box<dyn std::error::Error>> {
///     let client = RestClient::new(RestClientConfig::new("https://atomistictools.org"))?;
///
///     let request = RestRequest::get("/api/v1.0/calculatortypes").param("token", "secret");
///     let response = client.send::<serde_json::Value>(request).await?;
///
///     println!("{}", response.data);
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RestClient {
    /// HTTP client
    client: ReqwestClient,
    /// Configuration
    config: RestClientConfig,
}

impl RestClient {
    /// Create a new REST client
    pub fn new(config: RestClientConfig) -> Result<Self, RestError> {
        let client = ReqwestClient::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()
            .map_err(|e| {
                RestError::new(0, "ClientBuild", format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self { client, config })
    }

    /// Send a request and decode the JSON response into `T`
    pub async fn send<T>(&self, request: RestRequest) -> Result<RestResponse<T>, RestError>
    where
        T: for<'de> Deserialize<'de>,
    {
        let url = self.url_for(&request.path);
        tracing::debug!(method = request.method.as_str(), %url, "dispatching request");

        let mut req = match request.method {
            HttpMethod::Get => self.client.get(&url),
            HttpMethod::Post => self.client.post(&url),
        };

        if !request.params.is_empty() {
            req = req.query(&request.params);
        }

        for (key, value) in &self.config.default_headers {
            req = req.header(key, value);
        }

        for (key, value) in &request.headers {
            req = req.header(key, value);
        }

        if let Some(body) = request.body {
            if let Some(encoding) = &request.encoding {
                req = req.header("Content-Type", encoding);
            }
            req = req.body(body);
        }

        let started = Instant::now();
        let response = req.send().await.map_err(transport_error)?;
        self.parse_response(response, started).await
    }

    /// Parse reqwest response into RestResponse
    async fn parse_response<T>(
        &self,
        response: ReqwestResponse,
        started: Instant,
    ) -> Result<RestResponse<T>, RestError>
    where
        T: for<'de> Deserialize<'de>,
    {
        let status = response.status();

        let mut headers = HashMap::new();
        for (key, value) in response.headers() {
            if let Ok(value_str) = value.to_str() {
                headers.insert(key.to_string(), value_str.to_string());
            }
        }

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            tracing::debug!(status = status.as_u16(), "request rejected");
            return Err(error_from_body(status, &error_body));
        }

        let body = response.bytes().await.map_err(|e| {
            RestError::new(0, "ParseError", format!("Failed to read response: {}", e))
        })?;

        tracing::debug!(
            status = status.as_u16(),
            size_kb = body.len() as f64 / 1024.0,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "response received"
        );

        // Status 0: the body was received but is not JSON.
        let data: T = serde_json::from_slice(&body).map_err(|e| {
            RestError::new(0, "ParseError", format!("Failed to parse JSON: {}", e))
        })?;

        Ok(RestResponse::new(status.as_u16(), headers, data))
    }

    /// Join the service URL and a request path
    fn url_for(&self, path: &str) -> String {
        let base = self.config.service_url.trim_end_matches('/');
        if path.starts_with('/') {
            format!("{}{}", base, path)
        } else {
            format!("{}/{}", base, path)
        }
    }
}

#[async_trait]
impl Transport for RestClient {
    async fn execute(
        &self,
        request: RestRequest,
    ) -> Result<RestResponse<serde_json::Value>, RestError> {
        self.send(request).await
    }
}

/// Map a reqwest failure (no usable response) to a status-0 error
fn transport_error(e: reqwest::Error) -> RestError {
    let code = if e.is_timeout() {
        "Timeout"
    } else if e.is_connect() {
        "ConnectionError"
    } else {
        "NetworkError"
    };
    RestError::new(0, code, format!("Request failed: {}", e))
}

/// Build an error from a non-success response body
fn error_from_body(status: StatusCode, body: &str) -> RestError {
    if let Ok(error_response) = serde_json::from_str::<RestErrorResponse>(body) {
        return RestError::new(status.as_u16(), error_response.error, error_response.message);
    }

    let reason = status.canonical_reason().unwrap_or("Unknown");
    RestError::new(
        status.as_u16(),
        reason,
        format!("HTTP {}: {}", status.as_u16(), body),
    )
}

// =============================================================================
// Tests
// =============================================================================
