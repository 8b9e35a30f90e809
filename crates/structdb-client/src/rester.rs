//! Rester - token-authenticated client for the structure database
//!
//! The Rester holds an access token and a transport. Each query is one
//! round trip: the token is attached, the request is sent, and the JSON
//! answer is returned as-is or decoded into [`Entry`] values.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::collections::HashMap;
//! use structdb_client::Rester;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let rester = Rester::new("my-access-token")?;
//!
//!     let mut params = HashMap::new();
//!     params.insert("param_prototype_name".to_string(), "fcc".to_string());
//!     let body = rester.query("prototypes", &params).await?;
//!
//!     println!("{}", body);
//!     Ok(())
//! }
//! ```

use crate::entries::{self, Entry, Field};
use crate::query::{
    CalculatorQuery, CatalogueQuery, ComparatorQuery, PropertyQuery, PropertyTypeQuery,
    PrototypeQuery,
};
use crate::resource::Resource;
use crate::rest::{RestClient, RestClientConfig, RestRequest, Transport};
use crate::{Error, Result};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Endpoint of the public structure database service
pub const DEFAULT_BASE_URL: &str = "https://atomistictools.org";

/// Where the access token travels
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenPlacement {
    /// A field of the JSON body; GET requests carry it as a query parameter
    /// of the same name
    JsonBody(String),
    /// A query parameter
    QueryParam(String),
    /// `Authorization: Bearer <token>`
    Bearer,
}

impl Default for TokenPlacement {
    fn default() -> Self {
        TokenPlacement::JsonBody("token".to_string())
    }
}

/// Configuration for [`Rester`]
#[derive(Debug, Clone)]
pub struct ResterConfig {
    /// Service base URL
    pub base_url: String,
    /// Where the token is attached
    pub token_placement: TokenPlacement,
    /// Transport settings; its service URL is replaced by `base_url`
    pub rest_config: RestClientConfig,
}

impl Default for ResterConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl ResterConfig {
    /// Create a configuration for a base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            rest_config: RestClientConfig::new(base_url.clone()),
            base_url,
            token_placement: TokenPlacement::default(),
        }
    }

    /// Set where the token is attached
    pub fn with_token_placement(mut self, placement: TokenPlacement) -> Self {
        self.token_placement = placement;
        self
    }

    /// Set transport settings (timeout, user agent, headers, TLS)
    pub fn with_rest_config(mut self, config: RestClientConfig) -> Self {
        self.rest_config = config;
        self
    }
}

/// Client for the structure database service
///
/// Cloning is cheap and clones share the transport. The token cannot change
/// after construction, so concurrent queries need no coordination.
#[derive(Clone)]
pub struct Rester {
    /// Access token
    token: String,
    /// Service base URL
    base_url: String,
    /// Where the token is attached
    token_placement: TokenPlacement,
    /// Request transport
    transport: Arc<dyn Transport>,
}

impl Rester {
    /// Create a Rester for the public service
    ///
    /// # Example
    ///
    /// ```rust
    /// use structdb_client::{Error, Rester};
    ///
    /// assert!(Rester::new("my-access-token").is_ok());
    /// assert!(matches!(Rester::new(""), Err(Error::Configuration(_))));
    /// ```
    pub fn new(token: impl Into<String>) -> Result<Self> {
        Self::with_config(token, ResterConfig::default())
    }

    /// Create a Rester with custom configuration
    pub fn with_config(token: impl Into<String>, config: ResterConfig) -> Result<Self> {
        let token = validate_token(token.into())?;

        let mut rest_config = config.rest_config;
        rest_config.service_url = config.base_url.clone();
        let client = RestClient::new(rest_config)
            .map_err(|e| Error::Configuration(e.message().to_string()))?;

        Ok(Self {
            token,
            base_url: config.base_url,
            token_placement: config.token_placement,
            transport: Arc::new(client),
        })
    }

    /// Create a Rester over any transport
    pub fn with_transport(
        token: impl Into<String>,
        base_url: impl Into<String>,
        token_placement: TokenPlacement,
        transport: Arc<dyn Transport>,
    ) -> Result<Self> {
        Ok(Self {
            token: validate_token(token.into())?,
            base_url: base_url.into(),
            token_placement,
            transport,
        })
    }

    /// Service base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Where the token is attached
    pub fn token_placement(&self) -> &TokenPlacement {
        &self.token_placement
    }

    /// Query a resource and return the JSON body unchanged
    ///
    /// `resource` is either a catalogue name (`"prototypes"`, `"properties"`,
    /// `"calculators"`, ...), sent as POST with the parameters in the JSON
    /// body, or a path such as `"/api/v1.0/status"`, sent as GET with the
    /// parameters in the query string.
    pub async fn query(&self, resource: &str, params: &HashMap<String, String>) -> Result<Value> {
        let params: Map<String, Value> = params
            .iter()
            .map(|(key, value)| (key.clone(), Value::String(value.clone())))
            .collect();

        match resource.parse::<Resource>() {
            Ok(known) => self.query_resource(known, params).await,
            Err(_) => self.get(resource, params).await,
        }
    }

    /// POST parameters to a catalogue resource and return the JSON body
    pub async fn query_resource(&self, resource: Resource, params: Map<String, Value>) -> Result<Value> {
        let mut body = params;
        // The service sends every referenced record unless told the client
        // already holds it; this client never does.
        body.insert("cache_state".to_string(), Value::Object(Map::new()));

        let mut request = RestRequest::post(resource.path());
        match &self.token_placement {
            TokenPlacement::JsonBody(field) => {
                body.insert(field.clone(), Value::String(self.token.clone()));
            }
            TokenPlacement::QueryParam(name) => {
                request = request.param(name.clone(), self.token.clone());
            }
            TokenPlacement::Bearer => {
                request = request.header("Authorization", format!("Bearer {}", self.token));
            }
        }

        let request = request.json_body(&body)?;
        self.dispatch(request).await
    }

    /// Run a catalogue query and decode its entries
    ///
    /// Result items that are not entry references are returned as
    /// [`Field::Value`].
    pub async fn query_entries<Q: CatalogueQuery + ?Sized>(&self, query: &Q) -> Result<Vec<Field>> {
        let resource = query.resource();
        let body = self.query_resource(resource, query.to_params()).await?;
        let results = entries::decode(&body)?;
        tracing::debug!(%resource, count = results.len(), "entries received");
        Ok(results)
    }

    /// Comparison types
    pub async fn query_comparators(&self, query: &ComparatorQuery) -> Result<Vec<Arc<Entry>>> {
        self.typed_entries(query).await
    }

    /// Crystal prototypes (generic entries)
    pub async fn query_prototypes(&self, query: &PrototypeQuery) -> Result<Vec<Arc<Entry>>> {
        self.typed_entries(query).await
    }

    /// Properties with their types, calculators and structures
    pub async fn query_properties(&self, query: &PropertyQuery) -> Result<Vec<Arc<Entry>>> {
        self.typed_entries(query).await
    }

    /// Property types
    pub async fn query_property_types(&self, query: &PropertyTypeQuery) -> Result<Vec<Arc<Entry>>> {
        self.typed_entries(query).await
    }

    /// Calculator types
    pub async fn query_calculators(&self, query: &CalculatorQuery) -> Result<Vec<Arc<Entry>>> {
        self.typed_entries(query).await
    }

    async fn typed_entries<Q: CatalogueQuery>(&self, query: &Q) -> Result<Vec<Arc<Entry>>> {
        let results = self.query_entries(query).await?;
        let mut typed = Vec::with_capacity(results.len());
        for field in results {
            match field {
                Field::Entry(entry) => typed.push(entry),
                other => tracing::warn!(resource = %query.resource(), ?other, "skipping non-entry result"),
            }
        }
        Ok(typed)
    }

    /// GET a raw path with the parameters as query string
    async fn get(&self, path: &str, params: Map<String, Value>) -> Result<Value> {
        let mut request = RestRequest::get(path);
        for (key, value) in params {
            let value = match value {
                Value::String(s) => s,
                other => other.to_string(),
            };
            request = request.param(key, value);
        }

        request = match &self.token_placement {
            TokenPlacement::JsonBody(name) | TokenPlacement::QueryParam(name) => {
                request.param(name.clone(), self.token.clone())
            }
            TokenPlacement::Bearer => {
                request.header("Authorization", format!("Bearer {}", self.token))
            }
        };

        self.dispatch(request).await
    }

    async fn dispatch(&self, request: RestRequest) -> Result<Value> {
        let response = self.transport.execute(request).await?;
        Ok(response.data)
    }
}

impl fmt::Debug for Rester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rester")
            .field("token", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("token_placement", &self.token_placement)
            .finish_non_exhaustive()
    }
}

fn validate_token(token: String) -> Result<String> {
    if token.trim().is_empty() {
        return Err(Error::Configuration("access token must not be empty".to_string()));
    }
    Ok(token)
}

// =============================================================================
// Tests
// =============================================================================
