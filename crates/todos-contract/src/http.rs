// crates/todos-contract/src/http.rs
// ============================================================================
// Module: Todos HTTP Client
// Description: Request/response types and the reqwest-backed transport.
// Purpose: Issue todos API calls and separate transport failures from responses.
// Dependencies: async-trait, hyper, reqwest, serde, serde_json, thiserror, url
// ============================================================================

//! ## Overview
//! Every call returns `Result<ApiResponse, TransportError>`. An `Ok` value is
//! any HTTP response at all, including 4xx and 5xx; those are contract
//! outcomes for the expectation layer to judge. An `Err` means no response was
//! obtained.
//!
//! Redirects are not followed and bodies are capped at a configurable size.
//! The reason phrase is the one the server put on the HTTP/1 status line;
//! hyper only records it when it differs from the canonical phrase, so the
//! canonical phrase stands in otherwise (and for HTTP/2, which has none).

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;
use std::time::Instant;

use async_trait::async_trait;
use hyper::ext::ReasonPhrase;
use reqwest::Client;
use reqwest::Method;
use reqwest::redirect::Policy;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use url::Url;

use crate::config::HarnessConfig;
use crate::model::Todo;
use crate::model::TodoField;
use crate::model::TodoFields;
use crate::model::TodoId;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default maximum response body size accepted by the client.
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

// ============================================================================
// SECTION: Requests
// ============================================================================

/// HTTP methods used against the todos API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ApiMethod {
    /// GET.
    Get,
    /// POST.
    Post,
    /// PUT.
    Put,
    /// PATCH.
    Patch,
    /// DELETE.
    Delete,
}

impl ApiMethod {
    /// Returns the method token.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }

    /// Maps to the reqwest method.
    fn to_reqwest(self) -> Method {
        match self {
            Self::Get => Method::GET,
            Self::Post => Method::POST,
            Self::Put => Method::PUT,
            Self::Patch => Method::PATCH,
            Self::Delete => Method::DELETE,
        }
    }
}

impl fmt::Display for ApiMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Addressable todos endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Endpoint {
    /// The collection URL (`/todos`).
    Collection,
    /// A single todo (`/todos/{id}`).
    Item(TodoId),
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Collection => f.write_str("collection"),
            Self::Item(id) => write!(f, "item/{id}"),
        }
    }
}

/// A single todos API request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    /// HTTP method.
    pub method: ApiMethod,
    /// Target endpoint.
    pub endpoint: Endpoint,
    /// Query parameters.
    pub params: TodoFields,
}

impl ApiRequest {
    /// Builds a request without parameters.
    #[must_use]
    pub const fn new(method: ApiMethod, endpoint: Endpoint) -> Self {
        Self {
            method,
            endpoint,
            params: TodoFields::none(),
        }
    }

    /// Attaches query parameters.
    #[must_use]
    pub fn with_params(mut self, params: TodoFields) -> Self {
        self.params = params;
        self
    }
}

// ============================================================================
// SECTION: Responses
// ============================================================================

/// An observed HTTP response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiResponse {
    /// Status code.
    pub status: u16,
    /// Reason phrase from the status line.
    pub reason: String,
    /// Raw body text (lossy UTF-8).
    pub body: String,
    /// Round-trip time in milliseconds.
    pub elapsed_ms: u64,
}

impl ApiResponse {
    /// Builds a response, deriving the reason phrase from the status code.
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            reason: canonical_reason(status).to_string(),
            body: body.into(),
            elapsed_ms: 0,
        }
    }

    /// Replaces the reason phrase.
    #[must_use]
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = reason.into();
        self
    }

    /// Parses the body as JSON.
    #[must_use]
    pub fn json(&self) -> Option<Value> {
        serde_json::from_str(&self.body).ok()
    }

    /// Returns a top-level JSON field from an object body.
    #[must_use]
    pub fn field(&self, field: TodoField) -> Option<Value> {
        match self.json()? {
            Value::Object(mut map) => map.remove(field.as_str()),
            _ => None,
        }
    }

    /// Returns a field rendered as text (strings verbatim, other scalars as JSON).
    #[must_use]
    pub fn field_text(&self, field: TodoField) -> Option<String> {
        match self.field(field)? {
            Value::String(text) => Some(text),
            Value::Null => None,
            other => Some(other.to_string()),
        }
    }

    /// Returns the todo identifier carried by the body, if any.
    #[must_use]
    pub fn todo_id(&self) -> Option<TodoId> {
        self.field(TodoField::Id).as_ref().and_then(TodoId::from_json)
    }

    /// Decodes the body as a todo.
    ///
    /// # Errors
    ///
    /// Returns the decode error when the body is not a todo object.
    pub fn todo(&self) -> Result<Todo, serde_json::Error> {
        serde_json::from_str(&self.body)
    }

    /// Returns true when the body is empty or whitespace.
    #[must_use]
    pub fn body_is_empty(&self) -> bool {
        self.body.trim().is_empty()
    }

    /// Returns true when the body is a JSON array.
    #[must_use]
    pub fn is_collection(&self) -> bool {
        matches!(self.json(), Some(Value::Array(_)))
    }
}

/// Returns the canonical reason phrase for a status code.
#[must_use]
pub fn canonical_reason(status: u16) -> &'static str {
    reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|status| status.canonical_reason())
        .unwrap_or("")
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Failures that prevented an HTTP response from being observed.
///
/// # Invariants
/// - Never used for 4xx/5xx responses; those are [`ApiResponse`] values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The request URL could not be formed.
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    /// The HTTP client could not be constructed.
    #[error("http client build failed: {0}")]
    Build(String),
    /// The request timed out.
    #[error("request timed out: {0}")]
    Timeout(String),
    /// The service could not be reached.
    #[error("connection failed: {0}")]
    Connect(String),
    /// Any other request failure.
    #[error("request failed: {0}")]
    Request(String),
    /// The response body could not be read.
    #[error("response body read failed: {0}")]
    Body(String),
    /// The response body exceeded the configured limit.
    #[error("response exceeds size limit ({actual} > {limit})")]
    ResponseTooLarge {
        /// Observed size in bytes.
        actual: usize,
        /// Maximum size in bytes.
        limit: usize,
    },
}

impl TransportError {
    /// Classifies a reqwest error.
    fn from_reqwest(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_connect() {
            Self::Connect(err.to_string())
        } else {
            Self::Request(err.to_string())
        }
    }
}

// ============================================================================
// SECTION: Transport Trait
// ============================================================================

/// Sends todos API requests.
///
/// The provided methods name the CRUD operations; implementors only supply
/// [`TodoTransport::send`].
#[async_trait]
pub trait TodoTransport: Send + Sync {
    /// Sends a request and returns the observed response.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when no response was obtained.
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError>;

    /// `POST /todos` with the given fields.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when no response was obtained.
    async fn create(&self, fields: &TodoFields) -> Result<ApiResponse, TransportError> {
        let request =
            ApiRequest::new(ApiMethod::Post, Endpoint::Collection).with_params(fields.clone());
        self.send(&request).await
    }

    /// `GET /todos/{id}`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when no response was obtained.
    async fn read(&self, id: &TodoId) -> Result<ApiResponse, TransportError> {
        self.send(&ApiRequest::new(ApiMethod::Get, Endpoint::Item(id.clone()))).await
    }

    /// `GET /todos`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when no response was obtained.
    async fn list(&self) -> Result<ApiResponse, TransportError> {
        self.send(&ApiRequest::new(ApiMethod::Get, Endpoint::Collection)).await
    }

    /// `PUT /todos/{id}` replacing both fields.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when no response was obtained.
    async fn replace(
        &self,
        id: &TodoId,
        fields: &TodoFields,
    ) -> Result<ApiResponse, TransportError> {
        let request = ApiRequest::new(ApiMethod::Put, Endpoint::Item(id.clone()))
            .with_params(fields.clone());
        self.send(&request).await
    }

    /// `PATCH /todos/{id}` with a subset of fields.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when no response was obtained.
    async fn update(
        &self,
        id: &TodoId,
        fields: &TodoFields,
    ) -> Result<ApiResponse, TransportError> {
        let request = ApiRequest::new(ApiMethod::Patch, Endpoint::Item(id.clone()))
            .with_params(fields.clone());
        self.send(&request).await
    }

    /// `DELETE /todos/{id}`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when no response was obtained.
    async fn delete(&self, id: &TodoId) -> Result<ApiResponse, TransportError> {
        self.send(&ApiRequest::new(ApiMethod::Delete, Endpoint::Item(id.clone()))).await
    }
}

// ============================================================================
// SECTION: Transcript
// ============================================================================

/// One recorded exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExchangeRecord {
    /// 1-based sequence number within the client.
    pub sequence: u64,
    /// HTTP method.
    pub method: ApiMethod,
    /// Full request URL.
    pub url: String,
    /// Status code when a response was received.
    pub status: Option<u16>,
    /// Transport error text when no response was received.
    pub error: Option<String>,
    /// Round-trip time in milliseconds.
    pub elapsed_ms: u64,
}

// ============================================================================
// SECTION: HTTP Client
// ============================================================================

/// reqwest-backed todos client with transcript capture.
#[derive(Clone)]
pub struct TodosHttpClient {
    /// Collection endpoint URL.
    collection_url: Url,
    /// Underlying HTTP client.
    client: Client,
    /// Maximum accepted response body size.
    max_body_bytes: usize,
    /// Recorded exchanges.
    transcript: Arc<Mutex<Vec<ExchangeRecord>>>,
}

impl TodosHttpClient {
    /// Creates a client for a collection URL with a request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the URL is invalid or the client
    /// cannot be built.
    pub fn new(collection_url: &str, timeout: Duration) -> Result<Self, TransportError> {
        let url = parse_collection_url(collection_url)?;
        let client = Client::builder()
            .redirect(Policy::none())
            .timeout(timeout)
            .build()
            .map_err(|err| TransportError::Build(err.to_string()))?;
        Ok(Self::with_client(url, client))
    }

    /// Creates a client from harness configuration.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the URL is invalid or the client
    /// cannot be built.
    pub fn from_config(config: &HarnessConfig) -> Result<Self, TransportError> {
        Ok(Self::new(&config.collection_url, config.timeout())?
            .with_max_body_bytes(config.max_body_bytes))
    }

    /// Creates a client from an existing reqwest client.
    #[must_use]
    pub fn with_client(collection_url: Url, client: Client) -> Self {
        Self {
            collection_url,
            client,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            transcript: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Overrides the response body limit.
    #[must_use]
    pub const fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }

    /// Returns the collection URL.
    #[must_use]
    pub const fn collection_url(&self) -> &Url {
        &self.collection_url
    }

    /// Returns a snapshot of the transcript.
    #[must_use]
    pub fn transcript(&self) -> Vec<ExchangeRecord> {
        self.transcript.lock().map_or_else(|_| Vec::new(), |entries| entries.clone())
    }

    /// Resolves the full URL for an endpoint and parameter set.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::InvalidUrl`] when the collection URL cannot
    /// take path segments.
    pub fn endpoint_url(
        &self,
        endpoint: &Endpoint,
        params: &TodoFields,
    ) -> Result<Url, TransportError> {
        let mut url = self.collection_url.clone();
        if let Endpoint::Item(id) = endpoint {
            url.path_segments_mut()
                .map_err(|()| {
                    TransportError::InvalidUrl(format!("{} cannot be a base", self.collection_url))
                })?
                .pop_if_empty()
                .push(&id.to_string());
        }
        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params.query_pairs());
        }
        Ok(url)
    }

    /// Performs the HTTP exchange.
    async fn execute(&self, method: ApiMethod, url: Url) -> Result<ApiResponse, TransportError> {
        let response = self
            .client
            .request(method.to_reqwest(), url)
            .send()
            .await
            .map_err(|err| TransportError::from_reqwest(&err))?;
        let status = response.status();
        let reason = observed_reason(&response);
        if let Some(length) = response.content_length() {
            let actual = usize::try_from(length).unwrap_or(usize::MAX);
            if actual > self.max_body_bytes {
                return Err(TransportError::ResponseTooLarge {
                    actual,
                    limit: self.max_body_bytes,
                });
            }
        }
        let bytes = response.bytes().await.map_err(|err| TransportError::Body(err.to_string()))?;
        if bytes.len() > self.max_body_bytes {
            return Err(TransportError::ResponseTooLarge {
                actual: bytes.len(),
                limit: self.max_body_bytes,
            });
        }
        Ok(ApiResponse {
            status: status.as_u16(),
            reason,
            body: String::from_utf8_lossy(&bytes).into_owned(),
            elapsed_ms: 0,
        })
    }

    /// Appends an exchange to the transcript.
    fn record(&self, method: ApiMethod, url: &Url, result: &Result<ApiResponse, TransportError>) {
        let Ok(mut entries) = self.transcript.lock() else {
            return;
        };
        let sequence = u64::try_from(entries.len()).unwrap_or(u64::MAX).saturating_add(1);
        let (status, error, elapsed_ms) = match result {
            Ok(response) => (Some(response.status), None, response.elapsed_ms),
            Err(err) => (None, Some(err.to_string()), 0),
        };
        entries.push(ExchangeRecord {
            sequence,
            method,
            url: url.to_string(),
            status,
            error,
            elapsed_ms,
        });
    }
}

#[async_trait]
impl TodoTransport for TodosHttpClient {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        let url = self.endpoint_url(&request.endpoint, &request.params)?;
        let started = Instant::now();
        let result = self.execute(request.method, url.clone()).await.map(|mut response| {
            response.elapsed_ms = elapsed_millis(started);
            response
        });
        self.record(request.method, &url, &result);
        result
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Parses and checks a collection URL.
fn parse_collection_url(raw: &str) -> Result<Url, TransportError> {
    let url = Url::parse(raw).map_err(|err| TransportError::InvalidUrl(err.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(TransportError::InvalidUrl(format!("unsupported scheme {scheme}"))),
    }
}

/// Reason phrase as sent on the status line.
fn observed_reason(response: &reqwest::Response) -> String {
    response.extensions().get::<ReasonPhrase>().map_or_else(
        || response.status().canonical_reason().unwrap_or_default().to_string(),
        |phrase| String::from_utf8_lossy(phrase.as_bytes()).into_owned(),
    )
}

/// Milliseconds elapsed since `started`, saturating.
pub(crate) fn elapsed_millis(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
