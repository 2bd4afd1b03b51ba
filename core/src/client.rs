//! Request construction, execution and response handling for the shop API.
//!
//! # Design
//! `ApiClient` holds only its `ClientConfig` and a `Transport`; there is no
//! mutable state between calls, so clones can be shared freely across tasks.
//! Every call goes through the same three steps:
//!
//! 1. `build` turns an `ApiRequest` into a plain `HttpRequest` (pure).
//! 2. The transport executes it under the configured timeout, racing an
//!    optional caller `CancellationToken`. Losing the race drops the
//!    transport future, which aborts the request.
//! 3. `parse_response` maps the `HttpResponse` to a `Payload` or an
//!    `ApiError::HttpStatus` carrying the server's `detail`/`message`.
//!
//! Nothing is cached and nothing is retried here.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{find_header, HttpBody, HttpMethod, HttpRequest, HttpResponse, MultipartForm};
use crate::payload::Payload;
use crate::transport::{ReqwestTransport, Transport};

const CONTENT_TYPE: &str = "content-type";
const CACHE_CONTROL: &str = "cache-control";
const JSON_MIME: &str = "application/json";

/// Body supplied by the caller of an `ApiRequest`.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// A key-value mapping or ordered sequence, sent as JSON.
    Json(Value),
    /// Sent verbatim.
    Text(String),
    /// Sent verbatim; the transport sets the multipart boundary.
    Multipart(MultipartForm),
}

impl RequestBody {
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, ApiError> {
        serde_json::to_value(value)
            .map(RequestBody::Json)
            .map_err(|e| ApiError::Encode(e.to_string()))
    }
}

impl From<Value> for RequestBody {
    fn from(value: Value) -> Self {
        RequestBody::Json(value)
    }
}

impl From<String> for RequestBody {
    fn from(text: String) -> Self {
        RequestBody::Text(text)
    }
}

impl From<&str> for RequestBody {
    fn from(text: &str) -> Self {
        RequestBody::Text(text.to_string())
    }
}

impl From<MultipartForm> for RequestBody {
    fn from(form: MultipartForm) -> Self {
        RequestBody::Multipart(form)
    }
}

/// A request against the API, relative to the configured base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: HttpMethod,
    /// Must begin with `/`.
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<RequestBody>,
}

impl ApiRequest {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Patch, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, path)
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn body(mut self, body: impl Into<RequestBody>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn maybe_body(mut self, body: Option<RequestBody>) -> Self {
        self.body = body;
        self
    }

    pub fn json<T: Serialize + ?Sized>(self, value: &T) -> Result<Self, ApiError> {
        Ok(self.body(RequestBody::json(value)?))
    }
}

/// Stateless client for the shop API.
#[derive(Debug, Clone)]
pub struct ApiClient<T = ReqwestTransport> {
    config: ClientConfig,
    transport: T,
}

impl ApiClient<ReqwestTransport> {
    /// Client over the default `reqwest` transport.
    pub fn with_reqwest(config: ClientConfig) -> Self {
        Self::new(config, ReqwestTransport::new())
    }
}

impl<T: Transport> ApiClient<T> {
    pub fn new(config: ClientConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Resolve the URL, encode the body and attach default headers.
    pub fn build(&self, request: ApiRequest) -> Result<HttpRequest, ApiError> {
        if !request.path.starts_with('/') {
            return Err(ApiError::InvalidRequest(format!(
                "path must begin with '/': {:?}",
                request.path
            )));
        }

        let mut headers = request.headers;
        let body = match request.body {
            None => None,
            Some(RequestBody::Multipart(form)) => Some(HttpBody::Multipart(form)),
            Some(RequestBody::Text(text)) => Some(HttpBody::Text(text)),
            Some(RequestBody::Json(value)) => {
                let text = serde_json::to_string(&value).map_err(|e| ApiError::Encode(e.to_string()))?;
                if find_header(&headers, CONTENT_TYPE).is_none() {
                    headers.push((CONTENT_TYPE.to_string(), JSON_MIME.to_string()));
                }
                Some(HttpBody::Text(text))
            }
        };
        if find_header(&headers, CACHE_CONTROL).is_none() {
            headers.push((CACHE_CONTROL.to_string(), "no-store".to_string()));
        }

        Ok(HttpRequest {
            method: request.method,
            url: format!("{}{}", self.config.base_url(), request.path),
            headers,
            body,
        })
    }

    pub async fn send(&self, request: ApiRequest) -> Result<Payload, ApiError> {
        self.send_with_cancel(request, &CancellationToken::new()).await
    }

    /// Like `send`, but settles with `ApiError::Cancelled` as soon as `cancel`
    /// fires. The timeout still applies.
    pub async fn send_with_cancel(
        &self,
        request: ApiRequest,
        cancel: &CancellationToken,
    ) -> Result<Payload, ApiError> {
        let http = self.build(request)?;
        let method = http.method;
        let url = http.url.clone();
        let timeout = self.config.timeout();
        debug!(%method, %url, "sending request");

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ApiError::Cancelled),
            result = tokio::time::timeout(timeout, self.transport.execute(http)) => {
                result.unwrap_or(Err(ApiError::Timeout(timeout)))
            }
        };

        let result = outcome.and_then(parse_response);
        if let Err(e) = &result {
            debug!(%method, %url, error = %e, "request failed");
        }
        result
    }

    /// `send` followed by strict decoding into `R`.
    pub async fn fetch<R: DeserializeOwned>(&self, request: ApiRequest) -> Result<R, ApiError> {
        self.send(request).await?.decode()
    }

    pub async fn fetch_with_cancel<R: DeserializeOwned>(
        &self,
        request: ApiRequest,
        cancel: &CancellationToken,
    ) -> Result<R, ApiError> {
        self.send_with_cancel(request, cancel).await?.decode()
    }

    pub async fn get<R: DeserializeOwned>(&self, path: &str) -> Result<R, ApiError> {
        self.fetch(ApiRequest::get(path)).await
    }

    pub async fn post<R: DeserializeOwned>(
        &self,
        path: &str,
        body: Option<RequestBody>,
    ) -> Result<R, ApiError> {
        self.fetch(ApiRequest::post(path).maybe_body(body)).await
    }

    pub async fn patch<R: DeserializeOwned>(
        &self,
        path: &str,
        body: Option<RequestBody>,
    ) -> Result<R, ApiError> {
        self.fetch(ApiRequest::patch(path).maybe_body(body)).await
    }

    pub async fn delete<R: DeserializeOwned>(&self, path: &str) -> Result<R, ApiError> {
        self.fetch(ApiRequest::delete(path)).await
    }
}

/// Map a transport response to a payload, or to `HttpStatus` on non-2xx.
pub fn parse_response(response: HttpResponse) -> Result<Payload, ApiError> {
    if response.is_success() {
        return Ok(Payload::from_body(response.body));
    }
    let detail = error_detail(&response.body);
    Err(ApiError::HttpStatus {
        status: response.status,
        reason: response.reason,
        detail,
    })
}

/// Human-readable detail from an error body.
///
/// JSON bodies contribute their `detail` field, or `message` when `detail` is
/// absent or null (non-string values such as validation error lists are
/// rendered compactly); JSON without either field contributes nothing.
/// Non-JSON bodies contribute their text.
fn error_detail(body: &str) -> Option<String> {
    let detail = match serde_json::from_str::<Value>(body) {
        Ok(value) => match value
            .get("detail")
            .filter(|v| !v.is_null())
            .or_else(|| value.get("message"))
        {
            Some(Value::String(s)) => s.trim().to_string(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        },
        Err(_) => body.trim().to_string(),
    };
    (!detail.is_empty()).then_some(detail)
}
