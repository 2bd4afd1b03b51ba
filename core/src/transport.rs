//! The I/O seam between `ApiClient` and the network.
//!
//! `ApiClient` owns request construction, timeouts and response handling;
//! a `Transport` only executes one `HttpRequest` and reports what came back.
//! Any non-2xx answer is still an `Ok(HttpResponse)` here. Only failures that
//! produced no HTTP response at all are errors.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use tracing::debug;

use crate::error::ApiError;
use crate::http::{HttpBody, HttpMethod, HttpRequest, HttpResponse, MultipartForm, MultipartPart};

#[async_trait]
pub trait Transport: Send + Sync {
    /// Execute `request` and read the full response body as text.
    ///
    /// Dropping the returned future must abort the request.
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        (**self).execute(request).await
    }
}

/// `reqwest`-backed transport.
///
/// The inner client carries no timeout of its own; `ApiClient` enforces one
/// around every call. reqwest keeps no response cache.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a preconfigured client (proxies, TLS roots, connection pools).
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let method = match request.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self.client.request(method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder = match request.body {
            Some(HttpBody::Text(text)) => builder.body(text),
            Some(HttpBody::Multipart(form)) => builder.multipart(into_form(form)?),
            None => builder,
        };

        let response = builder.send().await.map_err(network_error)?;
        let status = response.status();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.as_str().to_string(), v.to_string())))
            .collect();
        let body = response.text().await.map_err(network_error)?;
        debug!(status = status.as_u16(), bytes = body.len(), "response received");

        Ok(HttpResponse {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            body,
        })
    }
}

/// Builder errors (bad header names, unparsable URLs) fail identically on
/// every attempt, so they are not reported as network failures.
fn network_error(e: reqwest::Error) -> ApiError {
    if e.is_builder() {
        ApiError::InvalidRequest(e.to_string())
    } else {
        ApiError::Network(e.to_string())
    }
}

fn into_form(form: MultipartForm) -> Result<Form, ApiError> {
    let mut out = Form::new();
    for part in form.parts {
        out = match part {
            MultipartPart::Text { name, value } => out.text(name, value),
            MultipartPart::File {
                name,
                file_name,
                mime,
                bytes,
            } => {
                let mut part = Part::bytes(bytes).file_name(file_name);
                if let Some(mime) = mime {
                    part = part
                        .mime_str(&mime)
                        .map_err(|e| ApiError::InvalidRequest(format!("invalid mime type {mime:?}: {e}")))?;
                }
                out.part(name, part)
            }
        };
    }
    Ok(out)
}
