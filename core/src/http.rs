//! HTTP transport types described as plain data.
//!
//! # Design
//! `ApiClient` turns an `ApiRequest` into an `HttpRequest` value and hands it
//! to a `Transport`; the transport answers with an `HttpResponse` value. Both
//! sides are plain owned data, so request construction and response handling
//! can be tested without a socket and any transport can be swapped in.
//!
//! Multipart bodies are described by `MultipartForm` rather than a
//! transport-native form type, which keeps them inspectable and `Clone`.

use std::fmt;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One part of a multipart form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MultipartPart {
    Text {
        name: String,
        value: String,
    },
    File {
        name: String,
        file_name: String,
        mime: Option<String>,
        bytes: Vec<u8>,
    },
}

/// A multipart form body. The transport picks the boundary and the matching
/// `content-type`, so the client never sets one for this body kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultipartForm {
    pub parts: Vec<MultipartPart>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push(MultipartPart::Text {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    pub fn file(
        mut self,
        name: impl Into<String>,
        file_name: impl Into<String>,
        mime: Option<&str>,
        bytes: Vec<u8>,
    ) -> Self {
        self.parts.push(MultipartPart::File {
            name: name.into(),
            file_name: file_name.into(),
            mime: mime.map(str::to_string),
            bytes,
        });
        self
    }
}

/// Encoded body of an outgoing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HttpBody {
    Text(String),
    Multipart(MultipartForm),
}

/// An HTTP request described as plain data.
///
/// Built by `ApiClient::build`. `url` is absolute: base URL plus path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<HttpBody>,
}

impl HttpRequest {
    /// First header value whose name matches case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// An HTTP response described as plain data.
///
/// `reason` is the status phrase as reported by the transport ("Not Found").
/// `body` is the full body read as text, on success and failure alike.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub reason: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

pub(crate) fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}
