//! Successful response bodies and the typed decoding policy.
//!
//! # Design
//! `ApiClient::send` never fails a 2xx response because of its shape: the body
//! lands in `Payload` as `Empty`, `Json` or `Text`. Typed calls then decode the
//! payload strictly, so a caller asking for `Vec<Product>` either gets one or
//! an `ApiError::Decode`:
//!
//! - `Empty` decodes as JSON `null` (`Option<T>`, `()` and `Value` accept it).
//! - `Json` decodes with `serde_json::from_value`.
//! - `Text` decodes as a JSON string, so `String` targets tolerate plain-text
//!   bodies while structured targets reject them.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ApiError;

#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// 2xx with an empty body (e.g. 204 No Content).
    Empty,
    Json(Value),
    /// 2xx body that is not valid JSON, kept verbatim.
    Text(String),
}

impl Payload {
    /// Classify a 2xx body.
    pub fn from_body(body: String) -> Self {
        if body.is_empty() {
            return Payload::Empty;
        }
        match serde_json::from_str(&body) {
            Ok(value) => Payload::Json(value),
            Err(_) => Payload::Text(body),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Payload::Empty)
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Payload::Json(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Payload::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn decode<T: DeserializeOwned>(self) -> Result<T, ApiError> {
        let (value, kind) = match self {
            Payload::Empty => (Value::Null, "empty body"),
            Payload::Json(value) => (value, "json body"),
            Payload::Text(text) => (Value::String(text), "text body"),
        };
        serde_json::from_value(value).map_err(|e| ApiError::Decode(format!("{kind}: {e}")))
    }
}
