//! Async API client core for the shop dashboard backend.
//!
//! # Overview
//! `ApiClient` issues typed requests against a configured base URL, encodes
//! bodies, enforces a timeout, classifies failures into `ApiError`, and
//! decodes responses through `Payload`. `safe` lets views degrade to a
//! fallback value instead of propagating a failure.
//!
//! # Design
//! - `ApiClient` is stateless: it holds only `ClientConfig` and a `Transport`.
//! - The network sits behind the `Transport` trait and plain-data
//!   `HttpRequest` / `HttpResponse`, so everything but the socket is testable
//!   in memory. `ReqwestTransport` is the production implementation.
//! - Untyped `send` tolerates any 2xx shape; typed `fetch` and the verb
//!   helpers decode strictly and surface mismatches as `ApiError::Decode`.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod http;
pub mod inventory;
pub mod payload;
pub mod safe;
pub mod transport;
pub mod types;

pub use client::{ApiClient, ApiRequest, RequestBody};
pub use config::{ClientConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
pub use error::ApiError;
pub use http::{HttpBody, HttpMethod, HttpRequest, HttpResponse, MultipartForm, MultipartPart};
pub use payload::Payload;
pub use safe::{safe, safe_else};
pub use tokio_util::sync::CancellationToken;
pub use transport::{ReqwestTransport, Transport};
pub use types::{
    ActivityItem, CategoryShare, Due, DueSettlement, Forecast, ForecastPoint, ForecastRequest, NewDue, NewProduct,
    NewSale, Product, ProductBatch, ProductUpdate, ReportSummary, Sale, SeriesPoint, TopProduct,
};
