//! Domain DTOs for the shop API.
//!
//! # Design
//! These mirror the backend's JSON schema but are defined independently of
//! the mock-server crate; the integration tests catch schema drift.
//! Timestamps are naive because the backend emits them without an offset.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

fn default_category() -> String {
    "General".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub id: i64,
    pub sku: String,
    pub name: String,
    #[serde(default = "default_category")]
    pub category: String,
    pub stock: i64,
    pub price: f64,
    pub reorder_point: i64,
}

impl Product {
    /// Units above (positive) or below (negative) the reorder point.
    pub fn headroom(&self) -> i64 {
        self.stock - self.reorder_point
    }
}

/// Payload for creating a product. Omitted fields take the backend defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewProduct {
    pub sku: String,
    pub name: String,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub reorder_point: i64,
}

/// Partial product update. Only fields present in the JSON are applied.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProductUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reorder_point: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductBatch {
    pub items: Vec<NewProduct>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Sale {
    pub id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub qty: i64,
    pub unit_price: f64,
    pub is_credit: bool,
    #[serde(default)]
    pub customer_name: Option<String>,
    pub created_at: NaiveDateTime,
}

impl Sale {
    pub fn total(&self) -> f64 {
        self.qty as f64 * self.unit_price
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewSale {
    pub product_id: i64,
    pub qty: i64,
    pub unit_price: f64,
    #[serde(default)]
    pub is_credit: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Due {
    pub id: i64,
    pub customer_name: String,
    pub amount: f64,
    #[serde(default)]
    pub note: Option<String>,
    pub is_settled: bool,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewDue {
    pub customer_name: String,
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DueSettlement {
    pub is_settled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TopProduct {
    pub name: String,
    pub revenue: f64,
}

/// Dashboard KPIs.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ReportSummary {
    pub today_sales: f64,
    pub week_sales: f64,
    pub month_sales: f64,
    pub pending_dues: f64,
    pub low_stock: i64,
    #[serde(default)]
    pub top_product: Option<TopProduct>,
}

/// One day of the sales chart. `date` is `YYYY-MM-DD`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SeriesPoint {
    pub date: String,
    pub value: f64,
}

/// Revenue of one product category; `pct` is its share of all revenue.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryShare {
    pub category: String,
    pub revenue: f64,
    pub pct: f64,
}

/// An entry of the recent-activity feed: a sale or a due.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActivityItem {
    #[serde(rename = "type")]
    pub kind: String,
    pub ts: NaiveDateTime,
    pub title: String,
    pub subtitle: String,
    pub amount: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForecastRequest {
    pub product_id: i64,
    pub horizon_days: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForecastPoint {
    pub date: String,
    pub forecast_qty: f64,
}

/// Projected daily demand, one point per day after today.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Forecast {
    pub points: Vec<ForecastPoint>,
}
