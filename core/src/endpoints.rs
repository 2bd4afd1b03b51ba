//! Typed operations for each backend resource.
//!
//! Thin wrappers over `ApiClient::fetch`: each one fixes the path, method and
//! body shape for a single endpoint under `/api/v1`.

use serde_json::Value;

use crate::client::{ApiClient, ApiRequest};
use crate::error::ApiError;
use crate::transport::Transport;
use crate::types::{
    ActivityItem, CategoryShare, Due, DueSettlement, Forecast, ForecastRequest, NewDue, NewProduct, NewSale, Product,
    ProductBatch, ProductUpdate, ReportSummary, Sale, SeriesPoint, TopProduct,
};

pub const PRODUCTS: &str = "/api/v1/products";
pub const SALES: &str = "/api/v1/sales";
pub const DUES: &str = "/api/v1/dues";
pub const REPORTS: &str = "/api/v1/reports";
pub const FORECAST: &str = "/api/v1/forecast";

impl<T: Transport> ApiClient<T> {
    pub async fn health(&self) -> Result<Value, ApiError> {
        self.get("/health").await
    }

    // --- products ---

    pub async fn list_products(&self) -> Result<Vec<Product>, ApiError> {
        self.get(PRODUCTS).await
    }

    pub async fn create_product(&self, product: &NewProduct) -> Result<Product, ApiError> {
        self.fetch(ApiRequest::post(PRODUCTS).json(product)?).await
    }

    pub async fn update_product(&self, id: i64, update: &ProductUpdate) -> Result<Product, ApiError> {
        self.fetch(ApiRequest::patch(format!("{PRODUCTS}/{id}")).json(update)?).await
    }

    /// Move `product`'s stock by `delta`, never below zero.
    pub async fn adjust_stock(&self, product: &Product, delta: i64) -> Result<Product, ApiError> {
        let update = ProductUpdate {
            stock: Some(product.stock.saturating_add(delta).max(0)),
            ..Default::default()
        };
        self.update_product(product.id, &update).await
    }

    pub async fn delete_product(&self, id: i64) -> Result<(), ApiError> {
        // The body (`{"ok": true}` or empty) carries nothing beyond the status.
        self.send(ApiRequest::delete(format!("{PRODUCTS}/{id}"))).await.map(|_| ())
    }

    pub async fn import_products(&self, items: Vec<NewProduct>) -> Result<Vec<Product>, ApiError> {
        let batch = ProductBatch { items };
        self.fetch(ApiRequest::post(format!("{PRODUCTS}/batch")).json(&batch)?).await
    }

    // --- sales ---

    pub async fn list_sales(&self) -> Result<Vec<Sale>, ApiError> {
        self.get(SALES).await
    }

    pub async fn record_sale(&self, sale: &NewSale) -> Result<Sale, ApiError> {
        self.fetch(ApiRequest::post(SALES).json(sale)?).await
    }

    // --- dues ---

    pub async fn list_dues(&self) -> Result<Vec<Due>, ApiError> {
        self.get(DUES).await
    }

    pub async fn create_due(&self, due: &NewDue) -> Result<Due, ApiError> {
        self.fetch(ApiRequest::post(DUES).json(due)?).await
    }

    pub async fn settle_due(&self, id: i64) -> Result<Due, ApiError> {
        let body = DueSettlement { is_settled: true };
        self.fetch(ApiRequest::patch(format!("{DUES}/{id}")).json(&body)?).await
    }

    // --- reports ---

    pub async fn report_summary(&self) -> Result<ReportSummary, ApiError> {
        self.get(&format!("{REPORTS}/summary")).await
    }

    pub async fn sales_series(&self, days: u32) -> Result<Vec<SeriesPoint>, ApiError> {
        self.get(&format!("{REPORTS}/sales-series?days={days}")).await
    }

    /// Best sellers by all-time revenue. The backend accepts `limit` in 1..=20.
    pub async fn top_products(&self, limit: u32) -> Result<Vec<TopProduct>, ApiError> {
        self.get(&format!("{REPORTS}/top-products?limit={limit}")).await
    }

    pub async fn category_share(&self) -> Result<Vec<CategoryShare>, ApiError> {
        self.get(&format!("{REPORTS}/category-share")).await
    }

    /// Latest sales and dues merged newest first. `limit` in 1..=50.
    pub async fn recent_activity(&self, limit: u32) -> Result<Vec<ActivityItem>, ApiError> {
        self.get(&format!("{REPORTS}/recent?limit={limit}")).await
    }

    pub async fn forecast(&self, product_id: i64, horizon_days: u32) -> Result<Forecast, ApiError> {
        let body = ForecastRequest {
            product_id,
            horizon_days,
        };
        self.fetch(ApiRequest::post(FORECAST).json(&body)?).await
    }
}
