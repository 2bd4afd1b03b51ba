use std::{
    collections::{BTreeMap, HashSet},
    sync::Arc,
};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use chrono::{Datelike, Days, Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub sku: String,
    pub name: String,
    pub category: String,
    pub stock: i64,
    pub price: f64,
    pub reorder_point: i64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ProductCreate {
    pub sku: String,
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub reorder_point: i64,
}

#[derive(Deserialize)]
pub struct ProductUpdate {
    pub sku: Option<String>,
    pub name: Option<String>,
    pub category: Option<String>,
    pub stock: Option<i64>,
    pub price: Option<f64>,
    pub reorder_point: Option<i64>,
}

#[derive(Deserialize)]
pub struct ProductBatch {
    pub items: Vec<ProductCreate>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Sale {
    pub id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub qty: i64,
    pub unit_price: f64,
    pub is_credit: bool,
    pub customer_name: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Deserialize)]
pub struct SaleCreate {
    pub product_id: i64,
    pub qty: i64,
    pub unit_price: f64,
    #[serde(default)]
    pub is_credit: bool,
    pub customer_name: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Due {
    pub id: i64,
    pub customer_name: String,
    pub amount: f64,
    pub note: Option<String>,
    pub is_settled: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Deserialize)]
pub struct DueCreate {
    pub customer_name: String,
    pub amount: f64,
    pub note: Option<String>,
}

#[derive(Deserialize)]
pub struct SeriesQuery {
    pub days: Option<i64>,
}

#[derive(Deserialize)]
pub struct LimitQuery {
    pub limit: Option<i64>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ActivityItem {
    #[serde(rename = "type")]
    pub kind: String,
    pub ts: NaiveDateTime,
    pub title: String,
    pub subtitle: String,
    pub amount: f64,
}

#[derive(Deserialize)]
pub struct ForecastIn {
    pub product_id: i64,
    pub horizon_days: i64,
}

#[derive(Default)]
pub struct Store {
    pub products: BTreeMap<i64, Product>,
    pub sales: Vec<Sale>,
    pub dues: Vec<Due>,
    next_product: i64,
    next_sale: i64,
    next_due: i64,
}

impl Store {
    fn sku_taken(&self, sku: &str) -> bool {
        self.products.values().any(|p| p.sku == sku)
    }

    /// Rejects the whole batch if any SKU is already stored or repeats
    /// inside the batch. Nothing is written.
    pub fn check_batch(&self, items: &[ProductCreate]) -> Result<(), Rejection> {
        let mut seen = HashSet::new();
        for item in items {
            let sku = item.sku.trim();
            if self.sku_taken(sku) || !seen.insert(sku) {
                return Err(reject(StatusCode::BAD_REQUEST, "SKU already exists"));
            }
        }
        Ok(())
    }

    pub fn insert_product(&mut self, input: ProductCreate) -> Result<Product, Rejection> {
        let sku = input.sku.trim().to_string();
        if self.sku_taken(&sku) {
            return Err(reject(StatusCode::BAD_REQUEST, "SKU already exists"));
        }
        self.next_product += 1;
        let product = Product {
            id: self.next_product,
            sku,
            name: input.name.trim().to_string(),
            category: input
                .category
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| "General".to_string()),
            stock: input.stock,
            price: input.price,
            reorder_point: input.reorder_point,
        };
        self.products.insert(product.id, product.clone());
        Ok(product)
    }

    fn insert_due(&mut self, customer_name: String, amount: f64, note: Option<String>) -> Due {
        self.next_due += 1;
        let due = Due {
            id: self.next_due,
            customer_name,
            amount,
            note,
            is_settled: false,
            created_at: now(),
        };
        self.dues.push(due.clone());
        due
    }
}

pub type Db = Arc<RwLock<Store>>;

/// Error response in the backend's `{"detail": ...}` shape.
pub type Rejection = (StatusCode, Json<Value>);

fn reject(status: StatusCode, detail: &str) -> Rejection {
    (status, Json(json!({ "detail": detail })))
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

pub fn app() -> Router {
    app_with(Arc::new(RwLock::new(Store::default())))
}

pub fn app_with(db: Db) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/v1/products", get(list_products).post(create_product))
        .route("/api/v1/products/batch", post(create_products_batch))
        .route("/api/v1/products/{id}", patch(update_product).delete(delete_product))
        .route("/api/v1/sales", get(list_sales).post(create_sale))
        .route("/api/v1/dues", get(list_dues).post(create_due))
        .route("/api/v1/dues/{id}", patch(settle_due))
        .route("/api/v1/reports/summary", get(summary))
        .route("/api/v1/reports/sales-series", get(sales_series))
        .route("/api/v1/reports/top-products", get(top_products))
        .route("/api/v1/reports/category-share", get(category_share))
        .route("/api/v1/reports/recent", get(recent_activity))
        .route("/api/v1/forecast", post(forecast))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn health() -> Json<Value> {
    Json(json!({ "ok": true }))
}

// --- products ---

async fn list_products(State(db): State<Db>) -> Json<Vec<Product>> {
    let store = db.read().await;
    Json(store.products.values().rev().cloned().collect())
}

async fn create_product(
    State(db): State<Db>,
    Json(input): Json<ProductCreate>,
) -> Result<Json<Product>, Rejection> {
    db.write().await.insert_product(input).map(Json)
}

async fn create_products_batch(
    State(db): State<Db>,
    Json(batch): Json<ProductBatch>,
) -> Result<Json<Vec<Product>>, Rejection> {
    let mut store = db.write().await;
    store.check_batch(&batch.items)?;
    let created = batch
        .items
        .into_iter()
        .map(|item| store.insert_product(item))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(created))
}

async fn update_product(
    State(db): State<Db>,
    Path(id): Path<i64>,
    Json(input): Json<ProductUpdate>,
) -> Result<Json<Product>, Rejection> {
    let mut store = db.write().await;
    let product = store
        .products
        .get_mut(&id)
        .ok_or_else(|| reject(StatusCode::NOT_FOUND, "Product not found"))?;
    if let Some(sku) = input.sku {
        product.sku = sku;
    }
    if let Some(name) = input.name {
        product.name = name;
    }
    if let Some(category) = input.category {
        product.category = category;
    }
    if let Some(stock) = input.stock {
        product.stock = stock;
    }
    if let Some(price) = input.price {
        product.price = price;
    }
    if let Some(reorder_point) = input.reorder_point {
        product.reorder_point = reorder_point;
    }
    Ok(Json(product.clone()))
}

async fn delete_product(State(db): State<Db>, Path(id): Path<i64>) -> Result<Json<Value>, Rejection> {
    let mut store = db.write().await;
    store
        .products
        .remove(&id)
        .map(|_| Json(json!({ "ok": true })))
        .ok_or_else(|| reject(StatusCode::NOT_FOUND, "Product not found"))
}

// --- sales ---

async fn list_sales(State(db): State<Db>) -> Json<Vec<Sale>> {
    let store = db.read().await;
    let mut sales = store.sales.clone();
    sales.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
    Json(sales)
}

async fn create_sale(State(db): State<Db>, Json(input): Json<SaleCreate>) -> Result<Json<Sale>, Rejection> {
    if input.qty <= 0 {
        return Err(reject(StatusCode::UNPROCESSABLE_ENTITY, "qty must be greater than 0"));
    }
    if input.unit_price < 0.0 {
        return Err(reject(StatusCode::UNPROCESSABLE_ENTITY, "unit_price must not be negative"));
    }

    let mut store = db.write().await;
    let product = store
        .products
        .get_mut(&input.product_id)
        .ok_or_else(|| reject(StatusCode::NOT_FOUND, "Product not found"))?;
    if product.stock < input.qty {
        return Err(reject(StatusCode::BAD_REQUEST, "Insufficient stock"));
    }
    product.stock -= input.qty;
    let product_name = product.name.clone();

    let customer_name = input.customer_name.filter(|c| !c.trim().is_empty());
    store.next_sale += 1;
    let sale = Sale {
        id: store.next_sale,
        product_id: input.product_id,
        product_name,
        qty: input.qty,
        unit_price: input.unit_price,
        is_credit: input.is_credit,
        customer_name: customer_name.clone(),
        created_at: now(),
    };
    store.sales.push(sale.clone());

    if input.is_credit {
        store.insert_due(
            customer_name.unwrap_or_else(|| "Unknown".to_string()),
            input.qty as f64 * input.unit_price,
            Some(format!("Credit sale for product #{}", input.product_id)),
        );
    }
    Ok(Json(sale))
}

// --- dues ---

async fn list_dues(State(db): State<Db>) -> Json<Vec<Due>> {
    let store = db.read().await;
    let mut dues = store.dues.clone();
    dues.sort_by(|a, b| {
        a.is_settled
            .cmp(&b.is_settled)
            .then(b.created_at.cmp(&a.created_at))
            .then(b.id.cmp(&a.id))
    });
    Json(dues)
}

async fn create_due(State(db): State<Db>, Json(input): Json<DueCreate>) -> Json<Due> {
    Json(db.write().await.insert_due(input.customer_name, input.amount, input.note))
}

async fn settle_due(State(db): State<Db>, Path(id): Path<i64>) -> Result<Json<Due>, Rejection> {
    let mut store = db.write().await;
    let due = store
        .dues
        .iter_mut()
        .find(|d| d.id == id)
        .ok_or_else(|| reject(StatusCode::NOT_FOUND, "Due not found"))?;
    due.is_settled = true;
    Ok(Json(due.clone()))
}

// --- reports ---

fn revenue_since(sales: &[Sale], start: NaiveDate) -> f64 {
    sales
        .iter()
        .filter(|s| s.created_at.date() >= start)
        .map(|s| s.qty as f64 * s.unit_price)
        .sum()
}

async fn summary(State(db): State<Db>) -> Json<Value> {
    let store = db.read().await;
    let today = Local::now().date_naive();
    let week_start = today - Days::new(u64::from(today.weekday().num_days_from_monday()));
    let month_start = today.with_day(1).unwrap_or(today);
    let top_window = today - Days::new(30);

    let mut by_product: BTreeMap<i64, (String, f64)> = BTreeMap::new();
    for sale in store.sales.iter().filter(|s| s.created_at.date() >= top_window) {
        let entry = by_product.entry(sale.product_id).or_insert((sale.product_name.clone(), 0.0));
        entry.1 += sale.qty as f64 * sale.unit_price;
    }
    let top_product = by_product
        .into_values()
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(name, revenue)| json!({ "name": name, "revenue": revenue }));

    Json(json!({
        "today_sales": revenue_since(&store.sales, today),
        "week_sales": revenue_since(&store.sales, week_start),
        "month_sales": revenue_since(&store.sales, month_start),
        "pending_dues": store.dues.iter().filter(|d| !d.is_settled).map(|d| d.amount).sum::<f64>(),
        "low_stock": store.products.values().filter(|p| p.stock <= p.reorder_point).count(),
        "top_product": top_product,
    }))
}

async fn sales_series(State(db): State<Db>, Query(query): Query<SeriesQuery>) -> Result<Json<Value>, Rejection> {
    let days = query.days.unwrap_or(30);
    if !(1..=120).contains(&days) {
        return Err(reject(StatusCode::UNPROCESSABLE_ENTITY, "days must be between 1 and 120"));
    }
    let store = db.read().await;
    let today = Local::now().date_naive();
    let start = today - Days::new(days as u64 - 1);

    let points: Vec<Value> = start
        .iter_days()
        .take(days as usize)
        .map(|day| {
            let total: f64 = store
                .sales
                .iter()
                .filter(|s| s.created_at.date() == day)
                .map(|s| s.qty as f64 * s.unit_price)
                .sum();
            json!({ "date": day.format("%Y-%m-%d").to_string(), "value": total })
        })
        .collect();
    Ok(Json(Value::Array(points)))
}

fn limit_in(query: LimitQuery, default: i64, max: i64) -> Result<usize, Rejection> {
    let limit = query.limit.unwrap_or(default);
    if !(1..=max).contains(&limit) {
        let detail = format!("limit must be between 1 and {max}");
        return Err(reject(StatusCode::UNPROCESSABLE_ENTITY, &detail));
    }
    Ok(limit as usize)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Revenue per key, highest first. Sales of deleted products are skipped.
fn revenue_by<K: Ord>(store: &Store, key: impl Fn(&Product) -> K) -> Vec<(K, f64)> {
    let mut totals: BTreeMap<K, f64> = BTreeMap::new();
    for sale in &store.sales {
        if let Some(product) = store.products.get(&sale.product_id) {
            *totals.entry(key(product)).or_insert(0.0) += sale.qty as f64 * sale.unit_price;
        }
    }
    let mut rows: Vec<(K, f64)> = totals.into_iter().collect();
    rows.sort_by(|a, b| b.1.total_cmp(&a.1));
    rows
}

async fn top_products(State(db): State<Db>, Query(query): Query<LimitQuery>) -> Result<Json<Value>, Rejection> {
    let limit = limit_in(query, 5, 20)?;
    let store = db.read().await;
    let rows: Vec<Value> = revenue_by(&store, |p| (p.id, p.name.clone()))
        .into_iter()
        .take(limit)
        .map(|((_, name), revenue)| json!({ "name": name, "revenue": revenue }))
        .collect();
    Ok(Json(Value::Array(rows)))
}

async fn category_share(State(db): State<Db>) -> Json<Value> {
    let store = db.read().await;
    let rows = revenue_by(&store, |p| p.category.clone());
    let total: f64 = rows.iter().map(|(_, revenue)| revenue).sum();
    let total = if total > 0.0 { total } else { 1.0 };
    let shares: Vec<Value> = rows
        .into_iter()
        .map(|(category, revenue)| {
            json!({ "category": category, "revenue": revenue, "pct": round2(revenue * 100.0 / total) })
        })
        .collect();
    Json(Value::Array(shares))
}

async fn recent_activity(
    State(db): State<Db>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<Vec<ActivityItem>>, Rejection> {
    let limit = limit_in(query, 10, 50)?;
    let store = db.read().await;
    let sales = store.sales.iter().map(|s| ActivityItem {
        kind: "sale".to_string(),
        ts: s.created_at,
        title: format!("Sold {} × {}", s.qty, s.product_name),
        subtitle: if s.is_credit { "Credit" } else { "Cash" }.to_string(),
        amount: s.qty as f64 * s.unit_price,
    });
    let dues = store.dues.iter().map(|d| ActivityItem {
        kind: "due".to_string(),
        ts: d.created_at,
        title: format!("Due: {}", d.customer_name),
        subtitle: if d.is_settled { "Settled" } else { "Pending" }.to_string(),
        amount: d.amount,
    });
    let mut items: Vec<ActivityItem> = sales.chain(dues).collect();
    items.sort_by(|a, b| b.ts.cmp(&a.ts));
    items.truncate(limit);
    Ok(Json(items))
}

/// Holt's linear trend smoothing, projected `horizon` steps ahead.
pub fn holt_additive(series: &[f64], horizon: usize, alpha: f64, beta: f64) -> Vec<f64> {
    let Some(&first) = series.first() else {
        return vec![0.0; horizon];
    };
    let mut level = first;
    let mut trend = series.get(1).map_or(0.0, |second| second - first);
    for &y in series {
        let prev_level = level;
        level = alpha * y + (1.0 - alpha) * (level + trend);
        trend = beta * (level - prev_level) + (1.0 - beta) * trend;
    }
    (1..=horizon).map(|step| level + step as f64 * trend).collect()
}

/// Demand history for a product with no sales: sixty days around a third of
/// its stock.
fn synthetic_demand(stock: i64) -> Vec<f64> {
    let base = (stock / 3).max(8);
    (0..60).map(|i| (base + 3 * (i % 5) - 2).max(0) as f64).collect()
}

async fn forecast(State(db): State<Db>, Json(input): Json<ForecastIn>) -> Result<Json<Value>, Rejection> {
    if !(1..=60).contains(&input.horizon_days) {
        return Err(reject(StatusCode::UNPROCESSABLE_ENTITY, "horizon_days must be between 1 and 60"));
    }
    let store = db.read().await;
    let product = store
        .products
        .get(&input.product_id)
        .ok_or_else(|| reject(StatusCode::NOT_FOUND, "Product not found"))?;

    let mut history: Vec<&Sale> = store.sales.iter().filter(|s| s.product_id == product.id).collect();
    history.sort_by_key(|s| (s.created_at, s.id));
    let mut series: Vec<f64> = history.iter().map(|s| s.qty as f64).collect();
    if series.is_empty() {
        series = synthetic_demand(product.stock);
    }

    let horizon = input.horizon_days as usize;
    let today = Local::now().date_naive();
    let points: Vec<Value> = today
        .iter_days()
        .skip(1)
        .zip(holt_additive(&series, horizon, 0.6, 0.3))
        .map(|(day, qty)| json!({ "date": day.format("%Y-%m-%d").to_string(), "forecast_qty": round2(qty) }))
        .collect();
    Ok(Json(json!({ "points": points })))
}
