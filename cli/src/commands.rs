//! Subcommand implementations. Reads degrade to empty data through
//! `safe_else`; mutations propagate their `ApiError`.

use anyhow::{Context, Result};
use shopdesk_core::{
    inventory, safe_else, ActivityItem, ApiClient, CategoryShare, Due, Forecast, Product, ReportSummary, Sale,
    TopProduct, Transport,
};
use tracing::warn;

pub async fn products<T: Transport>(client: &ApiClient<T>, low_only: bool) -> String {
    let products = safe_else(client.list_products(), |e| {
        warn!(error = %e, "products unavailable, showing none");
        Vec::new()
    })
    .await;
    let shown = if low_only { inventory::low_stock(&products) } else { products };
    render_products(&shown)
}

pub async fn sales<T: Transport>(client: &ApiClient<T>) -> String {
    let sales = safe_else(client.list_sales(), |e| {
        warn!(error = %e, "sales unavailable, showing none");
        Vec::new()
    })
    .await;
    render_sales(&sales)
}

pub async fn dues<T: Transport>(client: &ApiClient<T>, pending_only: bool) -> String {
    let dues = safe_else(client.list_dues(), |e| {
        warn!(error = %e, "dues unavailable, showing none");
        Vec::new()
    })
    .await;
    let shown: Vec<Due> = if pending_only {
        inventory::outstanding_dues(&dues).into_iter().cloned().collect()
    } else {
        dues.clone()
    };
    let mut out = render_dues(&shown);
    out.push_str(&format!("outstanding: {:.2}\n", inventory::outstanding_total(&dues)));
    out
}

pub async fn summary<T: Transport>(client: &ApiClient<T>) -> String {
    let summary = safe_else(client.report_summary(), |e| {
        warn!(error = %e, "summary unavailable, showing zeros");
        ReportSummary::default()
    })
    .await;
    render_summary(&summary)
}

pub async fn top<T: Transport>(client: &ApiClient<T>, limit: u32) -> String {
    let top = safe_else(client.top_products(limit), |e| {
        warn!(error = %e, "top products unavailable, showing none");
        Vec::new()
    })
    .await;
    let shares = safe_else(client.category_share(), |e| {
        warn!(error = %e, "category share unavailable, showing none");
        Vec::new()
    })
    .await;
    render_top(&top, &shares)
}

pub async fn activity<T: Transport>(client: &ApiClient<T>, limit: u32) -> String {
    let feed = safe_else(client.recent_activity(limit), |e| {
        warn!(error = %e, "activity unavailable, showing none");
        Vec::new()
    })
    .await;
    render_activity(&feed)
}

pub async fn forecast<T: Transport>(client: &ApiClient<T>, id: i64, days: u32) -> Result<String> {
    let forecast = client
        .forecast(id, days)
        .await
        .with_context(|| format!("failed to forecast product #{id}"))?;
    Ok(render_forecast(&forecast))
}

pub async fn settle<T: Transport>(client: &ApiClient<T>, id: i64) -> Result<String> {
    let due = client
        .settle_due(id)
        .await
        .with_context(|| format!("failed to settle due #{id}"))?;
    Ok(format!("settled due #{} for {} ({:.2})", due.id, due.customer_name, due.amount))
}

pub async fn adjust<T: Transport>(client: &ApiClient<T>, id: i64, delta: i64) -> Result<String> {
    let products = client.list_products().await.context("failed to load products")?;
    let product = products
        .iter()
        .find(|p| p.id == id)
        .with_context(|| format!("product #{id} not found"))?;
    let updated = client
        .adjust_stock(product, delta)
        .await
        .with_context(|| format!("failed to adjust stock of product #{id}"))?;
    Ok(format!("{} stock: {} -> {}", updated.sku, product.stock, updated.stock))
}

fn render_products(products: &[Product]) -> String {
    if products.is_empty() {
        return "no products\n".to_string();
    }
    products
        .iter()
        .map(|p| {
            let flag = if p.stock <= p.reorder_point { " LOW" } else { "" };
            format!(
                "#{:<4} {:<12} {:<24} {:<10} stock {:>5} (reorder at {}) {:>9.2}{flag}\n",
                p.id, p.sku, p.name, p.category, p.stock, p.reorder_point, p.price
            )
        })
        .collect()
}

fn render_sales(sales: &[Sale]) -> String {
    if sales.is_empty() {
        return "no sales\n".to_string();
    }
    sales
        .iter()
        .map(|s| {
            let credit = match (&s.customer_name, s.is_credit) {
                (Some(name), true) => format!(" on credit to {name}"),
                (None, true) => " on credit".to_string(),
                _ => String::new(),
            };
            format!(
                "{} #{:<4} {} x{} @ {:.2} = {:.2}{credit}\n",
                s.created_at.format("%Y-%m-%d %H:%M"),
                s.id,
                s.product_name,
                s.qty,
                s.unit_price,
                s.total()
            )
        })
        .collect()
}

fn render_dues(dues: &[Due]) -> String {
    if dues.is_empty() {
        return "no dues\n".to_string();
    }
    dues.iter()
        .map(|d| {
            let state = if d.is_settled { "settled" } else { "pending" };
            let note = d.note.as_deref().map(|n| format!("  {n}")).unwrap_or_default();
            format!("#{:<4} {:<20} {:>9.2} {state}{note}\n", d.id, d.customer_name, d.amount)
        })
        .collect()
}

fn render_summary(s: &ReportSummary) -> String {
    let mut out = format!(
        "today:        {:.2}\nthis week:    {:.2}\nthis month:   {:.2}\npending dues: {:.2}\nlow stock:    {}\n",
        s.today_sales, s.week_sales, s.month_sales, s.pending_dues, s.low_stock
    );
    if let Some(top) = &s.top_product {
        out.push_str(&format!("top product:  {} ({:.2})\n", top.name, top.revenue));
    }
    out
}

fn render_top(top: &[TopProduct], shares: &[CategoryShare]) -> String {
    if top.is_empty() && shares.is_empty() {
        return "no sales\n".to_string();
    }
    let products = top
        .iter()
        .enumerate()
        .map(|(rank, t)| format!("{:>2}. {:<24} {:>10.2}\n", rank + 1, t.name, t.revenue));
    let categories = shares
        .iter()
        .map(|c| format!("    {:<24} {:>10.2} {:>6.2}%\n", c.category, c.revenue, c.pct));
    products.chain(categories).collect()
}

fn render_activity(feed: &[ActivityItem]) -> String {
    if feed.is_empty() {
        return "no activity\n".to_string();
    }
    feed.iter()
        .map(|item| {
            format!(
                "{} {:<4} {:<32} {:<8} {:>9.2}\n",
                item.ts.format("%Y-%m-%d %H:%M"),
                item.kind,
                item.title,
                item.subtitle,
                item.amount
            )
        })
        .collect()
}

fn render_forecast(forecast: &Forecast) -> String {
    forecast
        .points
        .iter()
        .map(|p| format!("{}  {:>8.2}\n", p.date, p.forecast_qty))
        .collect()
}
