//! Client-side derived state over fetched collections.

use crate::types::{Due, Product};

/// Products at or below their reorder point, most urgent first.
///
/// Urgency is `stock - reorder_point`; ties keep their fetched order.
pub fn low_stock(products: &[Product]) -> Vec<Product> {
    let mut low: Vec<Product> = products
        .iter()
        .filter(|p| p.stock <= p.reorder_point)
        .cloned()
        .collect();
    low.sort_by_key(Product::headroom);
    low
}

pub fn outstanding_dues(dues: &[Due]) -> Vec<&Due> {
    dues.iter().filter(|d| !d.is_settled).collect()
}

pub fn outstanding_total(dues: &[Due]) -> f64 {
    dues.iter().filter(|d| !d.is_settled).map(|d| d.amount).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: i64, stock: i64, reorder_point: i64) -> Product {
        Product {
            id,
            sku: format!("SKU-{id}"),
            name: format!("Item {id}"),
            category: "General".to_string(),
            stock,
            price: 10.0,
            reorder_point,
        }
    }

    fn due(id: i64, amount: f64, is_settled: bool) -> Due {
        Due {
            id,
            customer_name: "Asha".to_string(),
            amount,
            note: None,
            is_settled,
            created_at: None,
        }
    }

    #[test]
    fn low_stock_filters_and_orders_by_urgency() {
        let products = vec![product(1, 3, 5), product(2, 50, 5), product(3, 0, 10), product(4, 5, 5)];
        let ids: Vec<i64> = low_stock(&products).iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![3, 1, 4]);
    }

    #[test]
    fn low_stock_is_stable_for_ties() {
        let products = vec![product(7, 1, 2), product(8, 4, 5)];
        let ids: Vec<i64> = low_stock(&products).iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![7, 8]);
    }

    #[test]
    fn outstanding_ignores_settled() {
        let dues = vec![due(1, 100.0, false), due(2, 40.0, true), due(3, 25.5, false)];
        assert_eq!(outstanding_dues(&dues).len(), 2);
        assert_eq!(outstanding_total(&dues), 125.5);
    }
}
