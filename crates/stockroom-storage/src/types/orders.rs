//! Order records.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::ids::{OrderId, PrincipalId, ProductId};

/// A placed order. Created only by the placement transaction; `delivered` is
/// the single field mutable after creation.
#[derive(Clone, Debug, Serialize)]
pub struct Order {
    pub id: OrderId,
    pub worker_id: PrincipalId,
    pub product_id: ProductId,
    pub customer_name: String,
    pub quantity: i64,
    pub address: String,
    pub contact: String,
    pub cod: f64,
    pub description: String,
    pub delivered: bool,
    pub created_at: DateTime<Utc>,
}

/// Product display fields attached to a listed order.
#[derive(Clone, Debug, Serialize)]
pub struct ProductDisplay {
    pub name: String,
    pub size: Option<String>,
    pub color: Option<String>,
    pub image_url: Option<String>,
}

/// An order enriched for listings. `product` and `worker_name` degrade to
/// `None` when the referenced record was deleted (references dangle; there is
/// no cascading delete).
#[derive(Clone, Debug, Serialize)]
pub struct OrderRecord {
    #[serde(flatten)]
    pub order: Order,
    pub product: Option<ProductDisplay>,
    pub worker_name: Option<String>,
}
