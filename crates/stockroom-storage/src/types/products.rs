//! Product records.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::ids::ProductId;

/// Catalog product. `stock` never goes below zero; the only writers are the
/// order-placement transaction (decrement) and direct admin edits.
#[derive(Clone, Debug, Serialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: f64,
    pub stock: i64,
    pub description: Option<String>,
    pub size: Option<String>,
    pub color: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
