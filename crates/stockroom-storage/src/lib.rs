//! Storage abstraction for stockroom.
//!
//! Backend crates (e.g., stockroom-store-sqlite, stockroom-store-memory)
//! implement the [`Store`] trait so the server doesn't depend on any specific
//! database engine or schema details.

use thiserror::Error;

pub mod store;
pub mod types;

pub use store::Store;
pub use types::*;

/// Uniform error type for all storage backends.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found")]
    NotFound,
    #[error("already exists")]
    AlreadyExists,
    /// An order placement asked for more units than the product has left.
    /// Raised inside the placement transaction; nothing is persisted.
    #[error("insufficient stock")]
    InsufficientStock,
    #[error("backend error: {0}")]
    Backend(String),
}

/// Parameters for creating a principal. The secret arrives already hashed;
/// backends never see a plaintext secret.
#[derive(Clone, Debug)]
pub struct CreatePrincipalParams {
    pub username: String,
    pub secret_hash: String,
    pub role: Role,
}

/// Parameters for creating a product.
#[derive(Clone, Debug)]
pub struct CreateProductParams {
    pub name: String,
    pub price: f64,
    pub stock: i64,
    pub description: Option<String>,
    pub size: Option<String>,
    pub color: Option<String>,
    pub image_url: Option<String>,
}

/// Parameters for the atomic order placement (stock decrement + insert).
#[derive(Clone, Debug)]
pub struct PlaceOrderParams {
    pub worker_id: PrincipalId,
    pub product_id: ProductId,
    pub customer_name: String,
    pub quantity: i64,
    pub address: String,
    pub contact: String,
    pub cod: f64,
    pub description: String,
}

/// Filter for product listings.
#[derive(Clone, Debug, Default)]
pub struct ProductFilter {
    /// Case-insensitive name substring.
    pub name_contains: Option<String>,
    pub skip: i64,
    pub take: i64,
}

/// Filter for order listings.
#[derive(Clone, Debug, Default)]
pub struct OrderFilter {
    /// Restrict to one worker's orders (None = all workers).
    pub worker_id: Option<PrincipalId>,
    /// Case-insensitive customer-name substring.
    pub customer_contains: Option<String>,
    pub skip: i64,
    pub take: i64,
}

/// One page of a listing plus the unpaginated total.
#[derive(Clone, Debug)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_count: i64,
}
