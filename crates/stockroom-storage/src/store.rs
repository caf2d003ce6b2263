//! The Store trait that backends implement.

use crate::types::*;
use crate::{
    CreatePrincipalParams, CreateProductParams, OrderFilter, Page, PlaceOrderParams,
    ProductFilter, StoreError,
};

/// The storage trait the server depends on.
///
/// Listing methods take pre-computed skip/take offsets; the caller owns
/// page/limit coercion.
#[async_trait::async_trait]
pub trait Store: Send + Sync {
    // ───────────────────────────────────── Principals ─────────────────────────────────────

    /// Create a new principal (admin or worker). Duplicate username within a
    /// role maps to `AlreadyExists`.
    async fn create_principal(
        &self,
        params: &CreatePrincipalParams,
    ) -> Result<Principal, StoreError>;

    /// Get principal by ID.
    async fn get_principal(&self, id: &PrincipalId) -> Result<Principal, StoreError>;

    /// Get principal by username within one role's namespace.
    async fn get_principal_by_username(
        &self,
        role: Role,
        username: &str,
    ) -> Result<Principal, StoreError>;

    /// Replace a principal's secret digest. The digest is recomputed by the
    /// caller whenever the raw secret changes and is otherwise left untouched.
    async fn update_principal_secret(
        &self,
        id: &PrincipalId,
        secret_hash: &str,
    ) -> Result<(), StoreError>;

    // ───────────────────────────────────── Products ───────────────────────────────────────

    /// Create a product (returns the stored record).
    async fn create_product(&self, params: &CreateProductParams) -> Result<Product, StoreError>;

    /// Get product by ID.
    async fn get_product(&self, id: &ProductId) -> Result<Product, StoreError>;

    /// Delete a product. Orders referencing it keep their dangling reference.
    async fn delete_product(&self, id: &ProductId) -> Result<(), StoreError>;

    /// List products, newest first, with optional name filter.
    async fn list_products(&self, filter: &ProductFilter) -> Result<Page<Product>, StoreError>;

    // ───────────────────────────────────── Orders ─────────────────────────────────────────

    /// Atomically decrement the product's stock by `quantity` and insert the
    /// order. Fails with `NotFound` when the product is absent and
    /// `InsufficientStock` when fewer than `quantity` units remain; in both
    /// cases no mutation is visible.
    async fn place_order(&self, params: &PlaceOrderParams) -> Result<Order, StoreError>;

    /// Get order by ID.
    async fn get_order(&self, id: &OrderId) -> Result<Order, StoreError>;

    /// Set the delivered flag. Idempotent; returns the updated order.
    async fn set_order_delivered(
        &self,
        id: &OrderId,
        delivered: bool,
    ) -> Result<Order, StoreError>;

    /// Delete an order. Stock is not restored.
    async fn delete_order(&self, id: &OrderId) -> Result<(), StoreError>;

    /// List orders, newest first, enriched with product and worker display
    /// fields (None when the referenced record was deleted).
    async fn list_orders(&self, filter: &OrderFilter) -> Result<Page<OrderRecord>, StoreError>;
}
