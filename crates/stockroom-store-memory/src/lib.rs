//! In-memory store implementation.
//!
//! This implementation is suitable for:
//! - Development and testing
//! - Single-process deployments that don't need durability
//!
//! Records live in plain maps behind one RwLock; the order-placement
//! check-and-decrement runs under the write lock, so concurrent placements
//! cannot oversell.

use std::collections::HashMap;

use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use stockroom_storage::{
    CreatePrincipalParams, CreateProductParams, Order, OrderFilter, OrderId, OrderRecord, Page,
    PlaceOrderParams, Principal, PrincipalId, Product, ProductDisplay, ProductFilter, ProductId,
    Role, Store, StoreError,
};

#[derive(Default)]
struct Inner {
    principals: HashMap<PrincipalId, Principal>,
    products: HashMap<ProductId, Product>,
    orders: HashMap<OrderId, Order>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn matches_insensitive(haystack: &str, needle: &Option<String>) -> bool {
    match needle {
        None => true,
        Some(n) => haystack.to_lowercase().contains(&n.to_lowercase()),
    }
}

fn page_of<T: Clone>(mut sorted: Vec<T>, skip: i64, take: i64) -> Page<T> {
    let total_count = sorted.len() as i64;
    let skip = skip.max(0) as usize;
    let take = take.max(0) as usize;
    let items: Vec<T> = sorted.drain(..).skip(skip).take(take).collect();
    Page { items, total_count }
}

#[async_trait::async_trait]
impl Store for MemoryStore {
    // ───────────────────────────── Principals ─────────────────────────────

    async fn create_principal(
        &self,
        params: &CreatePrincipalParams,
    ) -> Result<Principal, StoreError> {
        let mut inner = self.inner.write().await;
        if inner
            .principals
            .values()
            .any(|p| p.role == params.role && p.username == params.username)
        {
            return Err(StoreError::AlreadyExists);
        }
        let now = Utc::now();
        let principal = Principal {
            id: PrincipalId(Uuid::now_v7()),
            username: params.username.clone(),
            secret_hash: params.secret_hash.clone(),
            role: params.role,
            created_at: now,
            updated_at: now,
        };
        inner.principals.insert(principal.id, principal.clone());
        Ok(principal)
    }

    async fn get_principal(&self, id: &PrincipalId) -> Result<Principal, StoreError> {
        self.inner
            .read()
            .await
            .principals
            .get(id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn get_principal_by_username(
        &self,
        role: Role,
        username: &str,
    ) -> Result<Principal, StoreError> {
        self.inner
            .read()
            .await
            .principals
            .values()
            .find(|p| p.role == role && p.username == username)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn update_principal_secret(
        &self,
        id: &PrincipalId,
        secret_hash: &str,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let principal = inner.principals.get_mut(id).ok_or(StoreError::NotFound)?;
        principal.secret_hash = secret_hash.to_string();
        principal.updated_at = Utc::now();
        Ok(())
    }

    // ───────────────────────────── Products ───────────────────────────────

    async fn create_product(&self, params: &CreateProductParams) -> Result<Product, StoreError> {
        let now = Utc::now();
        let product = Product {
            id: ProductId(Uuid::now_v7()),
            name: params.name.clone(),
            price: params.price,
            stock: params.stock,
            description: params.description.clone(),
            size: params.size.clone(),
            color: params.color.clone(),
            image_url: params.image_url.clone(),
            created_at: now,
            updated_at: now,
        };
        self.inner
            .write()
            .await
            .products
            .insert(product.id, product.clone());
        Ok(product)
    }

    async fn get_product(&self, id: &ProductId) -> Result<Product, StoreError> {
        self.inner
            .read()
            .await
            .products
            .get(id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn delete_product(&self, id: &ProductId) -> Result<(), StoreError> {
        self.inner
            .write()
            .await
            .products
            .remove(id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }

    async fn list_products(&self, filter: &ProductFilter) -> Result<Page<Product>, StoreError> {
        let inner = self.inner.read().await;
        let mut products: Vec<Product> = inner
            .products
            .values()
            .filter(|p| matches_insensitive(&p.name, &filter.name_contains))
            .cloned()
            .collect();
        // Newest first; id breaks exact-timestamp ties.
        products.sort_by(|a, b| (b.created_at, b.id.0).cmp(&(a.created_at, a.id.0)));
        Ok(page_of(products, filter.skip, filter.take))
    }

    // ───────────────────────────── Orders ─────────────────────────────────

    async fn place_order(&self, params: &PlaceOrderParams) -> Result<Order, StoreError> {
        // Write lock held across check, decrement and insert: the whole
        // placement is one critical section.
        let mut inner = self.inner.write().await;
        let product = inner
            .products
            .get_mut(&params.product_id)
            .ok_or(StoreError::NotFound)?;
        if product.stock < params.quantity {
            return Err(StoreError::InsufficientStock);
        }
        product.stock -= params.quantity;
        product.updated_at = Utc::now();

        let order = Order {
            id: OrderId(Uuid::now_v7()),
            worker_id: params.worker_id,
            product_id: params.product_id,
            customer_name: params.customer_name.clone(),
            quantity: params.quantity,
            address: params.address.clone(),
            contact: params.contact.clone(),
            cod: params.cod,
            description: params.description.clone(),
            delivered: false,
            created_at: Utc::now(),
        };
        inner.orders.insert(order.id, order.clone());
        Ok(order)
    }

    async fn get_order(&self, id: &OrderId) -> Result<Order, StoreError> {
        self.inner
            .read()
            .await
            .orders
            .get(id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn set_order_delivered(
        &self,
        id: &OrderId,
        delivered: bool,
    ) -> Result<Order, StoreError> {
        let mut inner = self.inner.write().await;
        let order = inner.orders.get_mut(id).ok_or(StoreError::NotFound)?;
        order.delivered = delivered;
        Ok(order.clone())
    }

    async fn delete_order(&self, id: &OrderId) -> Result<(), StoreError> {
        self.inner
            .write()
            .await
            .orders
            .remove(id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }

    async fn list_orders(&self, filter: &OrderFilter) -> Result<Page<OrderRecord>, StoreError> {
        let inner = self.inner.read().await;
        let mut orders: Vec<Order> = inner
            .orders
            .values()
            .filter(|o| filter.worker_id.map_or(true, |w| o.worker_id == w))
            .filter(|o| matches_insensitive(&o.customer_name, &filter.customer_contains))
            .cloned()
            .collect();
        orders.sort_by(|a, b| (b.created_at, b.id.0).cmp(&(a.created_at, a.id.0)));

        let page = page_of(orders, filter.skip, filter.take);
        let items = page
            .items
            .into_iter()
            .map(|order| {
                let product = inner.products.get(&order.product_id).map(|p| ProductDisplay {
                    name: p.name.clone(),
                    size: p.size.clone(),
                    color: p.color.clone(),
                    image_url: p.image_url.clone(),
                });
                let worker_name = inner
                    .principals
                    .get(&order.worker_id)
                    .map(|w| w.username.clone());
                OrderRecord {
                    order,
                    product,
                    worker_name,
                }
            })
            .collect();
        Ok(Page {
            items,
            total_count: page.total_count,
        })
    }
}
