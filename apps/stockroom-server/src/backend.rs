use std::sync::Arc;

use stockroom_storage::*;
use stockroom_store_memory::MemoryStore;
use stockroom_store_sqlite::SqliteStore;

/// StoreBackend abstracts over the SQLite and in-memory implementations
#[derive(Clone)]
pub enum StoreBackend {
    Sqlite(Arc<SqliteStore>),
    Memory(Arc<MemoryStore>),
}

#[async_trait::async_trait]
impl Store for StoreBackend {
    async fn create_principal(
        &self,
        params: &CreatePrincipalParams,
    ) -> Result<Principal, StoreError> {
        match self {
            StoreBackend::Sqlite(s) => s.create_principal(params).await,
            StoreBackend::Memory(s) => s.create_principal(params).await,
        }
    }

    async fn get_principal(&self, id: &PrincipalId) -> Result<Principal, StoreError> {
        match self {
            StoreBackend::Sqlite(s) => s.get_principal(id).await,
            StoreBackend::Memory(s) => s.get_principal(id).await,
        }
    }

    async fn get_principal_by_username(
        &self,
        role: Role,
        username: &str,
    ) -> Result<Principal, StoreError> {
        match self {
            StoreBackend::Sqlite(s) => s.get_principal_by_username(role, username).await,
            StoreBackend::Memory(s) => s.get_principal_by_username(role, username).await,
        }
    }

    async fn update_principal_secret(
        &self,
        id: &PrincipalId,
        secret_hash: &str,
    ) -> Result<(), StoreError> {
        match self {
            StoreBackend::Sqlite(s) => s.update_principal_secret(id, secret_hash).await,
            StoreBackend::Memory(s) => s.update_principal_secret(id, secret_hash).await,
        }
    }

    async fn create_product(&self, params: &CreateProductParams) -> Result<Product, StoreError> {
        match self {
            StoreBackend::Sqlite(s) => s.create_product(params).await,
            StoreBackend::Memory(s) => s.create_product(params).await,
        }
    }

    async fn get_product(&self, id: &ProductId) -> Result<Product, StoreError> {
        match self {
            StoreBackend::Sqlite(s) => s.get_product(id).await,
            StoreBackend::Memory(s) => s.get_product(id).await,
        }
    }

    async fn delete_product(&self, id: &ProductId) -> Result<(), StoreError> {
        match self {
            StoreBackend::Sqlite(s) => s.delete_product(id).await,
            StoreBackend::Memory(s) => s.delete_product(id).await,
        }
    }

    async fn list_products(&self, filter: &ProductFilter) -> Result<Page<Product>, StoreError> {
        match self {
            StoreBackend::Sqlite(s) => s.list_products(filter).await,
            StoreBackend::Memory(s) => s.list_products(filter).await,
        }
    }

    async fn place_order(&self, params: &PlaceOrderParams) -> Result<Order, StoreError> {
        match self {
            StoreBackend::Sqlite(s) => s.place_order(params).await,
            StoreBackend::Memory(s) => s.place_order(params).await,
        }
    }

    async fn get_order(&self, id: &OrderId) -> Result<Order, StoreError> {
        match self {
            StoreBackend::Sqlite(s) => s.get_order(id).await,
            StoreBackend::Memory(s) => s.get_order(id).await,
        }
    }

    async fn set_order_delivered(
        &self,
        id: &OrderId,
        delivered: bool,
    ) -> Result<Order, StoreError> {
        match self {
            StoreBackend::Sqlite(s) => s.set_order_delivered(id, delivered).await,
            StoreBackend::Memory(s) => s.set_order_delivered(id, delivered).await,
        }
    }

    async fn delete_order(&self, id: &OrderId) -> Result<(), StoreError> {
        match self {
            StoreBackend::Sqlite(s) => s.delete_order(id).await,
            StoreBackend::Memory(s) => s.delete_order(id).await,
        }
    }

    async fn list_orders(&self, filter: &OrderFilter) -> Result<Page<OrderRecord>, StoreError> {
        match self {
            StoreBackend::Sqlite(s) => s.list_orders(filter).await,
            StoreBackend::Memory(s) => s.list_orders(filter).await,
        }
    }
}
