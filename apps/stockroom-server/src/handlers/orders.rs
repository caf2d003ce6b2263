//! Order workflow handlers: placement, listings, delivery status, deletion.

use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::server::AppServer;
use crate::session::Session;
use stockroom_storage::{
    Order, OrderFilter, OrderId, OrderRecord, PlaceOrderParams, ProductId, Role, Store,
    StoreError,
};

use super::{page_window, total_pages};

#[derive(Debug, Deserialize)]
pub struct PlaceOrderRequest {
    pub product_id: Option<ProductId>,
    pub customer_name: Option<String>,
    pub quantity: Option<i64>,
    pub address: Option<String>,
    pub contact: Option<String>,
    pub cod: Option<f64>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct ListOrdersParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct MyOrdersResponse {
    pub orders: Vec<OrderRecord>,
    pub worker_name: String,
    pub total_count: i64,
    pub total_pages: i64,
}

#[derive(Debug, Serialize)]
pub struct AllOrdersResponse {
    pub orders: Vec<OrderRecord>,
    pub total_count: i64,
    pub total_pages: i64,
}

#[derive(Debug, Deserialize)]
pub struct UpdateDeliveryRequest {
    pub delivered: bool,
}

fn required_text(value: &Option<String>, what: &str) -> Result<String, ApiError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ApiError::Validation(format!("{} is required", what)))
}

/// Worker (or admin): place an order. All validation happens before the
/// store call; the stock check-and-decrement plus the order insert are one
/// atomic store operation, so a failure leaves nothing behind.
pub async fn place_order(
    server: &AppServer,
    session: Option<&Session>,
    req: PlaceOrderRequest,
) -> Result<Order, ApiError> {
    let session = server.require_authenticated(session)?;
    server.require_role(session, Role::Worker)?;

    let product_id = req
        .product_id
        .ok_or_else(|| ApiError::Validation("Product id is required".to_string()))?;
    let customer_name = required_text(&req.customer_name, "Customer name")?;
    let address = required_text(&req.address, "Address")?;
    let contact = required_text(&req.contact, "Contact")?;
    let description = required_text(&req.description, "Description")?;
    let cod = req
        .cod
        .ok_or_else(|| ApiError::Validation("COD amount is required".to_string()))?;
    let quantity = match req.quantity {
        Some(q) if q > 0 => q,
        _ => {
            return Err(ApiError::Validation(
                "Quantity must be a positive integer".to_string(),
            ))
        }
    };

    let order = server
        .store
        .place_order(&PlaceOrderParams {
            worker_id: session.id,
            product_id,
            customer_name,
            quantity,
            address,
            contact,
            cod,
            description,
        })
        .await
        .map_err(|e| match e {
            StoreError::NotFound => ApiError::NotFound("Product"),
            other => other.into(),
        })?;

    tracing::info!(
        order = %order.id.0,
        worker = %session.username,
        quantity = order.quantity,
        "order placed"
    );
    Ok(order)
}

/// Worker (or admin): list own orders, paginated, optionally filtered by
/// customer-name substring.
pub async fn list_my_orders(
    server: &AppServer,
    session: Option<&Session>,
    params: ListOrdersParams,
) -> Result<MyOrdersResponse, ApiError> {
    let session = server.require_authenticated(session)?;
    server.require_role(session, Role::Worker)?;

    let (page, limit) = page_window(params.page, params.limit);
    let result = server
        .store
        .list_orders(&OrderFilter {
            worker_id: Some(session.id),
            customer_contains: params.search.filter(|s| !s.trim().is_empty()),
            skip: (page - 1) * limit,
            take: limit,
        })
        .await?;

    // Fresh lookup so a renamed account shows its current name.
    let worker_name = match server.store.get_principal(&session.id).await {
        Ok(principal) => principal.username,
        Err(StoreError::NotFound) => "Unknown Worker".to_string(),
        Err(other) => return Err(other.into()),
    };

    Ok(MyOrdersResponse {
        total_pages: total_pages(result.total_count, limit),
        orders: result.items,
        worker_name,
        total_count: result.total_count,
    })
}

/// Admin: list every worker's orders with product and worker display fields.
pub async fn list_all_orders(
    server: &AppServer,
    session: Option<&Session>,
    params: ListOrdersParams,
) -> Result<AllOrdersResponse, ApiError> {
    let session = server.require_authenticated(session)?;
    server.require_role(session, Role::Admin)?;

    let (page, limit) = page_window(params.page, params.limit);
    let result = server
        .store
        .list_orders(&OrderFilter {
            worker_id: None,
            customer_contains: params.search.filter(|s| !s.trim().is_empty()),
            skip: (page - 1) * limit,
            take: limit,
        })
        .await?;

    Ok(AllOrdersResponse {
        total_pages: total_pages(result.total_count, limit),
        orders: result.items,
        total_count: result.total_count,
    })
}

/// Admin: set the delivered flag. Idempotent.
pub async fn update_delivery(
    server: &AppServer,
    session: Option<&Session>,
    id: OrderId,
    req: UpdateDeliveryRequest,
) -> Result<Order, ApiError> {
    let session = server.require_authenticated(session)?;
    server.require_role(session, Role::Admin)?;

    server
        .store
        .set_order_delivered(&id, req.delivered)
        .await
        .map_err(|e| match e {
            StoreError::NotFound => ApiError::NotFound("Order"),
            other => other.into(),
        })
}

/// Admin: delete an order. Stock is not restored.
pub async fn delete_order(
    server: &AppServer,
    session: Option<&Session>,
    id: OrderId,
) -> Result<(), ApiError> {
    let session = server.require_authenticated(session)?;
    server.require_role(session, Role::Admin)?;

    server.store.delete_order(&id).await.map_err(|e| match e {
        StoreError::NotFound => ApiError::NotFound("Order"),
        other => other.into(),
    })
}
