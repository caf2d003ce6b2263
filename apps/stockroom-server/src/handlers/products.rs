//! Catalog handlers: add, delete, public listing.

use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::server::AppServer;
use crate::session::Session;
use stockroom_storage::{
    CreateProductParams, Product, ProductFilter, ProductId, Role, Store, StoreError,
};

use super::{page_window, total_pages};

#[derive(Debug, Deserialize)]
pub struct AddProductRequest {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub stock: Option<i64>,
    pub description: Option<String>,
    pub size: Option<String>,
    pub color: Option<String>,
    pub image: Option<ImagePayload>,
}

/// Base64-encoded image attached to a new product.
#[derive(Debug, Deserialize)]
pub struct ImagePayload {
    pub file_name: String,
    pub data: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct ListProductsParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProductListResponse {
    pub products: Vec<Product>,
    pub total_count: i64,
    pub current_page: i64,
    pub total_pages: i64,
}

/// Admin: add a product. Validation runs before any mutation; when an image
/// is attached it is stored first and the product is only persisted once the
/// upload produced a URL.
pub async fn add_product(
    server: &AppServer,
    session: Option<&Session>,
    req: AddProductRequest,
) -> Result<Product, ApiError> {
    let session = server.require_authenticated(session)?;
    server.require_role(session, Role::Admin)?;

    let name = req
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ApiError::Validation("Product name is required".to_string()))?;
    let price = req
        .price
        .ok_or_else(|| ApiError::Validation("Product price is required".to_string()))?;
    if price < 0.0 {
        return Err(ApiError::Validation("Product price cannot be negative".to_string()));
    }
    let stock = req
        .stock
        .ok_or_else(|| ApiError::Validation("Product stock is required".to_string()))?;
    if stock < 0 {
        return Err(ApiError::Validation("Product stock cannot be negative".to_string()));
    }

    let image_url = match &req.image {
        None => None,
        Some(image) => {
            let bytes = base64::engine::general_purpose::STANDARD
                .decode(image.data.as_bytes())
                .map_err(|_| {
                    ApiError::Validation("Image data is not valid base64".to_string())
                })?;
            let url = server
                .objects
                .put(&image.file_name, &bytes)
                .await
                .map_err(|e| ApiError::Internal(format!("Image upload failed: {}", e)))?;
            Some(url)
        }
    };

    let product = server
        .store
        .create_product(&CreateProductParams {
            name: name.to_string(),
            price,
            stock,
            description: req.description.clone(),
            size: req.size.clone(),
            color: req.color.clone(),
            image_url,
        })
        .await?;

    tracing::info!(product = %product.name, stock = product.stock, "product added");
    Ok(product)
}

/// Admin: delete a product. Orders referencing it keep a dangling reference.
pub async fn delete_product(
    server: &AppServer,
    session: Option<&Session>,
    id: ProductId,
) -> Result<(), ApiError> {
    let session = server.require_authenticated(session)?;
    server.require_role(session, Role::Admin)?;

    server.store.delete_product(&id).await.map_err(|e| match e {
        StoreError::NotFound => ApiError::NotFound("Product"),
        other => other.into(),
    })
}

/// Public listing: paginated, newest first, optional case-insensitive name
/// filter. No gate on purpose.
pub async fn list_products(
    server: &AppServer,
    params: ListProductsParams,
) -> Result<ProductListResponse, ApiError> {
    let (page, limit) = page_window(params.page, params.limit);
    let search = params.search.filter(|s| !s.trim().is_empty());

    let result = server
        .store
        .list_products(&ProductFilter {
            name_contains: search,
            skip: (page - 1) * limit,
            take: limit,
        })
        .await?;

    Ok(ProductListResponse {
        total_pages: total_pages(result.total_count, limit),
        products: result.items,
        total_count: result.total_count,
        current_page: page,
    })
}
