//! Catalog handler tests.

use base64::Engine;

use super::super::common::*;
use crate::error::ApiError;
use crate::handlers::products::{self, ImagePayload, ListProductsParams};
use stockroom_storage::{ProductId, Store};
use uuid::Uuid;

#[tokio::test]
async fn add_product_requires_authentication() {
    let server = create_test_server().await;
    let err = products::add_product(&server, None, product_request("Widget", 10))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized));
}

#[tokio::test]
async fn add_product_requires_admin() {
    let server = create_test_server().await;
    let worker = worker_session(&server, "wendy").await;

    let err = products::add_product(&server, Some(&worker), product_request("Widget", 10))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Forbidden(_)));

    // Nothing was persisted behind the failed gate.
    let page = products::list_products(&server, ListProductsParams::default())
        .await
        .unwrap();
    assert_eq!(page.total_count, 0);
}

#[tokio::test]
async fn add_product_validates_required_fields() {
    let server = create_test_server().await;
    let admin = admin_session(&server).await;

    let mut req = product_request(" ", 10);
    let err = products::add_product(&server, Some(&admin), req).await.unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));

    req = product_request("Widget", 10);
    req.price = None;
    let err = products::add_product(&server, Some(&admin), req).await.unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));

    req = product_request("Widget", -1);
    let err = products::add_product(&server, Some(&admin), req).await.unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));
}

#[tokio::test]
async fn add_product_persists_and_is_publicly_listed() {
    let server = create_test_server().await;
    let admin = admin_session(&server).await;

    let product = products::add_product(&server, Some(&admin), product_request("Widget", 10))
        .await
        .unwrap();
    assert_eq!(product.stock, 10);

    // Listing needs no session.
    let page = products::list_products(&server, ListProductsParams::default())
        .await
        .unwrap();
    assert_eq!(page.total_count, 1);
    assert_eq!(page.products[0].name, "Widget");
    assert_eq!(page.current_page, 1);
    assert_eq!(page.total_pages, 1);
}

#[tokio::test]
async fn add_product_with_image_attaches_upload_url() {
    let server = create_test_server().await;
    let admin = admin_session(&server).await;

    let mut req = product_request("Widget", 10);
    req.image = Some(ImagePayload {
        file_name: "widget.png".to_string(),
        data: base64::engine::general_purpose::STANDARD.encode(b"png-bytes"),
    });

    let product = products::add_product(&server, Some(&admin), req).await.unwrap();
    let url = product.image_url.unwrap();
    assert!(url.starts_with("/uploads/"));
    assert!(url.ends_with("widget.png"));
}

#[tokio::test]
async fn bad_image_data_fails_before_any_product_is_created() {
    let server = create_test_server().await;
    let admin = admin_session(&server).await;

    let mut req = product_request("Widget", 10);
    req.image = Some(ImagePayload {
        file_name: "widget.png".to_string(),
        data: "%%% not base64 %%%".to_string(),
    });

    let err = products::add_product(&server, Some(&admin), req).await.unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));

    let page = products::list_products(&server, ListProductsParams::default())
        .await
        .unwrap();
    assert_eq!(page.total_count, 0);
}

#[tokio::test]
async fn listing_paginates_newest_first() {
    let server = create_test_server().await;
    for i in 0..12 {
        create_test_product(&server, &format!("item-{:02}", i), 1).await;
    }

    let page = products::list_products(
        &server,
        ListProductsParams {
            page: Some(2),
            limit: Some(5),
            search: None,
        },
    )
    .await
    .unwrap();

    // Page 2 / limit 5 = items 6..=10 of the newest-first ordering.
    assert_eq!(page.total_count, 12);
    assert_eq!(page.total_pages, 3);
    assert_eq!(page.current_page, 2);
    assert_eq!(page.products.len(), 5);
    assert_eq!(page.products[0].name, "item-06");
    assert_eq!(page.products[4].name, "item-02");
}

#[tokio::test]
async fn listing_coerces_bad_page_params() {
    let server = create_test_server().await;
    create_test_product(&server, "Widget", 1).await;

    let page = products::list_products(
        &server,
        ListProductsParams {
            page: Some(-4),
            limit: Some(0),
            search: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(page.current_page, 1);
    assert_eq!(page.products.len(), 1);
}

#[tokio::test]
async fn listing_filters_by_name_substring() {
    let server = create_test_server().await;
    create_test_product(&server, "Blue Widget", 1).await;
    create_test_product(&server, "Gadget", 1).await;

    let page = products::list_products(
        &server,
        ListProductsParams {
            page: None,
            limit: None,
            search: Some("widget".to_string()),
        },
    )
    .await
    .unwrap();
    assert_eq!(page.total_count, 1);
    assert_eq!(page.products[0].name, "Blue Widget");
}

#[tokio::test]
async fn delete_product_is_admin_gated_and_maps_missing_ids() {
    let server = create_test_server().await;
    let admin = admin_session(&server).await;
    let worker = worker_session(&server, "wendy").await;
    let product = create_test_product(&server, "Widget", 1).await;

    let err = products::delete_product(&server, Some(&worker), product.id)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Forbidden(_)));

    products::delete_product(&server, Some(&admin), product.id)
        .await
        .unwrap();
    assert!(server.store.get_product(&product.id).await.is_err());

    let err = products::delete_product(&server, Some(&admin), ProductId(Uuid::now_v7()))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound("Product")));
}
