//! Order workflow tests: placement atomicity, visibility, delivery status.

use super::super::common::*;
use crate::error::ApiError;
use crate::handlers::orders::{self, ListOrdersParams, UpdateDeliveryRequest};
use stockroom_storage::{OrderId, ProductId, Store};
use uuid::Uuid;

#[tokio::test]
async fn place_order_requires_a_session() {
    let server = create_test_server().await;
    let product = create_test_product(&server, "Widget", 10).await;

    let err = orders::place_order(&server, None, order_request(product.id, 1))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized));
    assert_eq!(server.store.get_product(&product.id).await.unwrap().stock, 10);
}

#[tokio::test]
async fn admin_passes_the_worker_gate() {
    let server = create_test_server().await;
    let admin = admin_session(&server).await;
    let product = create_test_product(&server, "Widget", 10).await;

    let order = orders::place_order(&server, Some(&admin), order_request(product.id, 2))
        .await
        .unwrap();
    assert_eq!(order.worker_id, admin.id);
}

#[tokio::test]
async fn placement_validates_before_touching_stock() {
    let server = create_test_server().await;
    let worker = worker_session(&server, "wendy").await;
    let product = create_test_product(&server, "Widget", 10).await;

    let mut req = order_request(product.id, 0);
    let err = orders::place_order(&server, Some(&worker), req).await.unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));

    req = order_request(product.id, 1);
    req.contact = None;
    let err = orders::place_order(&server, Some(&worker), req).await.unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));

    // Failed validation leaves the product untouched.
    assert_eq!(server.store.get_product(&product.id).await.unwrap().stock, 10);
}

#[tokio::test]
async fn placement_on_missing_product_is_productnotfound() {
    let server = create_test_server().await;
    let worker = worker_session(&server, "wendy").await;

    let err = orders::place_order(
        &server,
        Some(&worker),
        order_request(ProductId(Uuid::now_v7()), 1),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::NotFound("Product")));
}

#[tokio::test]
async fn order_and_inventory_scenario_end_to_end() {
    let server = create_test_server().await;
    let admin = admin_session(&server).await;
    let worker = worker_session(&server, "wendy").await;
    let product = create_test_product(&server, "Widget", 10).await;

    // Worker places an order for 4: stock 10 -> 6, order starts undelivered.
    let order = orders::place_order(&server, Some(&worker), order_request(product.id, 4))
        .await
        .unwrap();
    assert!(!order.delivered);
    assert_eq!(order.quantity, 4);
    assert_eq!(server.store.get_product(&product.id).await.unwrap().stock, 6);

    // Oversized order fails and changes nothing.
    let err = orders::place_order(&server, Some(&worker), order_request(product.id, 10))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::InsufficientStock));
    assert_eq!(server.store.get_product(&product.id).await.unwrap().stock, 6);

    // Admin marks the first order delivered; stock is unaffected.
    let updated = orders::update_delivery(
        &server,
        Some(&admin),
        order.id,
        UpdateDeliveryRequest { delivered: true },
    )
    .await
    .unwrap();
    assert!(updated.delivered);
    assert_eq!(server.store.get_product(&product.id).await.unwrap().stock, 6);

    // Deleting the order does not replenish stock.
    orders::delete_order(&server, Some(&admin), order.id).await.unwrap();
    assert!(server.store.get_order(&order.id).await.is_err());
    assert_eq!(server.store.get_product(&product.id).await.unwrap().stock, 6);
}

#[tokio::test]
async fn my_orders_are_scoped_to_the_caller() {
    let server = create_test_server().await;
    let wendy = worker_session(&server, "wendy").await;
    let walt = worker_session(&server, "walt").await;
    let product = create_test_product(&server, "Widget", 100).await;

    orders::place_order(&server, Some(&wendy), order_request(product.id, 1))
        .await
        .unwrap();
    orders::place_order(&server, Some(&walt), order_request(product.id, 1))
        .await
        .unwrap();

    let mine = orders::list_my_orders(&server, Some(&wendy), ListOrdersParams::default())
        .await
        .unwrap();
    assert_eq!(mine.total_count, 1);
    assert_eq!(mine.worker_name, "wendy");
    assert_eq!(mine.orders[0].order.worker_id, wendy.id);
    // Enriched with the product's display fields.
    let display = mine.orders[0].product.as_ref().unwrap();
    assert_eq!(display.name, "Widget");
}

#[tokio::test]
async fn my_orders_search_filters_by_customer_name() {
    let server = create_test_server().await;
    let wendy = worker_session(&server, "wendy").await;
    let product = create_test_product(&server, "Widget", 100).await;

    let mut req = order_request(product.id, 1);
    req.customer_name = Some("Alice Jones".to_string());
    orders::place_order(&server, Some(&wendy), req).await.unwrap();

    let mut req = order_request(product.id, 1);
    req.customer_name = Some("Bob Smith".to_string());
    orders::place_order(&server, Some(&wendy), req).await.unwrap();

    let found = orders::list_my_orders(
        &server,
        Some(&wendy),
        ListOrdersParams {
            page: None,
            limit: None,
            search: Some("ALICE".to_string()),
        },
    )
    .await
    .unwrap();
    assert_eq!(found.total_count, 1);
    assert_eq!(found.orders[0].order.customer_name, "Alice Jones");
}

#[tokio::test]
async fn all_orders_listing_is_admin_only() {
    let server = create_test_server().await;
    let admin = admin_session(&server).await;
    let wendy = worker_session(&server, "wendy").await;
    let walt = worker_session(&server, "walt").await;
    let product = create_test_product(&server, "Widget", 100).await;

    orders::place_order(&server, Some(&wendy), order_request(product.id, 1))
        .await
        .unwrap();
    orders::place_order(&server, Some(&walt), order_request(product.id, 1))
        .await
        .unwrap();

    let err = orders::list_all_orders(&server, Some(&wendy), ListOrdersParams::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Forbidden(_)));

    let all = orders::list_all_orders(&server, Some(&admin), ListOrdersParams::default())
        .await
        .unwrap();
    assert_eq!(all.total_count, 2);
    let mut workers: Vec<_> = all
        .orders
        .iter()
        .map(|o| o.worker_name.clone().unwrap())
        .collect();
    workers.sort();
    assert_eq!(workers, vec!["walt", "wendy"]);
}

#[tokio::test]
async fn delivery_update_is_admin_gated_and_idempotent() {
    let server = create_test_server().await;
    let admin = admin_session(&server).await;
    let worker = worker_session(&server, "wendy").await;
    let product = create_test_product(&server, "Widget", 10).await;
    let order = orders::place_order(&server, Some(&worker), order_request(product.id, 1))
        .await
        .unwrap();

    let err = orders::update_delivery(
        &server,
        Some(&worker),
        order.id,
        UpdateDeliveryRequest { delivered: true },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::Forbidden(_)));

    for _ in 0..2 {
        let updated = orders::update_delivery(
            &server,
            Some(&admin),
            order.id,
            UpdateDeliveryRequest { delivered: true },
        )
        .await
        .unwrap();
        assert!(updated.delivered);
    }

    let err = orders::update_delivery(
        &server,
        Some(&admin),
        OrderId(Uuid::now_v7()),
        UpdateDeliveryRequest { delivered: true },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::NotFound("Order")));
}

#[tokio::test]
async fn order_deletion_is_admin_only() {
    let server = create_test_server().await;
    let worker = worker_session(&server, "wendy").await;
    let product = create_test_product(&server, "Widget", 10).await;
    let order = orders::place_order(&server, Some(&worker), order_request(product.id, 1))
        .await
        .unwrap();

    let err = orders::delete_order(&server, Some(&worker), order.id)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Forbidden(_)));
    assert!(server.store.get_order(&order.id).await.is_ok());
}

#[tokio::test]
async fn orders_survive_product_deletion_with_degraded_display() {
    let server = create_test_server().await;
    let admin = admin_session(&server).await;
    let worker = worker_session(&server, "wendy").await;
    let product = create_test_product(&server, "Widget", 10).await;

    orders::place_order(&server, Some(&worker), order_request(product.id, 1))
        .await
        .unwrap();
    server.store.delete_product(&product.id).await.unwrap();

    let all = orders::list_all_orders(&server, Some(&admin), ListOrdersParams::default())
        .await
        .unwrap();
    assert_eq!(all.total_count, 1);
    assert!(all.orders[0].product.is_none());
    assert_eq!(all.orders[0].order.product_id, product.id);
}
