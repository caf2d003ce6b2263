//! HTTP wiring: the axum router and the session-cookie glue.
//!
//! Everything here is transport framing; the behaviour lives in
//! `handlers::*`. The session travels in an opaque `sid` cookie whose token
//! keys the in-process session store.

use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde_json::json;
use uuid::Uuid;

use crate::error::ApiError;
use crate::handlers::{auth, orders, products};
use crate::server::AppServer;
use crate::session::Session;
use stockroom_storage::{OrderId, ProductId, Role};

const SESSION_COOKIE: &str = "sid";

pub fn router(server: AppServer) -> Router {
    Router::new()
        .route("/healthz", get(health))
        .route("/auth/worker-login", post(worker_login))
        .route("/auth/admin-login", post(admin_login))
        .route("/auth/worker-register", post(worker_register))
        .route("/auth/change-password", post(change_password))
        .route("/auth/logout", post(logout))
        .route("/auth/check", get(check_auth))
        .route("/products", get(list_products).post(add_product))
        .route("/products/{id}", delete(delete_product))
        .route("/orders", get(list_all_orders).post(place_order))
        .route("/orders/mine", get(list_my_orders))
        .route("/orders/{id}/delivered", put(update_delivery))
        .route("/orders/{id}", delete(delete_order))
        .with_state(server)
}

// ───────────────────────────── Session cookie ─────────────────────────────

fn session_token(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == SESSION_COOKIE).then(|| value.to_string())
    })
}

fn current_session(server: &AppServer, headers: &HeaderMap) -> Option<Session> {
    session_token(headers).and_then(|token| server.sessions.get(&token))
}

fn session_cookie(token: &str, ttl_hours: i64) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE,
        token,
        ttl_hours * 3600
    )
}

fn clear_session_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", SESSION_COOKIE)
}

fn with_cookie(mut response: Response, cookie: &str) -> Result<Response, ApiError> {
    let value =
        HeaderValue::from_str(cookie).map_err(|e| ApiError::Internal(e.to_string()))?;
    response.headers_mut().append(header::SET_COOKIE, value);
    Ok(response)
}

// ───────────────────────────── Route handlers ─────────────────────────────

async fn health() -> &'static str {
    "ok"
}

async fn worker_login(
    State(server): State<AppServer>,
    Json(req): Json<auth::LoginRequest>,
) -> Result<Response, ApiError> {
    login_response(&server, Role::Worker, req, "Worker login successful").await
}

async fn admin_login(
    State(server): State<AppServer>,
    Json(req): Json<auth::LoginRequest>,
) -> Result<Response, ApiError> {
    login_response(&server, Role::Admin, req, "Admin login successful").await
}

async fn login_response(
    server: &AppServer,
    role: Role,
    req: auth::LoginRequest,
    message: &str,
) -> Result<Response, ApiError> {
    let outcome = auth::login(server, role, req).await?;
    let body = Json(json!({ "message": message, "user": outcome.session })).into_response();
    with_cookie(
        body,
        &session_cookie(&outcome.token, server.config.session_ttl_hours),
    )
}

async fn worker_register(
    State(server): State<AppServer>,
    Json(req): Json<auth::RegisterRequest>,
) -> Result<Response, ApiError> {
    let principal = auth::register_worker(&server, req).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Worker registered successfully",
            "user": { "id": principal.id, "username": principal.username },
        })),
    )
        .into_response())
}

async fn change_password(
    State(server): State<AppServer>,
    headers: HeaderMap,
    Json(req): Json<auth::ChangePasswordRequest>,
) -> Result<Response, ApiError> {
    let session = current_session(&server, &headers);
    auth::change_password(&server, session.as_ref(), req).await?;
    Ok(Json(json!({ "message": "Password updated" })).into_response())
}

async fn logout(State(server): State<AppServer>, headers: HeaderMap) -> Result<Response, ApiError> {
    auth::logout(&server, session_token(&headers).as_deref());
    let body = Json(json!({ "message": "Logout successful" })).into_response();
    with_cookie(body, &clear_session_cookie())
}

async fn check_auth(State(server): State<AppServer>, headers: HeaderMap) -> Response {
    match auth::who_am_i(&server, current_session(&server, &headers).as_ref()) {
        Ok(session) => Json(json!({ "authenticated": true, "user": session })).into_response(),
        Err(_) => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "authenticated": false, "message": "Unauthorized: Please log in" })),
        )
            .into_response(),
    }
}

async fn list_products(
    State(server): State<AppServer>,
    Query(params): Query<products::ListProductsParams>,
) -> Result<Response, ApiError> {
    let response = products::list_products(&server, params).await?;
    Ok(Json(response).into_response())
}

async fn add_product(
    State(server): State<AppServer>,
    headers: HeaderMap,
    Json(req): Json<products::AddProductRequest>,
) -> Result<Response, ApiError> {
    let session = current_session(&server, &headers);
    let product = products::add_product(&server, session.as_ref(), req).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Product added successfully", "product": product })),
    )
        .into_response())
}

async fn delete_product(
    State(server): State<AppServer>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let session = current_session(&server, &headers);
    products::delete_product(&server, session.as_ref(), ProductId(id)).await?;
    Ok(Json(json!({ "message": "Product deleted successfully" })).into_response())
}

async fn place_order(
    State(server): State<AppServer>,
    headers: HeaderMap,
    Json(req): Json<orders::PlaceOrderRequest>,
) -> Result<Response, ApiError> {
    let session = current_session(&server, &headers);
    let order = orders::place_order(&server, session.as_ref(), req).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Order added successfully", "order": order })),
    )
        .into_response())
}

async fn list_my_orders(
    State(server): State<AppServer>,
    headers: HeaderMap,
    Query(params): Query<orders::ListOrdersParams>,
) -> Result<Response, ApiError> {
    let session = current_session(&server, &headers);
    let response = orders::list_my_orders(&server, session.as_ref(), params).await?;
    Ok(Json(response).into_response())
}

async fn list_all_orders(
    State(server): State<AppServer>,
    headers: HeaderMap,
    Query(params): Query<orders::ListOrdersParams>,
) -> Result<Response, ApiError> {
    let session = current_session(&server, &headers);
    let response = orders::list_all_orders(&server, session.as_ref(), params).await?;
    Ok(Json(response).into_response())
}

async fn update_delivery(
    State(server): State<AppServer>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(req): Json<orders::UpdateDeliveryRequest>,
) -> Result<Response, ApiError> {
    let session = current_session(&server, &headers);
    let order = orders::update_delivery(&server, session.as_ref(), OrderId(id), req).await?;
    Ok(Json(json!({ "message": "Order updated successfully", "order": order })).into_response())
}

async fn delete_order(
    State(server): State<AppServer>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let session = current_session(&server, &headers);
    orders::delete_order(&server, session.as_ref(), OrderId(id)).await?;
    Ok(Json(json!({ "message": "Order deleted successfully" })).into_response())
}
