//! Handler functions organized by domain:
//! - auth: login, logout, session check, worker registration, password change
//! - products: catalog management and the public listing
//! - orders: placement workflow, listings, delivery status, deletion
//!
//! Handlers are transport-free: they take the server, an explicit session
//! (the principal snapshot, or None for anonymous callers) and a plain
//! request value. `routes.rs` wires them to HTTP.

pub mod auth;
pub mod orders;
pub mod products;

/// Coerce raw page/limit query values to positive integers
/// (defaults: page 1, limit 8).
pub(crate) fn page_window(page: Option<i64>, limit: Option<i64>) -> (i64, i64) {
    let page = page.filter(|p| *p > 0).unwrap_or(1);
    let limit = limit.filter(|l| *l > 0).unwrap_or(8);
    (page, limit)
}

pub(crate) fn total_pages(total_count: i64, limit: i64) -> i64 {
    (total_count + limit - 1) / limit
}
