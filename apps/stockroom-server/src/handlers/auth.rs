//! Authentication handlers: login, logout, session check, registration.

use serde::Deserialize;

use crate::error::ApiError;
use crate::server::AppServer;
use crate::session::Session;
use stockroom_storage::{CreatePrincipalParams, Principal, Role, Store, StoreError};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

/// A fresh session plus the token the transport hands back to the client.
#[derive(Debug)]
pub struct LoginOutcome {
    pub session: Session,
    pub token: String,
}

/// Verify credentials within one role's namespace and establish a session.
/// This is the only place sessions are created.
pub async fn login(
    server: &AppServer,
    role: Role,
    req: LoginRequest,
) -> Result<LoginOutcome, ApiError> {
    let principal = server
        .store
        .get_principal_by_username(role, &req.username)
        .await
        .map_err(|e| match e {
            StoreError::NotFound => ApiError::NotFound(match role {
                Role::Admin => "Admin",
                Role::Worker => "User",
            }),
            other => other.into(),
        })?;

    if !stockroom_crypto::verify_secret(&req.password, &principal.secret_hash)? {
        return Err(ApiError::InvalidCredential);
    }

    let session = Session::for_principal(&principal);
    let token = server.sessions.create(session.clone());
    tracing::info!(username = %session.username, role = role.as_str(), "login");
    Ok(LoginOutcome { session, token })
}

/// Destroy the session behind a token. Best-effort: an absent or already
/// expired token is not an error.
pub fn logout(server: &AppServer, token: Option<&str>) {
    if let Some(token) = token {
        server.sessions.destroy(token);
    }
}

/// Session check: returns the principal snapshot for the caller, if any.
pub fn who_am_i(server: &AppServer, session: Option<&Session>) -> Result<Session, ApiError> {
    server.require_authenticated(session).cloned()
}

/// Register a worker account. The secret is hashed before it reaches the
/// store; a taken username maps to `Conflict`.
pub async fn register_worker(
    server: &AppServer,
    req: RegisterRequest,
) -> Result<Principal, ApiError> {
    let username = req
        .username
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .ok_or_else(|| ApiError::Validation("Username is required".to_string()))?;
    let password = req
        .password
        .as_deref()
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::Validation("Password is required".to_string()))?;

    let secret_hash = stockroom_crypto::hash_secret(password)?;
    let principal = server
        .store
        .create_principal(&CreatePrincipalParams {
            username: username.to_string(),
            secret_hash,
            role: Role::Worker,
        })
        .await
        .map_err(|e| match e {
            StoreError::AlreadyExists => {
                ApiError::Conflict("Username already taken".to_string())
            }
            other => other.into(),
        })?;

    tracing::info!(username = %principal.username, "worker registered");
    Ok(principal)
}

/// Change the caller's own secret. The stored digest is recomputed from the
/// new secret; nothing else on the principal is touched.
pub async fn change_password(
    server: &AppServer,
    session: Option<&Session>,
    req: ChangePasswordRequest,
) -> Result<(), ApiError> {
    let session = server.require_authenticated(session)?;

    let current = req
        .current_password
        .as_deref()
        .ok_or_else(|| ApiError::Validation("Current password is required".to_string()))?;
    let new = req
        .new_password
        .as_deref()
        .filter(|p| !p.is_empty())
        .ok_or_else(|| ApiError::Validation("New password is required".to_string()))?;

    let principal = server
        .store
        .get_principal(&session.id)
        .await
        .map_err(|e| match e {
            StoreError::NotFound => ApiError::NotFound("User"),
            other => other.into(),
        })?;

    if !stockroom_crypto::verify_secret(current, &principal.secret_hash)? {
        return Err(ApiError::InvalidCredential);
    }

    let secret_hash = stockroom_crypto::hash_secret(new)?;
    server
        .store
        .update_principal_secret(&session.id, &secret_hash)
        .await?;
    Ok(())
}
