//! Auth handler tests: login, logout, session check, registration,
//! password changes.

use super::super::common::*;
use crate::error::ApiError;
use crate::handlers::auth::{
    self, ChangePasswordRequest, LoginRequest, RegisterRequest,
};
use stockroom_storage::{CreatePrincipalParams, Role, Store};

fn login_req(username: &str, password: &str) -> LoginRequest {
    LoginRequest {
        username: username.to_string(),
        password: password.to_string(),
    }
}

#[tokio::test]
async fn register_then_login_as_worker() {
    let server = create_test_server().await;

    auth::register_worker(
        &server,
        RegisterRequest {
            username: Some("wendy".to_string()),
            password: Some("hunter2".to_string()),
        },
    )
    .await
    .unwrap();

    let outcome = auth::login(&server, Role::Worker, login_req("wendy", "hunter2"))
        .await
        .unwrap();
    assert_eq!(outcome.session.username, "wendy");
    assert_eq!(outcome.session.role, Role::Worker);

    // The token resolves back to the same principal snapshot.
    let session = server.sessions.get(&outcome.token).unwrap();
    assert_eq!(session.id, outcome.session.id);
}

#[tokio::test]
async fn login_unknown_user_is_notfound() {
    let server = create_test_server().await;
    let err = auth::login(&server, Role::Worker, login_req("nobody", "pw"))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[tokio::test]
async fn login_wrong_password_is_invalid_credential() {
    let server = create_test_server().await;
    auth::register_worker(
        &server,
        RegisterRequest {
            username: Some("wendy".to_string()),
            password: Some("hunter2".to_string()),
        },
    )
    .await
    .unwrap();

    let err = auth::login(&server, Role::Worker, login_req("wendy", "wrong"))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidCredential));
}

#[tokio::test]
async fn duplicate_registration_is_conflict() {
    let server = create_test_server().await;
    let req = || RegisterRequest {
        username: Some("wendy".to_string()),
        password: Some("hunter2".to_string()),
    };

    auth::register_worker(&server, req()).await.unwrap();
    let err = auth::register_worker(&server, req()).await.unwrap_err();
    assert!(matches!(err, ApiError::Conflict(_)));
}

#[tokio::test]
async fn registration_requires_username_and_password() {
    let server = create_test_server().await;

    let err = auth::register_worker(
        &server,
        RegisterRequest {
            username: Some("  ".to_string()),
            password: Some("pw".to_string()),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));

    let err = auth::register_worker(
        &server,
        RegisterRequest {
            username: Some("wendy".to_string()),
            password: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));
}

#[tokio::test]
async fn admin_login_uses_its_own_namespace() {
    let server = create_test_server().await;
    server
        .store
        .create_principal(&CreatePrincipalParams {
            username: "alex".to_string(),
            secret_hash: stockroom_crypto::hash_secret("s3cret").unwrap(),
            role: Role::Admin,
        })
        .await
        .unwrap();

    let outcome = auth::login(&server, Role::Admin, login_req("alex", "s3cret"))
        .await
        .unwrap();
    assert_eq!(outcome.session.role, Role::Admin);

    // No worker named alex exists.
    let err = auth::login(&server, Role::Worker, login_req("alex", "s3cret"))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[tokio::test]
async fn logout_destroys_the_session() {
    let server = create_test_server().await;
    auth::register_worker(
        &server,
        RegisterRequest {
            username: Some("wendy".to_string()),
            password: Some("hunter2".to_string()),
        },
    )
    .await
    .unwrap();
    let outcome = auth::login(&server, Role::Worker, login_req("wendy", "hunter2"))
        .await
        .unwrap();

    auth::logout(&server, Some(&outcome.token));
    assert!(server.sessions.get(&outcome.token).is_none());

    // Logging out with no token is a no-op, not an error.
    auth::logout(&server, None);
}

#[tokio::test]
async fn who_am_i_reflects_the_session() {
    let server = create_test_server().await;
    let session = worker_session(&server, "wendy").await;

    let got = auth::who_am_i(&server, Some(&session)).unwrap();
    assert_eq!(got.username, "wendy");

    let err = auth::who_am_i(&server, None).unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized));
}

#[tokio::test]
async fn change_password_rotates_the_digest() {
    let server = create_test_server().await;
    auth::register_worker(
        &server,
        RegisterRequest {
            username: Some("wendy".to_string()),
            password: Some("old-pass".to_string()),
        },
    )
    .await
    .unwrap();
    let outcome = auth::login(&server, Role::Worker, login_req("wendy", "old-pass"))
        .await
        .unwrap();

    // Wrong current password is rejected before any mutation.
    let err = auth::change_password(
        &server,
        Some(&outcome.session),
        ChangePasswordRequest {
            current_password: Some("nope".to_string()),
            new_password: Some("new-pass".to_string()),
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::InvalidCredential));

    auth::change_password(
        &server,
        Some(&outcome.session),
        ChangePasswordRequest {
            current_password: Some("old-pass".to_string()),
            new_password: Some("new-pass".to_string()),
        },
    )
    .await
    .unwrap();

    assert!(auth::login(&server, Role::Worker, login_req("wendy", "old-pass"))
        .await
        .is_err());
    auth::login(&server, Role::Worker, login_req("wendy", "new-pass"))
        .await
        .unwrap();
}
