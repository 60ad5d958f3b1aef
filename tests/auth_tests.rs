use axum::http::StatusCode;
use chrono::{Duration, Utc};
use hrms::repositories::{RefreshTokenRepository, UserRepository};
use serde_json::json;

#[allow(dead_code)]
mod common {
    include!("common/mod.rs");
}

use common::{create_test_state, login, make_request, register_user, setup_test_db, unique_email};

// ============================================================================
// Registration & Login
// ============================================================================

#[tokio::test]
async fn test_register_success() {
    let Some(pool) = setup_test_db().await else { return };
    let state = create_test_state(pool);

    let email = unique_email("register");
    let (status, body) = make_request(
        &state,
        "POST",
        "/api/auth/register",
        Some(json!({ "email": email, "password": "password123" })),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["user"]["email"], email);
    assert!(body["data"]["user"].get("password_hash").is_none());
    assert!(body["data"]["access_token"].is_string());
    assert!(body["data"]["refresh_token"].is_string());
    assert_eq!(body["data"]["token_type"], "Bearer");
}

#[tokio::test]
async fn test_register_grants_default_role() {
    let Some(pool) = setup_test_db().await else { return };
    let state = create_test_state(pool);
    let user = register_user(&state, None).await;

    let (status, body) = make_request(
        &state,
        "GET",
        "/api/auth/roles-permissions",
        None,
        Some(&user.access_token),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["roles"], json!(["employee"]));
    assert_eq!(
        body["data"]["permissions"],
        json!(["attendance:self", "leave:self"])
    );
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let Some(pool) = setup_test_db().await else { return };
    let state = create_test_state(pool);
    let user = register_user(&state, None).await;

    let (status, body) = make_request(
        &state,
        "POST",
        "/api/auth/register",
        Some(json!({ "email": user.email, "password": "password123" })),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "EMAIL_TAKEN");
}

#[tokio::test]
async fn test_register_rejects_short_password_and_bad_email() {
    let Some(pool) = setup_test_db().await else { return };
    let state = create_test_state(pool);

    let (status, body) = make_request(
        &state,
        "POST",
        "/api/auth/register",
        Some(json!({ "email": unique_email("short"), "password": "short" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "PASSWORD_TOO_SHORT");

    let (status, body) = make_request(
        &state,
        "POST",
        "/api/auth/register",
        Some(json!({ "email": "not-an-email", "password": "password123" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_EMAIL");
}

#[tokio::test]
async fn test_login_wrong_password() {
    let Some(pool) = setup_test_db().await else { return };
    let state = create_test_state(pool);
    let user = register_user(&state, None).await;

    let (status, body) = make_request(
        &state,
        "POST",
        "/api/auth/login",
        Some(json!({ "email": user.email, "password": "wrongpassword" })),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn test_login_inactive_user() {
    let Some(pool) = setup_test_db().await else { return };
    let state = create_test_state(pool.clone());
    let user = register_user(&state, None).await;

    UserRepository::set_active(&pool, user.id, false).await.unwrap();

    let (status, body) = make_request(
        &state,
        "POST",
        "/api/auth/login",
        Some(json!({ "email": user.email, "password": user.password })),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "USER_INACTIVE");
}

// ============================================================================
// Access tokens
// ============================================================================

#[tokio::test]
async fn test_missing_token_is_rejected() {
    let Some(pool) = setup_test_db().await else { return };
    let state = create_test_state(pool);

    let (status, body) = make_request(&state, "GET", "/api/auth/profile", None, None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "ACCESS_TOKEN_REQUIRED");
    assert_eq!(body["error"]["message"], "Access token is required");
}

#[tokio::test]
async fn test_invalid_token_is_rejected() {
    let Some(pool) = setup_test_db().await else { return };
    let state = create_test_state(pool);

    let (status, body) =
        make_request(&state, "GET", "/api/auth/profile", None, Some("not.a.jwt")).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "INVALID_TOKEN");
    assert_eq!(body["error"]["message"], "Invalid or expired token");
}

#[tokio::test]
async fn test_deactivated_user_token_is_rejected() {
    let Some(pool) = setup_test_db().await else { return };
    let state = create_test_state(pool.clone());
    let user = register_user(&state, None).await;

    UserRepository::set_active(&pool, user.id, false).await.unwrap();

    let (status, body) =
        make_request(&state, "GET", "/api/auth/profile", None, Some(&user.access_token)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "INVALID_TOKEN");
}

#[tokio::test]
async fn test_profile_and_update() {
    let Some(pool) = setup_test_db().await else { return };
    let state = create_test_state(pool);
    let user = register_user(&state, None).await;

    let (status, body) =
        make_request(&state, "GET", "/api/auth/profile", None, Some(&user.access_token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], user.id.to_string());
    assert_eq!(body["data"]["roles"], json!(["employee"]));

    let new_email = unique_email("renamed");
    let (status, body) = make_request(
        &state,
        "PUT",
        "/api/auth/profile",
        Some(json!({ "email": new_email })),
        Some(&user.access_token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], new_email);
    assert_eq!(body["data"]["email_verified"], false);
}

#[tokio::test]
async fn test_verify_token_introspection() {
    let Some(pool) = setup_test_db().await else { return };
    let state = create_test_state(pool);
    let user = register_user(&state, None).await;

    let (status, body) = make_request(
        &state,
        "POST",
        "/api/auth/verify-token",
        Some(json!({ "token": user.access_token })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["valid"], true);
    assert_eq!(body["data"]["user_id"], user.id.to_string());

    let (status, body) = make_request(
        &state,
        "POST",
        "/api/auth/verify-token",
        Some(json!({ "token": "garbage" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["valid"], false);
}

#[tokio::test]
async fn test_check_permission() {
    let Some(pool) = setup_test_db().await else { return };
    let state = create_test_state(pool);
    let user = register_user(&state, None).await;

    for (permission, granted) in [("leave:self", true), ("employee:read", false)] {
        let (status, body) = make_request(
            &state,
            "POST",
            "/api/auth/check-permission",
            Some(json!({ "token": user.access_token, "permission": permission })),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["granted"], granted, "{permission}");
    }
}

#[tokio::test]
async fn test_check_permission_uses_bearer_token() {
    let Some(pool) = setup_test_db().await else { return };
    let state = create_test_state(pool);
    let user = register_user(&state, None).await;

    let (status, body) = make_request(
        &state,
        "POST",
        "/api/auth/check-permission",
        Some(json!({ "permission": "attendance:self" })),
        Some(&user.access_token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["granted"], true);
}

#[tokio::test]
async fn test_check_permission_without_any_token() {
    let Some(pool) = setup_test_db().await else { return };
    let state = create_test_state(pool);

    let (status, body) = make_request(
        &state,
        "POST",
        "/api/auth/check-permission",
        Some(json!({ "permission": "employee:read" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "ACCESS_TOKEN_REQUIRED");

    let (status, body) = make_request(
        &state,
        "POST",
        "/api/auth/check-permission",
        Some(json!({ "token": "not-a-jwt", "permission": "employee:read" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "INVALID_TOKEN");
}

// ============================================================================
// Refresh tokens
// ============================================================================

#[tokio::test]
async fn test_refresh_token_is_reusable() {
    let Some(pool) = setup_test_db().await else { return };
    let state = create_test_state(pool);
    let user = register_user(&state, None).await;

    for _ in 0..2 {
        let (status, body) = make_request(
            &state,
            "POST",
            "/api/auth/refresh-token",
            Some(json!({ "refresh_token": user.refresh_token })),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let access = body["data"]["access_token"].as_str().unwrap();
        let (status, _) = make_request(&state, "GET", "/api/auth/profile", None, Some(access)).await;
        assert_eq!(status, StatusCode::OK);
    }
}

#[tokio::test]
async fn test_unknown_refresh_token() {
    let Some(pool) = setup_test_db().await else { return };
    let state = create_test_state(pool);

    let (status, body) = make_request(
        &state,
        "POST",
        "/api/auth/refresh-token",
        Some(json!({ "refresh_token": RefreshTokenRepository::generate_token() })),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "INVALID_REFRESH_TOKEN");
}

#[tokio::test]
async fn test_expired_refresh_token() {
    let Some(pool) = setup_test_db().await else { return };
    let state = create_test_state(pool.clone());
    let user = register_user(&state, None).await;

    let expired = RefreshTokenRepository::generate_token();
    RefreshTokenRepository::create(&pool, user.id, &expired, Utc::now() - Duration::minutes(1))
        .await
        .unwrap();

    let (status, body) = make_request(
        &state,
        "POST",
        "/api/auth/refresh-token",
        Some(json!({ "refresh_token": expired })),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "INVALID_REFRESH_TOKEN");
}

#[tokio::test]
async fn test_concurrent_sessions_are_independent() {
    let Some(pool) = setup_test_db().await else { return };
    let state = create_test_state(pool);
    let user = register_user(&state, None).await;

    let (_, first) = login(&state, &user).await;
    let (_, second) = login(&state, &user).await;
    assert_ne!(first, second);

    let (status, _) = make_request(
        &state,
        "POST",
        "/api/auth/logout",
        Some(json!({ "refresh_token": first })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = make_request(
        &state,
        "POST",
        "/api/auth/refresh-token",
        Some(json!({ "refresh_token": first })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "INVALID_REFRESH_TOKEN");

    let (status, _) = make_request(
        &state,
        "POST",
        "/api/auth/refresh-token",
        Some(json!({ "refresh_token": second })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_logout_all_revokes_every_session() {
    let Some(pool) = setup_test_db().await else { return };
    let state = create_test_state(pool);
    let user = register_user(&state, None).await;
    let (_, second) = login(&state, &user).await;

    let (status, _) =
        make_request(&state, "POST", "/api/auth/logout-all", None, Some(&user.access_token)).await;
    assert_eq!(status, StatusCode::OK);

    for token in [&user.refresh_token, &second] {
        let (status, _) = make_request(
            &state,
            "POST",
            "/api/auth/refresh-token",
            Some(json!({ "refresh_token": token })),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}

#[tokio::test]
async fn test_change_password_revokes_refresh_tokens() {
    let Some(pool) = setup_test_db().await else { return };
    let state = create_test_state(pool);
    let user = register_user(&state, None).await;

    let (status, body) = make_request(
        &state,
        "POST",
        "/api/auth/change-password",
        Some(json!({ "current_password": "wrong-password", "new_password": "newpassword456" })),
        Some(&user.access_token),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "INVALID_CREDENTIALS");

    let (status, _) = make_request(
        &state,
        "POST",
        "/api/auth/change-password",
        Some(json!({ "current_password": user.password, "new_password": "newpassword456" })),
        Some(&user.access_token),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = make_request(
        &state,
        "POST",
        "/api/auth/refresh-token",
        Some(json!({ "refresh_token": user.refresh_token })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = make_request(
        &state,
        "POST",
        "/api/auth/login",
        Some(json!({ "email": user.email, "password": "newpassword456" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}
