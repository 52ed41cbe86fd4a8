mod common;

use axum::http::{Method, StatusCode};
use chrono::Duration;
use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn test_register_login_profile_logout_refresh() {
    let app = TestApp::spawn();

    // 1. Register
    let res = app.register("Jo", "jo@x.com", "secret1").await;
    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(
        res.body["message"],
        "Registration successful. Please login to continue."
    );
    assert_eq!(res.body["user"]["email"], "jo@x.com");
    assert_eq!(res.body["user"]["name"], "Jo");
    assert!(res.body.get("token").is_none());
    assert!(res.body["user"].get("password").is_none());

    // 2. Login
    let res = app.login("jo@x.com", "secret1").await;
    assert_eq!(res.status, StatusCode::OK);
    let token = res.body["token"].as_str().unwrap().to_string();
    let refresh_token = res.body["refreshToken"].as_str().unwrap().to_string();
    assert_eq!(res.body["user"]["email"], "jo@x.com");

    // 3. Profile
    let res = app.get("/auth/profile", &token).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["user"]["name"], "Jo");
    assert_eq!(res.body["user"]["email"], "jo@x.com");
    assert_eq!(res.body["user"]["role"], "user");
    assert!(res.body["user"]["id"].is_i64());
    assert!(res.body["user"].get("password").is_none());

    // 4. Refresh works while the session is live
    let res = app
        .post("/auth/refresh", json!({"refreshToken": refresh_token}))
        .await;
    assert_eq!(res.status, StatusCode::OK);
    let refreshed = res.body["token"].as_str().unwrap();
    assert!(app.jwt.validate_access_token(refreshed).is_ok());

    // 5. Logout
    let res = app
        .post("/auth/logout", json!({"refreshToken": refresh_token}))
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["message"], "Logged out");

    // 6. Refresh after logout
    let res = app
        .post("/auth/refresh", json!({"refreshToken": refresh_token}))
        .await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.body["message"], "Invalid refresh token");
}

#[tokio::test]
async fn test_duplicate_registration_conflicts() {
    let app = TestApp::spawn();

    let res = app.register("Jo", "jo@x.com", "secret1").await;
    assert_eq!(res.status, StatusCode::CREATED);

    let res = app.register("Someone Else", "jo@x.com", "another1").await;
    assert_eq!(res.status, StatusCode::CONFLICT);
    assert_eq!(res.body["message"], "Email already in use");
}

#[tokio::test]
async fn test_registration_validation() {
    let app = TestApp::spawn();

    let res = app.register("Jo", "jo@x.com", "12345").await;
    assert_eq!(res.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(res.body["message"], "Validation error");
    assert!(res.body["errors"]["password"].is_array());

    let res = app.register("", "not-an-email", "secret1").await;
    assert_eq!(res.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(res.body["errors"]["name"].is_array());
    assert!(res.body["errors"]["email"].is_array());

    let res = app.post("/auth/register", json!({})).await;
    assert_eq!(res.status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = TestApp::spawn();

    let request = axum::http::Request::builder()
        .method(Method::POST)
        .uri("/auth/login")
        .header("content-type", "application/json")
        .body(axum::body::Body::from("{not json"))
        .unwrap();
    let res = app.send(request).await;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_failures_are_generic() {
    let app = TestApp::spawn();
    app.register("Jo", "jo@x.com", "secret1").await;

    let wrong_password = app.login("jo@x.com", "wrong-password").await;
    let unknown_email = app.login("nobody@x.com", "secret1").await;

    assert_eq!(wrong_password.status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password.body, unknown_email.body);
    assert_eq!(wrong_password.body["message"], "Invalid credentials");
}

#[tokio::test]
async fn test_login_validation() {
    let app = TestApp::spawn();

    let res = app.login("jo@x.com", "").await;
    assert_eq!(res.status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_refresh_requires_a_token() {
    let app = TestApp::spawn();

    let res = app.post("/auth/refresh", json!({})).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["message"], "Missing refresh token");

    let res = app
        .request(Method::POST, "/auth/refresh", None, None)
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_refresh_rejects_unissued_tokens() {
    let app = TestApp::spawn();

    // Validly signed, never registered
    let (unissued, _) = app.jwt.generate_refresh_token(1).unwrap();
    let res = app
        .post("/auth/refresh", json!({"refreshToken": unissued}))
        .await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);

    let res = app
        .post("/auth/refresh", json!({"refreshToken": "not.a.token"}))
        .await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.body["message"], "Invalid refresh token");
}

#[tokio::test]
async fn test_refresh_rejects_expired_token_still_in_registry() {
    let app = TestApp::with_ttls(Duration::minutes(15), Duration::zero());
    let (_, refresh_token) = app.signed_in_user("jo@x.com").await;

    let res = app
        .post("/auth/refresh", json!({"refreshToken": refresh_token}))
        .await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_is_idempotent() {
    let app = TestApp::spawn();
    let (_, refresh_token) = app.signed_in_user("jo@x.com").await;

    for body in [
        json!({"refreshToken": refresh_token}),
        json!({"refreshToken": refresh_token}),
        json!({"refreshToken": "never-issued"}),
        json!({}),
    ] {
        let res = app.post("/auth/logout", body).await;
        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.body["message"], "Logged out");
    }

    let res = app.request(Method::POST, "/auth/logout", None, None).await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(app.registry.is_empty());
}

#[tokio::test]
async fn test_concurrent_logins_yield_distinct_sessions() {
    let app = TestApp::spawn();
    app.register("Jo", "jo@x.com", "secret1").await;

    let (first, second) = tokio::join!(
        app.login("jo@x.com", "secret1"),
        app.login("jo@x.com", "secret1")
    );
    let first = first.body["refreshToken"].as_str().unwrap().to_string();
    let second = second.body["refreshToken"].as_str().unwrap().to_string();
    assert_ne!(first, second);
    assert_eq!(app.registry.len(), 2);

    // Logging out one session leaves the other usable
    app.post("/auth/logout", json!({"refreshToken": first})).await;
    let res = app
        .post("/auth/refresh", json!({"refreshToken": second}))
        .await;
    assert_eq!(res.status, StatusCode::OK);
}

#[tokio::test]
async fn test_list_users() {
    let app = TestApp::spawn();
    let (token, _) = app.signed_in_user("jo@x.com").await;
    app.register("Al", "al@x.com", "secret2").await;

    let res = app.get("/users", &token).await;
    assert_eq!(res.status, StatusCode::OK);

    let users = res.body["users"].as_array().unwrap();
    assert_eq!(users.len(), 2);
    for user in users {
        assert!(user.get("password").is_none());
        assert!(user.get("password_hash").is_none());
        assert_eq!(user["role"], "user");
    }
}
