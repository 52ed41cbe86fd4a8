//! Test helpers for directory-service integration tests.
//!
//! Builds the full router over in-memory backends and drives it with
//! `tower::ServiceExt::oneshot`, so no database or Redis is needed.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::Duration;
use directory_service::{
    build_router,
    config::{DirectoryConfig, Environment, JwtConfig, RegistryConfig, SecurityConfig},
    services::{InMemoryRegistry, JwtService, MemoryDatabase},
    AppState,
};
use serde_json::Value;
use std::sync::Arc;
use tower::util::ServiceExt;

pub const TEST_JWT_SECRET: &str = "integration-test-secret-at-least-32-bytes";

pub fn test_config() -> DirectoryConfig {
    DirectoryConfig {
        common: service_core::config::Config { port: 0 },
        environment: Environment::Dev,
        service_name: "directory-service".to_string(),
        service_version: "test".to_string(),
        log_level: "error".to_string(),
        otlp_endpoint: None,
        database: None,
        redis: None,
        jwt: JwtConfig {
            secret: TEST_JWT_SECRET.to_string(),
            access_token_expiry_minutes: 15,
            refresh_token_expiry_days: 7,
        },
        registry: RegistryConfig {
            sweep_interval_seconds: 300,
        },
        security: SecurityConfig {
            allowed_origins: vec!["http://localhost:5173".to_string()],
        },
    }
}

/// Test application over fresh in-memory stores.
pub struct TestApp {
    pub router: Router,
    pub jwt: JwtService,
    pub registry: Arc<InMemoryRegistry>,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Value,
}

impl TestApp {
    pub fn spawn() -> Self {
        Self::with_jwt(JwtService::new(&test_config().jwt).expect("Failed to create JWT service"))
    }

    /// Use a custom token service, e.g. one with zero TTLs.
    pub fn with_jwt(jwt: JwtService) -> Self {
        let db = Arc::new(MemoryDatabase::new());
        let registry = Arc::new(InMemoryRegistry::new());

        let state = AppState::new(
            test_config(),
            jwt.clone(),
            db.clone(),
            db.clone(),
            db,
            registry.clone(),
        );

        Self {
            router: build_router(state),
            jwt,
            registry,
        }
    }

    pub fn with_ttls(access: Duration, refresh: Duration) -> Self {
        Self::with_jwt(JwtService::with_ttls(
            TEST_JWT_SECRET.as_bytes(),
            access,
            refresh,
        ))
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        self.send(builder.body(body).unwrap()).await
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn post(&self, uri: &str, body: Value) -> TestResponse {
        self.request(Method::POST, uri, None, Some(body)).await
    }

    pub async fn get(&self, uri: &str, token: &str) -> TestResponse {
        self.request(Method::GET, uri, Some(token), None).await
    }

    pub async fn register(&self, name: &str, email: &str, password: &str) -> TestResponse {
        self.post(
            "/auth/register",
            serde_json::json!({"name": name, "email": email, "password": password}),
        )
        .await
    }

    pub async fn login(&self, email: &str, password: &str) -> TestResponse {
        self.post(
            "/auth/login",
            serde_json::json!({"email": email, "password": password}),
        )
        .await
    }

    /// Register and log in; returns `(access token, refresh token)`.
    pub async fn signed_in_user(&self, email: &str) -> (String, String) {
        let res = self.register("Jo", email, "secret1").await;
        assert_eq!(res.status, StatusCode::CREATED, "register failed: {}", res.body);

        let res = self.login(email, "secret1").await;
        assert_eq!(res.status, StatusCode::OK, "login failed: {}", res.body);

        (
            res.body["token"].as_str().unwrap().to_string(),
            res.body["refreshToken"].as_str().unwrap().to_string(),
        )
    }
}
