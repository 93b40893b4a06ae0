//! REST API behavior exercised against the bare [`Router`].
//!
//! [`Router`]: axum::Router

use std::sync::Arc;

use application::{api, config};
use axum::{body::Body, Extension, Router};
use http_body_util::BodyExt as _;
use tower::ServiceExt as _;

/// Builds the [`Router`] with the default session configuration.
fn test_router() -> Router {
    api::router().layer(Extension(Arc::new(config::Session::default())))
}

/// Reads the response body as JSON.
async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn unauthenticated_profile_request_is_rejected() {
    let response = test_router()
        .oneshot(
            http::Request::get("/api/auth/me")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), http::StatusCode::UNAUTHORIZED);

    let json = body_json(response).await;
    assert_eq!(json["code"], "AUTHORIZATION_REQUIRED");
}

#[tokio::test]
async fn unauthenticated_logout_is_rejected() {
    let response = test_router()
        .oneshot(
            http::Request::post("/api/auth/logout")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), http::StatusCode::UNAUTHORIZED);

    let json = body_json(response).await;
    assert_eq!(json["code"], "AUTHORIZATION_REQUIRED");
}

#[tokio::test]
async fn malformed_authorization_header_is_a_bad_request() {
    let response = test_router()
        .oneshot(
            http::Request::get("/api/auth/me")
                .header(http::header::AUTHORIZATION, "Basic not-a-bearer")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), http::StatusCode::BAD_REQUEST);
}
