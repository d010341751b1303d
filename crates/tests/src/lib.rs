//! Helpers shared by the HTTP integration tests.

use axum::body::{to_bytes, Body};
use axum::http::{Request, Response};
use campus_api::{build_app, ApiConfig};
use serde_json::Value;

pub async fn test_app() -> axum::Router {
    build_app(&ApiConfig::default())
        .await
        .expect("app should build")
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("valid request")
}

pub fn post_json(uri: &str, payload: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .expect("valid request")
}

pub async fn json_body(response: Response<Body>) -> Value {
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    serde_json::from_slice(&body).expect("body should be json")
}
