#![allow(dead_code)]

use super::mocks::{FakeBlobStore, FakeImageModel, FakeSchemaClient};
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, Response},
};
use imagegen_gateway::{
    config::Credentials,
    server::{self, handlers::AppState},
};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt; // for `oneshot`

pub const DEFAULT_MODEL: &str = "@cf/black-forest-labs/flux-1-schnell";

/// Base64 of the three bytes `FF D8 FF`, the start of a JPEG.
pub const JPEG_B64: &str = "/9j/";

/// Shared handles to the fakes behind a test router.
pub struct TestApp {
    pub router: Router,
    pub model: Arc<FakeImageModel>,
    pub store: Arc<FakeBlobStore>,
    pub schema: Arc<FakeSchemaClient>,
}

pub fn test_credentials() -> Credentials {
    Credentials {
        account_id: Some("test-account".to_string()),
        api_token: Some("test-token".to_string()),
    }
}

pub fn create_test_app(
    model: FakeImageModel,
    store: FakeBlobStore,
    schema: FakeSchemaClient,
    credentials: Credentials,
) -> TestApp {
    let model = Arc::new(model);
    let store = Arc::new(store);
    let schema = Arc::new(schema);

    let state = AppState {
        image_model: model.clone(),
        store: store.clone(),
        schema_client: schema.clone(),
        credentials,
        default_model: DEFAULT_MODEL.to_string(),
        page_size: 500,
    };

    TestApp {
        router: server::router(state),
        model,
        store,
        schema,
    }
}

/// App whose collaborators all succeed with defaults.
pub fn create_default_app() -> TestApp {
    create_test_app(
        FakeImageModel::returning(json!({ "image": JPEG_B64 })),
        FakeBlobStore::new(),
        FakeSchemaClient::returning(json!({})),
        test_credentials(),
    )
}

pub async fn send(router: &Router, request: Request<Body>) -> Response<Body> {
    router.clone().oneshot(request).await.unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub async fn body_text(response: Response<Body>) -> String {
    String::from_utf8(body_bytes(response).await).unwrap()
}

pub fn content_type<B>(response: &Response<B>) -> Option<String> {
    response
        .headers()
        .get("content-type")
        .map(|v| v.to_str().unwrap().to_string())
}
