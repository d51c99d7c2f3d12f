#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, header};
use axum::response::Response;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use sqlx::sqlite::SqlitePoolOptions;
use tower::ServiceExt;

use rentals_api::db;
use rentals_api::routes::routes::app;
use rentals_api::services::rental_service::RentalService;
use rentals_api::state::AppState;

pub const JSON_API: &str = "application/vnd.api+json";
pub const BASE_URL: &str = "http://rentals.test";

/// Build the full application router over a fresh in-memory database.
///
/// A single connection keeps every request on the same in-memory schema.
pub async fn build_test_app() -> Router {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite");
    db::run_migrations(&pool).await.expect("migrations");

    let state = AppState::new(
        RentalService::new(Arc::new(pool)),
        Some(BASE_URL.to_string()),
    );
    app(state)
}

/// Attributes of the standard fixture rental.
pub fn mansion() -> Value {
    json!({
        "title": "Grand Old Mansion",
        "owner": "Veruca Salt",
        "city": "San Francisco",
        "category": "Estate",
        "image": "https://upload.wikimedia.org/wikipedia/commons/c/cb/Crane_estate_(5).jpg",
        "bedrooms": 15,
        "description": "This grand old mansion sits on over 100 acres of rolling hills and dense redwood forests."
    })
}

/// Wrap attributes in a JSON:API write document.
pub fn document(attributes: Value) -> Value {
    json!({ "data": { "type": "rentals", "attributes": attributes } })
}

pub async fn send(app: Router, method: Method, uri: &str, body: Option<Value>) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, JSON_API);
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };
    app.oneshot(builder.body(body).unwrap()).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, Method::GET, uri, None).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response {
    send(app, Method::POST, uri, Some(body)).await
}

pub async fn patch_json(app: Router, uri: &str, body: Value) -> Response {
    send(app, Method::PATCH, uri, Some(body)).await
}

pub async fn delete(app: Router, uri: &str) -> Response {
    send(app, Method::DELETE, uri, None).await
}

/// Collect a response body as JSON, or `Value::Null` when it is empty.
pub async fn body_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&bytes).expect("response body should be JSON")
}

/// Number of rentals currently listed.
pub async fn rental_count(app: Router) -> usize {
    let json = body_json(get(app, "/rentals").await).await;
    json["data"].as_array().expect("data should be an array").len()
}

/// Create the fixture rental and return its id.
pub async fn create_mansion(app: Router) -> String {
    let json = body_json(post_json(app, "/rentals", document(mansion())).await).await;
    json["data"]["id"].as_str().expect("id should be a string").to_string()
}
