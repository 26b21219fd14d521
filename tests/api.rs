// Copyright (c) MySocial Team
// SPDX-License-Identifier: Apache-2.0

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use recruit_hub::api::{build_router, AppState};
use recruit_hub::config::Config;
use recruit_hub::notify::RecordingNotifier;
use recruit_hub::storage::MemoryObjectStorage;
use recruit_hub::store::{collections, DocumentStore, Fields, MemoryStore};

fn app(store: Arc<MemoryStore>) -> Router {
    let state = AppState::new(
        store,
        Arc::new(MemoryObjectStorage::new("https://files.test")),
        Arc::new(RecordingNotifier::new()),
        &Config::defaults(),
    );
    build_router(state, true)
}

fn request(method: Method, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("x-user-id", "p1")
        .header("x-account-type", "player");
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[test]
fn health_reports_a_reachable_store() {
    let app = app(Arc::new(MemoryStore::new()));
    let (status, body) = tokio_test::block_on(send(app, request(Method::GET, "/health", None)));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[test_log::test(tokio::test)]
async fn plans_can_be_created_and_duplicated() {
    let app = app(Arc::new(MemoryStore::new()));

    let (status, body) = send(
        app.clone(),
        request(
            Method::POST,
            "/api/plans",
            Some(json!({ "name": "الفضية", "nameEn": "Silver", "price": "75.5", "duration": 30 })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = send(app.clone(), request(Method::POST, &format!("/api/plans/{}/duplicate", id), None)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["duration"], 90);
    assert_eq!(body["data"]["isActive"], false);

    let (status, body) = send(app.clone(), request(Method::GET, "/api/plans", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().map(Vec::len), Some(2));

    let (status, _) = send(app, request(Method::GET, "/api/plans/missing", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[test_log::test(tokio::test)]
async fn step_submission_reports_field_errors() {
    let app = app(Arc::new(MemoryStore::new()));

    let (status, body) = send(
        app,
        request(
            Method::POST,
            "/api/players/p1/steps/personal",
            Some(json!({ "full_name": "Ali", "birth_date": "not a date" })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["success"], false);
    assert!(body["fields"]["birth_date"].is_string());
    assert!(body["fields"]["city"].is_string());
}

#[test_log::test(tokio::test)]
async fn strangers_see_masked_phone_numbers() {
    let store = Arc::new(MemoryStore::new());
    let doc: Fields = json!({ "full_name": "Ali", "phone": "+966500000000" })
        .as_object()
        .cloned()
        .unwrap();
    store.upsert(collections::PLAYERS, "p2", doc).await.unwrap();

    let (status, body) = send(app(store.clone()), request(Method::GET, "/api/players/p2", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["profile"]["phone"], "محجوب");

    let owner = Request::builder()
        .uri("/api/players/p2")
        .header("x-user-id", "p2")
        .body(Body::empty())
        .unwrap();
    let (_, body) = send(app(store), owner).await;
    assert_eq!(body["data"]["profile"]["phone"], "+966500000000");
}

#[test_log::test(tokio::test)]
async fn only_organizations_create_players() {
    let (status, _) = send(
        app(Arc::new(MemoryStore::new())),
        request(Method::POST, "/api/players", Some(json!({ "full_name": "Ali" }))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[test_log::test(tokio::test)]
async fn countries_and_directory_are_served() {
    let app = app(Arc::new(MemoryStore::new()));

    let (status, body) = send(app.clone(), request(Method::GET, "/api/geo/countries", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"].as_array().is_some_and(|c| !c.is_empty()));

    let (status, body) = send(app, request(Method::GET, "/api/players?age=all&page=2", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], 0);
    assert_eq!(body["data"]["page"], 2);
}
