use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use recommendations_feed::api::{create_router, AppState};
use recommendations_feed::db::CacheStore;
use recommendations_feed::models::Recommendation;
use recommendations_feed::services::{
    FetchPipeline, HttpSource, PresentationContext, DEFAULT_LIMIT,
};

async fn get(app: &Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, body.to_vec())
}

async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    let (status, body) = get(app, uri).await;
    (status, serde_json::from_slice(&body).unwrap())
}

/// Runs the whole pipeline against `server` and returns the display router
async fn run_pipeline(server: &MockServer, store: CacheStore) -> Router {
    run_pipeline_with_state(server, store, AppState::new()).await
}

async fn run_pipeline_with_state(server: &MockServer, store: CacheStore, state: AppState) -> Router {
    let (presentation, handle) = PresentationContext::spawn(state.clone());

    let source = HttpSource::new(format!("{}/recommendations", server.uri()));
    let pipeline = FetchPipeline::new(Arc::new(source), store, presentation, DEFAULT_LIMIT);

    pipeline.start().await.unwrap();
    handle.shutdown().await.unwrap();

    create_router(state)
}

#[tokio::test]
async fn test_health_check() {
    let app = create_router(AppState::new());
    let (status, body) = get_json(&app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_empty_state_before_any_snapshot() {
    let app = create_router(AppState::new());
    let (status, body) = get_json(&app, "/api/v1/recommendations").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["recommendations"], json!([]));
    assert_eq!(body["updated_at"], Value::Null);
}

#[tokio::test]
async fn test_network_refresh_replaces_cached_snapshot() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/recommendations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "titles": [
                { "title": "A", "rating": 9, "is_released": true },
                { "title": "B", "rating": 5, "is_released": true },
                { "title": "C", "rating": 1 }
            ],
            "skipped": [],
            "titles_owned": ["B"]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let store = CacheStore::new(dir.path());
    store
        .save(&[Recommendation {
            title: "Stale".to_string(),
            rating: 4.0,
            is_released: true,
            ..Default::default()
        }])
        .unwrap();

    let app = run_pipeline(&server, store.clone()).await;
    let (status, body) = get_json(&app, "/api/v1/recommendations").await;

    assert_eq!(status, StatusCode::OK);
    let recommendations = body["recommendations"].as_array().unwrap();
    assert_eq!(recommendations.len(), 1);
    assert_eq!(recommendations[0]["title"], "A");
    assert_eq!(recommendations[0]["rating"], 9.0);
    assert_eq!(recommendations[0]["isReleased"], true);
    assert!(body["updated_at"].is_string());

    let cached = store.load().unwrap();
    assert_eq!(cached.len(), 1);
    assert_eq!(cached[0].title, "A");
}

#[tokio::test]
async fn test_envelope_with_error_status_is_still_published() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/recommendations"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "titles": [
                { "title": "A", "rating": 9, "is_released": true },
                { "title": "B", "rating": 5, "is_released": true },
                { "title": "C", "rating": 1 }
            ],
            "skipped": [],
            "titles_owned": ["B"]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let store = CacheStore::new(dir.path());

    let app = run_pipeline(&server, store.clone()).await;
    let (_, body) = get_json(&app, "/api/v1/recommendations").await;

    let recommendations = body["recommendations"].as_array().unwrap();
    assert_eq!(recommendations.len(), 1);
    assert_eq!(recommendations[0]["title"], "A");
    assert_eq!(store.load().map(|items| items.len()), Some(1));
}

#[tokio::test]
async fn test_non_object_title_keeps_cached_snapshot() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/recommendations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "titles": [1, { "title": "X", "rating": 2, "is_released": true }],
            "skipped": [],
            "titles_owned": []
        })))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let store = CacheStore::new(dir.path());
    let cached = vec![Recommendation {
        title: "Cached".to_string(),
        rating: 5.0,
        is_released: true,
        ..Default::default()
    }];
    store.save(&cached).unwrap();

    let app = run_pipeline(&server, store.clone()).await;
    let (_, body) = get_json(&app, "/api/v1/recommendations").await;

    assert_eq!(body["recommendations"].as_array().unwrap().len(), 1);
    assert_eq!(body["recommendations"][0]["title"], "Cached");
    assert_eq!(store.load(), Some(cached));
}

#[tokio::test]
async fn test_failed_refresh_keeps_cached_snapshot() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/recommendations"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let store = CacheStore::new(dir.path());
    let cached = vec![Recommendation {
        title: "Cached".to_string(),
        tagline: "Still here".to_string(),
        rating: 6.5,
        is_released: true,
        ..Default::default()
    }];
    store.save(&cached).unwrap();

    let app = run_pipeline(&server, store.clone()).await;
    let (_, body) = get_json(&app, "/api/v1/recommendations").await;

    assert_eq!(body["recommendations"][0]["title"], "Cached");
    assert_eq!(body["recommendations"][0]["tagline"], "Still here");
    assert_eq!(store.load(), Some(cached));
}

#[tokio::test]
async fn test_recommendation_image_proxy() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/recommendations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "titles": [{
                "title": "Poster",
                "rating": 7.5,
                "is_released": true,
                "image": format!("{}/images/poster.png", server.uri())
            }],
            "skipped": [],
            "titles_owned": []
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/images/poster.png"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "image/png")
                .set_body_bytes(vec![1u8, 2, 3, 4]),
        )
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    // The mock image server listens on loopback
    let state = AppState::new().allow_private_image_hosts(true);
    let app = run_pipeline_with_state(&server, CacheStore::new(dir.path()), state).await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/v1/recommendations/0/image")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "image/png");
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(bytes.to_vec(), vec![1u8, 2, 3, 4]);

    let (status, body) = get_json(&app, "/api/v1/recommendations/5/image").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("index 5"));
}

#[tokio::test]
async fn test_recommendation_image_invalid_url() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/recommendations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "titles": [{ "title": "No image", "rating": 3, "is_released": true }],
            "skipped": [],
            "titles_owned": []
        })))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let app = run_pipeline(&server, CacheStore::new(dir.path())).await;

    let (status, _) = get_json(&app, "/api/v1/recommendations/0/image").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_image_proxy_refuses_loopback_hosts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/recommendations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "titles": [{
                "title": "Internal",
                "rating": 7,
                "is_released": true,
                "image": format!("http://127.0.0.1:{}/internal/secret", server.address().port())
            }],
            "skipped": [],
            "titles_owned": []
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/internal/secret"))
        .respond_with(ResponseTemplate::new(200).set_body_string("secret"))
        .expect(0)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let app = run_pipeline(&server, CacheStore::new(dir.path())).await;

    let (status, body) = get_json(&app, "/api/v1/recommendations/0/image").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert!(body["error"].as_str().unwrap().contains("invalid image URL"));
}
