use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use configs::AppConfig;
use serde_json::{json, Value};
use service::storage::{JsonFileStore, LensStorage, MemoryStore};
use tower::ServiceExt;

const ALLOWED: &str = "http://localhost:3000";

fn strict_config() -> AppConfig {
    AppConfig::default()
}

fn permissive_config() -> AppConfig {
    let mut cfg = AppConfig::default();
    cfg.cors.allow_any_origin = true;
    cfg
}

fn app(cfg: &AppConfig, storage: Arc<dyn LensStorage>) -> Router {
    server::build_app(cfg, storage).expect("build app")
}

fn request(method: Method, uri: &str, body: Option<&Value>, origin: Option<&str>) -> anyhow::Result<Request<Body>> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(o) = origin {
        builder = builder.header(header::ORIGIN, o);
    }
    let req = match body {
        Some(v) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(v)?))?,
        None => builder.body(Body::empty())?,
    };
    Ok(req)
}

async fn send_req(app: &Router, req: Request<Body>) -> anyhow::Result<(StatusCode, Value)> {
    let resp = app.clone().oneshot(req).await?;
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await?;
    let body = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes)? };
    Ok((status, body))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> anyhow::Result<(StatusCode, Value)> {
    send_req(app, request(method, uri, body.as_ref(), None)?).await
}

fn lens(v: Value) -> service::Lens {
    v.as_object().cloned().expect("object")
}

#[tokio::test]
async fn create_get_delete_scenario() -> anyhow::Result<()> {
    let app = app(&strict_config(), Arc::new(MemoryStore::new()));

    let (status, created) = send(&app, Method::POST, "/lenses", Some(json!({"brand": "Canon"}))).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["brand"], "Canon");
    let id = created["id"].as_str().expect("generated id").to_string();
    assert!(!id.is_empty());

    let (status, fetched) = send(&app, Method::GET, &format!("/lenses/{id}"), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    let (status, body) = send(&app, Method::DELETE, &format!("/lenses/{id}"), None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "Lens deleted"}));

    let (status, body) = send(&app, Method::GET, &format!("/lenses/{id}"), None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"message": "Lens not found"}));
    Ok(())
}

#[tokio::test]
async fn absent_data_file_lists_empty() -> anyhow::Result<()> {
    let path = std::env::temp_dir()
        .join(format!("lens_api_{}", uuid::Uuid::new_v4()))
        .join("lenses.json");
    let app = app(&strict_config(), Arc::new(JsonFileStore::new(path)));

    let (status, body) = send(&app, Method::GET, "/lenses", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
    Ok(())
}

#[tokio::test]
async fn list_keeps_insertion_order() -> anyhow::Result<()> {
    let app = app(&strict_config(), Arc::new(MemoryStore::new()));
    for brand in ["Sony", "Canon", "Nikon"] {
        send(&app, Method::POST, "/lenses", Some(json!({"brand": brand}))).await?;
    }
    let (_, body) = send(&app, Method::GET, "/lenses", None).await?;
    let brands: Vec<&str> = body.as_array().unwrap().iter().filter_map(|l| l["brand"].as_str()).collect();
    assert_eq!(brands, vec!["Sony", "Canon", "Nikon"]);
    Ok(())
}

#[tokio::test]
async fn create_ignores_client_id() -> anyhow::Result<()> {
    let app = app(&strict_config(), Arc::new(MemoryStore::new()));
    let (status, created) = send(&app, Method::POST, "/lenses", Some(json!({"id": "mine", "mm": 35}))).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_ne!(created["id"], "mine");
    Ok(())
}

#[tokio::test]
async fn update_merges_fields() -> anyhow::Result<()> {
    let store = Arc::new(MemoryStore::with_lenses(vec![lens(json!({"id": "1", "brand": "Sony", "mm": 50}))]));
    let app = app(&strict_config(), store.clone());

    let (status, body) = send(&app, Method::PUT, "/lenses/1", Some(json!({"mm": 85}))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"id": "1", "brand": "Sony", "mm": 85}));
    assert_eq!(store.snapshot().await, vec![lens(json!({"id": "1", "brand": "Sony", "mm": 85}))]);
    Ok(())
}

#[tokio::test]
async fn update_refuses_id_change() -> anyhow::Result<()> {
    let store = Arc::new(MemoryStore::with_lenses(vec![lens(json!({"id": "1", "brand": "Sony"}))]));
    let app = app(&strict_config(), store.clone());

    let (status, body) = send(&app, Method::PUT, "/lenses/1", Some(json!({"id": "2"}))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"message": "lens id cannot be changed"}));
    assert_eq!(store.save_count(), 0);
    Ok(())
}

#[tokio::test]
async fn unknown_id_is_404_everywhere() -> anyhow::Result<()> {
    let store = Arc::new(MemoryStore::with_lenses(vec![lens(json!({"id": "1"}))]));
    let app = app(&strict_config(), store.clone());
    let not_found = json!({"message": "Lens not found"});

    assert_eq!(send(&app, Method::GET, "/lenses/9", None).await?, (StatusCode::NOT_FOUND, not_found.clone()));
    assert_eq!(
        send(&app, Method::PUT, "/lenses/9", Some(json!({"mm": 1}))).await?,
        (StatusCode::NOT_FOUND, not_found.clone())
    );
    assert_eq!(
        send(&app, Method::PUT, "/lenses/9", Some(json!({"id": "x"}))).await?,
        (StatusCode::NOT_FOUND, not_found.clone())
    );
    assert_eq!(send(&app, Method::DELETE, "/lenses/9", None).await?, (StatusCode::NOT_FOUND, not_found));
    assert_eq!(store.save_count(), 0);
    assert_eq!(store.snapshot().await.len(), 1);
    Ok(())
}

#[tokio::test]
async fn failed_write_is_a_500() -> anyhow::Result<()> {
    let store = Arc::new(MemoryStore::with_lenses(vec![lens(json!({"id": "1"}))]));
    store.set_fail_saves(true);
    let app = app(&strict_config(), store.clone());
    let storage_error = json!({"message": "Storage error"});

    assert_eq!(
        send(&app, Method::POST, "/lenses", Some(json!({"brand": "Canon"}))).await?,
        (StatusCode::INTERNAL_SERVER_ERROR, storage_error.clone())
    );
    assert_eq!(
        send(&app, Method::PUT, "/lenses/1", Some(json!({"mm": 85}))).await?,
        (StatusCode::INTERNAL_SERVER_ERROR, storage_error.clone())
    );
    assert_eq!(
        send(&app, Method::DELETE, "/lenses/1", None).await?,
        (StatusCode::INTERNAL_SERVER_ERROR, storage_error)
    );
    assert_eq!(store.snapshot().await, vec![lens(json!({"id": "1"}))]);
    Ok(())
}

#[tokio::test]
async fn corrupt_data_file_is_a_500() -> anyhow::Result<()> {
    let dir = std::env::temp_dir().join(format!("lens_api_{}", uuid::Uuid::new_v4()));
    tokio::fs::create_dir_all(&dir).await?;
    let path = dir.join("lenses.json");
    tokio::fs::write(&path, b"not json").await?;
    let app = app(&strict_config(), Arc::new(JsonFileStore::new(&path)));

    let (status, body) = send(&app, Method::GET, "/lenses", None).await?;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"message": "Storage error"}));
    let _ = tokio::fs::remove_dir_all(&dir).await;
    Ok(())
}

#[tokio::test]
async fn body_must_be_a_json_object() -> anyhow::Result<()> {
    let app = app(&strict_config(), Arc::new(MemoryStore::new()));

    let (status, body) = send(&app, Method::POST, "/lenses", Some(json!([1, 2]))).await?;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["message"].is_string());

    let req = Request::builder()
        .method(Method::POST)
        .uri("/lenses")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"brand\":"))?;
    let (status, body) = send_req(&app, req).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());
    Ok(())
}

#[tokio::test]
async fn oversized_body_is_rejected() -> anyhow::Result<()> {
    let mut cfg = strict_config();
    cfg.limits.max_body_bytes = 64;
    let store = Arc::new(MemoryStore::new());
    let app = app(&cfg, store.clone());

    let big = "x".repeat(256);
    let (status, _) = send(&app, Method::POST, "/lenses", Some(json!({"notes": big}))).await?;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(store.save_count(), 0);
    Ok(())
}

#[tokio::test]
async fn disallowed_origin_never_reaches_store() -> anyhow::Result<()> {
    let store = Arc::new(MemoryStore::new());
    let app = app(&strict_config(), store.clone());

    let req = request(Method::POST, "/lenses", Some(&json!({"brand": "Canon"})), Some("http://evil.example"))?;
    let (status, body) = send_req(&app, req).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, json!({"message": "Origin not allowed"}));
    assert_eq!(store.save_count(), 0);
    Ok(())
}

#[tokio::test]
async fn allowed_origin_gets_cors_headers() -> anyhow::Result<()> {
    let app = app(&strict_config(), Arc::new(MemoryStore::new()));

    let req = request(Method::POST, "/lenses", Some(&json!({"brand": "Canon"})), Some(ALLOWED))?;
    let resp = app.clone().oneshot(req).await?;
    assert_eq!(resp.status(), StatusCode::CREATED);
    assert_eq!(
        resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).and_then(|v| v.to_str().ok()),
        Some(ALLOWED)
    );

    let preflight = Request::builder()
        .method(Method::OPTIONS)
        .uri("/lenses")
        .header(header::ORIGIN, ALLOWED)
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "PUT")
        .body(Body::empty())?;
    let resp = app.clone().oneshot(preflight).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key(header::ACCESS_CONTROL_ALLOW_METHODS));
    Ok(())
}

#[tokio::test]
async fn permissive_config_accepts_any_origin() -> anyhow::Result<()> {
    let app = app(&permissive_config(), Arc::new(MemoryStore::new()));

    let req = request(Method::GET, "/lenses", None, Some("http://anywhere.example"))?;
    let resp = app.clone().oneshot(req).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).and_then(|v| v.to_str().ok()),
        Some("*")
    );
    Ok(())
}

#[tokio::test]
async fn welcome_and_health() -> anyhow::Result<()> {
    let app = app(&strict_config(), Arc::new(MemoryStore::new()));

    let resp = app.clone().oneshot(request(Method::GET, "/", None, None)?).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await?;
    assert_eq!(&bytes[..], b"Welcome to the Lens API");

    let (status, body) = send(&app, Method::GET, "/health", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
    Ok(())
}

#[tokio::test]
async fn metrics_count_operations() -> anyhow::Result<()> {
    let app = app(&strict_config(), Arc::new(MemoryStore::new()));
    send(&app, Method::GET, "/lenses/none", None).await?;

    let resp = app.clone().oneshot(request(Method::GET, "/metrics", None, None)?).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await?;
    let text = String::from_utf8(bytes.to_vec())?;
    assert!(text.contains("lens_api_operations_total"));
    Ok(())
}
