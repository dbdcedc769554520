use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use docflow::api::models::JobAcceptedResponse;
use docflow::api::state::AppState;
use docflow::config::Config;
use docflow::domain::JobState;
use docflow::ledger::FjallStore;
use docflow::observability::Metrics;
use docflow::queue::FjallQueue;
use docflow::storage::StorageClient;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt; // for `oneshot`

/// Builds a test app with isolated, temp-dir-backed dependencies.
async fn build_test_app() -> (Router, TempDir) {
    let temp_dir = TempDir::new().expect("failed to create temp dir");

    let ledger = Arc::new(
        FjallStore::open(temp_dir.path().join("ledger")).expect("failed to open test ledger"),
    );
    let queue = Arc::new(
        FjallQueue::open(temp_dir.path().join("queue")).expect("failed to open test queue"),
    );
    let storage = Arc::new(StorageClient::new(temp_dir.path().join("blobs")));
    let metrics = Arc::new(Metrics::new());

    let mut config = Config {
        server: Default::default(),
        adapters: Default::default(),
        worker: Default::default(),
        retention: Default::default(),
        telemetry: Default::default(),
    };
    config.server.max_upload_bytes = docflow::humanize::ByteSize(1024);
    let config = Arc::new(config);

    let state = AppState::new(config, ledger, queue, storage, metrics);

    let app = Router::new()
        .route("/jobs", axum::routing::post(docflow::api::services::ingest_job))
        .route("/jobs/{job_id}", axum::routing::get(docflow::api::services::get_job))
        .route("/health", axum::routing::get(docflow::api::services::health))
        .with_state(state);

    (app, temp_dir)
}

/// Builds a raw `multipart/form-data` body with a single `file` field,
/// since axum's `Multipart` extractor only needs the wire format, not a
/// real HTTP client.
fn multipart_body(file_name: &str, content_type: &str, data: &[u8]) -> (String, Vec<u8>) {
    let boundary = "docflow-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\n").as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    (boundary.to_string(), body)
}

fn post_job_request(file_name: &str, data: &[u8]) -> Request<Body> {
    let (boundary, body) = multipart_body(file_name, "application/pdf", data);
    Request::builder()
        .uri("/jobs")
        .method("POST")
        .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={boundary}"))
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn test_ingest_job_success() {
    let (app, _temp_dir) = build_test_app().await;

    let request = post_job_request("invoice_001.pdf", b"%PDF-1.4 fake invoice bytes");
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let job: JobAcceptedResponse = serde_json::from_slice(&body).unwrap();

    assert!(!job.job_id.is_empty());
    assert_eq!(job.file_name, "invoice_001.pdf");
}

#[tokio::test]
async fn test_ingest_job_idempotency() {
    let (app, _temp_dir) = build_test_app().await;

    let build_request = || {
        let (boundary, body) = multipart_body("invoice_001.pdf", "application/pdf", b"same bytes");
        Request::builder()
            .uri("/jobs")
            .method("POST")
            .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={boundary}"))
            .header("X-Docflow-Idempotency-Key", "test-key-123")
            .body(Body::from(body))
            .unwrap()
    };

    let response1 = ServiceExt::<Request<Body>>::oneshot(app.clone(), build_request()).await.unwrap();
    assert_eq!(response1.status(), StatusCode::ACCEPTED);
    let body1 = axum::body::to_bytes(response1.into_body(), usize::MAX).await.unwrap();
    let job1: JobAcceptedResponse = serde_json::from_slice(&body1).unwrap();

    let response2 = ServiceExt::<Request<Body>>::oneshot(app, build_request()).await.unwrap();
    assert_eq!(response2.status(), StatusCode::ACCEPTED);
    let body2 = axum::body::to_bytes(response2.into_body(), usize::MAX).await.unwrap();
    let job2: JobAcceptedResponse = serde_json::from_slice(&body2).unwrap();

    assert_eq!(job1.job_id, job2.job_id);
}

#[tokio::test]
async fn test_ingest_job_missing_file_field() {
    let (app, _temp_dir) = build_test_app().await;

    let boundary = "docflow-test-boundary";
    let body = format!("--{boundary}--\r\n");
    let request = Request::builder()
        .uri("/jobs")
        .method("POST")
        .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={boundary}"))
        .body(Body::from(body))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_ingest_job_rejects_path_traversal_file_name() {
    let (app, _temp_dir) = build_test_app().await;

    let request = post_job_request("../../etc/passwd", b"data");
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_ingest_job_rejects_oversized_upload() {
    let (app, _temp_dir) = build_test_app().await;

    // Test config caps max_upload_bytes at 1024; send more than that.
    let oversized = vec![0u8; 2048];
    let request = post_job_request("big.pdf", &oversized);
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_get_job_success() {
    let (app, _temp_dir) = build_test_app().await;

    let ingest_request = post_job_request("invoice_001.pdf", b"bytes");
    let ingest_response = ServiceExt::<Request<Body>>::oneshot(app.clone(), ingest_request).await.unwrap();
    let ingest_body = axum::body::to_bytes(ingest_response.into_body(), usize::MAX).await.unwrap();
    let job: JobAcceptedResponse = serde_json::from_slice(&ingest_body).unwrap();

    let get_request = Request::builder()
        .uri(format!("/jobs/{}", job.job_id))
        .method("GET")
        .body(Body::empty())
        .unwrap();
    let get_response = ServiceExt::<Request<Body>>::oneshot(app, get_request).await.unwrap();

    assert_eq!(get_response.status(), StatusCode::OK);

    let get_body = axum::body::to_bytes(get_response.into_body(), usize::MAX).await.unwrap();
    let state: JobState = serde_json::from_slice(&get_body).unwrap();
    assert!(matches!(state, JobState::Queued));
}

#[tokio::test]
async fn test_get_job_not_found() {
    let (app, _temp_dir) = build_test_app().await;

    let request = Request::builder()
        .uri("/jobs/nonexistent-job-id")
        .method("GET")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health_endpoint() {
    let (app, _temp_dir) = build_test_app().await;

    let request = Request::builder().uri("/health").method("GET").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let health: serde_json::Value = serde_json::from_slice(&body).unwrap();

    assert_eq!(health.get("status").and_then(|v| v.as_str()), Some("healthy"));
    let components = health.get("components").unwrap().as_object().unwrap();
    assert!(components.contains_key("api"));
    assert!(components.contains_key("ledger"));
    assert!(components.contains_key("queue"));
    assert!(components.contains_key("storage"));
}
