//! End-to-end tests of the HTTP surface with an in-memory uploader

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use h5pmake::{Packager, TemplateLoader, unpack_entries};
use h5pmake_publish::{MemoryUploader, Publisher};
use h5pmake_server::{AppState, create_router};
use serde_json::{Value, json};
use tempfile::{TempDir, tempdir};
use tower::ServiceExt;
use tower_http::cors::CorsLayer;

struct TestApp {
    router: Router,
    uploader: Arc<MemoryUploader>,
    scratch: TempDir,
}

fn templates_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../templates")
}

fn test_app(uploader: MemoryUploader) -> TestApp {
    let scratch = tempdir().unwrap();
    let uploader = Arc::new(uploader);
    let publisher = Publisher::new(
        TemplateLoader::new(templates_root()),
        Packager::new(scratch.path()),
        uploader.clone(),
        Duration::from_secs(10),
    );
    let router = create_router(AppState { publisher }, CorsLayer::permissive());
    TestApp {
        router,
        uploader,
        scratch,
    }
}

impl TestApp {
    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    async fn get(&self, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        self.send(request).await
    }

    fn scratch_is_empty(&self) -> bool {
        std::fs::read_dir(self.scratch.path()).unwrap().next().is_none()
    }

    fn uploaded_json(&self, key: &str, entry: &str) -> Value {
        let file = self.uploader.get(key).unwrap();
        let entries = unpack_entries(&file.bytes).unwrap();
        let entry = entries.iter().find(|e| e.name == entry).unwrap();
        serde_json::from_slice(&entry.contents).unwrap()
    }
}

fn crossword_body(title: &str) -> Value {
    json!({
        "title": title,
        "description": "Name the planets",
        "words": [
            {"fixWord": false, "orientation": "across", "clue": "Red planet", "answer": "Mars"},
            {"fixWord": false, "orientation": "down", "clue": "Gas giant", "answer": "Jupiter"}
        ]
    })
}

#[tokio::test]
async fn test_health() {
    let app = test_app(MemoryUploader::new());
    let (status, body) = app.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], json!("healthy"));
}

#[tokio::test]
async fn test_generate_wordlist() {
    let app = test_app(MemoryUploader::new());
    let (status, body) = app.post("/generate/wordlist", crossword_body("Planets")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
    assert!(body["url"].as_str().unwrap().starts_with("memory://"));
    assert_eq!(body["fileName"], json!("modified-content.h5p"));

    let key = body["key"].as_str().unwrap();
    assert_eq!(app.uploaded_json(key, "h5p.json")["title"], json!("Planets"));
    let content = app.uploaded_json(key, "content/content.json");
    assert_eq!(content["taskDescription"], json!("<p>Name the planets</p>"));
    assert_eq!(content["words"][1]["answer"], json!("Jupiter"));
    assert!(app.scratch_is_empty());
}

#[tokio::test]
async fn test_generate_dragwords_with_original_field_name() {
    let app = test_app(MemoryUploader::new());
    let (status, body) = app
        .post(
            "/generate/dragwords",
            json!({"title": "Seasons", "description": "Drag them", "textField": "Snow falls in *winter*"}),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    let key = body["key"].as_str().unwrap();
    let content = app.uploaded_json(key, "content/content.json");
    assert_eq!(content["textField"], json!("Snow falls in *winter*"));
}

#[tokio::test]
async fn test_too_few_words_is_rejected() {
    let app = test_app(MemoryUploader::new());
    let mut body = crossword_body("Planets");
    body["words"].as_array_mut().unwrap().pop();

    let (status, response) = app.post("/generate/wordlist", body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(response["error"].as_str().unwrap().starts_with("words"));
    assert!(app.uploader.is_empty());
    assert!(app.scratch_is_empty());
}

#[tokio::test]
async fn test_empty_text_is_rejected() {
    let app = test_app(MemoryUploader::new());
    let (status, response) = app
        .post("/generate/dragwords", json!({"title": "t", "description": "d", "text": ""}))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(response["error"].as_str().unwrap().starts_with("text"));
    assert!(app.scratch_is_empty());
}

#[tokio::test]
async fn test_malformed_json_is_rejected() {
    let app = test_app(MemoryUploader::new());
    let request = Request::builder()
        .method("POST")
        .uri("/generate/wordlist")
        .header("content-type", "application/json")
        .body(Body::from("{\"title\": "))
        .unwrap();

    let (status, _) = app.send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post(
            "/generate/wordlist",
            json!({"title": "t", "description": "d", "words": [{"orientation": "sideways", "clue": "c", "answer": "a"}]}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_upload_failure_is_500() {
    let app = test_app(MemoryUploader::failing("storage offline"));
    let (status, body) = app.post("/generate/wordlist", crossword_body("Planets")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], json!("processing failed"));
    assert!(app.scratch_is_empty());
}

#[tokio::test]
async fn test_premade() {
    let app = test_app(MemoryUploader::new());

    let (status, body) = app.get("/generate/premade?type=CrossWords").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["fileName"], json!("crossword.h5p"));
    let key = body["key"].as_str().unwrap();
    assert_eq!(app.uploaded_json(key, "h5p.json")["title"], json!("Crossword"));

    let (status, _) = app.get("/generate/premade?type=DragAndDrop").await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.get("/generate/premade?type=Quiz").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(app.uploader.len(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_parallel_requests_keep_their_titles() {
    let app = Arc::new(test_app(MemoryUploader::new()));

    let a = {
        let app = app.clone();
        tokio::spawn(async move { app.post("/generate/wordlist", crossword_body("Alpha")).await })
    };
    let b = {
        let app = app.clone();
        tokio::spawn(async move { app.post("/generate/wordlist", crossword_body("Beta")).await })
    };

    let (status_a, body_a) = a.await.unwrap();
    let (status_b, body_b) = b.await.unwrap();
    assert_eq!(status_a, StatusCode::OK);
    assert_eq!(status_b, StatusCode::OK);

    let title_a = app.uploaded_json(body_a["key"].as_str().unwrap(), "h5p.json")["title"].clone();
    let title_b = app.uploaded_json(body_b["key"].as_str().unwrap(), "h5p.json")["title"].clone();
    assert_eq!(title_a, json!("Alpha"));
    assert_eq!(title_b, json!("Beta"));
    assert!(app.scratch_is_empty());
}
