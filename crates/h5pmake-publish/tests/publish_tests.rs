//! Integration tests for the publish pipeline against the stock templates

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use h5pmake::{ContentType, Orientation, Packager, RequestPayload, TemplateLoader, WordEntry, unpack_entries};
use h5pmake_publish::*;
use serde_json::{Value, json};
use tempfile::tempdir;

fn templates_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../templates")
}

fn publisher(scratch: &Path, uploader: Arc<MemoryUploader>) -> Publisher {
    Publisher::new(
        TemplateLoader::new(templates_root()),
        Packager::new(scratch),
        uploader,
        Duration::from_secs(10),
    )
}

fn uploaded_json(uploader: &MemoryUploader, key: &str, entry: &str) -> Value {
    let file = uploader.get(key).unwrap();
    let entries = unpack_entries(&file.bytes).unwrap();
    let entry = entries.iter().find(|e| e.name == entry).unwrap();
    serde_json::from_slice(&entry.contents).unwrap()
}

fn words(n: usize) -> Vec<WordEntry> {
    (0..n)
        .map(|i| {
            let orientation = if i % 2 == 0 { Orientation::Across } else { Orientation::Down };
            WordEntry::new(orientation, format!("clue {}", i), format!("answer{}", i))
        })
        .collect()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_requests_are_isolated() {
    let scratch = tempdir().unwrap();
    let uploader = Arc::new(MemoryUploader::new());
    let publisher = publisher(scratch.path(), uploader.clone());

    let first = {
        let publisher = publisher.clone();
        tokio::spawn(async move {
            publisher
                .generate(RequestPayload::words("First quiz", "one", words(3)))
                .await
        })
    };
    let second = {
        let publisher = publisher.clone();
        tokio::spawn(async move {
            publisher
                .generate(RequestPayload::words("Second quiz", "two", words(5)))
                .await
        })
    };

    let first = first.await.unwrap().unwrap();
    let second = second.await.unwrap().unwrap();
    assert_ne!(first.key, second.key);

    let manifest = uploaded_json(&uploader, &first.key, "h5p.json");
    assert_eq!(manifest["title"], json!("First quiz"));
    let content = uploaded_json(&uploader, &first.key, "content/content.json");
    assert_eq!(content["words"].as_array().unwrap().len(), 3);
    assert_eq!(content["taskDescription"], json!("<p>one</p>"));

    let manifest = uploaded_json(&uploader, &second.key, "h5p.json");
    assert_eq!(manifest["title"], json!("Second quiz"));
    let content = uploaded_json(&uploader, &second.key, "content/content.json");
    assert_eq!(content["words"].as_array().unwrap().len(), 5);
    assert_eq!(content["words"][4]["clue"], json!("clue 4"));

    assert_eq!(std::fs::read_dir(scratch.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_same_input_twice_gives_same_content() {
    let scratch = tempdir().unwrap();
    let uploader = Arc::new(MemoryUploader::new());
    let publisher = publisher(scratch.path(), uploader.clone());

    let request = RequestPayload::text("Gaps", "Fill them", "Water boils at *100* degrees");
    let a = publisher.generate(request.clone()).await.unwrap();
    let b = publisher.generate(request).await.unwrap();

    let a = unpack_entries(&uploader.get(&a.key).unwrap().bytes).unwrap();
    let b = unpack_entries(&uploader.get(&b.key).unwrap().bytes).unwrap();
    assert_eq!(a, b);
}

#[tokio::test]
async fn test_premade_for_every_content_type() {
    let scratch = tempdir().unwrap();
    let uploader = Arc::new(MemoryUploader::new());
    let publisher = publisher(scratch.path(), uploader.clone());

    for content_type in ContentType::ALL {
        let publication = publisher.premade(content_type).await.unwrap();
        let manifest = uploaded_json(&uploader, &publication.key, "h5p.json");
        assert!(manifest["mainLibrary"].as_str().unwrap().starts_with("H5P."));
    }
    assert_eq!(uploader.len(), 2);
}

#[tokio::test]
async fn test_failed_upload_reports_and_cleans_up() {
    let scratch = tempdir().unwrap();
    let uploader = Arc::new(MemoryUploader::failing("bucket full"));
    let publisher = publisher(scratch.path(), uploader);

    let err = publisher
        .generate(RequestPayload::words("Quiz", "Solve", words(2)))
        .await
        .unwrap_err();

    assert!(matches!(err, PublishError::UploadFailed(_)));
    assert!(!err.is_client_error());
    assert_eq!(std::fs::read_dir(scratch.path()).unwrap().count(), 0);
}
