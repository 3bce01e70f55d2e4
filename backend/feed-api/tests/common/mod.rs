//! Shared fixtures for feed-api integration tests
#![allow(dead_code)]

use actix_web::http::header;
use tempfile::TempDir;
use uuid::Uuid;

use feed_api::db::{MemoryStore, UserRepository};
use feed_api::models::NewUser;
use feed_api::storage::ImageStore;
use feed_api::AppState;

pub const MAX_IMAGE_BYTES: usize = 64 * 1024;

/// App state over a fresh in-memory store and a scratch image directory.
/// Keep the `TempDir` alive for the duration of the test.
pub struct TestContext {
    pub store: MemoryStore,
    pub state: AppState,
    pub dir: TempDir,
}

impl TestContext {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = MemoryStore::new();
        let state = AppState::in_memory(
            store.clone(),
            ImageStore::new(dir.path(), MAX_IMAGE_BYTES),
        );
        Self { store, state, dir }
    }

    pub async fn user(&self, email: &str, name: &str) -> Uuid {
        self.store
            .create_user(NewUser {
                email: email.to_string(),
                name: name.to_string(),
                password_hash: "not-a-real-hash".to_string(),
            })
            .await
            .expect("seed user")
            .id
    }

    pub fn image_files(&self) -> Vec<String> {
        let Ok(entries) = std::fs::read_dir(self.dir.path().join("images")) else {
            return Vec::new();
        };
        entries
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect()
    }
}

const BOUNDARY: &str = "----feed-api-test-boundary";

/// Hand-built `multipart/form-data` body
#[derive(Default)]
pub struct MultipartBody {
    body: Vec<u8>,
}

impl MultipartBody {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, file_name: &str, content_type: &str, bytes: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(bytes);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    pub fn png(self, file_name: &str) -> Self {
        self.file("image", file_name, "image/png", b"\x89PNG\r\n\x1a\nfake")
    }

    /// Content-Type header and body bytes
    pub fn finish(mut self) -> ((header::HeaderName, String), Vec<u8>) {
        self.body
            .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        (
            (
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            ),
            self.body,
        )
    }
}
