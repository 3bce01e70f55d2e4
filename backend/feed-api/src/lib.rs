/// Feed API Library
///
/// User signup and a paginated post feed with image uploads and
/// creator-only edit/delete.
///
/// # Modules
///
/// - `handlers`: HTTP request handlers
/// - `services`: Business logic (signup, feed operations)
/// - `db`: Repository traits with PostgreSQL and in-memory stores
/// - `models`: Users, posts and request payloads
/// - `storage`: Uploaded image files on local disk
/// - `middleware`: Caller identity injected by the gateway
/// - `error`: Error types and their HTTP rendering
/// - `config`: Configuration management
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod security;
pub mod services;
pub mod storage;
pub mod telemetry;
pub mod validation;

pub use config::Config;
pub use error::{AppError, Result};

use std::sync::Arc;

use db::{MemoryStore, PgStore, PostRepository, UserRepository};
use services::{AuthService, FeedService};
use storage::ImageStore;

/// Shared handler state. Every request builds its services from these handles.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub images: Arc<ImageStore>,
}

impl AppState {
    pub fn new(
        users: Arc<dyn UserRepository>,
        posts: Arc<dyn PostRepository>,
        images: ImageStore,
    ) -> Self {
        Self {
            users,
            posts,
            images: Arc::new(images),
        }
    }

    pub fn postgres(store: PgStore, images: ImageStore) -> Self {
        let store = Arc::new(store);
        Self::new(store.clone(), store, images)
    }

    pub fn in_memory(store: MemoryStore, images: ImageStore) -> Self {
        let store = Arc::new(store);
        Self::new(store.clone(), store, images)
    }

    pub fn auth_service(&self) -> AuthService {
        AuthService::new(self.users.clone())
    }

    pub fn feed_service(&self) -> FeedService {
        FeedService::new(self.posts.clone(), self.images.clone())
    }
}
