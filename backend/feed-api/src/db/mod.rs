/// Database access layer
///
/// Two repository traits cover the `users` and `posts` collections. Both are
/// implemented by [`PgStore`] (PostgreSQL via sqlx) and [`MemoryStore`]
/// (process-local, used for development and tests). Operations that touch a
/// post and its creator's reference list run as one unit in both stores.
pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{CreatorSummary, FeedPost, NewPost, NewUser, Post, PostChanges, User};

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("email already registered: {0}")]
    DuplicateEmail(String),

    #[error("creator {0} does not exist")]
    MissingCreator(Uuid),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type RepositoryResult<T> = std::result::Result<T, RepositoryError>;

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Persist a new user with an empty reference list
    async fn create_user(&self, new_user: NewUser) -> RepositoryResult<User>;

    /// Lookup by normalized (lower-cased) email
    async fn find_user_by_email(&self, email: &str) -> RepositoryResult<Option<User>>;

    /// Lookup by primary key
    async fn find_user_by_id(&self, id: Uuid) -> RepositoryResult<Option<User>>;
}

#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Total number of posts
    async fn count_posts(&self) -> RepositoryResult<i64>;

    /// One page of the feed in creation order, creators resolved
    async fn list_posts(&self, offset: i64, limit: i64) -> RepositoryResult<Vec<FeedPost>>;

    async fn find_post(&self, id: Uuid) -> RepositoryResult<Option<Post>>;

    /// Insert a post and append its id to the creator's reference list
    async fn create_post(&self, new_post: NewPost) -> RepositoryResult<(Post, CreatorSummary)>;

    /// Apply changes when the post exists and belongs to `creator`
    async fn update_post(
        &self,
        id: Uuid,
        creator: Uuid,
        changes: PostChanges,
    ) -> RepositoryResult<Option<Post>>;

    /// Remove a post owned by `creator` and pull it from the creator's list.
    /// Returns false when no such post exists.
    async fn delete_post(&self, id: Uuid, creator: Uuid) -> RepositoryResult<bool>;

    /// Round-trip to the backing store
    async fn health_check(&self) -> RepositoryResult<()> {
        Ok(())
    }
}
