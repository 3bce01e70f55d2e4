use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{PostRepository, RepositoryError, RepositoryResult, UserRepository};
use crate::models::{CreatorSummary, FeedPost, NewPost, NewUser, Post, PostChanges, User};

#[derive(Debug, Default)]
struct Collections {
    users: Vec<User>,
    /// Insertion order is creation order
    posts: Vec<Post>,
}

impl Collections {
    fn user_mut(&mut self, id: Uuid) -> Option<&mut User> {
        self.users.iter_mut().find(|u| u.id == id)
    }
}

/// Process-local store. One lock guards both collections, so post/creator
/// updates are applied together.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Collections>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create_user(&self, new_user: NewUser) -> RepositoryResult<User> {
        let mut data = self.inner.write().await;
        if data.users.iter().any(|u| u.email == new_user.email) {
            return Err(RepositoryError::DuplicateEmail(new_user.email));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: new_user.email,
            name: new_user.name,
            password_hash: new_user.password_hash,
            post_ids: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        data.users.push(user.clone());
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        let data = self.inner.read().await;
        Ok(data.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_id(&self, id: Uuid) -> RepositoryResult<Option<User>> {
        let data = self.inner.read().await;
        Ok(data.users.iter().find(|u| u.id == id).cloned())
    }
}

#[async_trait]
impl PostRepository for MemoryStore {
    async fn count_posts(&self) -> RepositoryResult<i64> {
        let data = self.inner.read().await;
        Ok(data.posts.len() as i64)
    }

    async fn list_posts(&self, offset: i64, limit: i64) -> RepositoryResult<Vec<FeedPost>> {
        let data = self.inner.read().await;
        let offset = usize::try_from(offset).unwrap_or(0);
        let limit = usize::try_from(limit).unwrap_or(0);

        let page = data
            .posts
            .iter()
            .skip(offset)
            .take(limit)
            .filter_map(|post| {
                let creator = data.users.iter().find(|u| u.id == post.creator)?;
                Some(FeedPost::from_post(
                    post.clone(),
                    CreatorSummary {
                        id: creator.id,
                        name: creator.name.clone(),
                    },
                ))
            })
            .collect();

        Ok(page)
    }

    async fn find_post(&self, id: Uuid) -> RepositoryResult<Option<Post>> {
        let data = self.inner.read().await;
        Ok(data.posts.iter().find(|p| p.id == id).cloned())
    }

    async fn create_post(&self, new_post: NewPost) -> RepositoryResult<(Post, CreatorSummary)> {
        let mut data = self.inner.write().await;
        let now = Utc::now();
        let post = Post {
            id: Uuid::new_v4(),
            title: new_post.title,
            content: new_post.content,
            image_url: new_post.image_url,
            creator: new_post.creator,
            created_at: now,
            updated_at: now,
        };

        let creator = data
            .user_mut(new_post.creator)
            .ok_or(RepositoryError::MissingCreator(new_post.creator))?;
        creator.post_ids.push(post.id);
        creator.updated_at = now;
        let summary = CreatorSummary {
            id: creator.id,
            name: creator.name.clone(),
        };

        data.posts.push(post.clone());
        Ok((post, summary))
    }

    async fn update_post(
        &self,
        id: Uuid,
        creator: Uuid,
        changes: PostChanges,
    ) -> RepositoryResult<Option<Post>> {
        let mut data = self.inner.write().await;
        let Some(post) = data
            .posts
            .iter_mut()
            .find(|p| p.id == id && p.creator == creator)
        else {
            return Ok(None);
        };

        post.title = changes.title;
        post.content = changes.content;
        post.image_url = changes.image_url;
        post.updated_at = Utc::now();
        Ok(Some(post.clone()))
    }

    async fn delete_post(&self, id: Uuid, creator: Uuid) -> RepositoryResult<bool> {
        let mut data = self.inner.write().await;
        let Some(index) = data
            .posts
            .iter()
            .position(|p| p.id == id && p.creator == creator)
        else {
            return Ok(false);
        };

        data.posts.remove(index);
        if let Some(user) = data.user_mut(creator) {
            user.post_ids.retain(|post_id| *post_id != id);
            user.updated_at = Utc::now();
        }
        Ok(true)
    }
}
