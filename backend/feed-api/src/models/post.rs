use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Stored post; `creator` is the owning user's id
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub image_url: String,
    #[sqlx(rename = "creator_id")]
    pub creator: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Minimal view of a post's creator
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatorSummary {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
}

/// Feed entry: a post with its creator resolved
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedPost {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub image_url: String,
    pub creator: CreatorSummary,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FeedPost {
    pub fn from_post(post: Post, creator: CreatorSummary) -> Self {
        Self {
            id: post.id,
            title: post.title,
            content: post.content,
            image_url: post.image_url,
            creator,
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub image_url: String,
    pub creator: Uuid,
}

/// Fields an update may touch
#[derive(Debug, Clone)]
pub struct PostChanges {
    pub title: String,
    pub content: String,
    pub image_url: String,
}

/// Title and content submitted for a post
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct PostInput {
    #[validate(length(min = 5, message = "Title must be at least 5 characters long."))]
    pub title: String,
    #[validate(length(min = 5, message = "Content must be at least 5 characters long."))]
    pub content: String,
}

impl PostInput {
    pub fn normalized(self) -> Self {
        Self {
            title: self.title.trim().to_string(),
            content: self.content.trim().to_string(),
        }
    }
}
