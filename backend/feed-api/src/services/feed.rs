/// Feed service - post listing, creation and creator-only mutation
use std::sync::Arc;
use uuid::Uuid;

use crate::db::PostRepository;
use crate::error::{AppError, Result};
use crate::models::{CreatorSummary, FeedPost, NewPost, Post, PostChanges, PostInput};
use crate::storage::{ImageStore, ImageUpload};
use crate::validation;

pub const POSTS_PER_PAGE: i64 = 2;

const POST_NOT_FOUND: &str = "could not find post";
const NOT_CREATOR: &str = "not authorized user";

/// Image supplied with an update
#[derive(Debug, Clone)]
pub enum ImageSource {
    /// A newly uploaded file
    Upload(ImageUpload),
    /// The post's current reference, kept unchanged
    Existing(String),
}

#[derive(Debug)]
pub struct FeedPage {
    pub posts: Vec<FeedPost>,
    pub total_items: i64,
}

pub struct FeedService {
    posts: Arc<dyn PostRepository>,
    images: Arc<ImageStore>,
}

impl FeedService {
    pub fn new(posts: Arc<dyn PostRepository>, images: Arc<ImageStore>) -> Self {
        Self { posts, images }
    }

    /// One page of posts plus the total count across all pages.
    /// Pages below 1 are served as the first page; pages past the end are empty.
    pub async fn list_posts(&self, page: i64) -> Result<FeedPage> {
        let page = page.max(1);
        let total_items = self.posts.count_posts().await?;
        let Some(offset) = (page - 1).checked_mul(POSTS_PER_PAGE) else {
            return Ok(FeedPage {
                posts: Vec::new(),
                total_items,
            });
        };
        let posts = self.posts.list_posts(offset, POSTS_PER_PAGE).await?;

        Ok(FeedPage { posts, total_items })
    }

    /// Create a post owned by `creator` and link it from the creator's list
    pub async fn create_post(
        &self,
        creator: Uuid,
        input: PostInput,
        image: Option<ImageUpload>,
    ) -> Result<(Post, CreatorSummary)> {
        let input = input.normalized();
        validation::check(&input)?;
        let image = image.ok_or_else(|| AppError::validation("no image provided"))?;

        let image_url = self.images.save(&image).await?;
        let new_post = NewPost {
            title: input.title,
            content: input.content,
            image_url: image_url.clone(),
            creator,
        };

        match self.posts.create_post(new_post).await {
            Ok((post, summary)) => {
                tracing::info!(post_id = %post.id, %creator, "post created");
                Ok((post, summary))
            }
            Err(err) => {
                self.images.clear(&image_url).await;
                Err(err.into())
            }
        }
    }

    pub async fn get_post(&self, id: Uuid) -> Result<Post> {
        self.posts
            .find_post(id)
            .await?
            .ok_or_else(|| AppError::NotFound(POST_NOT_FOUND.into()))
    }

    /// Replace title, content and image of a post the caller created.
    /// The previous image file is cleared when the reference changes.
    pub async fn update_post(
        &self,
        id: Uuid,
        caller: Uuid,
        input: PostInput,
        image: Option<ImageSource>,
    ) -> Result<Post> {
        let input = input.normalized();
        validation::check(&input)?;
        let image = image.ok_or_else(|| AppError::validation("no file picked"))?;

        let current = self.owned_post(id, caller).await?;
        // A kept reference may only name this post's own image
        if let ImageSource::Existing(reference) = &image {
            if *reference != current.image_url {
                return Err(AppError::validation("invalid image reference"));
            }
        }

        let (image_url, uploaded) = match image {
            ImageSource::Upload(upload) => (self.images.save(&upload).await?, true),
            ImageSource::Existing(reference) => (reference, false),
        };
        let changes = PostChanges {
            title: input.title,
            content: input.content,
            image_url: image_url.clone(),
        };

        let updated = match self.posts.update_post(id, caller, changes).await {
            Ok(Some(post)) => post,
            Ok(None) => {
                if uploaded {
                    self.images.clear(&image_url).await;
                }
                return Err(AppError::NotFound(POST_NOT_FOUND.into()));
            }
            Err(err) => {
                if uploaded {
                    self.images.clear(&image_url).await;
                }
                return Err(err.into());
            }
        };

        if updated.image_url != current.image_url {
            self.images.clear(&current.image_url).await;
        }

        tracing::info!(post_id = %id, "post updated");
        Ok(updated)
    }

    /// Delete a post the caller created, its reference and its image
    pub async fn delete_post(&self, id: Uuid, caller: Uuid) -> Result<()> {
        let post = self.owned_post(id, caller).await?;

        if !self.posts.delete_post(id, caller).await? {
            return Err(AppError::NotFound(POST_NOT_FOUND.into()));
        }
        self.images.clear(&post.image_url).await;

        tracing::info!(post_id = %id, "post deleted");
        Ok(())
    }

    async fn owned_post(&self, id: Uuid, caller: Uuid) -> Result<Post> {
        let post = self.get_post(id).await?;
        if post.creator != caller {
            tracing::warn!(post_id = %id, %caller, "rejected mutation by non-creator");
            return Err(AppError::Forbidden(NOT_CREATOR.into()));
        }
        Ok(post)
    }
}
