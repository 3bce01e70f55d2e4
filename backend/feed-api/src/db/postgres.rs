use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::migrate::{MigrateError, Migrator};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

use super::{PostRepository, RepositoryError, RepositoryResult, UserRepository};
use crate::models::{CreatorSummary, FeedPost, NewPost, NewUser, Post, PostChanges, User};

pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";

const USER_COLUMNS: &str = "id, email, name, password_hash, post_ids, created_at, updated_at";
const POST_COLUMNS: &str = "id, title, content, image_url, creator_id, created_at, updated_at";

/// PostgreSQL-backed store for users and posts
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct FeedPostRow {
    id: Uuid,
    title: String,
    content: String,
    image_url: String,
    creator_id: Uuid,
    creator_name: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<FeedPostRow> for FeedPost {
    fn from(row: FeedPostRow) -> Self {
        FeedPost {
            id: row.id,
            title: row.title,
            content: row.content,
            image_url: row.image_url,
            creator: CreatorSummary {
                id: row.creator_id,
                name: row.creator_name,
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

fn has_code(err: &sqlx::Error, code: &str) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().as_deref() == Some(code),
        _ => false,
    }
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(5))
            .connect(url)
            .await?;
        Ok(Self::new(pool))
    }

    pub async fn migrate(&self) -> Result<(), MigrateError> {
        MIGRATOR.run(&self.pool).await
    }
}

#[async_trait]
impl UserRepository for PgStore {
    async fn create_user(&self, new_user: NewUser) -> RepositoryResult<User> {
        let result = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (id, email, name, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&new_user.email)
        .bind(&new_user.name)
        .bind(&new_user.password_hash)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(user) => {
                debug!(user_id = %user.id, "inserted user");
                Ok(user)
            }
            Err(err) if has_code(&err, UNIQUE_VIOLATION) => {
                Err(RepositoryError::DuplicateEmail(new_user.email))
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn find_user_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_user_by_id(&self, id: Uuid) -> RepositoryResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }
}

#[async_trait]
impl PostRepository for PgStore {
    async fn count_posts(&self) -> RepositoryResult<i64> {
        let (count,) = sqlx::query_as::<_, (i64,)>("SELECT COUNT(*) FROM posts")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn list_posts(&self, offset: i64, limit: i64) -> RepositoryResult<Vec<FeedPost>> {
        let rows = sqlx::query_as::<_, FeedPostRow>(
            r#"
            SELECT p.id, p.title, p.content, p.image_url, p.created_at, p.updated_at,
                   u.id AS creator_id, u.name AS creator_name
            FROM posts p
            JOIN users u ON u.id = p.creator_id
            ORDER BY p.created_at ASC, p.id ASC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(FeedPost::from).collect())
    }

    async fn find_post(&self, id: Uuid) -> RepositoryResult<Option<Post>> {
        let post = sqlx::query_as::<_, Post>(&format!(
            "SELECT {POST_COLUMNS} FROM posts WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(post)
    }

    async fn create_post(&self, new_post: NewPost) -> RepositoryResult<(Post, CreatorSummary)> {
        // Post insert and reference append commit together
        let mut tx = self.pool.begin().await?;

        let inserted = sqlx::query_as::<_, Post>(&format!(
            r#"
            INSERT INTO posts (id, title, content, image_url, creator_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {POST_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&new_post.title)
        .bind(&new_post.content)
        .bind(&new_post.image_url)
        .bind(new_post.creator)
        .fetch_one(&mut *tx)
        .await;

        let post = match inserted {
            Ok(post) => post,
            Err(err) if has_code(&err, FOREIGN_KEY_VIOLATION) => {
                return Err(RepositoryError::MissingCreator(new_post.creator))
            }
            Err(err) => return Err(err.into()),
        };

        let creator = sqlx::query_as::<_, (Uuid, String)>(
            r#"
            UPDATE users
            SET post_ids = array_append(post_ids, $1), updated_at = NOW()
            WHERE id = $2
            RETURNING id, name
            "#,
        )
        .bind(post.id)
        .bind(new_post.creator)
        .fetch_optional(&mut *tx)
        .await?;

        let Some((creator_id, creator_name)) = creator else {
            return Err(RepositoryError::MissingCreator(new_post.creator));
        };

        tx.commit().await?;
        debug!(post_id = %post.id, %creator_id, "inserted post");

        Ok((
            post,
            CreatorSummary {
                id: creator_id,
                name: creator_name,
            },
        ))
    }

    async fn update_post(
        &self,
        id: Uuid,
        creator: Uuid,
        changes: PostChanges,
    ) -> RepositoryResult<Option<Post>> {
        let post = sqlx::query_as::<_, Post>(&format!(
            r#"
            UPDATE posts
            SET title = $1, content = $2, image_url = $3, updated_at = NOW()
            WHERE id = $4 AND creator_id = $5
            RETURNING {POST_COLUMNS}
            "#
        ))
        .bind(&changes.title)
        .bind(&changes.content)
        .bind(&changes.image_url)
        .bind(id)
        .bind(creator)
        .fetch_optional(&self.pool)
        .await?;

        Ok(post)
    }

    async fn delete_post(&self, id: Uuid, creator: Uuid) -> RepositoryResult<bool> {
        // Post removal and reference pull commit together
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("DELETE FROM posts WHERE id = $1 AND creator_id = $2")
            .bind(id)
            .bind(creator)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Ok(false);
        }

        sqlx::query(
            r#"
            UPDATE users
            SET post_ids = array_remove(post_ids, $1), updated_at = NOW()
            WHERE id = $2
            "#,
        )
        .bind(id)
        .bind(creator)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        debug!(post_id = %id, "deleted post");

        Ok(true)
    }

    async fn health_check(&self) -> RepositoryResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
