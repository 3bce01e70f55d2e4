/// Feed handlers - HTTP endpoints for post operations
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::error::Result;
use crate::handlers::multipart::read_post_form;
use crate::middleware::UserId;
use crate::models::PostInput;
use crate::services::ImageSource;
use crate::validation;
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct FeedQuery {
    #[validate(range(min = 1, message = "Page must be a positive number."))]
    pub page: Option<i64>,
}

/// JSON form of an update; `image` is the reference to keep
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdatePostRequest {
    pub title: String,
    pub content: String,
    pub image: Option<String>,
}

/// GET /feed/posts?page=
pub async fn get_posts(
    state: web::Data<AppState>,
    query: web::Query<FeedQuery>,
) -> Result<HttpResponse> {
    validation::check(&*query)?;
    let page = state
        .feed_service()
        .list_posts(query.page.unwrap_or(1))
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "post retrieved successfully",
        "posts": page.posts,
        "totalItems": page.total_items,
    })))
}

/// POST /feed/post (multipart)
pub async fn create_post(
    state: web::Data<AppState>,
    user_id: UserId,
    payload: Multipart,
) -> Result<HttpResponse> {
    let form = read_post_form(payload, state.images.max_bytes()).await?;
    let (post, creator) = state
        .feed_service()
        .create_post(user_id.0, form.input(), form.image)
        .await?;

    Ok(HttpResponse::Created().json(json!({
        "message": "Post created successfully!",
        "post": post,
        "creator": creator,
    })))
}

/// GET /feed/post/{post_id}
pub async fn get_post(
    state: web::Data<AppState>,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let post = state.feed_service().get_post(post_id.into_inner()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Post fetched successfully",
        "post": post,
    })))
}

/// PUT /feed/post/{post_id} (multipart)
pub async fn update_post(
    state: web::Data<AppState>,
    user_id: UserId,
    post_id: web::Path<Uuid>,
    payload: Multipart,
) -> Result<HttpResponse> {
    let form = read_post_form(payload, state.images.max_bytes()).await?;
    let input = form.input();
    let image = form.image_source();

    updated(&state, post_id.into_inner(), user_id, input, image).await
}

/// PUT /feed/post/{post_id} (JSON)
pub async fn update_post_json(
    state: web::Data<AppState>,
    user_id: UserId,
    post_id: web::Path<Uuid>,
    payload: web::Json<UpdatePostRequest>,
) -> Result<HttpResponse> {
    let UpdatePostRequest {
        title,
        content,
        image,
    } = payload.into_inner();
    let image = image
        .filter(|reference| !reference.trim().is_empty())
        .map(|reference| ImageSource::Existing(reference.trim().to_string()));

    updated(
        &state,
        post_id.into_inner(),
        user_id,
        PostInput { title, content },
        image,
    )
    .await
}

async fn updated(
    state: &AppState,
    post_id: Uuid,
    user_id: UserId,
    input: PostInput,
    image: Option<ImageSource>,
) -> Result<HttpResponse> {
    let post = state
        .feed_service()
        .update_post(post_id, user_id.0, input, image)
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "post updated successfully",
        "post": post,
    })))
}

/// DELETE /feed/post/{post_id}
pub async fn delete_post(
    state: web::Data<AppState>,
    user_id: UserId,
    post_id: web::Path<Uuid>,
) -> Result<HttpResponse> {
    state
        .feed_service()
        .delete_post(post_id.into_inner(), user_id.0)
        .await?;

    Ok(HttpResponse::Ok().json(json!({ "message": "Deleted Post" })))
}
