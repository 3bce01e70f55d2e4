/// Route table
///
/// `PUT /feed/post/{post_id}` dispatches on content type: multipart bodies
/// go to the upload-aware handler, everything else is parsed as JSON.
use actix_web::{error, guard, http::header, web, HttpRequest};

use crate::error::AppError;
use crate::handlers;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(query_config())
        .route("/health", web::get().to(handlers::liveness))
        .route("/health/ready", web::get().to(handlers::readiness))
        .service(web::scope("/auth").route("/signup", web::post().to(handlers::signup)))
        .service(
            web::scope("/feed")
                .route("/posts", web::get().to(handlers::get_posts))
                .route("/post", web::post().to(handlers::create_post))
                .service(
                    web::resource("/post/{post_id}")
                        .route(web::get().to(handlers::get_post))
                        .route(
                            web::put()
                                .guard(guard::fn_guard(|ctx| {
                                    is_multipart(ctx.head().headers().get(header::CONTENT_TYPE))
                                }))
                                .to(handlers::update_post),
                        )
                        .route(web::put().to(handlers::update_post_json))
                        .route(web::delete().to(handlers::delete_post)),
                ),
        );
}

fn is_multipart(content_type: Option<&header::HeaderValue>) -> bool {
    content_type
        .and_then(|value| value.to_str().ok())
        .map(|value| value.trim_start().starts_with("multipart/form-data"))
        .unwrap_or(false)
}

/// Unparseable JSON bodies are rejected as invalid input
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err: error::JsonPayloadError, _: &HttpRequest| {
        AppError::validation(format!("invalid request body: {}", err)).into()
    })
}

fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err: error::QueryPayloadError, _: &HttpRequest| {
        AppError::validation(format!("invalid query string: {}", err)).into()
    })
}
