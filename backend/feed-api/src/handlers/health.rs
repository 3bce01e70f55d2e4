use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::AppState;

/// GET /health
pub async fn liveness() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

/// GET /health/ready - the store must answer a round trip
pub async fn readiness(state: web::Data<AppState>) -> HttpResponse {
    match state.posts.health_check().await {
        Ok(()) => HttpResponse::Ok().json(json!({ "status": "ready" })),
        Err(err) => {
            tracing::warn!(error = %err, "readiness check failed");
            HttpResponse::ServiceUnavailable().json(json!({ "status": "unavailable" }))
        }
    }
}
