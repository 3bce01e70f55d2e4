/// Signup handler
use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::error::Result;
use crate::models::SignupRequest;
use crate::AppState;

/// POST /auth/signup
pub async fn signup(
    state: web::Data<AppState>,
    payload: web::Json<SignupRequest>,
) -> Result<HttpResponse> {
    let user = state.auth_service().signup(payload.into_inner()).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "User created!",
        "userId": user.id,
    })))
}
