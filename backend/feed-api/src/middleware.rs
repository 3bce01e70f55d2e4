/// Caller identity
///
/// Authentication happens upstream; the gateway forwards the authenticated
/// user's id in `x-user-id`. Handlers that mutate posts take a [`UserId`].
use actix_web::{dev::Payload, FromRequest, HttpRequest};
use std::future::{ready, Ready};
use uuid::Uuid;

use crate::error::AppError;

pub const USER_ID_HEADER: &str = "x-user-id";

/// Authenticated caller, extracted from the request headers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserId(pub Uuid);

fn extract_user_id(req: &HttpRequest) -> Result<Uuid, AppError> {
    let header_value = req
        .headers()
        .get(USER_ID_HEADER)
        .ok_or_else(|| AppError::Unauthorized("not authenticated".into()))?;

    let value = header_value
        .to_str()
        .map_err(|_| AppError::Unauthorized("invalid x-user-id header".into()))?;

    Uuid::parse_str(value.trim())
        .map_err(|_| AppError::Unauthorized("invalid x-user-id header value".into()))
}

impl FromRequest for UserId {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(extract_user_id(req).map(UserId))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test::TestRequest;

    #[test]
    fn reads_uuid_from_header() {
        let id = Uuid::new_v4();
        let req = TestRequest::default()
            .insert_header((USER_ID_HEADER, id.to_string()))
            .to_http_request();
        assert_eq!(extract_user_id(&req).unwrap(), id);
    }

    #[test]
    fn missing_or_malformed_header_is_unauthorized() {
        let req = TestRequest::default().to_http_request();
        assert!(matches!(
            extract_user_id(&req),
            Err(AppError::Unauthorized(_))
        ));

        let req = TestRequest::default()
            .insert_header((USER_ID_HEADER, "not-a-uuid"))
            .to_http_request();
        assert!(matches!(
            extract_user_id(&req),
            Err(AppError::Unauthorized(_))
        ));
    }
}
