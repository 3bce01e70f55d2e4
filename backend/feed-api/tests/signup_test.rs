mod common;

use actix_web::{http::StatusCode, test, web, App};
use serde_json::{json, Value};
use uuid::Uuid;

use common::TestContext;
use feed_api::db::UserRepository;
use feed_api::routes;

#[actix_web::test]
async fn signup_creates_user() {
    let ctx = TestContext::new();
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(ctx.state.clone()))
            .configure(routes::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/auth/signup")
        .set_json(json!({
            "email": "Ada@Example.com",
            "name": "Ada",
            "password": "secret1"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "User created!");
    let user_id: Uuid = body["userId"]
        .as_str()
        .expect("userId")
        .parse()
        .expect("uuid");

    let user = ctx
        .store
        .find_user_by_email("ada@example.com")
        .await
        .unwrap()
        .expect("user persisted");
    assert_eq!(user.id, user_id);
    assert_ne!(user.password_hash, "secret1");
    assert!(user.post_ids.is_empty());
}

#[actix_web::test]
async fn short_password_is_rejected_and_nothing_stored() {
    let ctx = TestContext::new();
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(ctx.state.clone()))
            .configure(routes::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/auth/signup")
        .set_json(json!({
            "email": "ada@example.com",
            "name": "Ada",
            "password": "abc"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "validation failed, entered data is incorrect");
    let violations = body["data"].as_array().expect("violations");
    assert!(!violations.is_empty());
    assert_eq!(violations[0]["field"], "password");

    assert!(ctx
        .store
        .find_user_by_email("ada@example.com")
        .await
        .unwrap()
        .is_none());
}

#[actix_web::test]
async fn duplicate_email_is_rejected() {
    let ctx = TestContext::new();
    ctx.user("ada@example.com", "Ada").await;
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(ctx.state.clone()))
            .configure(routes::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/auth/signup")
        .set_json(json!({
            "email": "ADA@example.com",
            "name": "Impostor",
            "password": "secret1"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"][0]["field"], "email");
    assert_eq!(body["data"][0]["message"], "E-Mail address already exists!");

    let user = ctx
        .store
        .find_user_by_email("ada@example.com")
        .await
        .unwrap()
        .expect("original user");
    assert_eq!(user.name, "Ada");
}

#[actix_web::test]
async fn malformed_json_is_invalid_input() {
    let ctx = TestContext::new();
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(ctx.state.clone()))
            .configure(routes::configure),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/auth/signup")
        .insert_header(("content-type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}
