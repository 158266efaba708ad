#![allow(dead_code)]

use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::header;
use actix_web::test;
use serde_json::{json, Value};
use taskvault::auth::password::MIN_HASH_COST;
use taskvault::auth::TokenKeys;
use taskvault::AppState;

pub const SECRET: &[u8] = b"integration_test_secret";
pub const PASSWORD: &str = "Abcdef1!";

/// Fresh in-memory application state with a cheap bcrypt cost.
pub fn state() -> AppState {
    AppState::in_memory(TokenKeys::from_secret(SECRET), MIN_HASH_COST)
}

pub fn bearer(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {}", token))
}

/// Helper struct to hold auth details
pub struct TestUser {
    pub id: i64,
    pub token: String,
}

pub async fn register<S, B>(app: &S, username: &str, email: &str) -> Value
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/register")
        .set_json(json!({
            "username": username,
            "email": email,
            "password": PASSWORD
        }))
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), 201, "registration of {} failed", username);
    test::read_body_json(resp).await
}

pub async fn login<S, B>(app: &S, username: &str) -> String
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/login")
        .set_json(json!({ "username": username, "password": PASSWORD }))
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), 200, "login of {} failed", username);
    let body: Value = test::read_body_json(resp).await;
    body["token"]
        .as_str()
        .expect("login response carries a token")
        .to_string()
}

pub async fn register_and_login<S, B>(app: &S, username: &str, email: &str) -> TestUser
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let user = register(app, username, email).await;
    let token = login(app, username).await;
    TestUser {
        id: user["id"].as_i64().expect("user id"),
        token,
    }
}

pub async fn create_task<S, B>(app: &S, token: &str, payload: Value) -> Value
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let req = test::TestRequest::post()
        .uri("/tasks")
        .insert_header(bearer(token))
        .set_json(payload)
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), 201);
    let body: Value = test::read_body_json(resp).await;
    body["task"].clone()
}
