mod common;

use actix_web::http::{header, StatusCode};
use actix_web::{test, App};
use chrono::{Duration, Utc};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use taskvault::auth::{Claims, TokenKeys};

use common::{bearer, SECRET};

#[actix_rt::test]
async fn test_register_and_login_flow() {
    let state = common::state();
    let app = test::init_service(App::new().configure(|cfg| state.configure(cfg))).await;

    let req = test::TestRequest::post()
        .uri("/register")
        .set_json(json!({
            "username": "alice123",
            "email": "a@x.com",
            "password": "Abcdef1!"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let user: Value = test::read_body_json(resp).await;
    assert_eq!(user["username"], "alice123");
    assert_eq!(user["email"], "a@x.com");
    assert!(user["id"].is_number());
    assert!(user.get("password").is_none());
    assert!(user.get("passwordHash").is_none());

    let req = test::TestRequest::post()
        .uri("/login")
        .set_json(json!({ "username": "alice123", "password": "Abcdef1!" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    let token = body["token"].as_str().unwrap();
    assert!(!token.is_empty());

    let claims = TokenKeys::from_secret(SECRET).verify(token).unwrap();
    assert_eq!(claims.id as i64, user["id"].as_i64().unwrap());
    assert_eq!(claims.username, "alice123");
    assert_eq!(claims.email, "a@x.com");
}

#[actix_rt::test]
async fn test_duplicate_registration_conflicts() {
    let state = common::state();
    let app = test::init_service(App::new().configure(|cfg| state.configure(cfg))).await;
    common::register(&app, "alice123", "a@x.com").await;

    let cases = vec![
        (json!({ "username": "different", "email": "a@x.com", "password": "Abcdef1!" }), "Email already in use"),
        (json!({ "username": "alice123", "email": "b@x.com", "password": "Abcdef1!" }), "Username already in use"),
    ];

    for (payload, expected_message) in cases {
        let req = test::TestRequest::post()
            .uri("/register")
            .set_json(&payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT, "payload {}", payload);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({ "message": expected_message }));
    }
}

#[actix_rt::test]
async fn test_invalid_registration_inputs() {
    let state = common::state();
    let app = test::init_service(App::new().configure(|cfg| state.configure(cfg))).await;

    let test_cases = vec![
        (json!({ "email": "test@example.com", "password": "Abcdef1!" }), "missing username"),
        (json!({ "username": "testuser", "password": "Abcdef1!" }), "missing email"),
        (json!({ "username": "testuser", "email": "test@example.com" }), "missing password"),
        (json!({ "username": "testuser", "email": "invalid-email", "password": "Abcdef1!" }), "invalid email format"),
        (json!({ "username": "u", "email": "test@example.com", "password": "Abcdef1!" }), "username too short"),
        (json!({ "username": "testuser", "email": "test@example.com", "password": "Ab1!" }), "password too short"),
        (json!({ "username": "testuser", "email": "test@example.com", "password": "abcdefg1!" }), "password without uppercase"),
        (json!({ "username": "testuser", "email": "test@example.com", "password": "Abcdefgh!" }), "password without digit"),
        (json!({ "username": "testuser", "email": "test@example.com", "password": "Abcdefgh1" }), "password without symbol"),
        (json!({ "username": "testuser", "email": "test@example.com", "password": "Abcdef1!", "role": "admin" }), "unknown field"),
        (json!({ "username": 42, "email": "test@example.com", "password": "Abcdef1!" }), "wrong type"),
    ];

    for (payload, description) in test_cases {
        let req = test::TestRequest::post()
            .uri("/register")
            .set_json(&payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "case: {}", description);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "Validation Error", "case: {}", description);
        assert!(
            !body["issues"].as_array().unwrap().is_empty(),
            "case: {} should list issues",
            description
        );
    }
}

#[actix_rt::test]
async fn test_validation_issues_name_the_field() {
    let state = common::state();
    let app = test::init_service(App::new().configure(|cfg| state.configure(cfg))).await;

    let req = test::TestRequest::post()
        .uri("/register")
        .set_json(json!({ "username": "testuser", "email": "nope", "password": "Abcdef1!" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["issues"][0]["path"], json!(["email"]));
    assert_eq!(body["issues"][0]["code"], "email");

    let req = test::TestRequest::post()
        .uri("/register")
        .set_json(json!({
            "username": "testuser",
            "email": "test@example.com",
            "password": "Abcdef1!",
            "role": "admin"
        }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["issues"][0]["path"], json!(["role"]));

    let req = test::TestRequest::post()
        .uri("/register")
        .set_json(json!({ "username": "testuser", "email": "test@example.com" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["issues"][0]["path"], json!(["password"]));
}

#[actix_rt::test]
async fn test_malformed_json_body() {
    let state = common::state();
    let app = test::init_service(App::new().configure(|cfg| state.configure(cfg))).await;

    let req = test::TestRequest::post()
        .uri("/register")
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_payload("{\"username\": \"alice\",")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "message": "Invalid JSON Payload" }));
}

#[actix_rt::test]
async fn test_invalid_login_inputs() {
    let state = common::state();
    let app = test::init_service(App::new().configure(|cfg| state.configure(cfg))).await;
    common::register(&app, "login_test_user", "login@example.com").await;

    let test_cases = vec![
        (json!({ "password": "Abcdef1!" }), StatusCode::BAD_REQUEST, "missing username"),
        (json!({ "username": "login_test_user" }), StatusCode::BAD_REQUEST, "missing password"),
        (json!({ "username": "lo", "password": "Abcdef1!" }), StatusCode::BAD_REQUEST, "username too short"),
        (json!({ "username": "login_test_user", "password": "" }), StatusCode::BAD_REQUEST, "empty password"),
        (json!({ "username": "login_test_user", "password": "Wrong123!" }), StatusCode::UNAUTHORIZED, "incorrect password"),
        (json!({ "username": "nonexistent", "password": "Abcdef1!" }), StatusCode::UNAUTHORIZED, "non-existent user"),
    ];

    for (payload, expected_status, description) in test_cases {
        let req = test::TestRequest::post()
            .uri("/login")
            .set_json(&payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), expected_status, "case: {}", description);

        if expected_status == StatusCode::UNAUTHORIZED {
            let body: Value = test::read_body_json(resp).await;
            assert_eq!(body["message"], "Invalid username or password");
        }
    }
}

#[actix_rt::test]
async fn test_protected_route_token_handling() {
    let state = common::state();
    let app = test::init_service(App::new().configure(|cfg| state.configure(cfg))).await;
    let user = common::register_and_login(&app, "alice123", "a@x.com").await;

    let req = test::TestRequest::get()
        .uri("/tasks")
        .insert_header(bearer(&user.token))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::get().uri("/tasks").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Authorization token required");

    let forged = TokenKeys::from_secret(b"some_other_secret")
        .sign(&Claims {
            id: user.id as i32,
            username: "alice123".into(),
            email: "a@x.com".into(),
            iat: Utc::now().timestamp() as usize,
            exp: (Utc::now() + Duration::hours(1)).timestamp() as usize,
        })
        .unwrap();
    let req = test::TestRequest::get()
        .uri("/users")
        .insert_header(bearer(&forged))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Invalid token");

    let issued = Utc::now() - Duration::hours(2);
    let expired = TokenKeys::from_secret(SECRET)
        .sign(&Claims {
            id: user.id as i32,
            username: "alice123".into(),
            email: "a@x.com".into(),
            iat: issued.timestamp() as usize,
            exp: (issued + Duration::hours(1)).timestamp() as usize,
        })
        .unwrap();
    let req = test::TestRequest::get()
        .uri("/tasks")
        .insert_header(bearer(&expired))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Token expired");
}

#[actix_rt::test]
async fn test_public_endpoints() {
    let state = common::state();
    let app = test::init_service(App::new().configure(|cfg| state.configure(cfg))).await;

    let req = test::TestRequest::get().uri("/").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!({ "message": "Hello, World!" }));

    let req = test::TestRequest::get().uri("/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "ok");
}
