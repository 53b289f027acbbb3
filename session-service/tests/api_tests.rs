mod common;

use auth::Claims;
use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use common::session_cookie;
use common::TestApp;
use common::ISSUER;
use reqwest::StatusCode;
use serde_json::json;
use session_service::config::TransportKind;

async fn unauthorized_body(response: reqwest::Response) {
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(
        body,
        json!({"status_code": 401, "data": {"message": "Unauthorized"}})
    );
}

/// Register a@x.com and log in; returns the raw session token.
async fn registered_session(app: &TestApp) -> String {
    let response = app.register("a@x.com", "pw", "A").await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app.login("a@x.com", "pw").await;
    assert_eq!(response.status(), StatusCode::OK);

    session_cookie(&response).expect("Login did not set a session cookie")
}

#[tokio::test]
async fn test_ping() {
    let app = TestApp::spawn().await;

    let response = app
        .get("/ping")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["message"], "pong");
}

#[tokio::test]
async fn test_register_success() {
    let app = TestApp::spawn().await;

    let response = app.register("a@x.com", "pw", "A").await;

    assert_eq!(response.status(), StatusCode::CREATED);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status_code"], 201);
    assert_eq!(body["data"]["email"], "a@x.com");
    assert_eq!(body["data"]["name"], "A");
    assert!(body["data"]["id"].is_string());
    assert!(body["data"]["created_at"].is_string());
    assert!(body["data"].get("password_digest").is_none());
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let app = TestApp::spawn().await;

    app.register("a@x.com", "pw", "A").await;
    let response = app.register("a@x.com", "other", "B").await;

    assert_eq!(response.status(), StatusCode::CONFLICT);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert!(body["data"]["message"]
        .as_str()
        .unwrap()
        .contains("already exists"));
}

#[tokio::test]
async fn test_register_invalid_input() {
    let app = TestApp::spawn().await;

    for (email, password, name) in [
        ("not-an-email", "pw", "A"),
        ("a@x.com", "", "A"),
        ("a@x.com", "pw", ""),
    ] {
        let response = app.register(email, password, name).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let app = TestApp::spawn().await;

    let response = app
        .post("/register")
        .header(reqwest::header::CONTENT_TYPE, "application/json")
        .body("{\"email\": ")
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .post("/login")
        .json(&json!({ "email": "a@x.com" }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_sets_http_only_cookie() {
    let app = TestApp::spawn().await;
    app.register("a@x.com", "pw", "A").await;

    let response = app.login("a@x.com", "pw").await;
    assert_eq!(response.status(), StatusCode::OK);

    let cookie = response
        .cookies()
        .find(|cookie| cookie.name() == common::COOKIE_NAME)
        .expect("Login did not set a session cookie");
    assert!(cookie.http_only());
    assert_eq!(cookie.path(), Some("/"));
    assert!(!cookie.value().is_empty());

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["user"]["email"], "a@x.com");
    // The cookie transport never exposes the token to scripts
    assert!(body["data"].get("token").is_none());

    let expires_at: DateTime<Utc> = body["data"]["expires_at"]
        .as_str()
        .unwrap()
        .parse()
        .expect("expires_at is not a timestamp");
    assert!(expires_at > Utc::now());
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let app = TestApp::spawn().await;
    app.register("a@x.com", "pw", "A").await;

    let wrong_password = app.login("a@x.com", "wrong").await;
    let unknown_email = app.login("nobody@x.com", "pw").await;

    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_email.status(), StatusCode::UNAUTHORIZED);
    assert!(session_cookie(&wrong_password).is_none());

    let first: serde_json::Value = wrong_password.json().await.unwrap();
    let second: serde_json::Value = unknown_email.json().await.unwrap();
    assert_eq!(first, second);
    assert_eq!(first["data"]["message"], "Invalid credentials");
}

#[tokio::test]
async fn test_current_user_with_session() {
    let app = TestApp::spawn().await;
    registered_session(&app).await;

    let response = app
        .get("/auth/user")
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), StatusCode::OK);

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["name"], "A");
    assert_eq!(body["data"]["email"], "a@x.com");
}

#[tokio::test]
async fn test_current_user_without_session() {
    let app = TestApp::spawn().await;

    let response = app
        .get("/auth/user")
        .send()
        .await
        .expect("Failed to execute request");

    unauthorized_body(response).await;
}

#[tokio::test]
async fn test_expired_token_rejected() {
    let app = TestApp::spawn().await;
    let token = registered_session(&app).await;

    let claims = app.jwt_handler.decode(&token).unwrap();
    let expired = Claims::issued_at(
        claims.uid,
        claims.sub,
        claims.name,
        ISSUER,
        Utc::now() - Duration::hours(1),
        Duration::minutes(30),
    )
    .unwrap();

    let response = app
        .get_with_cookie("/auth/user", &app.token_for(&expired))
        .send()
        .await
        .expect("Failed to execute request");

    unauthorized_body(response).await;
}

#[tokio::test]
async fn test_foreign_tokens_rejected() {
    let app = TestApp::spawn().await;
    let token = registered_session(&app).await;
    let claims = app.jwt_handler.decode(&token).unwrap();

    // Same secret, different issuer
    let other_issuer = auth::JwtHandler::new(common::JWT_SECRET, "other-authority")
        .encode(&Claims::for_user(
            &claims.uid,
            &claims.sub,
            &claims.name,
            "other-authority",
            Duration::minutes(30),
        )
        .unwrap())
        .unwrap();

    // Same issuer, different secret
    let other_secret = auth::JwtHandler::new(b"another-secret-that-is-at-least-32-bytes", ISSUER)
        .encode(&claims)
        .unwrap();

    // Tampered payload under the original signature
    let foreign_payload = other_issuer.split('.').nth(1).unwrap().to_string();
    let mut parts: Vec<&str> = token.split('.').collect();
    parts[1] = &foreign_payload;
    let tampered = parts.join(".");

    for token in [other_issuer, other_secret, tampered] {
        let response = app
            .get_with_cookie("/auth/user", &token)
            .send()
            .await
            .expect("Failed to execute request");
        unauthorized_body(response).await;
    }
}

#[tokio::test]
async fn test_logout_clears_cookie_and_is_idempotent() {
    let app = TestApp::spawn().await;
    registered_session(&app).await;

    let first = app
        .post("/logout")
        .send()
        .await
        .expect("Failed to execute request");
    let first_cookie = first
        .headers()
        .get(reqwest::header::SET_COOKIE)
        .cloned()
        .expect("Logout did not clear the cookie");
    assert_eq!(first.status(), StatusCode::OK);

    let second = app
        .get("/logout")
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(second.status(), StatusCode::OK);
    assert_eq!(
        second.headers().get(reqwest::header::SET_COOKIE),
        Some(&first_cookie)
    );
    assert!(first_cookie.to_str().unwrap().contains("Max-Age=0"));

    // The client dropped its cookie
    let response = app
        .get("/auth/user")
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_token_issues_new_session() {
    let app = TestApp::spawn().await;
    let original = registered_session(&app).await;
    let original_claims = app.jwt_handler.decode(&original).unwrap();

    // Tokens carry second precision
    tokio::time::sleep(std::time::Duration::from_millis(1100)).await;

    let response = app
        .get("/auth/refresh-token")
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::OK);

    let refreshed = session_cookie(&response).expect("Refresh did not set a cookie");
    let refreshed_claims = app.jwt_handler.decode(&refreshed).unwrap();

    assert_eq!(refreshed_claims.uid, original_claims.uid);
    assert!(refreshed_claims.exp > original_claims.exp);

    let response = app
        .get("/auth/user")
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_refresh_token_requires_session() {
    let app = TestApp::spawn().await;

    let response = app
        .get("/auth/refresh-token")
        .send()
        .await
        .expect("Failed to execute request");

    unauthorized_body(response).await;
}

#[tokio::test]
async fn test_delete_current_user() {
    let app = TestApp::spawn().await;
    let token = registered_session(&app).await;

    let response = app
        .delete("/auth/user")
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .get(reqwest::header::SET_COOKIE)
        .is_some());

    // A still-valid token for a deleted user opens nothing
    let response = app
        .get_with_cookie("/auth/user", &token)
        .send()
        .await
        .expect("Failed to execute request");
    unauthorized_body(response).await;

    let response = app.login("a@x.com", "pw").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // The email can be registered again
    let response = app.register("a@x.com", "pw", "A").await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn test_old_token_does_not_reach_new_owner_of_email() {
    let app = TestApp::spawn().await;
    let old_token = registered_session(&app).await;

    let response = app
        .delete("/auth/user")
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.register("a@x.com", "pw2", "B").await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .get_with_cookie("/auth/user", &old_token)
        .send()
        .await
        .expect("Failed to execute request");
    unauthorized_body(response).await;

    let response = app
        .delete_with_cookie("/auth/user", &old_token)
        .send()
        .await
        .expect("Failed to execute request");
    unauthorized_body(response).await;

    let response = app
        .get_with_cookie("/auth/refresh-token", &old_token)
        .send()
        .await
        .expect("Failed to execute request");
    unauthorized_body(response).await;

    // The new account survived the old token
    let response = app.login("a@x.com", "pw2").await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .get("/auth/user")
        .send()
        .await
        .expect("Failed to execute request");
    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["data"]["name"], "B");
}

#[tokio::test]
async fn test_bearer_transport_returns_token_in_body() {
    let app = TestApp::spawn_with(TransportKind::Bearer).await;
    app.register("a@x.com", "pw", "A").await;

    let response = app.login("a@x.com", "pw").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .get(reqwest::header::SET_COOKIE)
        .is_none());

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    let token = body["data"]["token"]
        .as_str()
        .expect("Bearer login must return the token")
        .to_string();

    let response = app
        .get_authenticated("/auth/user", &token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::OK);

    // The bearer transport does not look at cookies
    let response = app
        .get_with_cookie("/auth/user", &token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_session_lifecycle() {
    let app = TestApp::spawn().await;

    let response = app.register("a@x.com", "pw", "A").await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app.register("a@x.com", "pw", "A").await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app.login("a@x.com", "wrong").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app.login("a@x.com", "pw").await;
    assert_eq!(response.status(), StatusCode::OK);
    let token = session_cookie(&response).expect("Login did not set a session cookie");

    let response = app
        .get_with_cookie("/auth/user", &token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["data"]["name"], "A");
    assert_eq!(body["data"]["email"], "a@x.com");

    let response = app
        .post("/logout")
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::OK);
}
