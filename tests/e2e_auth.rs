//! E2E tests for admin login, logout and the session guard

mod common;

use chrono::{Duration, Utc};
use common::{ADMIN_PASSWORD, TestServer, set_cookie, test_config};
use reqwest::StatusCode;
use reqwest::header::SET_COOKIE;
use serde_json::{Value, json};
use tourney::auth::{ADMIN_SUBJECT, create_session_token};

async fn get_session(server: &TestServer, cookie: Option<String>) -> reqwest::Response {
    let mut request = server.client.get(server.url("/api/admin/session"));
    if let Some(cookie) = cookie {
        request = request.header("Cookie", cookie);
    }
    request.send().await.expect("request succeeds")
}

#[tokio::test]
async fn test_login_sets_cookie_with_profile_attributes() {
    let server = TestServer::new().await;

    let response = server
        .client
        .post(server.url("/api/admin/login"))
        .json(&json!({ "password": ADMIN_PASSWORD }))
        .send()
        .await
        .expect("request succeeds");

    assert_eq!(response.status(), StatusCode::OK);
    let cookie = set_cookie(&response, "admin_session").expect("admin cookie set");
    assert!(!cookie.value().is_empty());
    assert_eq!(cookie.http_only(), Some(true));
    assert_eq!(cookie.same_site(), Some(cookie::SameSite::Lax));
    assert_eq!(cookie.path(), Some("/"));
    assert_eq!(cookie.max_age(), Some(cookie::time::Duration::seconds(86_400)));
    // Plain-http local deployment
    assert_ne!(cookie.secure(), Some(true));

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["authenticated"], true);
    assert!(body["expires_at"].is_string());
}

#[tokio::test]
async fn test_login_sets_secure_cookie_on_https_deployment() {
    let mut config = test_config();
    config.server.domain = "cup.example.com".to_string();
    config.server.protocol = "https".to_string();
    let server = TestServer::with_config(config).await;

    let response = server
        .client
        .post(server.url("/api/admin/login"))
        .json(&json!({ "password": ADMIN_PASSWORD }))
        .send()
        .await
        .expect("request succeeds");

    assert_eq!(response.status(), StatusCode::OK);
    let cookie = set_cookie(&response, "admin_session").expect("admin cookie set");
    assert_eq!(cookie.secure(), Some(true));
    assert_eq!(cookie.http_only(), Some(true));
}

#[tokio::test]
async fn test_login_rejects_wrong_password_without_cookie() {
    let server = TestServer::new().await;

    let response = server
        .client
        .post(server.url("/api/admin/login"))
        .json(&json!({ "password": "not the password" }))
        .send()
        .await
        .expect("request succeeds");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().get(SET_COOKIE).is_none());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "error": "Invalid credentials" }));
}

#[tokio::test]
async fn test_login_rejects_unreadable_body_as_json_error() {
    let server = TestServer::new().await;

    let requests = [
        server.client.post(server.url("/api/admin/login")),
        server
            .client
            .post(server.url("/api/admin/login"))
            .json(&json!({})),
        server
            .client
            .post(server.url("/api/admin/login"))
            .header("Content-Type", "application/json")
            .body("{\"password\":"),
    ];

    for request in requests {
        let response = request.send().await.expect("request succeeds");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(response.headers().get(SET_COOKIE).is_none());
        let body: Value = response.json().await.unwrap();
        assert!(body["error"].is_string());
    }
}

#[tokio::test]
async fn test_guard_denies_absent_malformed_and_expired_alike() {
    let server = TestServer::new().await;
    let expired = server.admin_token_at(Utc::now() - Duration::hours(25));

    let cases = [
        None,
        Some(server.admin_cookie("garbage")),
        Some(server.admin_cookie(&expired)),
    ];

    for cookie in cases {
        let response = get_session(&server, cookie.clone()).await;
        assert_eq!(
            response.status(),
            StatusCode::UNAUTHORIZED,
            "cookie {cookie:?}"
        );
        assert!(response.headers().get(SET_COOKIE).is_none());
        let body: Value = response.json().await.unwrap();
        assert_eq!(body, json!({ "error": "Authentication required" }));
    }
}

#[tokio::test]
async fn test_guard_denies_foreign_and_tampered_tokens() {
    let server = TestServer::new().await;
    let now = Utc::now();

    let foreign = create_session_token(
        "some-other-deployment-secret-32-bytes",
        "admin_session",
        ADMIN_SUBJECT,
        now,
        Duration::hours(24),
    )
    .unwrap();

    let mut tampered = server.admin_token();
    let last = tampered.pop().unwrap();
    tampered.push(if last == 'A' { 'B' } else { 'A' });

    let (visitor_cookie, _) = server.state.visitor.issue("01HXVISITOR", now).unwrap();

    for token in [foreign, tampered, visitor_cookie.value().to_string()] {
        let response = get_session(&server, Some(server.admin_cookie(&token))).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}

#[tokio::test]
async fn test_guard_allows_fresh_session() {
    let server = TestServer::new().await;
    let token = server.login().await;

    let response = get_session(&server, Some(server.admin_cookie(&token))).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["authenticated"], true);
    assert!(body["issued_at"].is_string());
}

#[tokio::test]
async fn test_logout_clears_cookie_but_token_survives_replay() {
    let server = TestServer::new().await;
    let token = server.login().await;

    let response = server
        .client
        .post(server.url("/api/admin/logout"))
        .header("Cookie", server.admin_cookie(&token))
        .send()
        .await
        .expect("request succeeds");

    assert_eq!(response.status(), StatusCode::OK);
    let cleared = set_cookie(&response, "admin_session").expect("clearing cookie set");
    assert_eq!(cleared.value(), "");
    assert_eq!(cleared.max_age(), Some(cookie::time::Duration::ZERO));
    assert_eq!(cleared.http_only(), Some(true));
    assert_eq!(cleared.same_site(), Some(cookie::SameSite::Lax));
    assert_eq!(cleared.path(), Some("/"));
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "authenticated": false }));

    // Stateless sessions: a client that kept the old token is still accepted
    let replay = get_session(&server, Some(server.admin_cookie(&token))).await;
    assert_eq!(replay.status(), StatusCode::OK);

    // A client that dropped it is not
    let dropped = get_session(&server, None).await;
    assert_eq!(dropped.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_requires_session() {
    let server = TestServer::new().await;

    let response = server
        .client
        .post(server.url("/api/admin/logout"))
        .send()
        .await
        .expect("request succeeds");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().get(SET_COOKIE).is_none());
}
