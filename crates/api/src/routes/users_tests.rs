use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

use crate::routes::test_support::{empty_request, json_request, test_app};

#[tokio::test]
async fn test_get_me() {
    let app = test_app().await;
    let (id, token) = app.signup("me@example.com").await;

    let (status, user) = app
        .send(empty_request("GET", "/users/me", Some(&token)))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(user["id"], id.to_string());
    assert_eq!(user["email"], "me@example.com");

    let (status, _) = app.send(empty_request("GET", "/users/me", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_patch_me_ignores_flags_and_resets_verification() {
    let app = test_app().await;
    let (_, token) = app.signup("patch@example.com").await;
    let issued = app
        .state
        .auth
        .request_verify("patch@example.com")
        .await
        .unwrap()
        .unwrap();
    app.state.auth.verify_email(&issued.token).await.unwrap();

    let (status, user) = app
        .send(json_request(
            "PATCH",
            "/users/me",
            Some(&token),
            &json!({"email": "patched@example.com", "is_superuser": true}),
        ))
        .await;

    assert_eq!(status, StatusCode::OK, "{user}");
    assert_eq!(user["email"], "patched@example.com");
    assert_eq!(user["is_superuser"], false);
    assert_eq!(user["is_verified"], false);
}

#[tokio::test]
async fn test_admin_routes_require_superuser() {
    let app = test_app().await;
    let (_, token) = app.signup("regular@example.com").await;
    let (other, _) = app.signup("other@example.com").await;

    for method in ["GET", "DELETE"] {
        let (status, _) = app
            .send(empty_request(method, &format!("/users/{other}"), Some(&token)))
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }
}

#[tokio::test]
async fn test_superuser_manages_users() {
    let app = test_app().await;
    let (admin, token) = app.signup("admin@example.com").await;
    app.promote(admin).await;
    let (target, _) = app.signup("target@example.com").await;
    let uri = format!("/users/{target}");

    let (status, user) = app.send(empty_request("GET", &uri, Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(user["email"], "target@example.com");

    let (status, user) = app
        .send(json_request(
            "PATCH",
            &uri,
            Some(&token),
            &json!({"is_active": false, "is_verified": true}),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(user["is_active"], false);
    assert_eq!(user["is_verified"], true);

    let (status, _) = app.send(empty_request("DELETE", &uri, Some(&token))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app.send(empty_request("GET", &uri, Some(&token))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .send(empty_request(
            "DELETE",
            &format!("/users/{}", Uuid::new_v4()),
            Some(&token),
        ))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
