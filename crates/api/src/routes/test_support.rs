//! Router test harness: SQLite in memory, local media storage in a temp dir.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use glimpse_core::auth::JwtAuthProvider;
use glimpse_core::storage::{StorageConfig, StorageProvider, StorageService};
use glimpse_db::{UserRepository, init_schema};
use glimpse_shared::{EmailConfig, EmailService, JwtConfig, JwtService, UserUpdate};
use http_body_util::BodyExt;
use sea_orm::{ConnectOptions, Database};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;
use uuid::Uuid;

use crate::{AppState, create_router};

pub const PASSWORD: &str = "s3cure-passphrase";
pub const BOUNDARY: &str = "glimpse-test-boundary";

pub struct TestApp {
    pub state: AppState,
    pub router: Router,
    pub media: TempDir,
}

pub async fn test_app() -> TestApp {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).min_connections(1).sqlx_logging(false);
    let db = Database::connect(options).await.expect("connect sqlite");
    init_schema(&db).await.expect("create schema");

    let jwt = Arc::new(JwtService::new(JwtConfig {
        secret: "router-test-secret".into(),
        ..JwtConfig::default()
    }));
    let auth = JwtAuthProvider::new(jwt, UserRepository::new(db.clone()));

    let media = tempfile::tempdir().expect("media dir");
    let storage = StorageService::from_config(StorageConfig::new(StorageProvider::local_fs(
        media.path(),
        "http://localhost:8000/media",
    )))
    .expect("local storage");

    let state = AppState {
        db: Arc::new(db),
        auth: Arc::new(auth),
        storage: Arc::new(storage),
        email: Arc::new(EmailService::new(EmailConfig::default())),
    };
    let router = create_router(state.clone());

    TestApp {
        state,
        router,
        media,
    }
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        send(self.router.clone(), request).await
    }

    /// Registers `email` and returns its ID with a fresh bearer token.
    pub async fn signup(&self, email: &str) -> (Uuid, String) {
        let (status, user) = self
            .send(json_request(
                "POST",
                "/auth/register",
                None,
                &serde_json::json!({ "email": email, "password": PASSWORD }),
            ))
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {user}");
        let id = user["id"].as_str().unwrap().parse().unwrap();

        (id, self.login(email, PASSWORD).await)
    }

    pub async fn login(&self, email: &str, password: &str) -> String {
        let (status, body) = self.send(login_request(email, password)).await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        body["access_token"].as_str().unwrap().to_string()
    }

    pub async fn promote(&self, id: Uuid) {
        self.state
            .auth
            .update_user(
                id,
                UserUpdate {
                    is_superuser: Some(true),
                    ..UserUpdate::default()
                },
            )
            .await
            .unwrap();
    }

    pub async fn upload(
        &self,
        token: &str,
        file_name: &str,
        content_type: &str,
        caption: &str,
    ) -> (StatusCode, Value) {
        self.send(multipart_request(
            Some(token),
            Some((file_name, content_type, b"fake-media".as_slice())),
            Some(caption),
        ))
        .await
    }
}

/// Runs `request` through `router`; an empty body comes back as `Null`.
pub async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, json)
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

pub fn empty_request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, bearer(token));
    }
    builder.body(Body::empty()).unwrap()
}

pub fn json_request(method: &str, uri: &str, token: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, bearer(token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn login_request(email: &str, password: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/auth/jwt/login")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(format!(
            "username={}&password={}",
            email.replace('@', "%40"),
            password
        )))
        .unwrap()
}

pub fn multipart_request(
    token: Option<&str>,
    file: Option<(&str, &str, &[u8])>,
    caption: Option<&str>,
) -> Request<Body> {
    let mut body = Vec::new();
    if let Some((file_name, content_type, data)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    if let Some(caption) = caption {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"caption\"\r\n\r\n{caption}\r\n"
            )
            .as_bytes(),
        );
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    let mut builder = Request::builder().method("POST").uri("/upload").header(
        header::CONTENT_TYPE,
        format!("multipart/form-data; boundary={BOUNDARY}"),
    );
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, bearer(token));
    }
    builder.body(Body::from(body)).unwrap()
}
