#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::Router;
use chrono::{DateTime, Utc};
use folio::auth::{hash_password, NewClaims, Role};
use folio::config::Config;
use folio::db::{create_user, User};
use folio::AppState;
use http_body_util::BodyExt;
use serde_json::Value;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

pub const SECRET: &str = "integration-test-secret";
pub const PASSWORD: &str = "password123";

const BOUNDARY: &str = "folio-test-boundary";

pub struct TestApp {
    pub router: Router,
    pub state: Arc<AppState>,
    pub uploads: TempDir,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
    pub text: String,
}

impl TestResponse {
    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
    }

    pub fn set_cookie(&self) -> Option<&str> {
        self.headers
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
    }
}

pub async fn spawn_app() -> TestApp {
    let uploads = TempDir::new().unwrap();

    let mut config = Config::default();
    config.auth.jwt_secret = Some(SECRET.to_string());
    config.server.upload_dir = uploads.path().to_path_buf();
    config.server.static_dir = uploads.path().join("static");

    let db = folio::db::init_in_memory().await.unwrap();
    let state = Arc::new(AppState::new(config, db).unwrap());
    let router = folio::api::create_router(state.clone());

    TestApp {
        router,
        state,
        uploads,
    }
}

impl TestApp {
    pub async fn user(&self, email: &str, role: Role) -> User {
        let hash = hash_password(PASSWORD).unwrap();
        create_user(&self.state.db, email, &hash, Some("Test User"), role)
            .await
            .unwrap()
    }

    pub fn token(&self, user: &User) -> String {
        self.token_at(user, Utc::now())
    }

    pub fn token_at(&self, user: &User, issued_at: DateTime<Utc>) -> String {
        self.state
            .tokens
            .issue_at(
                NewClaims {
                    user_id: user.id.clone(),
                    email: user.email.clone(),
                    role: user.role_enum().unwrap(),
                    name: user.name.clone(),
                },
                issued_at,
            )
            .unwrap()
    }

    /// User plus a session token for them
    pub async fn session(&self, email: &str, role: Role) -> (User, String) {
        let user = self.user(email, role).await;
        let token = self.token(&user);
        (user, token)
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let text = String::from_utf8_lossy(&bytes).to_string();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        TestResponse {
            status,
            headers,
            body,
            text,
        }
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.send(request(Method::GET, uri, token, None)).await
    }

    pub async fn json(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Value,
    ) -> TestResponse {
        self.send(request(method, uri, token, Some(body))).await
    }

    pub async fn multipart(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        fields: &[(&str, &str)],
        file: Option<(&str, &str, &[u8])>,
    ) -> TestResponse {
        self.send(multipart_request(method, uri, token, fields, file))
            .await
    }
}

fn with_cookie(builder: axum::http::request::Builder, token: Option<&str>) -> axum::http::request::Builder {
    match token {
        Some(token) => builder.header(header::COOKIE, format!("token={}", token)),
        None => builder,
    }
}

pub fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let builder = with_cookie(Request::builder().method(method).uri(uri), token);
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub fn multipart_request(
    method: Method,
    uri: &str,
    token: Option<&str>,
    fields: &[(&str, &str)],
    file: Option<(&str, &str, &[u8])>,
) -> Request<Body> {
    let mut body: Vec<u8> = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((field, filename, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    with_cookie(Request::builder().method(method).uri(uri), token)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}
