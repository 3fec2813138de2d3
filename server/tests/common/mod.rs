#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tempfile::TempDir;
use tower::ServiceExt;
use uuid::Uuid;

use campus_events_server::auth::{issue_token, JwtConfig};
use campus_events_server::config::Config;
use campus_events_server::models::{NewUser, User};
use campus_events_server::routes::create_routes;
use campus_events_server::state::AppState;
use campus_events_server::store::{EventStore, MemoryStore, UserStore};
use campus_events_server::uploads::ImageStorage;

pub const TEST_SECRET: &str = "integration-test-secret";

const BOUNDARY: &str = "campus-events-test-boundary";

/// Config with every default except the signing secret and upload directory.
pub fn test_config(upload_dir: &std::path::Path) -> Config {
    let mut config = Config::from_vars(|_| None);
    config.jwt = JwtConfig::new(TEST_SECRET, 1);
    config.upload_dir = upload_dir.to_path_buf();
    config
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub config: Config,
    // Dropping the directory removes uploaded files.
    pub upload_dir: TempDir,
}

/// Full router over an in-memory store, with the production middleware stack.
pub fn spawn_app() -> TestApp {
    let store = Arc::new(MemoryStore::new());
    spawn_app_with(store.clone(), store)
}

pub fn spawn_app_with<S>(backend: Arc<S>, store: Arc<MemoryStore>) -> TestApp
where
    S: EventStore + UserStore + 'static,
{
    build_app(backend, store, |_| {})
}

/// Like [`spawn_app`], with request bodies capped at `max_upload_bytes`.
pub fn spawn_app_with_upload_limit(max_upload_bytes: usize) -> TestApp {
    let store = Arc::new(MemoryStore::new());
    build_app(store.clone(), store, |config| {
        config.max_upload_bytes = max_upload_bytes;
    })
}

fn build_app<S>(
    backend: Arc<S>,
    store: Arc<MemoryStore>,
    adjust: impl FnOnce(&mut Config),
) -> TestApp
where
    S: EventStore + UserStore + 'static,
{
    let upload_dir = tempfile::tempdir().expect("temp dir");
    let mut config = test_config(upload_dir.path());
    adjust(&mut config);
    let state = AppState::new(
        backend,
        config.jwt.clone(),
        ImageStorage::new(config.upload_dir.clone()),
    );
    let router = create_routes(state, &config);

    TestApp {
        router,
        store,
        config,
        upload_dir,
    }
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible")
    }

    pub async fn create_user(&self, name: &str) -> User {
        UserStore::create(
            self.store.as_ref(),
            NewUser {
                name: name.to_string(),
                email: format!("{}@college.edu", name.to_lowercase()),
                password_hash: "unused".to_string(),
            },
        )
        .await
        .expect("user creation should succeed")
    }

    pub fn token_for(&self, user_id: Uuid) -> String {
        issue_token(user_id, &self.config.jwt).expect("token generation should succeed")
    }
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes()
        .to_vec()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("valid request")
}

pub fn delete(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(Method::DELETE).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).expect("valid request")
}

pub fn json_request(method: Method, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("valid request")
}

/// An image part for [`multipart_request`]: file name and contents.
pub type ImagePart<'a> = (&'a str, &'a [u8]);

pub fn multipart_body(fields: &[(&str, &str)], image: Option<ImagePart<'_>>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((file_name, data)) = image {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; \
                 filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub fn multipart_request(
    method: Method,
    uri: &str,
    token: Option<&str>,
    fields: &[(&str, &str)],
    image: Option<ImagePart<'_>>,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        );
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    builder
        .body(Body::from(multipart_body(fields, image)))
        .expect("valid request")
}

pub const TECH_FEST: &[(&str, &str)] = &[
    ("title", "Tech Fest"),
    ("description", "Annual fest"),
    ("eventType", "Technical"),
    ("date", "2024-03-01"),
    ("time", "10:00"),
    ("venue", "Main Hall"),
];

/// Creates the Tech Fest event as `token`'s subject and returns the response body.
pub async fn create_tech_fest(app: &TestApp, token: &str) -> serde_json::Value {
    let response = app
        .send(multipart_request(
            Method::POST,
            "/api/events",
            Some(token),
            TECH_FEST,
            None,
        ))
        .await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    body_json(response).await
}
