#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::SqlitePool;
use tower::ServiceExt;

use stencil_api::auth::jwt::JwtConfig;
use stencil_api::auth::password::hash_password;
use stencil_api::config::ServerConfig;
use stencil_api::router::build_app_router;
use stencil_api::state::AppState;
use stencil_db::models::user::{NewUser, User};
use stencil_db::repositories::UserRepo;
use stencil_mailer::{DeliveryReceipt, MailError, MailTransport, OutgoingMessage};

/// Password used for every user created through [`create_user`].
pub const TEST_PASSWORD: &str = "Passw0rdTest";

const TEST_JWT_SECRET: &str = "test-secret-that-is-at-least-32-characters-long";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        database_url: "sqlite::memory:".to_string(),
        jwt: JwtConfig {
            secret: TEST_JWT_SECRET.to_string(),
            expiry_hours: 1,
        },
    }
}

// ---------------------------------------------------------------------------
// Mail transport double
// ---------------------------------------------------------------------------

/// In-memory [`MailTransport`] that records what it was asked to send.
pub struct RecordingTransport {
    configured: bool,
    sent: Mutex<Vec<OutgoingMessage>>,
    next_failure: Mutex<Option<MailError>>,
}

impl RecordingTransport {
    pub fn configured() -> Arc<Self> {
        Arc::new(Self {
            configured: true,
            sent: Mutex::new(Vec::new()),
            next_failure: Mutex::new(None),
        })
    }

    pub fn unconfigured() -> Arc<Self> {
        Arc::new(Self {
            configured: false,
            sent: Mutex::new(Vec::new()),
            next_failure: Mutex::new(None),
        })
    }

    /// Make the next send fail with `err`.
    pub fn fail_next(&self, err: MailError) {
        *self.next_failure.lock().unwrap() = Some(err);
    }

    pub fn sent(&self) -> Vec<OutgoingMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl MailTransport for RecordingTransport {
    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn send(&self, message: OutgoingMessage) -> Result<DeliveryReceipt, MailError> {
        if let Some(err) = self.next_failure.lock().unwrap().take() {
            return Err(err);
        }
        let receipt = DeliveryReceipt {
            message_id: format!("<test-{}@stencil.test>", self.sent.lock().unwrap().len() + 1),
            accepted: vec![message.to.clone()],
        };
        self.sent.lock().unwrap().push(message);
        Ok(receipt)
    }
}

// ---------------------------------------------------------------------------
// App construction
// ---------------------------------------------------------------------------

/// Build the full application router with a configured recording transport.
pub fn build_test_app(pool: SqlitePool) -> Router {
    build_test_app_with_mailer(pool, RecordingTransport::configured())
}

/// Build the full application router around the given transport.
pub fn build_test_app_with_mailer(pool: SqlitePool, mailer: Arc<RecordingTransport>) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        mailer,
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Users and tokens
// ---------------------------------------------------------------------------

/// Insert a user with [`TEST_PASSWORD`].
pub async fn create_user(pool: &SqlitePool, username: &str, role: &str) -> User {
    let input = NewUser {
        username: username.to_string(),
        email: Some(format!("{username}@test.com")),
        password_hash: hash_password(TEST_PASSWORD).expect("hashing should succeed"),
        role: role.to_string(),
    };
    UserRepo::create(pool, &input)
        .await
        .expect("user creation should succeed")
}

/// Mint a token for an existing user without going through `/api/login`.
pub fn token_for(user: &User) -> String {
    test_config()
        .jwt
        .issue(user.id, &user.username, &user.role)
        .expect("token generation should succeed")
}

/// Create an admin user and return a bearer token for it.
pub async fn admin_token(pool: &SqlitePool) -> String {
    let user = create_user(pool, "admin_user", "admin").await;
    token_for(&user)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, Some(token), None).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Collect a response body as UTF-8 text.
pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}
