//! Test harness: a real server on an ephemeral port over the in-memory
//! store.

#![allow(dead_code, clippy::expect_used, clippy::unwrap_used, clippy::panic)]

use reqwest::{Client, Response, StatusCode};
use serde_json::{Value, json};

use tradehub::api;
use tradehub::app_state::AppState;
use tradehub::auth::{JwtKeys, hash_password};
use tradehub::config::JwtSettings;
use tradehub::domain::{NewUser, Role};
use tradehub::persistence::{InMemoryStore, UserRepository};

/// Password used for every account created by the harness.
pub const PASSWORD: &str = "password123";

/// Email of the pre-provisioned admin.
pub const ADMIN_EMAIL: &str = "root@example.com";

/// Running server plus a client pointed at it.
pub struct TestApp {
    pub base: String,
    pub client: Client,
}

/// A logged-in account.
pub struct Session {
    pub id: i64,
    pub token: String,
}

pub async fn spawn() -> TestApp {
    let store = InMemoryStore::new();
    UserRepository::insert(
        &store,
        NewUser {
            username: "root".to_string(),
            email: ADMIN_EMAIL.to_string(),
            password_hash: hash_password(PASSWORD).expect("hash"),
            role: Role::Admin,
        },
    )
    .await
    .expect("admin insert");

    let keys = JwtKeys::new(&JwtSettings {
        secret: "integration-secret".to_string(),
        issuer: "tradehub".to_string(),
        audience: "tradehub-clients".to_string(),
        expiration_minutes: 5,
    });
    let app = api::build_app(AppState::new(store, keys));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server");
    });

    TestApp {
        base: format!("http://{addr}"),
        client: Client::new(),
    }
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base)
    }

    pub async fn register(&self, username: &str) -> Session {
        let email = format!("{username}@example.com");
        let response = self
            .client
            .post(self.url("/api/v1/auth/register/user"))
            .json(&json!({ "username": username, "email": email, "password": PASSWORD }))
            .send()
            .await
            .expect("register request");
        assert_eq!(response.status(), StatusCode::CREATED);
        self.login(&email).await
    }

    pub async fn login(&self, email: &str) -> Session {
        let response = self
            .client
            .post(self.url("/api/v1/auth/login"))
            .json(&json!({ "email": email, "password": PASSWORD }))
            .send()
            .await
            .expect("login request");
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = response.json().await.expect("login body");
        Session {
            id: body["user"]["id"].as_i64().expect("user id"),
            token: body["access_token"].as_str().expect("token").to_string(),
        }
    }

    pub async fn admin(&self) -> Session {
        self.login(ADMIN_EMAIL).await
    }

    pub async fn get(&self, session: &Session, path: &str) -> Response {
        self.client
            .get(self.url(path))
            .bearer_auth(&session.token)
            .send()
            .await
            .expect("GET")
    }

    pub async fn post(&self, session: &Session, path: &str, body: Value) -> Response {
        self.client
            .post(self.url(path))
            .bearer_auth(&session.token)
            .json(&body)
            .send()
            .await
            .expect("POST")
    }

    pub async fn put(&self, session: &Session, path: &str, body: Option<Value>) -> Response {
        let request = self.client.put(self.url(path)).bearer_auth(&session.token);
        let request = match body {
            Some(body) => request.json(&body),
            None => request,
        };
        request.send().await.expect("PUT")
    }

    pub async fn patch(&self, session: &Session, path: &str, body: Value) -> Response {
        self.client
            .patch(self.url(path))
            .bearer_auth(&session.token)
            .json(&body)
            .send()
            .await
            .expect("PATCH")
    }

    pub async fn delete(&self, session: &Session, path: &str) -> Response {
        self.client
            .delete(self.url(path))
            .bearer_auth(&session.token)
            .send()
            .await
            .expect("DELETE")
    }

    /// Creates an available item and returns its JSON.
    pub async fn create_item(&self, session: &Session, name: &str) -> Value {
        let response = self
            .post(
                session,
                "/api/v1/items",
                json!({
                    "name": name,
                    "description": "test item",
                    "value": "25.00",
                    "tags": ["test"],
                    "condition": "used_good",
                }),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        response.json().await.expect("item body")
    }
}

/// Extracts `error.code` from an error response.
pub async fn error_code(response: Response) -> u64 {
    let body: Value = response.json().await.expect("error body");
    body["error"]["code"].as_u64().expect("error code")
}
