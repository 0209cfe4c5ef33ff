#![allow(dead_code)]

use std::net::TcpListener;
use std::sync::Arc;

use account_service::configuration::JwtSettings;
use account_service::startup::run;
use account_service::users::{InMemoryUserStore, User, UserStore};
use serde_json::{json, Value};

pub const PASSWORD: &str = "SecurePass123";

pub struct TestApp {
    pub address: String,
    pub store: Arc<InMemoryUserStore>,
    pub client: reqwest::Client,
}

pub fn jwt_settings() -> JwtSettings {
    JwtSettings {
        access_token_secret: "integration-access-secret-at-least-32-chars".to_string(),
        access_token_expiry: 900,
        refresh_token_secret: "integration-refresh-secret-at-least-32-chars".to_string(),
        refresh_token_expiry: 86400,
        issuer: "account_service_tests".to_string(),
    }
}

pub async fn spawn_app() -> TestApp {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    let store = Arc::new(InMemoryUserStore::new());
    let server = run(listener, store.clone(), jwt_settings()).expect("Failed to bind address");
    let _ = tokio::spawn(server);

    TestApp {
        address,
        store,
        client: reqwest::Client::new(),
    }
}

pub fn registration_body(username: &str, email: &str) -> Value {
    json!({
        "full_name": "John Doe",
        "username": username,
        "email": email,
        "password": PASSWORD,
        "avatar": "https://cdn.example.com/avatars/john.png"
    })
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}/api/v1/users{}", self.address, path)
    }

    pub async fn post_json(&self, path: &str, body: &Value) -> reqwest::Response {
        self.client
            .post(&self.url(path))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn register(&self, username: &str, email: &str) -> reqwest::Response {
        self.post_json("/register", &registration_body(username, email)).await
    }

    /// Register `john` and log in, returning the login response body
    pub async fn register_and_login(&self) -> Value {
        let response = self.register("john", "john@example.com").await;
        assert_eq!(201, response.status().as_u16());

        let response = self
            .post_json("/login", &json!({"username": "john", "password": PASSWORD}))
            .await;
        assert_eq!(200, response.status().as_u16());
        response.json().await.expect("Failed to parse response")
    }

    pub async fn refresh(&self, refresh_token: &str) -> reqwest::Response {
        self.post_json("/refresh-token", &json!({ "refresh_token": refresh_token }))
            .await
    }

    pub async fn user_by_username(&self, username: &str) -> User {
        self.store
            .find_by_username_or_email(Some(username), None)
            .await
            .expect("Store lookup failed")
            .expect("User not stored")
    }
}

pub fn token(body: &Value, field: &str) -> String {
    body[field]
        .as_str()
        .unwrap_or_else(|| panic!("No {} in response", field))
        .to_string()
}

pub fn set_cookies(response: &reqwest::Response) -> Vec<String> {
    response
        .headers()
        .get_all("set-cookie")
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect()
}
