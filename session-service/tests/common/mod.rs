use std::sync::Arc;

use auth::Authenticator;
use auth::Claims;
use auth::HashingCost;
use auth::JwtHandler;
use auth::PasswordHasher;
use chrono::Duration;
use serde_json::json;
use session_service::config::SessionConfig;
use session_service::config::TransportKind;
use session_service::domain::user::service::UserService;
use session_service::inbound::http::router::create_router;
use session_service::inbound::http::transport;
use session_service::outbound::repositories::InMemoryUserRepository;

pub const JWT_SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";
pub const ISSUER: &str = "test-authority";
pub const COOKIE_NAME: &str = "token";

/// Test application that spawns a real server
pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub api_client: reqwest::Client,
    pub jwt_handler: JwtHandler,
}

impl TestApp {
    /// Spawn the application with the cookie transport
    pub async fn spawn() -> Self {
        Self::spawn_with(TransportKind::Cookie).await
    }

    /// Spawn the application in a background task and return TestApp
    pub async fn spawn_with(transport_kind: TransportKind) -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        // Cheap hashing keeps the suite fast
        let password_hasher = PasswordHasher::with_cost(HashingCost {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        })
        .expect("Failed to build password hasher");

        let authenticator = Arc::new(
            Authenticator::new(JWT_SECRET, ISSUER, Duration::minutes(30))
                .with_password_hasher(password_hasher),
        );

        let user_repo = Arc::new(InMemoryUserRepository::new());
        let user_service = Arc::new(UserService::new(user_repo, Arc::clone(&authenticator)));

        // Plain http, so the cookie must not be Secure for the client to send it back
        let session_transport = transport::from_config(&SessionConfig {
            transport: transport_kind,
            cookie_name: COOKIE_NAME.to_string(),
            cookie_path: "/".to_string(),
            cookie_secure: false,
        });

        let router = create_router(user_service, authenticator, session_transport);

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            port,
            api_client: reqwest::Client::builder()
                .cookie_store(true)
                .build()
                .expect("Failed to create reqwest client"),
            jwt_handler: JwtHandler::new(JWT_SECRET, ISSUER),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(self.url(path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(self.url(path))
    }

    /// Helper to make DELETE request
    pub fn delete(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.delete(self.url(path))
    }

    /// GET with an explicit session cookie, bypassing the client's cookie store
    pub fn get_with_cookie(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        reqwest::Client::new()
            .get(self.url(path))
            .header(reqwest::header::COOKIE, format!("{}={}", COOKIE_NAME, token))
    }

    /// DELETE with an explicit session cookie, bypassing the client's cookie store
    pub fn delete_with_cookie(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        reqwest::Client::new()
            .delete(self.url(path))
            .header(reqwest::header::COOKIE, format!("{}={}", COOKIE_NAME, token))
    }

    /// GET with a Bearer token and no cookies
    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        reqwest::Client::new().get(self.url(path)).bearer_auth(token)
    }

    pub async fn register(&self, email: &str, password: &str, name: &str) -> reqwest::Response {
        self.post("/register")
            .json(&json!({
                "email": email,
                "password": password,
                "name": name
            }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn login(&self, email: &str, password: &str) -> reqwest::Response {
        self.post("/login")
            .json(&json!({
                "email": email,
                "password": password
            }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Mint a token for arbitrary claims with the server's secret
    pub fn token_for(&self, claims: &Claims) -> String {
        self.jwt_handler
            .encode(claims)
            .expect("Failed to encode test token")
    }
}

/// Pull the session cookie value out of a response, if set.
pub fn session_cookie(response: &reqwest::Response) -> Option<String> {
    response
        .cookies()
        .find(|cookie| cookie.name() == COOKIE_NAME)
        .map(|cookie| cookie.value().to_string())
}
