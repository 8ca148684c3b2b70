//! Black-box API tests
//!
//! Binds the production router, backed by the in-memory store, to an
//! ephemeral port and talks to it over HTTP with bearer tokens.

use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use serde_json::{json, Value};
use tyre_stock_ledger::config::{
    DatabaseConfig, JwtConfig, NotificationConfig, ServerConfig, StorageBackend, StorageConfig,
};
use tyre_stock_ledger::{build_state, create_app, Config};

const JWT_SECRET: &str = "test-secret";

struct TestServer {
    base_url: String,
    client: reqwest::Client,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn() -> Self {
        let config = Config {
            environment: "test".to_string(),
            server: ServerConfig::default(),
            database: DatabaseConfig {
                url: String::new(),
                max_connections: 1,
                min_connections: 0,
            },
            storage: StorageConfig {
                backend: StorageBackend::Memory,
            },
            jwt: JwtConfig {
                secret: JWT_SECRET.to_string(),
            },
            notification: NotificationConfig::default(),
        };

        let state = build_state(config).await.expect("failed to build state");
        let app = create_app(state);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            client: reqwest::Client::new(),
            handle,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get(&self, path: &str, token: &str) -> (StatusCode, Value) {
        let res = self
            .client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .unwrap();
        (res.status(), res.json().await.unwrap())
    }

    async fn post(&self, path: &str, token: &str, body: Value) -> (StatusCode, Value) {
        let res = self
            .client
            .post(self.url(path))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .unwrap();
        (res.status(), res.json().await.unwrap())
    }

    async fn put(&self, path: &str, token: &str, body: Value) -> (StatusCode, Value) {
        let res = self
            .client
            .put(self.url(path))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .unwrap();
        (res.status(), res.json().await.unwrap())
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn mint_jwt(role: &str) -> String {
    let now = Utc::now();
    let claims = json!({
        "sub": uuid::Uuid::new_v4().to_string(),
        "role": role,
        "iat": now.timestamp(),
        "exp": (now + ChronoDuration::minutes(10)).timestamp(),
    });

    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .expect("failed to encode jwt")
}

fn today() -> String {
    Utc::now().date_naive().to_string()
}

fn receipt_body(item: &str, quantity: i64) -> Value {
    json!({
        "date": today(),
        "tyreSize": item,
        "quantity": quantity,
        "SSP": 120,
        "costPricePerUnit": 100,
        "totalAmount": quantity * 100,
        "location": "Rack A",
    })
}

fn sale_body(item: &str, quantity: i64) -> Value {
    json!({
        "item": item,
        "quantity": quantity,
        "costPricePerUnit": 100,
        "customerName": "Jane",
        "phoneNumber": "0700000000",
        "comment": "walk-in",
    })
}

#[tokio::test]
async fn health_and_banner_are_public() {
    let srv = TestServer::spawn().await;

    let res = srv.client.get(srv.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["storage"], "connected");

    let res = srv.client.get(srv.url("/")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.text().await.unwrap().contains("Tyre Stock Ledger"));
}

#[tokio::test]
async fn ledger_routes_require_a_valid_token() {
    let srv = TestServer::spawn().await;

    let res = srv
        .client
        .get(srv.url("/api/v1/stock/open"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Unauthorized");

    let (status, _) = srv.get("/api/v1/sales", "not-a-jwt").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn receipt_and_sale_lifecycle() {
    let srv = TestServer::spawn().await;
    let token = mint_jwt("worker");

    let (status, body) = srv
        .post("/api/v1/stock", &token, receipt_body("175/65R14", 10))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({ "message": "Stock updated successfully" }));

    let (status, body) = srv.get("/api/v1/stock/open", &token).await;
    assert_eq!(status, StatusCode::OK);
    let open = body["openStock"].as_array().unwrap();
    assert_eq!(open.len(), 1);
    assert_eq!(open[0]["quantity"], 10);
    assert_eq!(open[0]["status"], "open-stock");

    // Before any sale, today's existing stock falls back to open stock
    let (_, body) = srv.get("/api/v1/stock/existing", &token).await;
    assert_eq!(body["existingStock"][0]["status"], "open-stock");

    let (status, body) = srv
        .post("/api/v1/sales", &token, sale_body("175/65R14", 4))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Stock updated successfully");

    let (_, body) = srv.get("/api/v1/stock/existing", &token).await;
    let existing = body["existingStock"].as_array().unwrap();
    assert_eq!(existing.len(), 1);
    assert_eq!(existing[0]["quantity"], 6);
    assert_eq!(existing[0]["status"], "existing-stock");

    let (_, body) = srv.get("/api/v1/stock/open-days", &token).await;
    let snapshots = body["openStockDays"].as_array().unwrap();
    assert_eq!(snapshots.len(), 1);
    assert_eq!(snapshots[0]["quantity"], 10);

    let (status, body) = srv.get("/api/v1/sales", &token).await;
    assert_eq!(status, StatusCode::OK);
    let records = body["salesRecords"].as_array().unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[1]["customerName"], "Jane");
}

#[tokio::test]
async fn sale_failures_map_to_client_errors() {
    let srv = TestServer::spawn().await;
    let token = mint_jwt("owner");
    srv.post("/api/v1/stock", &token, receipt_body("175/65R14", 6))
        .await;

    let (status, body) = srv
        .post("/api/v1/sales", &token, sale_body("175/65R14", 7))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Insufficient stock quantity");

    let (status, body) = srv
        .post("/api/v1/sales", &token, sale_body("205/55R16", 1))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Item not found in stock");

    let (status, body) = srv
        .post("/api/v1/sales", &token, sale_body("175/65R14", 0))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Validation error");
    assert!(body["error"].as_str().unwrap().starts_with("quantity"));
}

#[tokio::test]
async fn other_roles_are_forbidden_from_mutations() {
    let srv = TestServer::spawn().await;
    let token = mint_jwt("viewer");

    let (status, body) = srv
        .post("/api/v1/stock", &token, receipt_body("175/65R14", 10))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Forbidden");

    let (status, _) = srv
        .put("/api/v1/stock/open", &token, receipt_body("175/65R14", 10))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Reads are open to any authenticated caller
    let (status, body) = srv.get("/api/v1/stock/open", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["openStock"], json!([]));
}

#[tokio::test]
async fn set_open_stock_overrides_todays_line() {
    let srv = TestServer::spawn().await;
    let token = mint_jwt("owner");

    let (status, body) = srv
        .put("/api/v1/stock/open", &token, receipt_body("175/65R14", 9))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Stock updated successfully");

    // No open line existed, so the override landed as existing stock
    let (_, body) = srv.get("/api/v1/stock/existing", &token).await;
    assert_eq!(body["existingStock"][0]["status"], "existing-stock");
    assert_eq!(body["existingStock"][0]["quantity"], 9);
    let (_, body) = srv.get("/api/v1/stock/open", &token).await;
    assert_eq!(body["openStock"], json!([]));
}
