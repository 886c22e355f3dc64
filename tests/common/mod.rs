#![allow(dead_code)]

use std::sync::Arc;

use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::{json, Value};
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

use cinema_client::{
    api::{ApiClient, HttpTransport},
    auth::{AuthSession, TokenClaims},
    cache::QueryCache,
    config::CacheConfig,
    notify::Toasts,
    storage::MemoryStorage,
};

pub struct Harness {
    pub server: MockServer,
    pub storage: Arc<MemoryStorage>,
    pub api: ApiClient,
    pub toasts: Toasts,
}

pub async fn harness() -> Harness {
    let server = MockServer::start().await;
    let storage = Arc::new(MemoryStorage::new());
    let transport = HttpTransport::with_client(&server.uri(), reqwest::Client::new());
    let auth = Arc::new(AuthSession::new(transport.clone(), storage.clone()));
    let cache = QueryCache::from_config(&CacheConfig {
        ttl_seconds: 60,
        max_capacity: 100,
    });
    Harness {
        server,
        storage,
        api: ApiClient::new(transport, auth, cache),
        toasts: Toasts::new(),
    }
}

pub fn token_expiring_at(exp: i64) -> String {
    let claims = TokenClaims {
        sub: Some(1),
        exp,
        iat: Some(exp - 3600),
        iss: Some("ticketo".to_string()),
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(b"secret-known-only-to-server"),
    )
    .unwrap()
}

pub fn fresh_token() -> String {
    token_expiring_at(Utc::now().timestamp() + 3600)
}

pub fn user_json(admin: bool) -> Value {
    json!({
        "id": 1,
        "username": if admin { "admin" } else { "viewer" },
        "email": "viewer@example.com",
        "created_at": "2025-01-01T00:00:00Z",
        "role": {"id": if admin { 3 } else { 1 }, "name": if admin { "admin" } else { "user" }, "level": 1}
    })
}

pub fn data(value: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "data": value }))
}

/// Вход через мок `/users/me`.
pub async fn log_in(h: &Harness, admin: bool) {
    Mock::given(method("GET"))
        .and(path("/users/me"))
        .respond_with(data(user_json(admin)))
        .mount(&h.server)
        .await;
    h.api.auth().login(&fresh_token()).await.unwrap();
}

pub fn movie_json(id: i64, slug: &str) -> Value {
    json!({
        "id": id,
        "slug": slug,
        "title": "Dune: Part Two",
        "description": "Paul Atreides unites with the Fremen",
        "duration": 166,
        "release_date": "2024-03-01"
    })
}

pub fn session_json(id: i64, movie_id: i64, price: f64) -> Value {
    json!({
        "id": id,
        "movie_id": movie_id,
        "room_id": 1,
        "start_time": "2025-03-10 18:30:00",
        "price": price,
        "room": {"id": 1, "name": "Red", "capacity": 40}
    })
}

pub fn seat_json(id: i64, row: i32, number: i32, reserved: bool) -> Value {
    json!({
        "id": id,
        "room_id": 1,
        "row": row,
        "seat_number": number,
        "price": 120.0,
        "status": if reserved { "reserved" } else { "available" }
    })
}

/// Ответ `/tickets/session/{session}/seat/{seat}`: сервер заполняет только
/// id, владельца, цену и дату, остальные поля приходят нулевыми.
pub fn ticket_json(id: i64, status: &str) -> Value {
    json!({
        "id": id,
        "session_id": 0,
        "seat_id": 0,
        "user_id": null,
        "price": 120.0,
        "created_at": "2025-03-01T10:00:00Z",
        "status": status
    })
}
