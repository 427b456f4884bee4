#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

use storefront_events::{
    app,
    config::UploadConfig,
    middleware::{SessionClaims, SessionTokenVerifier},
    services::ShopifyFilesClient,
    store::{MemoryStore, Store},
    AppState,
};

pub const API_KEY: &str = "test-api-key";
pub const API_SECRET: &str = "test-api-secret";
pub const SHOP: &str = "gala-tickets.myshopify.com";
pub const ACCESS_TOKEN: &str = "shpat_test";
pub const MULTIPART_BOUNDARY: &str = "storefront-events-boundary";

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
}

/// Приложение поверх in-memory хранилища. `graphql_url` - куда ходит клиент Shopify Files.
pub fn test_app_with(graphql_url: &str, upload: UploadConfig) -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let state = Arc::new(AppState {
        store: store.clone() as Arc<dyn Store>,
        auth: Arc::new(SessionTokenVerifier::new(API_KEY, API_SECRET, SHOP)),
        files: ShopifyFilesClient::new(graphql_url.to_string(), ACCESS_TOKEN.to_string())
            .expect("http client"),
        upload,
    });
    TestApp {
        router: app(state),
        store,
    }
}

pub fn test_app() -> TestApp {
    test_app_with("http://127.0.0.1:9/admin/api/2024-10/graphql.json", UploadConfig::default())
}

pub fn admin_token() -> String {
    token_for(&format!("https://{SHOP}"), API_SECRET)
}

pub fn token_for(dest: &str, secret: &str) -> String {
    let now = chrono::Utc::now().timestamp() as usize;
    let claims = SessionClaims {
        iss: format!("{dest}/admin"),
        dest: dest.to_string(),
        aud: API_KEY.to_string(),
        sub: Some("1".to_string()),
        exp: now + 60,
        nbf: Some(now - 5),
        iat: Some(now - 5),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("encode session token")
}

pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("read body")
            .to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        TestResponse { status, body }
    }

    pub async fn get(&self, uri: &str, admin: bool) -> TestResponse {
        self.send(request(Method::GET, uri, admin).body(Body::empty()).unwrap())
            .await
    }

    pub async fn post_form<T: Serialize>(&self, uri: &str, form: &T, admin: bool) -> TestResponse {
        let body = serde_urlencoded::to_string(form).expect("urlencode form");
        self.send(
            request(Method::POST, uri, admin)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
    }

    pub async fn put_json(&self, uri: &str, json: &Value, admin: bool) -> TestResponse {
        self.send(
            request(Method::PUT, uri, admin)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
        )
        .await
    }

    pub async fn patch(&self, uri: &str, admin: bool) -> TestResponse {
        self.send(request(Method::PATCH, uri, admin).body(Body::empty()).unwrap())
            .await
    }

    pub async fn delete(&self, uri: &str, admin: bool) -> TestResponse {
        self.send(request(Method::DELETE, uri, admin).body(Body::empty()).unwrap())
            .await
    }

    pub async fn post_multipart(&self, uri: &str, body: Vec<u8>, admin: bool) -> TestResponse {
        self.send(
            request(Method::POST, uri, admin)
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}"),
                )
                .body(Body::from(body))
                .unwrap(),
        )
        .await
    }

    /// Создает событие через API и возвращает его id.
    pub async fn create_event(&self, fields: &[(&str, &str)]) -> i64 {
        let response = self.post_form("/api/events", &fields, true).await;
        assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
        response.body["event"]["id"].as_i64().expect("event id")
    }
}

fn request(method: Method, uri: &str, admin: bool) -> axum::http::request::Builder {
    let builder = Request::builder().method(method).uri(uri);
    if admin {
        builder.header(header::AUTHORIZATION, format!("Bearer {}", admin_token()))
    } else {
        builder
    }
}

/// multipart-тело с одним файлом в поле `field`.
pub fn multipart_file(field: &str, filename: &str, content_type: &str, bytes: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{MULTIPART_BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n")
            .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{MULTIPART_BOUNDARY}--\r\n").as_bytes());
    body
}

/// multipart-тело из текстовых полей, как его отправляет `fetch` с `new FormData()`.
pub fn multipart_fields(fields: &[(&str, &str)]) -> Vec<u8> {
    let mut body = String::new();
    for (name, value) in fields {
        body.push_str(&format!("--{MULTIPART_BOUNDARY}\r\n"));
        body.push_str(&format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n"));
        body.push_str(value);
        body.push_str("\r\n");
    }
    body.push_str(&format!("--{MULTIPART_BOUNDARY}--\r\n"));
    body.into_bytes()
}
