pub mod config;
pub mod database;
pub mod error;
pub mod models;
pub mod store;
pub mod controllers;
pub mod middleware;
pub mod services;

use axum::{
    http::{header, Method},
    routing::get,
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

use config::{Config, StorageBackend, UploadConfig};
use middleware::{AdminAuthenticator, SessionTokenVerifier};
use services::ShopifyFilesClient;
use store::{MemoryStore, PgStore, Store};

// Shared state для всего приложения
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub auth: Arc<dyn AdminAuthenticator>,
    pub files: ShopifyFilesClient,
    pub upload: UploadConfig,
}

impl AppState {
    pub async fn new(config: &Config) -> anyhow::Result<Arc<Self>> {
        let store: Arc<dyn Store> = match config.database.backend {
            StorageBackend::Postgres => {
                let db = database::Database::connect(&config.database).await?;
                Arc::new(PgStore::new(db))
            }
            StorageBackend::Memory => {
                info!("Using in-memory storage, data is lost on restart");
                Arc::new(MemoryStore::new())
            }
        };

        let auth = Arc::new(SessionTokenVerifier::new(
            &config.shopify.api_key,
            &config.shopify.api_secret,
            &config.shopify.shop_domain,
        ));
        let files = ShopifyFilesClient::from_config(&config.shopify)?;

        Ok(Arc::new(Self {
            store,
            auth,
            files,
            upload: config.upload.clone(),
        }))
    }
}

/// Витрина ходит к публичным эндпоинтам с любого origin. Заголовок Authorization
/// в CORS не разрешен, поэтому кросс-доменные вызовы админских методов не пройдут preflight.
fn storefront_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(|| async { "Storefront Events API v1.0" }))
        .route("/health", get(|| async { "OK" }))
        .nest("/api", controllers::routes(&state.upload))
        .with_state(state)
        .layer(storefront_cors())
        .layer(TraceLayer::new_for_http())
}
