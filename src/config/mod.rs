use serde::Deserialize;
use std::env;
use std::str::FromStr;
use thiserror::Error;

// Главная структура конфигурации - контейнер для всех настроек
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub shopify: ShopifyConfig,
    pub upload: UploadConfig,
}

// Настройки приложения
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub rust_log: String,
}

// Где хранятся события и бронирования
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

// Настройки базы данных
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub backend: StorageBackend,
    pub url: Option<String>,
    pub pool_size: u32,
}

// Настройки приложения Shopify (session token + Admin GraphQL)
#[derive(Debug, Clone, Deserialize)]
pub struct ShopifyConfig {
    pub api_key: String,
    pub api_secret: String,
    pub shop_domain: String,
    pub admin_access_token: String,
    pub api_version: String,
}

impl ShopifyConfig {
    /// URL Admin GraphQL API магазина.
    pub fn graphql_url(&self) -> String {
        format!(
            "https://{}/admin/api/{}/graphql.json",
            self.shop_domain, self.api_version
        )
    }
}

// Ограничения на загрузку изображений
#[derive(Debug, Clone, Deserialize)]
pub struct UploadConfig {
    pub max_bytes: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_bytes: 100 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{0} has an invalid value: {1}")]
    Invalid(&'static str, String),
}

fn required(key: &'static str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::Missing(key))
}

fn or_default(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parsed<T: FromStr>(key: &'static str, default: &str) -> Result<T, ConfigError> {
    let raw = or_default(key, default);
    raw.parse().map_err(|_| ConfigError::Invalid(key, raw))
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let backend = match or_default("STORAGE_BACKEND", "postgres").as_str() {
            "postgres" => StorageBackend::Postgres,
            "memory" => StorageBackend::Memory,
            other => return Err(ConfigError::Invalid("STORAGE_BACKEND", other.to_string())),
        };

        let url = match backend {
            StorageBackend::Postgres => Some(required("DATABASE_URL")?),
            StorageBackend::Memory => env::var("DATABASE_URL").ok(),
        };

        Ok(Config {
            app: AppConfig {
                host: or_default("HOST", "0.0.0.0"),
                port: parsed("PORT", "8000")?,
                environment: or_default("ENVIRONMENT", "development"),
                rust_log: or_default("RUST_LOG", "storefront_events=debug,tower_http=debug"),
            },
            database: DatabaseConfig {
                backend,
                url,
                pool_size: parsed("DB_POOL_SIZE", "20")?,
            },
            shopify: ShopifyConfig {
                api_key: required("SHOPIFY_API_KEY")?,
                api_secret: required("SHOPIFY_API_SECRET")?,
                shop_domain: required("SHOPIFY_SHOP_DOMAIN")?,
                admin_access_token: required("SHOPIFY_ADMIN_ACCESS_TOKEN")?,
                api_version: or_default("SHOPIFY_API_VERSION", "2024-10"),
            },
            upload: UploadConfig {
                max_bytes: parsed("UPLOAD_MAX_BYTES", "104857600")?,
            },
        })
    }
}
