//! shopify_files.rs
//!
//! Клиент загрузки изображений в Shopify Files через Admin GraphQL API.
//!
//! Загрузка идет в три последовательных шага:
//! 1.  **stagedUploadsCreate**: запрашиваем временную цель загрузки (URL + параметры формы).
//! 2.  **POST на staged URL**: отправляем параметры и сам файл multipart-формой.
//! 3.  **fileCreate**: регистрируем загруженный ресурс как постоянный файл магазина.
//!
//! Если шаг 2 или 3 падает, временная цель просто бросается - Shopify сам ее удалит.

use axum::body::Bytes;
use reqwest::multipart::{Form, Part};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info};

use crate::config::{ShopifyConfig, UploadConfig};

/// Разрешенные MIME-типы изображений.
pub const ALLOWED_CONTENT_TYPES: [&str; 5] = [
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
    "image/svg+xml",
];

const STAGED_UPLOADS_CREATE: &str = r#"
mutation stagedUploadsCreate($input: [StagedUploadInput!]!) {
  stagedUploadsCreate(input: $input) {
    stagedTargets {
      url
      resourceUrl
      parameters {
        name
        value
      }
    }
    userErrors {
      field
      message
    }
  }
}
"#;

const FILE_CREATE: &str = r#"
mutation fileCreate($files: [FileCreateInput!]!) {
  fileCreate(files: $files) {
    files {
      id
      alt
    }
    userErrors {
      field
      message
    }
  }
}
"#;

/// Ошибки загрузки файла.
#[derive(Debug, Error)]
pub enum UploadError {
    /// Файл не прошел проверку размера или типа.
    #[error("{0}")]
    Invalid(String),
    /// У приложения нет scope `write_files`.
    #[error("App missing 'write_files' scope. Please reinstall the app.")]
    MissingPermission,
    /// Любой сбой одного из трех шагов.
    #[error("{0}")]
    Remote(String),
}

impl From<reqwest::Error> for UploadError {
    fn from(e: reqwest::Error) -> Self {
        error!("Shopify request failed: {:?}", e);
        UploadError::Remote(format!("Internal server error: {}", e))
    }
}

/// Файл, пришедший из multipart-формы админки.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub content_type: String,
    pub bytes: Bytes,
}

impl UploadedFile {
    /// Проверяет размер и тип до любых обращений к Shopify.
    pub fn validate(&self, limits: &UploadConfig) -> Result<(), UploadError> {
        if self.bytes.is_empty() {
            return Err(UploadError::Invalid("No file provided".to_string()));
        }
        if self.bytes.len() > limits.max_bytes {
            return Err(size_exceeded(limits));
        }
        if !ALLOWED_CONTENT_TYPES.contains(&self.content_type.as_str()) {
            return Err(UploadError::Invalid(
                "Invalid file type. Only JPEG, PNG, GIF, WebP, and SVG images are allowed"
                    .to_string(),
            ));
        }
        Ok(())
    }
}

pub fn size_exceeded(limits: &UploadConfig) -> UploadError {
    UploadError::Invalid(format!(
        "File size exceeds maximum limit of {}MB",
        limits.max_bytes / (1024 * 1024)
    ))
}

// --- Модели ответов GraphQL ---

#[derive(Debug, Deserialize)]
struct GraphqlResponse {
    data: Option<serde_json::Value>,
    errors: Option<Vec<GraphqlError>>,
}

#[derive(Debug, Deserialize)]
struct GraphqlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct UserError {
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StagedUploadsData {
    staged_uploads_create: StagedUploadsPayload,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StagedUploadsPayload {
    #[serde(default)]
    staged_targets: Vec<StagedTarget>,
    #[serde(default)]
    user_errors: Vec<UserError>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StagedTarget {
    pub url: String,
    pub resource_url: Option<String>,
    #[serde(default)]
    pub parameters: Vec<StagedParameter>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StagedParameter {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileCreateData {
    file_create: FileCreatePayload,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileCreatePayload {
    #[serde(default)]
    user_errors: Vec<UserError>,
}

fn join_messages<'a>(messages: impl Iterator<Item = &'a str>) -> String {
    messages.collect::<Vec<_>>().join(", ")
}

/// Клиент для загрузки изображений в Shopify Files.
#[derive(Clone)]
pub struct ShopifyFilesClient {
    /// Полный URL Admin GraphQL API магазина.
    graphql_url: String,
    /// Offline access token приложения.
    access_token: String,
    /// Асинхронный HTTP-клиент.
    http_client: reqwest::Client,
}

impl ShopifyFilesClient {
    pub fn new(graphql_url: String, access_token: String) -> Result<Self, reqwest::Error> {
        Ok(Self {
            graphql_url,
            access_token,
            http_client: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()?,
        })
    }

    pub fn from_config(config: &ShopifyConfig) -> Result<Self, reqwest::Error> {
        Self::new(config.graphql_url(), config.admin_access_token.clone())
    }

    /// Выполняет GraphQL-мутацию и возвращает `data`, либо ошибку с текстами `errors`.
    async fn graphql<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<T, UploadError> {
        let response = self
            .http_client
            .post(&self.graphql_url)
            .header("X-Shopify-Access-Token", &self.access_token)
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await?
            .error_for_status()?
            .json::<GraphqlResponse>()
            .await?;

        if let Some(errors) = response.errors.filter(|errors| !errors.is_empty()) {
            error!("Shopify GraphQL errors: {:?}", errors);
            return Err(UploadError::Remote(format!(
                "GraphQL error: {}",
                join_messages(errors.iter().map(|e| e.message.as_str()))
            )));
        }

        let data = response
            .data
            .ok_or_else(|| UploadError::Remote("GraphQL error: empty response".to_string()))?;
        serde_json::from_value(data).map_err(|e| {
            error!("Unexpected Shopify GraphQL payload: {:?}", e);
            UploadError::Remote(format!("GraphQL error: {}", e))
        })
    }

    /// Шаг 1: временная цель загрузки.
    async fn create_staged_target(&self, file: &UploadedFile) -> Result<StagedTarget, UploadError> {
        let data: StagedUploadsData = self
            .graphql(
                STAGED_UPLOADS_CREATE,
                json!({
                    "input": [{
                        "filename": file.filename,
                        "mimeType": file.content_type,
                        "httpMethod": "POST",
                        "resource": "FILE",
                    }]
                }),
            )
            .await?;

        let payload = data.staged_uploads_create;
        if !payload.user_errors.is_empty() {
            let messages = join_messages(payload.user_errors.iter().map(|e| e.message.as_str()));
            error!("Staged upload user errors: {}", messages);
            if messages.contains("Access denied") {
                return Err(UploadError::MissingPermission);
            }
            return Err(UploadError::Remote(format!("Staged upload failed: {}", messages)));
        }

        payload
            .staged_targets
            .into_iter()
            .next()
            .ok_or_else(|| UploadError::Remote("Staged upload failed: no target returned".to_string()))
    }

    /// Шаг 2: параметры цели, затем файл - порядок важен для подписанной формы.
    async fn upload_to_target(
        &self,
        target: &StagedTarget,
        file: &UploadedFile,
    ) -> Result<(), UploadError> {
        let mut form = Form::new();
        for param in &target.parameters {
            form = form.text(param.name.clone(), param.value.clone());
        }
        let part = Part::bytes(file.bytes.to_vec())
            .file_name(file.filename.clone())
            .mime_str(&file.content_type)?;
        form = form.part("file", part);

        let response = self
            .http_client
            .post(&target.url)
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            error!("Upload to staged URL failed: {} {}", status, text);
            return Err(UploadError::Remote("Failed to upload file to Shopify".to_string()));
        }
        Ok(())
    }

    /// Шаг 3: регистрируем файл в магазине.
    async fn register_file(&self, resource_url: &str, file: &UploadedFile) -> Result<(), UploadError> {
        let data: FileCreateData = self
            .graphql(
                FILE_CREATE,
                json!({
                    "files": [{
                        "alt": file.filename,
                        "contentType": "IMAGE",
                        "originalSource": resource_url,
                    }]
                }),
            )
            .await?;

        let user_errors = data.file_create.user_errors;
        if !user_errors.is_empty() {
            let messages = join_messages(user_errors.iter().map(|e| e.message.as_str()));
            error!("File create user errors: {}", messages);
            return Err(UploadError::Remote(format!("File create failed: {}", messages)));
        }
        Ok(())
    }

    /// Загружает изображение и возвращает его публичный URL.
    pub async fn upload(&self, file: &UploadedFile) -> Result<String, UploadError> {
        info!(
            "Uploading {} ({} bytes, {}) to Shopify Files",
            file.filename,
            file.bytes.len(),
            file.content_type
        );

        let target = self.create_staged_target(file).await?;
        self.upload_to_target(&target, file).await?;

        let resource_url = target
            .resource_url
            .clone()
            .filter(|url| !url.is_empty())
            .ok_or_else(|| {
                error!("Staged target has no resource URL: {:?}", target);
                UploadError::Remote("File uploaded but no public URL returned".to_string())
            })?;

        self.register_file(&resource_url, file).await?;

        info!("Uploaded {} -> {}", file.filename, resource_url);
        Ok(resource_url)
    }
}
