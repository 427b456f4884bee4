use axum::{
    extract::{FromRequest, Multipart, Request},
    http::header,
    Form,
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::ApiError;

/// Тело формы в любой из двух кодировок браузера: urlencoded или multipart/form-data
/// (так уходит `fetch` с `new FormData()`). Файловые поля multipart пропускаются,
/// при повторе имени берется первое значение.
pub struct FormData<T>(pub T);

fn invalid_body(e: impl std::fmt::Display) -> ApiError {
    tracing::debug!("Rejected form body: {}", e);
    ApiError::Validation("Invalid form body".to_string())
}

fn is_multipart(req: &Request) -> bool {
    req.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.trim_start().starts_with("multipart/form-data"))
}

impl<S, T> FromRequest<S> for FormData<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if !is_multipart(&req) {
            let Form(value) = Form::<T>::from_request(req, state)
                .await
                .map_err(invalid_body)?;
            return Ok(FormData(value));
        }

        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(invalid_body)?;

        let mut fields = Map::new();
        while let Some(field) = multipart.next_field().await.map_err(invalid_body)? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };
            if field.file_name().is_some() {
                continue;
            }
            let text = field.text().await.map_err(invalid_body)?;
            fields.entry(name).or_insert(Value::String(text));
        }

        serde_json::from_value(Value::Object(fields))
            .map(FormData)
            .map_err(invalid_body)
    }
}
