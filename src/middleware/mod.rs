use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use crate::error::ApiError;

/// Администратор магазина, прошедший проверку session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminSession {
    pub shop: String,
    pub user_id: Option<String>,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing bearer token")]
    MissingToken,
    #[error("invalid session token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),
    #[error("token issued for another shop: {0}")]
    WrongShop(String),
}

/// Внешний поставщик идентичности: запрос -> админ или отказ.
pub trait AdminAuthenticator: Send + Sync {
    fn authenticate(&self, headers: &HeaderMap) -> Result<AdminSession, AuthError>;
}

/// Claims из session token, который App Bridge выдает встроенному приложению.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    pub iss: String,
    pub dest: String,
    pub aud: String,
    pub sub: Option<String>,
    pub exp: usize,
    pub nbf: Option<usize>,
    pub iat: Option<usize>,
}

/// Проверяет HS256 session token, подписанный секретом приложения.
pub struct SessionTokenVerifier {
    key: DecodingKey,
    validation: Validation,
    shop_domain: String,
}

impl SessionTokenVerifier {
    pub fn new(api_key: &str, api_secret: &str, shop_domain: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[api_key]);
        validation.validate_nbf = true;
        validation.leeway = 5;

        Self {
            key: DecodingKey::from_secret(api_secret.as_bytes()),
            validation,
            shop_domain: shop_domain.to_string(),
        }
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

impl AdminAuthenticator for SessionTokenVerifier {
    fn authenticate(&self, headers: &HeaderMap) -> Result<AdminSession, AuthError> {
        let token = bearer_token(headers).ok_or(AuthError::MissingToken)?;
        let claims = decode::<SessionClaims>(token, &self.key, &self.validation)?.claims;

        // dest = https://{shop}.myshopify.com
        let shop = claims
            .dest
            .strip_prefix("https://")
            .unwrap_or(&claims.dest)
            .trim_end_matches('/')
            .to_string();
        if shop != self.shop_domain {
            return Err(AuthError::WrongShop(shop));
        }

        Ok(AdminSession {
            shop,
            user_id: claims.sub,
        })
    }
}

// Extractor: должен стоять в обработчике раньше тела запроса,
// чтобы неавторизованный вызов отклонялся до любой валидации
impl FromRequestParts<Arc<crate::AppState>> for AdminSession {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<crate::AppState>,
    ) -> Result<Self, Self::Rejection> {
        state.auth.authenticate(&parts.headers).map_err(|e| {
            tracing::warn!("Admin request rejected: {}", e);
            ApiError::Unauthorized
        })
    }
}
