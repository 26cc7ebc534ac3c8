//! Аутентификация по bearer токену

use tracing::{debug, warn};

use crate::config::JwtConfig;
use crate::error::TokenError;
use crate::utils::jwt;

const BEARER_PREFIX: &str = "Bearer ";

pub struct AuthService {
    config: JwtConfig,
}

impl AuthService {
    pub fn new(config: &JwtConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Access токен для субъекта (обычно email пользователя)
    pub fn issue_access_token(&self, subject: &str) -> Result<String, TokenError> {
        jwt::create_token(
            &self.config.secret,
            subject,
            &self.config.issuer,
            self.config.expiry_seconds,
        )
    }

    pub fn issue_refresh_token(&self, subject: &str) -> Result<String, TokenError> {
        jwt::create_token(
            &self.config.secret,
            subject,
            &self.config.issuer,
            self.config.refresh_expiry_seconds,
        )
    }

    /// Разбирает заголовок `Authorization` и возвращает субъект.
    ///
    /// `None` означает "не аутентифицирован": вызывающая сторона отклоняет
    /// запрос, а не возвращает ошибку.
    pub fn authenticate(&self, authorization: Option<&str>) -> Option<String> {
        self.authenticate_at(authorization, chrono::Utc::now().timestamp())
    }

    pub fn authenticate_at(&self, authorization: Option<&str>, now: i64) -> Option<String> {
        let Some(token) = bearer_token(authorization) else {
            debug!("No valid Bearer token found in request");
            return None;
        };

        if token.is_empty() {
            warn!("Empty JWT token in request");
            return None;
        }

        if !jwt::is_token_valid_at(token, &self.config.secret, now) {
            warn!("Invalid or expired JWT token");
            return None;
        }

        let username = jwt::extract_username(token);
        if let Some(username) = &username {
            debug!("Authenticated user: {}", username);
        }
        username
    }
}

/// Токен после префикса `Bearer ` (с обрезанными пробелами)
pub fn bearer_token(authorization: Option<&str>) -> Option<&str> {
    authorization?.strip_prefix(BEARER_PREFIX).map(str::trim)
}
