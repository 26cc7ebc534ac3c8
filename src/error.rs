//! Ошибки библиотеки

use thiserror::Error;

/// Ошибки выпуска токенов.
///
/// Проверка токенов никогда не возвращает ошибку: любой сбой означает `false`.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("HMAC key rejected: {0}")]
    InvalidKey(String),

    #[error("units must be a finite number, got {0}")]
    InvalidUnits(f64),

    #[error("numeric token must be 20 digits, got {0}")]
    MalformedNumericToken(usize),

    #[error("failed to serialize JWT segment: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Ошибки симуляции продажи электроэнергии
#[derive(Debug, Error)]
pub enum VendingError {
    #[error("Meter number is required")]
    MissingMeterNumber,

    #[error("Token is required")]
    MissingToken,

    #[error("Units must be greater than 0")]
    NonPositiveUnits,

    #[error("Amount must be greater than 0")]
    NonPositiveAmount,

    #[error("Failed to generate token: {0}")]
    Token(#[from] TokenError),
}

#[derive(Debug, Error)]
pub enum VerificationError {
    #[error("Expiration time cannot be negative")]
    NegativeExpiration,

    #[error("Expiration of {0} minutes is out of range")]
    OutOfRange(i64),
}
