//! Fortress tokens
//!
//! Кодеки учетных данных для бэкенда регистрации транспортных средств:
//! JWT (HS256) для аутентификации и 20-значные токены электроэнергии.

pub mod config;
pub mod error;
pub mod services;
pub mod utils;

pub use config::Config;
pub use error::{TokenError, VendingError, VerificationError};
pub use services::Services;
