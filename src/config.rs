//! Конфигурация
//!
//! Секреты и параметры токенов загружаются из переменных окружения или .env
//! файла поверх значений по умолчанию.

use serde::{Deserialize, Serialize};

/// Издатель JWT по умолчанию
const DEFAULT_ISSUER: &str = "fortress";

/// Главная структура конфигурации
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Подпись и срок жизни JWT
    pub jwt: JwtConfig,
    /// Токены электроэнергии
    pub electricity: ElectricityConfig,
}

/// Настройки JWT
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// Секрет HMAC-SHA256. Не должен попадать к клиентам.
    pub secret: String,
    /// Claim `iss`
    pub issuer: String,
    /// Срок жизни access токена в секундах
    pub expiry_seconds: i64,
    /// Срок жизни refresh токена в секундах (по умолчанию 7 дней)
    pub refresh_expiry_seconds: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElectricityConfig {
    /// Общий секрет для подписи токенов
    pub vending_key: String,
    /// Цена одной единицы (кВт·ч)
    pub rate_per_unit: f64,
}

impl Config {
    /// Загружает конфигурацию из переменных окружения
    ///
    /// 1. Пытается загрузить .env файл (если есть)
    /// 2. Берет значения по умолчанию
    /// 3. Перезаписывает их значениями из переменных окружения
    pub fn load() -> anyhow::Result<Self> {
        match dotenv::dotenv() {
            Ok(path) => {
                tracing::info!("Loaded .env file from: {:?}", path);
            }
            // Файл не найден - не критично, используем окружение процесса
            Err(dotenv::Error::Io(_)) => {
                tracing::debug!(".env file not found, using environment variables");
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to load .env file: {} (will use environment variables)",
                    e
                );
            }
        }

        Ok(Self::from_lookup(|key| std::env::var(key).ok()))
    }

    /// Применяет переопределения к значениям по умолчанию.
    ///
    /// Числа, которые не удалось разобрать, оставляют значение по умолчанию.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        // JWT configuration
        if let Some(secret) = lookup("JWT_SECRET") {
            cfg.jwt.secret = secret;
        }
        if let Some(issuer) = lookup("JWT_ISSUER") {
            cfg.jwt.issuer = issuer;
        }
        if let Some(expiry) = lookup("JWT_EXPIRY") {
            match expiry.parse::<i64>() {
                Ok(val) => cfg.jwt.expiry_seconds = val,
                Err(_) => tracing::warn!("Ignoring invalid JWT_EXPIRY: {}", expiry),
            }
        }
        if let Some(expiry) = lookup("JWT_REFRESH_EXPIRY") {
            match expiry.parse::<i64>() {
                Ok(val) => cfg.jwt.refresh_expiry_seconds = val,
                Err(_) => tracing::warn!("Ignoring invalid JWT_REFRESH_EXPIRY: {}", expiry),
            }
        }

        // Electricity configuration
        if let Some(key) = lookup("VENDING_KEY") {
            cfg.electricity.vending_key = key;
        }
        if let Some(rate) = lookup("ELECTRICITY_RATE") {
            match rate.parse::<f64>() {
                Ok(val) if val.is_finite() && val > 0.0 => cfg.electricity.rate_per_unit = val,
                _ => tracing::warn!("Ignoring invalid ELECTRICITY_RATE: {}", rate),
            }
        }

        if cfg.jwt.secret == "change-me" {
            tracing::warn!("JWT_SECRET is not set, using the insecure default");
        }

        cfg
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            jwt: JwtConfig {
                secret: "change-me".to_string(),
                issuer: DEFAULT_ISSUER.to_string(),
                expiry_seconds: 3600,
                refresh_expiry_seconds: 604_800,
            },
            electricity: ElectricityConfig {
                vending_key: "REG_SECRET_KEY".to_string(),
                rate_per_unit: 0.15,
            },
        }
    }
}
