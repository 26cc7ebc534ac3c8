//! Токены электроэнергии
//!
//! 20-значный токен формата `XXXXX-XXXXX-XXXXX-XXXXX`, привязанный к номеру
//! счетчика, количеству единиц (кВт·ч) и TID. Полезной нагрузки в токене нет:
//! для проверки вызывающая сторона передает те же значения, и токен
//! пересчитывается заново.
//!
//! Свертка hex подписи в цифры (`код символа % 10`) дает слабую защиту от
//! коллизий. Это формат провода, а не криптографическая схема.

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};

use crate::error::TokenError;
use crate::utils::crypto::hmac_sha256_hex;

/// 1993-01-01T00:00:00Z в секундах Unix
pub const TID_EPOCH_SECONDS: i64 = 725_846_400;

pub const TOKEN_DIGITS: usize = 20;
const GROUP_SIZE: usize = 5;

/// TID для указанного момента времени
pub fn tid_at(now: DateTime<Utc>) -> i64 {
    now.timestamp() - TID_EPOCH_SECONDS
}

pub fn current_tid() -> i64 {
    tid_at(Utc::now())
}

/// Форматирует количество единиц ровно с двумя знаками после запятой.
///
/// Округление HALF-UP применяется к кратчайшему десятичному представлению
/// числа, поэтому `100.005` дает `"100.01"`, а не `"100.00"`. Для NaN и
/// бесконечностей возвращает `None`.
pub fn format_units(units: f64) -> Option<String> {
    if !units.is_finite() {
        return None;
    }

    // Display для f64 печатает кратчайшее представление без экспоненты
    let repr = units.to_string();
    let (negative, digits) = match repr.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, repr.as_str()),
    };
    let (int_part, frac_part) = digits.split_once('.').unwrap_or((digits, ""));

    let mut scaled: Vec<u8> = int_part
        .bytes()
        .chain(frac_part.bytes().chain(std::iter::repeat(b'0')).take(2))
        .map(|b| b - b'0')
        .collect();

    if frac_part.as_bytes().get(2).is_some_and(|&d| d >= b'5') {
        let mut i = scaled.len();
        loop {
            if i == 0 {
                scaled.insert(0, 1);
                break;
            }
            i -= 1;
            if scaled[i] == 9 {
                scaled[i] = 0;
            } else {
                scaled[i] += 1;
                break;
            }
        }
    }

    let split = scaled.len() - 2;
    let render = |ds: &[u8]| ds.iter().map(|d| char::from(b'0' + d)).collect::<String>();
    let sign = if negative { "-" } else { "" };
    Some(format!(
        "{}{}.{}",
        sign,
        render(&scaled[..split]),
        render(&scaled[split..])
    ))
}

/// Каноническая строка для подписи: `{meter}|{tid}|{units:.2}`
pub fn token_data(meter_number: &str, tid: i64, units: f64) -> Result<String, TokenError> {
    let units = format_units(units).ok_or(TokenError::InvalidUnits(units))?;
    Ok(format!("{}|{}|{}", meter_number, tid, units))
}

/// Токен вместе с TID, которым он подписан
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub tid: i64,
}

/// Генерация и проверка токенов электроэнергии
#[derive(Clone)]
pub struct ElectricityTokenUtil {
    vending_key: String,
}

impl std::fmt::Debug for ElectricityTokenUtil {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElectricityTokenUtil")
            .field("vending_key", &"<redacted>")
            .finish()
    }
}

impl ElectricityTokenUtil {
    pub fn new(vending_key: impl Into<String>) -> Self {
        Self {
            vending_key: vending_key.into(),
        }
    }

    /// Генерирует токен с текущим TID
    pub fn generate_token(&self, meter_number: &str, units: f64) -> Result<String, TokenError> {
        self.issue_token(meter_number, units).map(|issued| issued.token)
    }

    /// Как `generate_token`, но также возвращает использованный TID
    pub fn issue_token(&self, meter_number: &str, units: f64) -> Result<IssuedToken, TokenError> {
        let tid = current_tid();
        let token = self
            .generate_token_with_tid(meter_number, units, tid)
            .map_err(|e| {
                error!("Failed to generate electricity token: {}", e);
                e
            })?;

        info!(
            "Generated electricity token for meter {}: {}",
            meter_number, token
        );
        Ok(IssuedToken { token, tid })
    }

    /// Детерминированная генерация для заданного TID
    pub fn generate_token_with_tid(
        &self,
        meter_number: &str,
        units: f64,
        tid: i64,
    ) -> Result<String, TokenError> {
        let numeric = self.numeric_token(meter_number, units, tid)?;
        format_token(&numeric)
    }

    /// Проверяет токен, пересчитывая его для переданных значений.
    ///
    /// Любая ошибка дает `false`.
    pub fn is_token_valid(&self, token: &str, meter_number: &str, units: f64, tid: i64) -> bool {
        let numeric = token.replace('-', "");

        let expected = match self.numeric_token(meter_number, units, tid) {
            Ok(expected) => expected,
            Err(e) => {
                error!("Error verifying electricity token: {}", e);
                return false;
            }
        };

        // not constant-time
        let is_valid = numeric == expected;
        if is_valid {
            debug!("Electricity token is valid for meter {}", meter_number);
        } else {
            warn!("Invalid electricity token for meter {}", meter_number);
        }
        is_valid
    }

    fn numeric_token(&self, meter_number: &str, units: f64, tid: i64) -> Result<String, TokenError> {
        let data = token_data(meter_number, tid, units)?;
        let signature = hmac_sha256_hex(self.vending_key.as_bytes(), data.as_bytes())?;
        Ok(signature_to_numeric_token(&signature))
    }
}

/// Первые 20 символов подписи -> `код % 10`, недостающие позиции -> `0`
fn signature_to_numeric_token(signature: &str) -> String {
    let bytes = signature.as_bytes();
    (0..TOKEN_DIGITS)
        .map(|i| bytes.get(i).map_or(0, |b| b % 10))
        .map(|d| char::from(b'0' + d))
        .collect()
}

fn format_token(numeric: &str) -> Result<String, TokenError> {
    if numeric.len() != TOKEN_DIGITS || !numeric.bytes().all(|b| b.is_ascii_digit()) {
        return Err(TokenError::MalformedNumericToken(numeric.len()));
    }

    let groups: Vec<&str> = (0..TOKEN_DIGITS)
        .step_by(GROUP_SIZE)
        .map(|start| &numeric[start..start + GROUP_SIZE])
        .collect();
    Ok(groups.join("-"))
}
