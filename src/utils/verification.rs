//! Коды подтверждения

use chrono::{DateTime, Duration, Utc};
use rand::Rng;

use crate::error::VerificationError;

pub const CODE_LENGTH: usize = 6;
const MIN_CODE: u32 = 100_000;
const MAX_CODE: u32 = 999_999;
const DATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Шестизначный код в диапазоне 100000..=999999
pub fn generate_verification_code<R: Rng + ?Sized>(rng: &mut R) -> String {
    format!(
        "{:0width$}",
        rng.gen_range(MIN_CODE..=MAX_CODE),
        width = CODE_LENGTH
    )
}

pub fn expiration_time(minutes: i64) -> Result<DateTime<Utc>, VerificationError> {
    expiration_time_from(Utc::now(), minutes)
}

pub fn expiration_time_from(
    now: DateTime<Utc>,
    minutes: i64,
) -> Result<DateTime<Utc>, VerificationError> {
    if minutes < 0 {
        return Err(VerificationError::NegativeExpiration);
    }
    Duration::try_minutes(minutes)
        .and_then(|delta| now.checked_add_signed(delta))
        .ok_or(VerificationError::OutOfRange(minutes))
}

pub fn format_date_time(date_time: &DateTime<Utc>) -> String {
    date_time.format(DATE_TIME_FORMAT).to_string()
}

/// Код без срока действия считается истекшим
pub fn is_code_expired(expiration: Option<DateTime<Utc>>) -> bool {
    is_code_expired_at(expiration, Utc::now())
}

pub fn is_code_expired_at(expiration: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    match expiration {
        Some(expiration) => now > expiration,
        None => true,
    }
}
