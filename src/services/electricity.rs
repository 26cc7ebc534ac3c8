//! Симуляция продажи электроэнергии

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::info;

use crate::config::ElectricityConfig;
use crate::error::VendingError;
use crate::utils::electricity::ElectricityTokenUtil;

/// Сколько дней действует купленный токен
pub const TOKEN_VALIDITY_DAYS: i64 = 30;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedToken {
    pub token: String,
    pub meter_number: String,
    pub units: f64,
    pub tid: i64,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenVerification {
    pub token: String,
    pub meter_number: String,
    pub is_valid: bool,
    pub units: f64,
    pub tid: i64,
    pub verified_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Purchase {
    pub transaction_id: String,
    pub token: String,
    pub meter_number: String,
    pub amount_paid: f64,
    /// Округлено до 2 знаков, только для отображения
    pub units_allocated: f64,
    /// Неокругленное количество, которым подписан токен
    #[serde(skip)]
    pub units_signed: f64,
    pub rate: f64,
    pub tid: i64,
    pub purchase_date: DateTime<Utc>,
    pub expiry_date: DateTime<Utc>,
}

pub struct ElectricityService {
    tokens: ElectricityTokenUtil,
    rate_per_unit: f64,
}

impl ElectricityService {
    pub fn new(config: &ElectricityConfig) -> Self {
        Self {
            tokens: ElectricityTokenUtil::new(config.vending_key.clone()),
            rate_per_unit: config.rate_per_unit,
        }
    }

    pub fn generate(&self, meter_number: &str, units: f64) -> Result<GeneratedToken, VendingError> {
        let meter_number = require_meter_number(meter_number)?;
        if units.is_nan() || units <= 0.0 {
            return Err(VendingError::NonPositiveUnits);
        }

        let issued = self.tokens.issue_token(meter_number, units)?;
        Ok(GeneratedToken {
            token: issued.token,
            meter_number: meter_number.to_string(),
            units,
            tid: issued.tid,
            generated_at: Utc::now(),
        })
    }

    /// Невалидный токен - это успешный ответ с `is_valid = false`
    pub fn verify(
        &self,
        token: &str,
        meter_number: &str,
        units: f64,
        tid: i64,
    ) -> Result<TokenVerification, VendingError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(VendingError::MissingToken);
        }
        let meter_number = require_meter_number(meter_number)?;

        let is_valid = self.tokens.is_token_valid(token, meter_number, units, tid);
        info!(
            "Token verification for meter {}: {} - {}",
            meter_number,
            token,
            if is_valid { "VALID" } else { "INVALID" }
        );

        Ok(TokenVerification {
            token: token.to_string(),
            meter_number: meter_number.to_string(),
            is_valid,
            units,
            tid,
            verified_at: Utc::now(),
        })
    }

    /// Покупка на сумму `amount` по текущему тарифу
    pub fn purchase(&self, meter_number: &str, amount: f64) -> Result<Purchase, VendingError> {
        let meter_number = require_meter_number(meter_number)?;
        if amount.is_nan() || amount <= 0.0 {
            return Err(VendingError::NonPositiveAmount);
        }

        let units = amount / self.rate_per_unit;
        let issued = self.tokens.issue_token(meter_number, units)?;
        let now = Utc::now();

        info!(
            "Token purchased for meter {}: {} - ${} for {} units",
            meter_number, issued.token, amount, units
        );

        Ok(Purchase {
            transaction_id: format!("TXN-{}", now.timestamp_millis()),
            token: issued.token,
            meter_number: meter_number.to_string(),
            amount_paid: amount,
            units_allocated: (units * 100.0).round() / 100.0,
            units_signed: units,
            rate: self.rate_per_unit,
            tid: issued.tid,
            purchase_date: now,
            expiry_date: now + Duration::days(TOKEN_VALIDITY_DAYS),
        })
    }
}

fn require_meter_number(meter_number: &str) -> Result<&str, VendingError> {
    let meter_number = meter_number.trim();
    if meter_number.is_empty() {
        return Err(VendingError::MissingMeterNumber);
    }
    Ok(meter_number)
}
