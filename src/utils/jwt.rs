//! JWT утилиты
//!
//! Компактный HS256 токен `header.payload.signature`. Подпись считается от
//! `header + "." + payload` и кодируется в base64url ровно один раз.
//!
//! Проверка не хранит состояния: нет ни сессий, ни списка отозванных токенов.
//! Все ошибки разбора дают `false` / `None`.

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, error, info, warn};

use crate::error::TokenError;
use crate::utils::crypto::{base64url_decode, base64url_encode, hmac_sha256};

const DOT_SEPARATOR: char = '.';

#[derive(Debug, Serialize)]
struct JwtHeader {
    alg: &'static str,
    typ: &'static str,
}

impl JwtHeader {
    fn hs256() -> Self {
        Self {
            alg: "HS256",
            typ: "JWT",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
}

impl JwtClaims {
    pub fn new(subject: String, issuer: String, expires_in_seconds: i64, now: i64) -> Self {
        Self {
            sub: subject,
            iss: issuer,
            iat: now,
            exp: now.saturating_add(expires_in_seconds),
        }
    }
}

/// Создает JWT токен, подписанный HMAC-SHA256
pub fn create_token(
    secret_key: &str,
    subject: &str,
    issuer: &str,
    expiry_in_seconds: i64,
) -> Result<String, TokenError> {
    create_token_at(
        secret_key,
        subject,
        issuer,
        expiry_in_seconds,
        Utc::now().timestamp(),
    )
}

/// Как `create_token`, но с заданным временем выпуска (секунды Unix)
pub fn create_token_at(
    secret_key: &str,
    subject: &str,
    issuer: &str,
    expiry_in_seconds: i64,
    now: i64,
) -> Result<String, TokenError> {
    let claims = JwtClaims::new(
        subject.to_string(),
        issuer.to_string(),
        expiry_in_seconds,
        now,
    );

    let encoded_header = base64url_encode(serde_json::to_vec(&JwtHeader::hs256())?);
    let encoded_payload = base64url_encode(serde_json::to_vec(&claims)?);

    let signing_input = format!("{}{}{}", encoded_header, DOT_SEPARATOR, encoded_payload);
    let signature = sign(&signing_input, secret_key).map_err(|e| {
        error!("HMAC operation failed: {}", e);
        e
    })?;

    info!("Successfully created JWT token for subject: {}", subject);
    Ok(format!("{}{}{}", signing_input, DOT_SEPARATOR, signature))
}

/// Проверяет подпись и срок действия токена
pub fn is_token_valid(token: &str, secret_key: &str) -> bool {
    is_token_valid_at(token, secret_key, Utc::now().timestamp())
}

pub fn is_token_valid_at(token: &str, secret_key: &str, now: i64) -> bool {
    let parts: Vec<&str> = token.split(DOT_SEPARATOR).collect();
    let [header, payload, signature] = parts.as_slice() else {
        warn!("Invalid JWT token format: incorrect number of parts");
        return false;
    };

    let signing_input = format!("{}{}{}", header, DOT_SEPARATOR, payload);
    let expected = match sign(&signing_input, secret_key) {
        Ok(expected) => expected,
        Err(e) => {
            error!("Error validating JWT token: {}", e);
            return false;
        }
    };
    if expected != *signature {
        warn!("Invalid JWT token: signature mismatch");
        return false;
    }

    if is_token_expired_at(token, now) {
        warn!("JWT token is expired");
        return false;
    }

    debug!("JWT token is valid");
    true
}

/// Токен без `exp` или с нечитаемым payload считается истекшим
pub fn is_token_expired(token: &str) -> bool {
    is_token_expired_at(token, Utc::now().timestamp())
}

pub fn is_token_expired_at(token: &str, now: i64) -> bool {
    match extract_claim::<i64>(token, "exp") {
        Some(exp) => exp <= now,
        None => {
            warn!("JWT token has no usable expiration claim");
            true
        }
    }
}

/// Возвращает `sub` без проверки подписи.
///
/// Вызывать только после успешного `is_token_valid`.
pub fn extract_username(token: &str) -> Option<String> {
    extract_claim(token, "sub")
}

/// Читает claim из payload, приводя его к `T` через serde.
///
/// Целые числа расширяются до `i64`/`u64`; при несовпадении типа
/// возвращается `None`.
pub fn extract_claim<T: DeserializeOwned>(token: &str, claim: &str) -> Option<T> {
    let payload = decode_payload(token)?;

    let value = match payload.get(claim) {
        Some(Value::Null) | None => {
            warn!("Claim {} not found in JWT token", claim);
            return None;
        }
        Some(value) => value.clone(),
    };

    match serde_json::from_value(value) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Claim {} has invalid type in JWT token: {}", claim, e);
            None
        }
    }
}

/// Все стандартные claims токена (без проверки подписи)
pub fn decode_claims(token: &str) -> Option<JwtClaims> {
    let payload = decode_payload(token)?;
    serde_json::from_value(Value::Object(payload)).ok()
}

fn decode_payload(token: &str) -> Option<Map<String, Value>> {
    let parts: Vec<&str> = token.split(DOT_SEPARATOR).collect();
    if parts.len() != 3 {
        warn!("Invalid JWT token format for claim extraction");
        return None;
    }

    let bytes = base64url_decode(parts[1])?;
    match serde_json::from_slice(&bytes) {
        Ok(payload) => Some(payload),
        Err(e) => {
            warn!("Failed to parse JWT payload: {}", e);
            None
        }
    }
}

/// Сырые байты HMAC, закодированные base64url один раз
fn sign(signing_input: &str, secret_key: &str) -> Result<String, TokenError> {
    hmac_sha256(secret_key.as_bytes(), signing_input.as_bytes()).map(base64url_encode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};

    const SECRET: &str = "test-secret";
    const ISSUER: &str = "fortress";
    const NOW: i64 = 1_700_000_000;

    fn segment(token: &str, index: usize) -> Value {
        let part = token.split('.').nth(index).unwrap();
        serde_json::from_slice(&base64url_decode(part).unwrap()).unwrap()
    }

    #[test]
    fn test_token_layout() {
        let token = create_token_at(SECRET, "u1", ISSUER, 3600, NOW).unwrap();
        assert_eq!(token.split('.').count(), 3);
        assert!(!token.contains('='));

        assert_eq!(
            segment(&token, 0),
            serde_json::json!({"alg": "HS256", "typ": "JWT"})
        );
        assert_eq!(
            segment(&token, 1),
            serde_json::json!({"sub": "u1", "iss": ISSUER, "iat": NOW, "exp": NOW + 3600})
        );
    }

    #[test]
    fn test_signature_is_encoded_once() {
        let token = create_token_at(SECRET, "u1", ISSUER, 3600, NOW).unwrap();
        let signature = token.rsplit('.').next().unwrap();
        // 32 raw bytes -> 43 base64url characters
        assert_eq!(signature.len(), 43);
        assert_eq!(base64url_decode(signature).unwrap().len(), 32);
    }

    #[test]
    fn test_deterministic_for_same_inputs() {
        let a = create_token_at(SECRET, "u1", ISSUER, 60, NOW).unwrap();
        let b = create_token_at(SECRET, "u1", ISSUER, 60, NOW).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_valid_until_expiry() {
        let token = create_token_at(SECRET, "u1", ISSUER, 3600, NOW).unwrap();
        assert!(is_token_valid_at(&token, SECRET, NOW));
        assert!(is_token_valid_at(&token, SECRET, NOW + 3599));
        assert!(!is_token_valid_at(&token, SECRET, NOW + 3600));
        assert!(!is_token_valid_at(&token, SECRET, NOW + 7200));
    }

    #[test]
    fn test_valid_with_real_clock() {
        let token = create_token(SECRET, "u1", ISSUER, 3600).unwrap();
        assert!(is_token_valid(&token, SECRET));
        assert!(!is_token_expired(&token));
    }

    #[test]
    fn test_zero_expiry_is_immediately_expired() {
        let token = create_token_at("S", "u1", "iss", 0, NOW).unwrap();
        assert!(!is_token_valid_at(&token, "S", NOW));

        let token = create_token("S", "u1", "iss", 0).unwrap();
        assert!(!is_token_valid(&token, "S"));
        assert!(is_token_expired(&token));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = create_token_at(SECRET, "u1", ISSUER, 3600, NOW).unwrap();
        assert!(!is_token_valid_at(&token, "wrong-secret", NOW));
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let token = create_token_at(SECRET, "u1", ISSUER, 3600, NOW).unwrap();
        let parts: Vec<&str> = token.split('.').collect();
        let forged = base64url_encode(
            serde_json::to_vec(&JwtClaims::new("admin".into(), ISSUER.into(), 3600, NOW)).unwrap(),
        );
        let tampered = format!("{}.{}.{}", parts[0], forged, parts[2]);
        assert!(!is_token_valid_at(&tampered, SECRET, NOW));
    }

    #[test]
    fn test_malformed_tokens_fail_closed() {
        assert!(!is_token_valid_at("only.two", SECRET, NOW));
        assert!(!is_token_valid_at("a.b.c.d", SECRET, NOW));
        assert!(!is_token_valid_at("", SECRET, NOW));
        assert!(!is_token_valid_at("...", SECRET, NOW));

        let token = create_token_at(SECRET, "u1", ISSUER, 3600, NOW).unwrap();
        assert!(!is_token_valid_at(&format!("{}.", token), SECRET, NOW));
    }

    #[test]
    fn test_signed_payload_without_exp_is_invalid() {
        let header = base64url_encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let payload = base64url_encode(br#"{"sub":"u1"}"#);
        let input = format!("{}.{}", header, payload);
        let token = format!("{}.{}", input, sign(&input, SECRET).unwrap());

        assert!(!is_token_valid_at(&token, SECRET, NOW));
        assert!(is_token_expired_at(&token, NOW));
        assert_eq!(extract_username(&token).as_deref(), Some("u1"));
    }

    #[test]
    fn test_signed_garbage_payload_is_invalid() {
        let header = base64url_encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let payload = base64url_encode(b"not json");
        let input = format!("{}.{}", header, payload);
        let token = format!("{}.{}", input, sign(&input, SECRET).unwrap());

        assert!(!is_token_valid_at(&token, SECRET, NOW));
        assert_eq!(extract_username(&token), None);
    }

    #[test]
    fn test_extract_username() {
        let token = create_token(SECRET, "alice@example.com", "issuer", 60).unwrap();
        assert_eq!(
            extract_username(&token).as_deref(),
            Some("alice@example.com")
        );
        assert_eq!(extract_username("garbage"), None);
        assert_eq!(extract_username("a.!!!.c"), None);
    }

    #[test]
    fn test_extract_claim_types() {
        let token = create_token_at(SECRET, "u1", ISSUER, 3600, NOW).unwrap();

        assert_eq!(extract_claim::<i64>(&token, "exp"), Some(NOW + 3600));
        assert_eq!(extract_claim::<u64>(&token, "iat"), Some(NOW as u64));
        assert_eq!(extract_claim::<String>(&token, "iss").as_deref(), Some(ISSUER));

        assert_eq!(extract_claim::<i32>(&token, "exp"), Some((NOW + 3600) as i32));

        // type mismatch
        assert_eq!(extract_claim::<i64>(&token, "sub"), None);
        assert_eq!(extract_claim::<String>(&token, "exp"), None);
        assert_eq!(extract_claim::<u8>(&token, "exp"), None);
        // missing
        assert_eq!(extract_claim::<String>(&token, "aud"), None);
    }

    #[test]
    fn test_decode_claims() {
        let token = create_token_at(SECRET, "u1", ISSUER, 10, NOW).unwrap();
        assert_eq!(
            decode_claims(&token),
            Some(JwtClaims::new("u1".into(), ISSUER.into(), 10, NOW))
        );
        assert_eq!(decode_claims("x.y"), None);
    }

    #[test]
    fn test_reference_library_accepts_our_tokens() {
        let token = create_token(SECRET, "alice@example.com", ISSUER, 3600).unwrap();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[ISSUER]);
        let data = jsonwebtoken::decode::<JwtClaims>(
            &token,
            &DecodingKey::from_secret(SECRET.as_bytes()),
            &validation,
        )
        .unwrap();

        assert_eq!(data.claims.sub, "alice@example.com");
        assert_eq!(data.claims.exp - data.claims.iat, 3600);
    }

    #[test]
    fn test_we_accept_reference_library_tokens() {
        let claims = JwtClaims::new(
            "bob@example.com".into(),
            ISSUER.into(),
            3600,
            Utc::now().timestamp(),
        );
        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert!(is_token_valid(&token, SECRET));
        assert_eq!(extract_username(&token).as_deref(), Some("bob@example.com"));
    }
}
