//! Криптографические утилиты

use base64::{
    alphabet,
    engine::{
        general_purpose::{GeneralPurpose, GeneralPurposeConfig, URL_SAFE_NO_PAD},
        DecodePaddingMode,
    },
    Engine,
};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::TokenError;

type HmacSha256 = Hmac<Sha256>;

/// Принимает сегменты как с паддингом, так и без
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Сырые байты HMAC-SHA256
pub fn hmac_sha256(key: &[u8], message: &[u8]) -> Result<Vec<u8>, TokenError> {
    let mut mac =
        HmacSha256::new_from_slice(key).map_err(|e| TokenError::InvalidKey(e.to_string()))?;
    mac.update(message);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// HMAC-SHA256 в виде hex строки (нижний регистр)
pub fn hmac_sha256_hex(key: &[u8], message: &[u8]) -> Result<String, TokenError> {
    hmac_sha256(key, message).map(hex::encode)
}

/// base64url без паддинга, как в компактных JWT сегментах
pub fn base64url_encode(bytes: impl AsRef<[u8]>) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

pub fn base64url_decode(segment: &str) -> Option<Vec<u8>> {
    URL_SAFE_LENIENT.decode(segment).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hmac_sha256_known_vector() {
        // RFC 4231, test case 2
        let digest = hmac_sha256_hex(b"Jefe", b"what do ya want for nothing?").unwrap();
        assert_eq!(
            digest,
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn test_hmac_depends_on_key() {
        let a = hmac_sha256(b"key", b"message").unwrap();
        let b = hmac_sha256(b"other", b"message").unwrap();
        assert_eq!(a.len(), 32);
        assert_ne!(a, b);
    }

    #[test]
    fn test_base64url_has_no_padding() {
        let encoded = base64url_encode([0xfbu8, 0xff]);
        assert_eq!(encoded, "-_8");
        assert_eq!(base64url_decode(&encoded).unwrap(), vec![0xfb, 0xff]);
        assert_eq!(base64url_decode("-_8=").unwrap(), vec![0xfb, 0xff]);
        assert!(base64url_decode("not base64!").is_none());
    }
}
