use chrono::Utc;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::error::ClientError;

/// Полезная нагрузка bearer-токена, выданного `/authentication/token`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenClaims {
    #[serde(default)]
    pub sub: Option<i64>,
    pub exp: i64,
    #[serde(default)]
    pub iat: Option<i64>,
    #[serde(default)]
    pub iss: Option<String>,
}

impl TokenClaims {
    pub fn is_expired_at(&self, unix_seconds: i64) -> bool {
        self.exp < unix_seconds
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now().timestamp())
    }
}

/// Читает claims без проверки подписи: секрет есть только у сервера, клиенту
/// нужен лишь срок действия. Срок проверяет вызывающий.
pub fn decode_claims(token: &str) -> Result<TokenClaims, ClientError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;

    let data = decode::<TokenClaims>(token, &DecodingKey::from_secret(&[]), &validation)?;
    Ok(data.claims)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    pub(crate) fn token_with_exp(exp: i64) -> String {
        let claims = TokenClaims {
            sub: Some(42),
            exp,
            iat: Some(exp - 3600),
            iss: Some("ticketo".to_string()),
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"server-only-secret"),
        )
        .unwrap()
    }

    #[test]
    fn decodes_without_knowing_the_secret() {
        let exp = Utc::now().timestamp() + 600;
        let claims = decode_claims(&token_with_exp(exp)).unwrap();
        assert_eq!(claims.sub, Some(42));
        assert_eq!(claims.exp, exp);
        assert!(!claims.is_expired());
    }

    #[test]
    fn expired_token_still_decodes() {
        let claims = decode_claims(&token_with_exp(1_000)).unwrap();
        assert!(claims.is_expired());
        assert!(claims.is_expired_at(1_001));
        assert!(!claims.is_expired_at(1_000));
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(matches!(decode_claims("not-a-jwt"), Err(ClientError::Token(_))));
    }
}
