// HS256 access tokens. Stateless: there is no refresh token or revocation list,
// logout simply clears the cookie.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use uuid::Uuid;

use crate::app_config::JwtConfig;
use crate::models::{AccessTokenClaims, Role, User};

#[derive(Error, Debug)]
pub enum JwtError {
    #[error("JWT encoding error: {0}")]
    EncodingError(String),

    #[error("Clock error: {0}")]
    ClockError(String),

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,
}

impl From<jsonwebtoken::errors::Error> for JwtError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;
        match err.kind() {
            ErrorKind::ExpiredSignature => JwtError::TokenExpired,
            ErrorKind::InvalidToken
            | ErrorKind::InvalidSignature
            | ErrorKind::InvalidAudience
            | ErrorKind::InvalidIssuer
            | ErrorKind::InvalidAlgorithm
            | ErrorKind::Base64(_)
            | ErrorKind::Json(_)
            | ErrorKind::Utf8(_) => JwtError::InvalidToken,
            _ => JwtError::EncodingError(err.to_string()),
        }
    }
}

/// Signing material derived from the JWT settings
#[derive(Clone)]
pub struct JwtKeys {
    pub access_token_expiry: u64,
    pub algorithm: Algorithm,
    pub audience: String,
    pub issuer: String,
    pub encoding_key: EncodingKey,
    pub decoding_key: DecodingKey,
    pub key_version: u32,
}

impl std::fmt::Debug for JwtKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtKeys")
            .field("access_token_expiry", &self.access_token_expiry)
            .field("algorithm", &self.algorithm)
            .field("audience", &self.audience)
            .field("issuer", &self.issuer)
            .field("encoding_key", &"<redacted>")
            .field("decoding_key", &"<redacted>")
            .field("key_version", &self.key_version)
            .finish()
    }
}

impl JwtKeys {
    pub fn from_config(config: &JwtConfig) -> Self {
        let secret = config.access_secret.as_bytes();
        Self {
            access_token_expiry: config.access_expiry,
            algorithm: Algorithm::HS256,
            audience: config.audience.clone(),
            issuer: config.issuer.clone(),
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            key_version: config.key_version,
        }
    }
}

#[derive(Debug, Clone)]
pub struct JwtService {
    keys: JwtKeys,
}

impl JwtService {
    pub fn new(config: &JwtConfig) -> Self {
        Self {
            keys: JwtKeys::from_config(config),
        }
    }

    /// Lifetime of an issued token in seconds; also the cookie max-age
    pub fn access_token_expiry(&self) -> u64 {
        self.keys.access_token_expiry
    }

    pub fn generate_access_token(&self, user: &User) -> Result<String, JwtError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| JwtError::ClockError(e.to_string()))?
            .as_secs();

        let claims = AccessTokenClaims {
            sub: user.id.to_string(),
            jti: Uuid::new_v4().to_string(),
            email: user.email.clone(),
            name: user.name.clone(),
            role: user.role.as_str().to_string(),
            aud: self.keys.audience.clone(),
            iss: self.keys.issuer.clone(),
            iat: now,
            exp: now + self.keys.access_token_expiry,
        };

        let mut header = Header::new(self.keys.algorithm);
        header.kid = Some(self.keys.key_version.to_string());

        encode(&header, &claims, &self.keys.encoding_key).map_err(Into::into)
    }

    /// Verify signature, audience, issuer and expiry (no leeway).
    /// Claims must also carry a UUID subject and a known role.
    pub fn validate_access_token(&self, token: &str) -> Result<AccessTokenClaims, JwtError> {
        let mut validation = Validation::new(self.keys.algorithm);
        validation.set_audience(&[self.keys.audience.clone()]);
        validation.set_issuer(&[self.keys.issuer.clone()]);
        validation.validate_exp = true;
        validation.validate_nbf = false;
        validation.leeway = 0;

        let claims =
            decode::<AccessTokenClaims>(token, &self.keys.decoding_key, &validation)?.claims;

        if Uuid::parse_str(&claims.sub).is_err() || Role::from_string(&claims.role).is_err() {
            return Err(JwtError::InvalidToken);
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app_config::AppConfig;

    fn service() -> JwtService {
        JwtService::new(&AppConfig::for_test().jwt)
    }

    fn user() -> User {
        User::new(
            "Grace".to_string(),
            "grace@example.com".to_string(),
            "hash".to_string(),
            Role::Instructor,
        )
    }

    #[test]
    fn test_token_round_trip() {
        let service = service();
        let user = user();

        let token = service.generate_access_token(&user).unwrap();
        let claims = service.validate_access_token(&token).unwrap();

        assert_eq!(claims.sub, user.id.to_string());
        assert_eq!(claims.role, "instructor");
        assert_eq!(claims.name, "Grace");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_kid_header_carries_key_version() {
        let token = service().generate_access_token(&user()).unwrap();
        let header = jsonwebtoken::decode_header(&token).unwrap();
        assert_eq!(header.kid.as_deref(), Some("1"));
        assert_eq!(header.alg, Algorithm::HS256);
    }

    #[test]
    fn test_foreign_secret_rejected() {
        let mut other = AppConfig::for_test().jwt;
        other.access_secret = "another-secret-that-is-also-long-enough-999".to_string();
        let token = JwtService::new(&other).generate_access_token(&user()).unwrap();

        assert!(matches!(
            service().validate_access_token(&token),
            Err(JwtError::InvalidToken)
        ));
    }

    #[test]
    fn test_wrong_audience_rejected() {
        let mut other = AppConfig::for_test().jwt;
        other.audience = "someone.else".to_string();
        let token = JwtService::new(&other).generate_access_token(&user()).unwrap();

        assert!(service().validate_access_token(&token).is_err());
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(service().validate_access_token("not.a.jwt").is_err());
        assert!(service().validate_access_token("").is_err());
    }
}
