use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::core::config::AuthConfig;
use crate::core::error::{AppError, Result};
use crate::features::auth::model::{Claims, Identity};

/// Signed token handed back on register/login
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_in: i64,
}

/// Issues and verifies HS256 bearer tokens.
///
/// There is no refresh or revocation: a token stays valid until `exp`.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_secs: i64,
    leeway_secs: u64,
}

impl TokenService {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            ttl_secs: config.token_ttl.as_secs() as i64,
            leeway_secs: config.jwt_leeway.as_secs(),
        }
    }

    /// Sign `{id, email, name, role}` with the configured expiry
    pub fn issue_token(&self, identity: &Identity) -> Result<IssuedToken> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: identity.id,
            email: identity.email.clone(),
            name: identity.name.clone(),
            role: identity.role,
            iat: now,
            exp: now + self.ttl_secs,
        };

        let token = self.sign(&claims)?;
        tracing::debug!("Issued token for user {}", identity.id);

        Ok(IssuedToken {
            token,
            expires_in: self.ttl_secs,
        })
    }

    /// Verify signature and expiry, returning the caller identity
    pub fn authenticate(&self, token: &str) -> Result<Identity> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = self.leeway_secs;

        let token_data =
            decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
                tracing::debug!("Token rejected: {}", e);
                match e.kind() {
                    ErrorKind::ExpiredSignature => {
                        AppError::Unauthorized("Token expired".to_string())
                    }
                    _ => AppError::Unauthorized("Invalid token".to_string()),
                }
            })?;

        Ok(token_data.claims.into())
    }

    fn sign(&self, claims: &Claims) -> Result<String> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to sign token: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::auth::model::UserRole;
    use std::time::Duration;
    use uuid::Uuid;

    fn config(secret: &str) -> AuthConfig {
        AuthConfig {
            jwt_secret: secret.to_string(),
            token_ttl: Duration::from_secs(7 * 24 * 60 * 60),
            jwt_leeway: Duration::from_secs(0),
        }
    }

    fn identity() -> Identity {
        Identity {
            id: Uuid::new_v4(),
            email: "ana@example.com".to_string(),
            name: "Ana".to_string(),
            role: UserRole::Admin,
        }
    }

    #[test]
    fn test_issue_then_authenticate() {
        let service = TokenService::new(&config("test-secret"));
        let identity = identity();

        let issued = service.issue_token(&identity).unwrap();
        assert_eq!(issued.expires_in, 7 * 24 * 60 * 60);

        let decoded = service.authenticate(&issued.token).unwrap();
        assert_eq!(decoded, identity);
    }

    #[test]
    fn test_token_older_than_seven_days_is_rejected() {
        let service = TokenService::new(&config("test-secret"));
        let identity = identity();
        let issued_at = Utc::now().timestamp() - 8 * 24 * 60 * 60;
        let claims = Claims {
            sub: identity.id,
            email: identity.email.clone(),
            name: identity.name.clone(),
            role: identity.role,
            iat: issued_at,
            exp: issued_at + 7 * 24 * 60 * 60,
        };
        let token = service.sign(&claims).unwrap();

        let err = service.authenticate(&token).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(msg) if msg == "Token expired"));
    }

    #[test]
    fn test_token_signed_with_other_secret_is_rejected() {
        let issuer = TokenService::new(&config("secret-a"));
        let verifier = TokenService::new(&config("secret-b"));

        let issued = issuer.issue_token(&identity()).unwrap();
        assert!(matches!(
            verifier.authenticate(&issued.token),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_malformed_token_is_rejected() {
        let service = TokenService::new(&config("test-secret"));
        assert!(matches!(
            service.authenticate("not-a-jwt"),
            Err(AppError::Unauthorized(_))
        ));
        assert!(matches!(
            service.authenticate(""),
            Err(AppError::Unauthorized(_))
        ));
    }
}
