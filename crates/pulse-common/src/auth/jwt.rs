//! JWT verification
//!
//! Tokens are issued by the external credential service; the gateway only
//! verifies them and extracts the authenticated principal.

use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use pulse_core::PrincipalId;

use crate::error::AppError;

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (principal id)
    pub sub: String,
    /// Issued at (unix timestamp)
    pub iat: i64,
    /// Expiration (unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Parse the subject as a principal id
    ///
    /// # Errors
    /// Returns `AppError::InvalidToken` if the subject is not a valid id
    pub fn principal_id(&self) -> Result<PrincipalId, AppError> {
        self.sub
            .parse()
            .map_err(|_| AppError::InvalidToken("subject is not a valid principal id".to_string()))
    }
}

/// Verifies tokens issued by the credential service
#[derive(Clone)]
pub struct JwtVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    /// Create a new JWT verifier with the given secret
    #[must_use]
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;

        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Verify a token and return its claims
    ///
    /// # Errors
    /// Returns an error if the token is invalid or expired
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        let token_data =
            decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => AppError::TokenExpired,
                    _ => AppError::InvalidToken(e.to_string()),
                }
            })?;

        Ok(token_data.claims)
    }

    /// Verify a token and return the authenticated principal id
    ///
    /// # Errors
    /// Returns an error if the token is invalid, expired, or carries a
    /// malformed subject
    pub fn verify_principal(&self, token: &str) -> Result<PrincipalId, AppError> {
        self.verify(token)?.principal_id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use jsonwebtoken::{encode, EncodingKey, Header};

    const SECRET: &str = "test-secret-key-for-jwt-verification";

    fn issue(sub: &str, ttl_secs: i64) -> String {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: sub.to_string(),
            iat: now,
            exp: now + ttl_secs,
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_verify_valid_token() {
        let verifier = JwtVerifier::new(SECRET);
        let principal_id = PrincipalId::generate();
        let token = issue(&principal_id.to_string(), 3600);

        let claims = verifier.verify(&token).unwrap();
        assert_eq!(claims.sub, principal_id.to_string());
        assert_eq!(claims.principal_id().unwrap(), principal_id);
    }

    #[test]
    fn test_verify_expired_token() {
        let verifier = JwtVerifier::new(SECRET);
        let token = issue(&PrincipalId::generate().to_string(), -3600);

        let result = verifier.verify(&token);
        assert!(matches!(result, Err(AppError::TokenExpired)));
    }

    #[test]
    fn test_verify_wrong_secret() {
        let verifier = JwtVerifier::new("a-different-secret");
        let token = issue(&PrincipalId::generate().to_string(), 3600);

        let result = verifier.verify(&token);
        assert!(matches!(result, Err(AppError::InvalidToken(_))));
    }

    #[test]
    fn test_verify_garbage_token() {
        let verifier = JwtVerifier::new(SECRET);
        let result = verifier.verify("not.a.token");
        assert!(matches!(result, Err(AppError::InvalidToken(_))));
    }

    #[test]
    fn test_malformed_subject() {
        let verifier = JwtVerifier::new(SECRET);
        let token = issue("not-a-uuid", 3600);

        let claims = verifier.verify(&token).unwrap();
        assert!(matches!(
            claims.principal_id(),
            Err(AppError::InvalidToken(_))
        ));
    }
}
