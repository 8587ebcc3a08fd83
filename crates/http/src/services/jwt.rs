//! JWT service for issuing and verifying bearer credentials

use crate::error::HttpError;
use async_trait::async_trait;
use bazaar_core::access::{Principal, RoleId, TokenVerifier, VerifyError};
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// JWT Claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (principal ID)
    pub sub: String,
    /// Role key, matching the `role_id` grants are stored under
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Expiration time (as UTC timestamp)
    pub exp: i64,
    /// Issued at (as UTC timestamp)
    pub iat: i64,
    /// Issuer
    pub iss: String,
}

/// JWT service configuration
#[derive(Clone, Debug)]
pub struct JwtConfig {
    /// Secret key for signing tokens
    pub secret: String,
    /// Token expiration duration
    pub expiration: Duration,
    /// Token issuer
    pub issuer: String,
}

impl JwtConfig {
    pub fn new(secret: String, expiration_hours: i64, issuer: String) -> Self {
        Self {
            secret,
            expiration: Duration::hours(expiration_hours),
            issuer,
        }
    }
}

/// JWT service for token operations
pub struct JwtService {
    config: Arc<JwtConfig>,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtService {
    /// Create a new JWT service
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config: Arc::new(config),
            encoding_key,
            decoding_key,
        }
    }

    /// Generate a JWT token for a principal
    pub fn generate_token(
        &self,
        subject: &str,
        role: Option<&RoleId>,
        name: Option<&str>,
    ) -> Result<String, HttpError> {
        let now = Utc::now();
        let expiration = now + self.config.expiration;

        let claims = Claims {
            sub: subject.to_string(),
            role: role.map(ToString::to_string),
            name: name.map(ToString::to_string),
            exp: expiration.timestamp(),
            iat: now.timestamp(),
            iss: self.config.issuer.clone(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| HttpError::InternalServerError(format!("Failed to generate token: {e}")))
    }

    /// Validate a JWT token and extract claims
    pub fn validate_token(&self, token: &str) -> Result<Claims, VerifyError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(std::slice::from_ref(&self.config.issuer));

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|token_data| token_data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => VerifyError::Expired,
                jsonwebtoken::errors::ErrorKind::InvalidToken => {
                    VerifyError::Invalid("Invalid token".to_string())
                }
                _ => VerifyError::Invalid(format!("Token validation failed: {e}")),
            })
    }
}

#[async_trait]
impl TokenVerifier for JwtService {
    async fn verify(&self, credential: &str) -> Result<Principal, VerifyError> {
        let claims = self.validate_token(credential)?;
        Ok(Principal {
            id: claims.sub,
            role: claims
                .role
                .filter(|role| !role.trim().is_empty())
                .map(RoleId::from),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> JwtService {
        JwtService::new(JwtConfig::new(
            "test-secret".to_string(),
            24,
            "test-issuer".to_string(),
        ))
    }

    #[tokio::test]
    async fn test_token_round_trip_carries_role() {
        let service = service();
        let token = service
            .generate_token("user-123", Some(&RoleId::from("admin")), Some("Test User"))
            .unwrap();

        let principal = service.verify(&token).await.unwrap();
        assert_eq!(principal, Principal::new("user-123", "admin"));
    }

    #[tokio::test]
    async fn test_token_without_role() {
        let service = service();
        let token = service.generate_token("user-123", None, None).unwrap();

        let principal = service.verify(&token).await.unwrap();
        assert_eq!(principal.role, None);
    }

    #[test]
    fn test_expired_token() {
        let service = service();
        let expired_time = Utc::now() - Duration::seconds(3600);

        let claims = Claims {
            sub: "user".to_string(),
            role: Some("admin".to_string()),
            name: None,
            exp: expired_time.timestamp(),
            iat: expired_time.timestamp(),
            iss: service.config.issuer.clone(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &service.encoding_key).unwrap();

        assert_eq!(service.validate_token(&token).unwrap_err(), VerifyError::Expired);
    }

    #[test]
    fn test_wrong_issuer_rejected() {
        let other = JwtService::new(JwtConfig::new(
            "test-secret".to_string(),
            24,
            "someone-else".to_string(),
        ));
        let token = other.generate_token("user", None, None).unwrap();

        assert!(matches!(
            service().validate_token(&token),
            Err(VerifyError::Invalid(_))
        ));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let other = JwtService::new(JwtConfig::new(
            "another-secret".to_string(),
            24,
            "test-issuer".to_string(),
        ));
        let token = other.generate_token("user", None, None).unwrap();

        assert!(service().validate_token(&token).is_err());
        assert!(service().validate_token("not-a-jwt").is_err());
    }
}
