//! Bearer token verification (HS256 JWT).

use std::fmt;

use axum::http::HeaderMap;
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use common::{AppError, AppResult};

/// JWT claims accepted on the users API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    /// Issuer-specific user id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
}

impl Claims {
    /// Best identifier for log lines
    pub fn subject(&self) -> Option<&str> {
        self.uid.as_deref().or(self.sub.as_deref())
    }
}

/// Verifies `Authorization: Bearer <token>` against one signing key.
#[derive(Clone)]
pub struct BearerVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl BearerVerifier {
    pub fn new(signing_key: &str) -> Self {
        Self {
            key: DecodingKey::from_secret(signing_key.as_bytes()),
            validation: Validation::default(),
        }
    }

    pub fn verify(&self, headers: &HeaderMap) -> AppResult<Claims> {
        let Authorization(bearer) = headers
            .typed_get::<Authorization<Bearer>>()
            .ok_or(AppError::Unauthorized)?;

        let token_data = decode::<Claims>(bearer.token(), &self.key, &self.validation)?;
        let claims = token_data.claims;
        tracing::info!(?claims, "bearer token verified");

        Ok(claims)
    }
}

impl fmt::Debug for BearerVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BearerVerifier")
            .field("algorithms", &self.validation.algorithms)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::AUTHORIZATION;
    use chrono::Utc;
    use jsonwebtoken::{encode, EncodingKey, Header};

    const KEY: &str = "bearer-test-key";

    fn token(key: &str, exp: i64) -> String {
        let claims = Claims {
            sub: None,
            uid: Some("42".to_string()),
            name: Some("alice".to_string()),
            exp,
            iat: Some(Utc::now().timestamp()),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(key.as_bytes()),
        )
        .unwrap()
    }

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, value.parse().unwrap());
        headers
    }

    #[test]
    fn test_valid_token() {
        let verifier = BearerVerifier::new(KEY);
        let bearer = format!("Bearer {}", token(KEY, Utc::now().timestamp() + 600));

        let claims = verifier.verify(&headers(&bearer)).unwrap();
        assert_eq!(claims.subject(), Some("42"));
        assert_eq!(claims.name.as_deref(), Some("alice"));
    }

    #[test]
    fn test_missing_header() {
        let verifier = BearerVerifier::new(KEY);
        assert!(matches!(
            verifier.verify(&HeaderMap::new()),
            Err(AppError::Unauthorized)
        ));
    }

    #[test]
    fn test_wrong_scheme() {
        let verifier = BearerVerifier::new(KEY);
        assert!(verifier.verify(&headers("Basic dXNlcjpwYXNz")).is_err());
    }

    #[test]
    fn test_wrong_key() {
        let verifier = BearerVerifier::new(KEY);
        let bearer = format!("Bearer {}", token("other-key", Utc::now().timestamp() + 600));
        assert!(matches!(
            verifier.verify(&headers(&bearer)),
            Err(AppError::Jwt(_))
        ));
    }

    #[test]
    fn test_expired_token() {
        let verifier = BearerVerifier::new(KEY);
        let bearer = format!("Bearer {}", token(KEY, Utc::now().timestamp() - 3600));
        let err = verifier.verify(&headers(&bearer)).unwrap_err();
        assert_eq!(err.status(), axum::http::StatusCode::UNAUTHORIZED);
    }
}
