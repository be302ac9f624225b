//! Ordered authentication steps built from configuration.

use axum::http::HeaderMap;

use common::{AppError, AppResult, AuthConfig};

use super::{BearerVerifier, Claims, CookieVerifier};

/// One credential check.
#[derive(Debug, Clone)]
pub enum AuthStep {
    Bearer(BearerVerifier),
    Cookie(CookieVerifier),
    /// Every request passes
    NoAuth,
}

/// What the pipeline verified, attached to the request extensions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Identity {
    pub claims: Option<Claims>,
    pub session_user_id: Option<u64>,
}

impl Identity {
    pub fn is_anonymous(&self) -> bool {
        self.claims.is_none() && self.session_user_id.is_none()
    }

    /// Label for log lines
    pub fn subject(&self) -> String {
        if let Some(subject) = self.claims.as_ref().and_then(Claims::subject) {
            return subject.to_string();
        }
        match self.session_user_id {
            Some(id) => format!("session:{}", id),
            None => "anonymous".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AuthPipeline {
    steps: Vec<AuthStep>,
}

impl AuthPipeline {
    /// Bearer first, then cookie; `[NoAuth]` when neither secret is set.
    ///
    /// A cookie secret without an expected user id is a startup error.
    pub fn from_config(config: &AuthConfig) -> AppResult<Self> {
        let mut steps = Vec::new();

        if let Some(key) = config.jwt_signing_key.key() {
            steps.push(AuthStep::Bearer(BearerVerifier::new(key)));
        }

        if let Some(secret) = config.session.secret_key_base.key() {
            let user_id = config.session.user_id.ok_or_else(|| {
                AppError::internal("RAILS_USER_ID is required when cookie auth is enabled")
            })?;
            steps.push(AuthStep::Cookie(CookieVerifier::new(
                secret,
                config.session.cookie_name.clone(),
                user_id,
            )));
        }

        if steps.is_empty() {
            tracing::warn!("no auth secrets configured; users API is open");
            steps.push(AuthStep::NoAuth);
        } else {
            tracing::info!(steps = steps.len(), "auth pipeline configured");
        }

        Ok(Self { steps })
    }

    pub fn new(steps: Vec<AuthStep>) -> Self {
        if steps.is_empty() {
            return Self {
                steps: vec![AuthStep::NoAuth],
            };
        }
        Self { steps }
    }

    pub fn steps(&self) -> &[AuthStep] {
        &self.steps
    }

    pub fn is_open(&self) -> bool {
        matches!(self.steps.as_slice(), [AuthStep::NoAuth])
    }

    /// Run every step in order; the first failure wins.
    pub fn authenticate(&self, headers: &HeaderMap) -> AppResult<Identity> {
        let mut identity = Identity::default();

        for step in &self.steps {
            match step {
                AuthStep::Bearer(verifier) => {
                    identity.claims = Some(verifier.verify(headers)?);
                }
                AuthStep::Cookie(verifier) => {
                    let user_id = verifier.verify(headers).map_err(|err| {
                        tracing::debug!(error = %err, "session cookie rejected");
                        AppError::from(err)
                    })?;
                    identity.session_user_id = Some(user_id);
                }
                AuthStep::NoAuth => {}
            }
        }

        Ok(identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::{AUTHORIZATION, COOKIE};
    use chrono::Utc;
    use common::{Secret, SessionCookieConfig};
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;

    const JWT_KEY: &str = "jwt-key";
    const COOKIE_SECRET: &str = "cookie-secret";
    const COOKIE_NAME: &str = "_app_session";

    fn config(jwt: &str, cookie: &str, user_id: Option<u64>) -> AuthConfig {
        AuthConfig {
            jwt_signing_key: Secret::parse(jwt),
            session: SessionCookieConfig {
                secret_key_base: Secret::parse(cookie),
                cookie_name: COOKIE_NAME.to_string(),
                user_id,
            },
        }
    }

    fn bearer_header(headers: &mut HeaderMap) {
        let claims = Claims {
            sub: Some("svc".to_string()),
            uid: None,
            name: None,
            exp: Utc::now().timestamp() + 600,
            iat: None,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(JWT_KEY.as_bytes()),
        )
        .unwrap();
        headers.insert(AUTHORIZATION, format!("Bearer {}", token).parse().unwrap());
    }

    fn cookie_header(headers: &mut HeaderMap, user_id: u64) {
        let value = CookieVerifier::new(COOKIE_SECRET, COOKIE_NAME, user_id)
            .sign(&json!({ "warden.user.user.key": [[user_id], "salt"] }));
        headers.insert(COOKIE, format!("{}={}", COOKIE_NAME, value).parse().unwrap());
    }

    #[test]
    fn test_nothing_configured_is_open() {
        let pipeline = AuthPipeline::from_config(&config("change-me", "change-me", None)).unwrap();

        assert!(pipeline.is_open());
        let identity = pipeline.authenticate(&HeaderMap::new()).unwrap();
        assert!(identity.is_anonymous());
        assert_eq!(identity.subject(), "anonymous");
    }

    #[test]
    fn test_step_order() {
        let pipeline =
            AuthPipeline::from_config(&config(JWT_KEY, COOKIE_SECRET, Some(7))).unwrap();
        assert!(matches!(
            pipeline.steps(),
            [AuthStep::Bearer(_), AuthStep::Cookie(_)]
        ));
    }

    #[test]
    fn test_cookie_without_user_id_fails_closed() {
        assert!(AuthPipeline::from_config(&config("change-me", COOKIE_SECRET, None)).is_err());
    }

    #[test]
    fn test_bearer_only_rejects_cookie() {
        let pipeline = AuthPipeline::from_config(&config(JWT_KEY, "change-me", None)).unwrap();

        let mut headers = HeaderMap::new();
        cookie_header(&mut headers, 7);
        assert!(matches!(
            pipeline.authenticate(&headers),
            Err(AppError::Unauthorized)
        ));

        let mut headers = HeaderMap::new();
        bearer_header(&mut headers);
        let identity = pipeline.authenticate(&headers).unwrap();
        assert_eq!(identity.subject(), "svc");
        assert_eq!(identity.session_user_id, None);
    }

    #[test]
    fn test_cookie_only() {
        let pipeline =
            AuthPipeline::from_config(&config("change-me", COOKIE_SECRET, Some(7))).unwrap();

        let mut headers = HeaderMap::new();
        bearer_header(&mut headers);
        assert!(matches!(
            pipeline.authenticate(&headers),
            Err(AppError::Unauthorized)
        ));

        let mut headers = HeaderMap::new();
        cookie_header(&mut headers, 8);
        assert!(matches!(
            pipeline.authenticate(&headers),
            Err(AppError::Forbidden)
        ));

        let mut headers = HeaderMap::new();
        cookie_header(&mut headers, 7);
        let identity = pipeline.authenticate(&headers).unwrap();
        assert_eq!(identity.session_user_id, Some(7));
        assert_eq!(identity.subject(), "session:7");
    }

    #[test]
    fn test_both_must_pass() {
        let pipeline =
            AuthPipeline::from_config(&config(JWT_KEY, COOKIE_SECRET, Some(7))).unwrap();

        let mut bearer_only = HeaderMap::new();
        bearer_header(&mut bearer_only);
        assert!(pipeline.authenticate(&bearer_only).is_err());

        let mut cookie_only = HeaderMap::new();
        cookie_header(&mut cookie_only, 7);
        assert!(pipeline.authenticate(&cookie_only).is_err());

        let mut both = HeaderMap::new();
        bearer_header(&mut both);
        cookie_header(&mut both, 7);
        let identity = pipeline.authenticate(&both).unwrap();
        assert!(identity.claims.is_some());
        assert_eq!(identity.session_user_id, Some(7));
    }

    #[test]
    fn test_empty_steps_default_to_open() {
        assert!(AuthPipeline::new(Vec::new()).is_open());
    }
}
