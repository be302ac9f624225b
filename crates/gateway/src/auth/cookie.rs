//! Signed session cookie verification.
//!
//! The cookie value is `<base64 json>--<base64 HMAC-SHA256>` where the MAC is
//! computed over the base64 text with the secret key base. The JSON may be
//! wrapped in a `{"_rails": {"message", "exp"}}` envelope.

use std::fmt;

use axum::http::HeaderMap;
use axum_extra::extract::cookie::CookieJar;
use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde_json::Value;
use sha2::Sha256;
use thiserror::Error;

use common::AppError;
use domain::WARDEN_USER_KEY;

type HmacSha256 = Hmac<Sha256>;

const SIGNATURE_SEPARATOR: &str = "--";

/// Why a session cookie was refused.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("session cookie is missing")]
    Missing,

    #[error("session cookie is malformed")]
    Malformed,

    #[error("session signature does not match")]
    BadSignature,

    #[error("session has expired")]
    Expired,

    #[error("session carries no user")]
    NoUser,

    #[error("session user {actual} is not allowed")]
    WrongUser { actual: u64 },
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::WrongUser { .. } => AppError::Forbidden,
            _ => AppError::Unauthorized,
        }
    }
}

/// Accepts a session cookie signed with the shared secret whose user is the
/// configured one.
#[derive(Clone)]
pub struct CookieVerifier {
    secret: Vec<u8>,
    cookie_name: String,
    user_id: u64,
}

impl CookieVerifier {
    pub fn new(secret_key_base: &str, cookie_name: impl Into<String>, user_id: u64) -> Self {
        Self {
            secret: secret_key_base.as_bytes().to_vec(),
            cookie_name: cookie_name.into(),
            user_id,
        }
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    pub fn user_id(&self) -> u64 {
        self.user_id
    }

    /// Session user id of a valid cookie.
    pub fn verify(&self, headers: &HeaderMap) -> Result<u64, SessionError> {
        let jar = CookieJar::from_headers(headers);
        let cookie = jar.get(&self.cookie_name).ok_or(SessionError::Missing)?;

        let session = self.decode(cookie.value())?;
        let actual = session_user_id(&session).ok_or(SessionError::NoUser)?;

        if actual != self.user_id {
            return Err(SessionError::WrongUser { actual });
        }
        Ok(actual)
    }

    fn decode(&self, value: &str) -> Result<Value, SessionError> {
        let (data, digest) = value
            .rsplit_once(SIGNATURE_SEPARATOR)
            .ok_or(SessionError::Malformed)?;
        let digest = STANDARD
            .decode(digest)
            .map_err(|_| SessionError::Malformed)?;

        let mut mac =
            HmacSha256::new_from_slice(&self.secret).map_err(|_| SessionError::BadSignature)?;
        mac.update(data.as_bytes());
        mac.verify_slice(&digest)
            .map_err(|_| SessionError::BadSignature)?;

        unwrap_envelope(decode_json(data)?)
    }

    #[cfg(test)]
    pub(crate) fn sign(&self, payload: &Value) -> String {
        let data = STANDARD.encode(payload.to_string());
        let mut mac = HmacSha256::new_from_slice(&self.secret).unwrap();
        mac.update(data.as_bytes());
        let digest = STANDARD.encode(mac.finalize().into_bytes());
        format!("{}{}{}", data, SIGNATURE_SEPARATOR, digest)
    }
}

impl fmt::Debug for CookieVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CookieVerifier")
            .field("cookie_name", &self.cookie_name)
            .field("user_id", &self.user_id)
            .finish_non_exhaustive()
    }
}

fn decode_json(encoded: &str) -> Result<Value, SessionError> {
    let bytes = STANDARD
        .decode(encoded)
        .map_err(|_| SessionError::Malformed)?;
    serde_json::from_slice(&bytes).map_err(|_| SessionError::Malformed)
}

/// Strip the `_rails` metadata envelope, enforcing its expiry.
fn unwrap_envelope(payload: Value) -> Result<Value, SessionError> {
    let Some(meta) = payload.get("_rails") else {
        return Ok(payload);
    };

    if let Some(exp) = meta.get("exp").and_then(Value::as_str) {
        let exp = DateTime::parse_from_rfc3339(exp).map_err(|_| SessionError::Malformed)?;
        if exp.with_timezone(&Utc) <= Utc::now() {
            return Err(SessionError::Expired);
        }
    }

    let message = meta
        .get("message")
        .and_then(Value::as_str)
        .ok_or(SessionError::Malformed)?;
    decode_json(message)
}

/// `warden.user.user.key` is `[[id], salt]`; older sessions carry `user_id`.
fn session_user_id(session: &Value) -> Option<u64> {
    session
        .get(WARDEN_USER_KEY)
        .and_then(|key| key.get(0))
        .and_then(|ids| ids.get(0))
        .and_then(as_id)
        .or_else(|| session.get("user_id").and_then(as_id))
}

fn as_id(value: &Value) -> Option<u64> {
    value
        .as_u64()
        .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::COOKIE;
    use chrono::Duration;
    use serde_json::json;

    const SECRET: &str = "secret-key-base";
    const NAME: &str = "_app_session";

    fn verifier(user_id: u64) -> CookieVerifier {
        CookieVerifier::new(SECRET, NAME, user_id)
    }

    fn headers(cookie: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, format!("other=1; {}={}", NAME, cookie).parse().unwrap());
        headers
    }

    fn warden(id: u64) -> Value {
        json!({ "session_id": "abc", WARDEN_USER_KEY: [[id], "$2a$10$salt"] })
    }

    #[test]
    fn test_warden_session() {
        let v = verifier(7);
        let cookie = v.sign(&warden(7));
        assert_eq!(v.verify(&headers(&cookie)), Ok(7));
    }

    #[test]
    fn test_user_id_fallback() {
        let v = verifier(9);
        let cookie = v.sign(&json!({ "user_id": "9" }));
        assert_eq!(v.verify(&headers(&cookie)), Ok(9));
    }

    #[test]
    fn test_wrong_user_is_forbidden() {
        let v = verifier(7);
        let cookie = v.sign(&warden(8));

        let err = v.verify(&headers(&cookie)).unwrap_err();
        assert_eq!(err, SessionError::WrongUser { actual: 8 });
        assert!(matches!(AppError::from(err), AppError::Forbidden));
    }

    #[test]
    fn test_tampered_payload() {
        let v = verifier(7);
        let cookie = v.sign(&warden(7));
        let (_, digest) = cookie.rsplit_once("--").unwrap();
        let forged = format!("{}--{}", STANDARD.encode(warden(1).to_string()), digest);

        assert_eq!(v.verify(&headers(&forged)), Err(SessionError::BadSignature));
    }

    #[test]
    fn test_other_secret() {
        let cookie = CookieVerifier::new("another-secret", NAME, 7).sign(&warden(7));
        assert_eq!(
            verifier(7).verify(&headers(&cookie)),
            Err(SessionError::BadSignature)
        );
    }

    #[test]
    fn test_missing_and_malformed() {
        let v = verifier(7);
        assert_eq!(v.verify(&HeaderMap::new()), Err(SessionError::Missing));
        assert_eq!(v.verify(&headers("no-separator")), Err(SessionError::Malformed));
        assert!(matches!(
            AppError::from(SessionError::Missing),
            AppError::Unauthorized
        ));
    }

    #[test]
    fn test_session_without_user() {
        let v = verifier(7);
        let cookie = v.sign(&json!({ "session_id": "abc" }));
        assert_eq!(v.verify(&headers(&cookie)), Err(SessionError::NoUser));
    }

    #[test]
    fn test_metadata_envelope() {
        let v = verifier(7);
        let message = STANDARD.encode(warden(7).to_string());
        let future = (Utc::now() + Duration::hours(1)).to_rfc3339();
        let cookie = v.sign(&json!({
            "_rails": { "message": message, "exp": future, "pur": "cookie._app_session" }
        }));
        assert_eq!(v.verify(&headers(&cookie)), Ok(7));

        let cookie = v.sign(&json!({ "_rails": { "message": message, "exp": null } }));
        assert_eq!(v.verify(&headers(&cookie)), Ok(7));
    }

    #[test]
    fn test_expired_envelope() {
        let v = verifier(7);
        let message = STANDARD.encode(warden(7).to_string());
        let past = (Utc::now() - Duration::hours(1)).to_rfc3339();
        let cookie = v.sign(&json!({ "_rails": { "message": message, "exp": past } }));

        assert_eq!(v.verify(&headers(&cookie)), Err(SessionError::Expired));
    }

    /// The jar decodes `%3D`/`%2B` before the signature is checked.
    #[test]
    fn test_url_encoded_cookie() {
        let v = verifier(7);
        let cookie = v.sign(&warden(7)).replace('=', "%3D").replace('+', "%2B");
        assert_eq!(v.verify(&headers(&cookie)), Ok(7));
    }
}
