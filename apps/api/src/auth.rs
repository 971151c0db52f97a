use async_trait::async_trait;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use base64::Engine;

use crate::config::Config;
use crate::errors::AppError;
use crate::state::AppState;

/// Authenticated admin identity. Extracting it from a request enforces
/// HTTP Basic auth against the configured credential pair; handlers that
/// take an `AdminUser` argument are write-gated.
#[derive(Debug, Clone)]
pub struct AdminUser(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        let header_value = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(AppError::Unauthorized)?;

        let (username, password) = parse_basic(header_value).ok_or(AppError::Unauthorized)?;

        if !verify_credentials(&username, &password, &state.config) {
            return Err(AppError::Unauthorized);
        }

        Ok(AdminUser(username))
    }
}

/// Parses an `Authorization: Basic <base64(user:pass)>` header value.
fn parse_basic(header_value: &str) -> Option<(String, String)> {
    let (scheme, encoded) = header_value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }
    let decoded = base64::engine::general_purpose::STANDARD
        .decode(encoded.trim())
        .ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (user, pass) = decoded.split_once(':')?;
    Some((user.to_string(), pass.to_string()))
}

/// Checks both halves of the credential pair in constant time.
/// Both comparisons always run so a wrong username costs the same as a
/// wrong password.
fn verify_credentials(username: &str, password: &str, config: &Config) -> bool {
    let user_ok = constant_time_eq(username.as_bytes(), config.admin_username.as_bytes());
    let pass_ok = constant_time_eq(password.as_bytes(), config.admin_password.as_bytes());
    user_ok & pass_ok
}

/// Compares two byte strings without leaking the match position via timing.
/// Inputs are hashed to a fixed width first so length differences do not
/// short-circuit, then the digests are compared with `subtle`.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    use sha2::{Digest, Sha256};
    use subtle::ConstantTimeEq;

    let hash_a = Sha256::digest(a);
    let hash_b = Sha256::digest(b);
    hash_a.ct_eq(&hash_b).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            database_url: "postgres://localhost/test".to_string(),
            admin_username: "admin".to_string(),
            admin_password: "s3cret".to_string(),
            allowed_origins: vec!["*".to_string()],
            port: 8080,
            rust_log: "info".to_string(),
        }
    }

    #[test]
    fn parses_valid_basic_header() {
        // base64("admin:s3cret")
        let header = "Basic YWRtaW46czNjcmV0";
        let (user, pass) = parse_basic(header).unwrap();
        assert_eq!(user, "admin");
        assert_eq!(pass, "s3cret");
    }

    #[test]
    fn scheme_is_case_insensitive() {
        assert!(parse_basic("basic YWRtaW46czNjcmV0").is_some());
        assert!(parse_basic("BASIC YWRtaW46czNjcmV0").is_some());
    }

    #[test]
    fn rejects_non_basic_scheme() {
        assert!(parse_basic("Bearer YWRtaW46czNjcmV0").is_none());
    }

    #[test]
    fn rejects_malformed_payloads() {
        assert!(parse_basic("Basic !!!not-base64!!!").is_none());
        // base64("no-colon-here")
        assert!(parse_basic("Basic bm8tY29sb24taGVyZQ==").is_none());
        assert!(parse_basic("Basic").is_none());
    }

    #[test]
    fn password_may_contain_colons() {
        // base64("admin:a:b:c") — only the first colon splits
        let (user, pass) = parse_basic("Basic YWRtaW46YTpiOmM=").unwrap();
        assert_eq!(user, "admin");
        assert_eq!(pass, "a:b:c");
    }

    #[test]
    fn accepts_correct_credentials() {
        assert!(verify_credentials("admin", "s3cret", &test_config()));
    }

    #[test]
    fn rejects_wrong_username_or_password() {
        let config = test_config();
        assert!(!verify_credentials("root", "s3cret", &config));
        assert!(!verify_credentials("admin", "wrong", &config));
        assert!(!verify_credentials("", "", &config));
    }

    #[test]
    fn constant_time_eq_handles_length_mismatch() {
        assert!(constant_time_eq(b"abc", b"abc"));
        assert!(!constant_time_eq(b"abc", b"abcd"));
        assert!(!constant_time_eq(b"", b"x"));
    }
}
