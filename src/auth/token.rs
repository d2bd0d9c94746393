//! Signed, time-bounded identity tokens.
//!
//! Stateless HS256 JWTs: validity is re-derived from the signature and
//! the `exp` claim at check time, never looked up. The signing secret is
//! injected at construction and read-only afterwards, so concurrent
//! validation needs no synchronization.

use crate::auth::clock::Clock;
use crate::auth::error::AuthError;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl TokenIssuer {
    #[must_use]
    pub fn new(secret: &SecretString, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        let secret = secret.expose_secret().as_bytes();
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
            clock,
        }
    }

    /// Mint a token for an authenticated subject.
    ///
    /// # Errors
    ///
    /// Returns an error if claim serialization or signing fails.
    pub fn issue(&self, subject: &str) -> Result<String, jsonwebtoken::errors::Error> {
        let now = self.clock.now().timestamp();
        let claims = Claims {
            sub: subject.to_string(),
            iat: now,
            exp: now + self.ttl.as_secs() as i64,
        };
        jsonwebtoken::encode(&Header::default(), &claims, &self.encoding)
    }

    /// Configured token lifetime, for callers that report it downstream.
    #[must_use]
    pub fn expiration_seconds(&self) -> u64 {
        self.ttl.as_secs()
    }

    /// Check signature and expiry, returning the subject.
    ///
    /// # Errors
    ///
    /// Fails with [`AuthError::InvalidToken`] when the token is
    /// malformed, the signature does not verify, or `now >= exp`.
    pub fn validate(&self, token: &str) -> Result<String, AuthError> {
        // Expiry is checked against the injected clock below, not by the
        // jsonwebtoken internals.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims = HashSet::new();

        let decoded = jsonwebtoken::decode::<Claims>(token, &self.decoding, &validation)
            .map_err(|_| AuthError::InvalidToken)?;

        if self.clock.now().timestamp() >= decoded.claims.exp {
            return Err(AuthError::InvalidToken);
        }

        Ok(decoded.claims.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::clock::ManualClock;
    use chrono::TimeZone;
    use chrono::Utc;

    fn issuer_with_clock() -> (TokenIssuer, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap(),
        ));
        let secret = SecretString::from("unit-test-secret".to_string());
        let issuer = TokenIssuer::new(&secret, Duration::from_secs(3600), clock.clone());
        (issuer, clock)
    }

    #[test]
    fn issue_then_validate_returns_subject() {
        let (issuer, _clock) = issuer_with_clock();
        let token = issuer.issue("alice").unwrap();
        assert_eq!(issuer.validate(&token).unwrap(), "alice");
    }

    #[test]
    fn validate_fails_after_expiry() {
        let (issuer, clock) = issuer_with_clock();
        let token = issuer.issue("alice").unwrap();

        clock.advance(chrono::Duration::seconds(3599));
        assert!(issuer.validate(&token).is_ok());

        // exp is exclusive: now == exp is already invalid.
        clock.advance(chrono::Duration::seconds(1));
        assert!(matches!(
            issuer.validate(&token),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn validate_rejects_garbage_and_tampering() {
        let (issuer, _clock) = issuer_with_clock();
        assert!(matches!(
            issuer.validate("not-a-token"),
            Err(AuthError::InvalidToken)
        ));

        let token = issuer.issue("alice").unwrap();
        let mut tampered = token.clone();
        tampered.pop();
        assert!(matches!(
            issuer.validate(&tampered),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn validate_rejects_foreign_secret() {
        let (issuer, clock) = issuer_with_clock();
        let other_secret = SecretString::from("some-other-secret".to_string());
        let other = TokenIssuer::new(&other_secret, Duration::from_secs(3600), clock);
        let token = other.issue("alice").unwrap();
        assert!(matches!(
            issuer.validate(&token),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn expiration_seconds_reports_configured_ttl() {
        let (issuer, _clock) = issuer_with_clock();
        assert_eq!(issuer.expiration_seconds(), 3600);
    }
}
