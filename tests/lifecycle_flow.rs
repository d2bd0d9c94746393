//! End-to-end walk through the credential lifecycle over the in-memory
//! store: signup, failed early login, verification, login, token
//! round-trip, and expiry.

use anyhow::Result;
use chiave::auth::{
    AccountStatus, AuthError, CredentialLifecycle, LifecycleConfig, ManualClock,
    MemoryAccountStore, MessageSender, TokenIssuer,
};
use chrono::{Duration, TimeZone, Utc};
use secrecy::SecretString;
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
struct RecordingMailer {
    sent: Arc<Mutex<Vec<(String, String)>>>,
}

impl RecordingMailer {
    fn last_code_for(&self, email: &str) -> Option<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(to, _)| to == email)
            .map(|(_, code)| code.clone())
    }
}

impl MessageSender for RecordingMailer {
    async fn send_verification_code(&self, email: &str, code: &str) -> Result<()> {
        self.sent
            .lock()
            .unwrap()
            .push((email.to_string(), code.to_string()));
        Ok(())
    }
}

struct Harness {
    lifecycle: CredentialLifecycle<MemoryAccountStore, RecordingMailer>,
    mailer: RecordingMailer,
    clock: Arc<ManualClock>,
    issuer: TokenIssuer,
}

fn harness() -> Harness {
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 7, 1, 9, 0, 0).unwrap(),
    ));
    let mailer = RecordingMailer::default();
    let lifecycle = CredentialLifecycle::new(
        MemoryAccountStore::new(),
        mailer.clone(),
        clock.clone(),
        LifecycleConfig::new(),
    );
    let issuer = TokenIssuer::new(
        &SecretString::from("integration-secret".to_string()),
        std::time::Duration::from_secs(3600),
        clock.clone(),
    );
    Harness {
        lifecycle,
        mailer,
        clock,
        issuer,
    }
}

#[tokio::test]
async fn full_lifecycle_from_signup_to_token() {
    let h = harness();

    // Signup leaves the account pending with a live code.
    let account = h
        .lifecycle
        .register("alice", "alice@x.com", "pw1")
        .await
        .unwrap();
    assert_eq!(account.status(), AccountStatus::PendingVerification);

    // Login before verification is rejected no matter the password.
    let early = h.lifecycle.authenticate("alice", "pw1").await;
    assert!(matches!(early, Err(AuthError::AccountNotVerified)));

    // A wrong code is an exact-match failure.
    let mismatch = h.lifecycle.verify_account("alice@x.com", "wrong").await;
    assert!(matches!(mismatch, Err(AuthError::CodeMismatch)));

    // The mailed code flips the account to verified.
    let code = h.mailer.last_code_for("alice@x.com").unwrap();
    let verified = h
        .lifecycle
        .verify_account("alice@x.com", &code)
        .await
        .unwrap();
    assert_eq!(verified.status(), AccountStatus::Verified);
    assert!(verified.verification_code.is_none());

    // Now the login works and a token round-trips to the subject.
    let account = h.lifecycle.authenticate("alice", "pw1").await.unwrap();
    let token = h.issuer.issue(&account.username).unwrap();
    assert_eq!(h.issuer.validate(&token).unwrap(), "alice");
    assert_eq!(h.issuer.expiration_seconds(), 3600);

    // The same token dies once the clock passes its expiry.
    h.clock.advance(Duration::seconds(3600));
    assert!(matches!(
        h.issuer.validate(&token),
        Err(AuthError::InvalidToken)
    ));
}

#[tokio::test]
async fn resend_then_verify_through_the_link() {
    let h = harness();

    h.lifecycle
        .register("bob", "bob@x.com", "a decent password")
        .await
        .unwrap();
    let first_code = h.mailer.last_code_for("bob@x.com").unwrap();

    // Inside the cooldown the resend is refused and the code unchanged.
    let throttled = h.lifecycle.resend_verification_code("bob@x.com").await;
    assert!(matches!(
        throttled,
        Err(AuthError::ResendThrottled { .. })
    ));

    h.clock.advance(Duration::seconds(60));
    h.lifecycle
        .resend_verification_code("bob@x.com")
        .await
        .unwrap();
    let second_code = h.mailer.last_code_for("bob@x.com").unwrap();
    assert_ne!(first_code, second_code);

    // The superseded code no longer resolves for the link flow.
    let stale = h.lifecycle.verify_by_code(&first_code).await;
    assert!(matches!(stale, Err(AuthError::AccountNotFound)));

    let verified = h.lifecycle.verify_by_code(&second_code).await.unwrap();
    assert_eq!(verified.status(), AccountStatus::Verified);

    let account = h
        .lifecycle
        .authenticate("bob@x.com", "a decent password")
        .await
        .unwrap();
    assert_eq!(account.username, "bob");
}

#[tokio::test]
async fn duplicate_registration_is_rejected_across_both_keys() {
    let h = harness();

    h.lifecycle
        .register("carol", "carol@x.com", "pw-carol")
        .await
        .unwrap();

    let email_clash = h
        .lifecycle
        .register("carola", "carol@x.com", "pw-other")
        .await;
    assert!(matches!(email_clash, Err(AuthError::DuplicateAccount)));

    let username_clash = h
        .lifecycle
        .register("carol", "other@x.com", "pw-other")
        .await;
    assert!(matches!(username_clash, Err(AuthError::DuplicateAccount)));
}
