use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use uuid::Uuid;

/// Where an account sits in the verification state machine.
///
/// There are no backward transitions: once verified, an account never
/// returns to `PendingVerification`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    PendingVerification,
    Verified,
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PendingVerification => write!(f, "pending_verification"),
            Self::Verified => write!(f, "verified"),
        }
    }
}

/// A registered identity with credentials and verification state.
///
/// The password hash and verification code are redacted from `Debug`
/// output so they never land in spans or logs.
#[derive(Clone)]
pub struct Account {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub enabled: bool,
    pub verification_code: Option<String>,
    pub code_expires_at: Option<DateTime<Utc>>,
    pub code_issued_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Account {
    #[must_use]
    pub fn status(&self) -> AccountStatus {
        if self.enabled {
            AccountStatus::Verified
        } else {
            AccountStatus::PendingVerification
        }
    }

    /// Flip the account to verified, dropping the single-use code.
    pub fn mark_verified(&mut self) {
        self.enabled = true;
        self.verification_code = None;
        self.code_expires_at = None;
        self.code_issued_at = None;
    }

    /// Replace the live verification code; the previous one stops being valid.
    pub fn replace_code(
        &mut self,
        code: String,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) {
        self.verification_code = Some(code);
        self.code_issued_at = Some(issued_at);
        self.code_expires_at = Some(expires_at);
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password_hash", &"[REDACTED]")
            .field("enabled", &self.enabled)
            .field("verification_code", &self.verification_code.as_ref().map(|_| "[REDACTED]"))
            .field("code_expires_at", &self.code_expires_at)
            .field("code_issued_at", &self.code_issued_at)
            .field("created_at", &self.created_at)
            .finish()
    }
}
