//! The credential state machine.
//!
//! Accounts move `Unregistered -> PendingVerification -> Verified` with
//! no backward transitions; resending a code is a self-loop that
//! replaces the live code. Each operation is a single read-modify-write
//! against the [`AccountStore`]; concurrent duplicate registrations are
//! resolved by the store's uniqueness constraint, not by locking here.

use crate::auth::account::Account;
use crate::auth::clock::Clock;
use crate::auth::code;
use crate::auth::error::AuthError;
use crate::auth::password;
use crate::auth::sender::MessageSender;
use crate::auth::store::AccountStore;
use anyhow::anyhow;
use chrono::Duration;
use std::sync::Arc;
use tracing::{error, warn};
use uuid::Uuid;

const DEFAULT_CODE_TTL_SECONDS: i64 = 15 * 60;
const DEFAULT_RESEND_COOLDOWN_SECONDS: i64 = 60;

/// Tunables for code expiry and resend throttling.
#[derive(Clone, Copy, Debug)]
pub struct LifecycleConfig {
    code_ttl_seconds: i64,
    resend_cooldown_seconds: i64,
}

impl LifecycleConfig {
    /// Defaults: codes live 15 minutes, resends are at least 60s apart.
    #[must_use]
    pub fn new() -> Self {
        Self {
            code_ttl_seconds: DEFAULT_CODE_TTL_SECONDS,
            resend_cooldown_seconds: DEFAULT_RESEND_COOLDOWN_SECONDS,
        }
    }

    #[must_use]
    pub fn with_code_ttl_seconds(mut self, seconds: i64) -> Self {
        self.code_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_resend_cooldown_seconds(mut self, seconds: i64) -> Self {
        self.resend_cooldown_seconds = seconds;
        self
    }

    #[must_use]
    pub fn code_ttl_seconds(&self) -> i64 {
        self.code_ttl_seconds
    }

    #[must_use]
    pub fn resend_cooldown_seconds(&self) -> i64 {
        self.resend_cooldown_seconds
    }
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Orchestrates registration, verification, resend, and authentication
/// over the injected store, mailer, and clock.
pub struct CredentialLifecycle<S, M> {
    store: S,
    mailer: M,
    clock: Arc<dyn Clock>,
    config: LifecycleConfig,
}

impl<S, M> CredentialLifecycle<S, M>
where
    S: AccountStore,
    M: MessageSender,
{
    pub fn new(store: S, mailer: M, clock: Arc<dyn Clock>, config: LifecycleConfig) -> Self {
        Self {
            store,
            mailer,
            clock,
            config,
        }
    }

    /// Create a pending account and send its verification code.
    ///
    /// # Errors
    ///
    /// [`AuthError::DuplicateAccount`] when the email or username is
    /// taken; store and hashing failures otherwise. A failed mail send
    /// does not fail the registration: the account is already durable
    /// and the code can be resent.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        raw_password: &str,
    ) -> Result<Account, AuthError> {
        // Friendly pre-check; the save below still catches the
        // concurrent race through the store's uniqueness constraint.
        if self.store.find_by_email(email).await?.is_some()
            || self.store.find_by_username(username).await?.is_some()
        {
            return Err(AuthError::DuplicateAccount);
        }

        let password_hash = password::hash(raw_password).map_err(|err| {
            error!("password hashing failed: {err}");
            AuthError::Internal(anyhow!("password hashing failed"))
        })?;

        let now = self.clock.now();
        let code_value = code::generate().map_err(AuthError::Internal)?;
        let account = Account {
            id: Uuid::new_v4(),
            username: username.to_string(),
            email: email.to_string(),
            password_hash,
            enabled: false,
            verification_code: Some(code_value.clone()),
            code_expires_at: Some(now + Duration::seconds(self.config.code_ttl_seconds)),
            code_issued_at: Some(now),
            created_at: now,
        };

        self.store.save(&account).await?;
        self.deliver_code(&account.email, &code_value).await;

        Ok(account)
    }

    /// Check credentials for an identifier: an `@` selects the email
    /// lookup, anything else the username lookup.
    ///
    /// Token minting stays with the caller so authentication can be
    /// reused without always producing a token.
    ///
    /// # Errors
    ///
    /// [`AuthError::AccountNotFound`], [`AuthError::AccountNotVerified`],
    /// or [`AuthError::InvalidCredentials`], in that precedence.
    pub async fn authenticate(
        &self,
        identifier: &str,
        raw_password: &str,
    ) -> Result<Account, AuthError> {
        let account = if identifier.contains('@') {
            self.store.find_by_email(identifier).await?
        } else {
            self.store.find_by_username(identifier).await?
        };
        let account = account.ok_or(AuthError::AccountNotFound)?;

        if !account.enabled {
            return Err(AuthError::AccountNotVerified);
        }
        if !password::verify(raw_password, &account.password_hash) {
            return Err(AuthError::InvalidCredentials);
        }

        Ok(account)
    }

    /// Consume a submitted code for the account behind `email`.
    ///
    /// # Errors
    ///
    /// [`AuthError::AccountNotFound`], [`AuthError::AccountAlreadyVerified`]
    /// on re-verification, [`AuthError::CodeExpired`] once `now` reaches
    /// the stored expiry (checked before the match), or
    /// [`AuthError::CodeMismatch`] on anything but an exact match.
    pub async fn verify_account(&self, email: &str, submitted: &str) -> Result<Account, AuthError> {
        let mut account = self
            .store
            .find_by_email(email)
            .await?
            .ok_or(AuthError::AccountNotFound)?;
        self.consume_code(&mut account, Some(submitted)).await
    }

    /// Link-click variant: resolve the account by its live code.
    ///
    /// A verified account no longer holds a code, so an unknown or
    /// already-consumed code reports [`AuthError::AccountNotFound`]
    /// without revealing whether it was ever valid.
    ///
    /// # Errors
    ///
    /// [`AuthError::AccountNotFound`] or [`AuthError::CodeExpired`].
    pub async fn verify_by_code(&self, submitted: &str) -> Result<Account, AuthError> {
        let mut account = self
            .store
            .find_by_verification_code(submitted)
            .await?
            .ok_or(AuthError::AccountNotFound)?;
        self.consume_code(&mut account, None).await
    }

    /// Replace the live code and send it again.
    ///
    /// # Errors
    ///
    /// [`AuthError::AccountNotFound`], [`AuthError::AccountAlreadyVerified`],
    /// or [`AuthError::ResendThrottled`] while the cooldown since the
    /// live code was issued has not elapsed.
    pub async fn resend_verification_code(&self, email: &str) -> Result<(), AuthError> {
        let mut account = self
            .store
            .find_by_email(email)
            .await?
            .ok_or(AuthError::AccountNotFound)?;

        if account.enabled {
            return Err(AuthError::AccountAlreadyVerified);
        }

        let now = self.clock.now();
        if let Some(issued_at) = account.code_issued_at {
            let elapsed = now.signed_duration_since(issued_at).num_seconds();
            if elapsed < self.config.resend_cooldown_seconds {
                return Err(AuthError::ResendThrottled {
                    retry_after_seconds: self.config.resend_cooldown_seconds - elapsed,
                });
            }
        }

        let code_value = code::generate().map_err(AuthError::Internal)?;
        account.replace_code(
            code_value.clone(),
            now,
            now + Duration::seconds(self.config.code_ttl_seconds),
        );
        self.store.save(&account).await?;
        self.deliver_code(&account.email, &code_value).await;

        Ok(())
    }

    async fn consume_code(
        &self,
        account: &mut Account,
        submitted: Option<&str>,
    ) -> Result<Account, AuthError> {
        if account.enabled {
            return Err(AuthError::AccountAlreadyVerified);
        }

        let expires_at = account.code_expires_at.ok_or_else(|| {
            // Invariant: an unverified account always carries an expiry.
            AuthError::Internal(anyhow!("pending account has no code expiry"))
        })?;
        if self.clock.now() >= expires_at {
            return Err(AuthError::CodeExpired);
        }

        if let Some(submitted) = submitted {
            if account.verification_code.as_deref() != Some(submitted) {
                return Err(AuthError::CodeMismatch);
            }
        }

        account.mark_verified();
        self.store.save(account).await?;
        Ok(account.clone())
    }

    async fn deliver_code(&self, email: &str, code_value: &str) {
        if let Err(err) = self.mailer.send_verification_code(email, code_value).await {
            warn!("failed to deliver verification code to {email}: {err:#}");
        }
    }
}
