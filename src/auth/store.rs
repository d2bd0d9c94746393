//! Durable account storage seam.
//!
//! The lifecycle only talks to this trait; the Postgres implementation
//! lives with the server wiring. Uniqueness of email and username is the
//! store's job, so concurrent duplicate registrations resolve to
//! [`StoreError::Duplicate`] instead of corrupting state.

use crate::auth::account::Account;
use crate::auth::error::StoreError;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

/// Account records keyed by identity fields. Abstracts SQL from the
/// lifecycle.
#[allow(async_fn_in_trait)]
pub trait AccountStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, StoreError>;
    async fn find_by_verification_code(&self, code: &str) -> Result<Option<Account>, StoreError>;
    /// Upsert by id. Fails with [`StoreError::Duplicate`] when another
    /// account already holds the email or username.
    async fn save(&self, account: &Account) -> Result<(), StoreError>;
}

/// Process-local store backed by a mutex-guarded map.
///
/// Used by the test suite; also handy for callers embedding the
/// lifecycle without a database.
#[derive(Debug, Default)]
pub struct MemoryAccountStore {
    accounts: Mutex<HashMap<Uuid, Account>>,
}

impl MemoryAccountStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn find_by<F>(&self, predicate: F) -> Result<Option<Account>, StoreError>
    where
        F: Fn(&Account) -> bool,
    {
        let accounts = self.accounts.lock().expect("store poisoned");
        Ok(accounts.values().find(|account| predicate(account)).cloned())
    }
}

impl AccountStore for MemoryAccountStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        self.find_by(|account| account.email == email)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, StoreError> {
        self.find_by(|account| account.username == username)
    }

    async fn find_by_verification_code(&self, code: &str) -> Result<Option<Account>, StoreError> {
        self.find_by(|account| account.verification_code.as_deref() == Some(code))
    }

    async fn save(&self, account: &Account) -> Result<(), StoreError> {
        let mut accounts = self.accounts.lock().expect("store poisoned");
        let conflict = accounts.values().any(|existing| {
            existing.id != account.id
                && (existing.email == account.email || existing.username == account.username)
        });
        if conflict {
            return Err(StoreError::Duplicate);
        }
        accounts.insert(account.id, account.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn account(username: &str, email: &str) -> Account {
        Account {
            id: Uuid::new_v4(),
            username: username.to_string(),
            email: email.to_string(),
            password_hash: "$argon2id$stub".to_string(),
            enabled: false,
            verification_code: Some(format!("code-{username}")),
            code_expires_at: Some(Utc::now()),
            code_issued_at: Some(Utc::now()),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn save_and_find_by_each_key() {
        let store = MemoryAccountStore::new();
        let alice = account("alice", "alice@example.com");
        store.save(&alice).await.unwrap();

        let by_email = store.find_by_email("alice@example.com").await.unwrap();
        assert_eq!(by_email.map(|a| a.id), Some(alice.id));

        let by_username = store.find_by_username("alice").await.unwrap();
        assert_eq!(by_username.map(|a| a.id), Some(alice.id));

        let by_code = store.find_by_verification_code("code-alice").await.unwrap();
        assert_eq!(by_code.map(|a| a.id), Some(alice.id));

        assert!(store.find_by_email("bob@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn save_rejects_duplicate_identity_fields() {
        let store = MemoryAccountStore::new();
        store.save(&account("alice", "alice@example.com")).await.unwrap();

        let same_email = account("alicia", "alice@example.com");
        assert!(matches!(
            store.save(&same_email).await,
            Err(StoreError::Duplicate)
        ));

        let same_username = account("alice", "other@example.com");
        assert!(matches!(
            store.save(&same_username).await,
            Err(StoreError::Duplicate)
        ));
    }

    #[tokio::test]
    async fn save_updates_existing_row_in_place() {
        let store = MemoryAccountStore::new();
        let mut alice = account("alice", "alice@example.com");
        store.save(&alice).await.unwrap();

        alice.mark_verified();
        store.save(&alice).await.unwrap();

        let stored = store.find_by_email("alice@example.com").await.unwrap().unwrap();
        assert!(stored.enabled);
        assert!(stored.verification_code.is_none());
    }
}
