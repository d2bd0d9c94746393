use thiserror::Error;

/// Failure from an [`super::AccountStore`] implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("account with that email or username already exists")]
    Duplicate,
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

/// Typed outcomes of credential lifecycle operations.
///
/// Callers match on the kind; transports map each kind to a status code.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("account with that email or username already exists")]
    DuplicateAccount,
    #[error("account not found")]
    AccountNotFound,
    #[error("account is not verified")]
    AccountNotVerified,
    #[error("account is already verified")]
    AccountAlreadyVerified,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("verification code expired")]
    CodeExpired,
    #[error("verification code mismatch")]
    CodeMismatch,
    #[error("verification code was resent recently, retry in {retry_after_seconds}s")]
    ResendThrottled { retry_after_seconds: i64 },
    #[error("invalid token")]
    InvalidToken,
    #[error("internal credential failure")]
    Internal(#[source] anyhow::Error),
    #[error("account store failure")]
    Store(#[source] StoreError),
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate => Self::DuplicateAccount,
            backend => Self::Store(backend),
        }
    }
}
