pub mod health;
pub use self::health::health;

pub mod user_register;
pub use self::user_register::register;

pub mod user_login;
pub use self::user_login::login;

pub mod user_verify;
pub use self::user_verify::{verify, verify_link};

pub mod user_resend;
pub use self::user_resend::resend;

pub mod whoami;
pub use self::whoami::whoami;

// common functions for the handlers
use crate::auth::{Account, AuthError};
use axum::http::{header::RETRY_AFTER, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::ToSchema;

/// Normalize an email for lookup/uniqueness checks.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").map_or(false, |re| re.is_match(email))
}

pub fn valid_username(username: &str) -> bool {
    Regex::new(r"^[a-zA-Z0-9_-]{3,32}$").map_or(false, |re| re.is_match(username))
}

pub fn valid_password(password: &str) -> bool {
    let length = password.chars().count();
    (8..=128).contains(&length)
}

/// Account view returned to API consumers; never carries the hash or
/// the verification code.
#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct AccountResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub status: String,
}

impl From<&Account> for AccountResponse {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id.to_string(),
            username: account.username.clone(),
            email: account.email.clone(),
            status: account.status().to_string(),
        }
    }
}

/// Map a lifecycle failure onto a response the transport can return.
pub fn error_response(err: AuthError) -> Response {
    if let AuthError::ResendThrottled {
        retry_after_seconds,
    } = &err
    {
        return (
            StatusCode::TOO_MANY_REQUESTS,
            [(RETRY_AFTER, retry_after_seconds.to_string())],
            err.to_string(),
        )
            .into_response();
    }

    let status = match err {
        AuthError::DuplicateAccount | AuthError::AccountAlreadyVerified => StatusCode::CONFLICT,
        AuthError::AccountNotFound => StatusCode::NOT_FOUND,
        AuthError::AccountNotVerified => StatusCode::FORBIDDEN,
        AuthError::InvalidCredentials | AuthError::InvalidToken => StatusCode::UNAUTHORIZED,
        AuthError::CodeExpired | AuthError::CodeMismatch => StatusCode::BAD_REQUEST,
        AuthError::ResendThrottled { .. } => StatusCode::TOO_MANY_REQUESTS,
        AuthError::Internal(_) | AuthError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status.is_server_error() {
        // Details stay in the logs; callers get a generic message.
        error!("credential operation failed: {err:?}");
        return (status, "Internal error".to_string()).into_response();
    }

    (status, err.to_string()).into_response()
}

pub(crate) fn json_created<T: Serialize>(body: T) -> Response {
    (StatusCode::CREATED, Json(body)).into_response()
}
