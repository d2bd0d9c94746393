use crate::auth::TokenIssuer;
use crate::chiave::handlers::{error_response, normalize_email, valid_password};
use crate::chiave::AppLifecycle;
use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, instrument};
use utoipa::ToSchema;

// No Debug on purpose: the payload carries a raw password.
#[derive(ToSchema, Serialize, Deserialize)]
pub struct UserLogin {
    identifier: String,
    password: String,
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct LoginResponse {
    pub token: String,
    pub expires_in: u64,
}

#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = UserLogin,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse, content_type = "application/json"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Account not verified"),
        (status = 404, description = "Account not found"),
    ),
    tag = "auth"
)]
// axum handler for login
#[instrument(skip_all)]
pub async fn login(
    lifecycle: Extension<Arc<AppLifecycle>>,
    issuer: Extension<Arc<TokenIssuer>>,
    payload: Option<Json<UserLogin>>,
) -> impl IntoResponse {
    let user: UserLogin = match payload {
        Some(Json(payload)) => payload,
        None => {
            return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response()
        }
    };

    if !valid_password(&user.password) {
        return (StatusCode::BAD_REQUEST, "Invalid password".to_string()).into_response();
    }

    // Email identifiers get the same normalization as registration.
    let identifier = if user.identifier.contains('@') {
        normalize_email(&user.identifier)
    } else {
        user.identifier.trim().to_string()
    };

    match lifecycle.authenticate(&identifier, &user.password).await {
        Ok(account) => match issuer.issue(&account.username) {
            Ok(token) => Json(LoginResponse {
                token,
                expires_in: issuer.expiration_seconds(),
            })
            .into_response(),
            Err(err) => {
                error!("failed to issue token: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to issue token".to_string(),
                )
                    .into_response()
            }
        },
        Err(err) => error_response(err),
    }
}
