use crate::chiave::handlers::{
    error_response, json_created, normalize_email, valid_email, valid_password, valid_username,
    AccountResponse,
};
use crate::chiave::AppLifecycle;
use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::instrument;
use utoipa::ToSchema;

// No Debug on purpose: the payload carries a raw password.
#[derive(ToSchema, Serialize, Deserialize)]
pub struct UserRegister {
    username: String,
    email: String,
    password: String,
}

#[utoipa::path(
    post,
    path = "/auth/signup",
    request_body = UserRegister,
    responses(
        (status = 201, description = "Registration successful", body = AccountResponse, content_type = "application/json"),
        (status = 400, description = "Invalid username, email or password"),
        (status = 409, description = "User with the specified username or email already exists"),
    ),
    tag = "auth"
)]
// axum handler for registration
#[instrument(skip_all)]
pub async fn register(
    lifecycle: Extension<Arc<AppLifecycle>>,
    payload: Option<Json<UserRegister>>,
) -> impl IntoResponse {
    let user: UserRegister = match payload {
        Some(Json(payload)) => payload,
        None => {
            return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response()
        }
    };

    let email = normalize_email(&user.email);
    if !valid_email(&email) {
        return (StatusCode::BAD_REQUEST, "Invalid email".to_string()).into_response();
    }

    if !valid_username(&user.username) {
        return (StatusCode::BAD_REQUEST, "Invalid username".to_string()).into_response();
    }

    if !valid_password(&user.password) {
        return (StatusCode::BAD_REQUEST, "Invalid password".to_string()).into_response();
    }

    match lifecycle.register(&user.username, &email, &user.password).await {
        Ok(account) => json_created(AccountResponse::from(&account)),
        Err(err) => error_response(err),
    }
}
