use crate::chiave::handlers::{error_response, normalize_email, valid_email};
use crate::chiave::AppLifecycle;
use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::instrument;
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct ResendRequest {
    email: String,
}

#[utoipa::path(
    post,
    path = "/auth/resend",
    request_body = ResendRequest,
    responses(
        (status = 202, description = "Verification code sent"),
        (status = 404, description = "Account not found"),
        (status = 409, description = "Account already verified"),
        (status = 429, description = "Resent too recently; Retry-After carries the remaining wait"),
    ),
    tag = "auth"
)]
// axum handler for resending the verification code
#[instrument(skip_all)]
pub async fn resend(
    lifecycle: Extension<Arc<AppLifecycle>>,
    payload: Option<Json<ResendRequest>>,
) -> impl IntoResponse {
    let request: ResendRequest = match payload {
        Some(Json(payload)) => payload,
        None => {
            return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response()
        }
    };

    let email = normalize_email(&request.email);
    if !valid_email(&email) {
        return (StatusCode::BAD_REQUEST, "Invalid email".to_string()).into_response();
    }

    match lifecycle.resend_verification_code(&email).await {
        Ok(()) => (StatusCode::ACCEPTED, "Verification code sent".to_string()).into_response(),
        Err(err) => error_response(err),
    }
}
