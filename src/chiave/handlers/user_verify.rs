use crate::chiave::handlers::{
    error_response, normalize_email, valid_email, AccountResponse,
};
use crate::chiave::AppLifecycle;
use axum::{
    extract::{Extension, Query},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::instrument;
use utoipa::{IntoParams, ToSchema};

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct VerifyRequest {
    email: String,
    code: String,
}

#[derive(IntoParams, Deserialize, Debug)]
pub struct VerifyLinkParams {
    code: String,
}

#[utoipa::path(
    post,
    path = "/auth/verify",
    request_body = VerifyRequest,
    responses(
        (status = 200, description = "Account verified", body = AccountResponse, content_type = "application/json"),
        (status = 400, description = "Code mismatch or expired"),
        (status = 404, description = "Account not found"),
        (status = 409, description = "Account already verified"),
    ),
    tag = "auth"
)]
// axum handler for code submission
#[instrument(skip_all)]
pub async fn verify(
    lifecycle: Extension<Arc<AppLifecycle>>,
    payload: Option<Json<VerifyRequest>>,
) -> impl IntoResponse {
    let request: VerifyRequest = match payload {
        Some(Json(payload)) => payload,
        None => {
            return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response()
        }
    };

    let email = normalize_email(&request.email);
    if !valid_email(&email) {
        return (StatusCode::BAD_REQUEST, "Invalid email".to_string()).into_response();
    }

    let code = request.code.trim();
    if code.is_empty() {
        return (StatusCode::BAD_REQUEST, "Missing code".to_string()).into_response();
    }

    match lifecycle.verify_account(&email, code).await {
        Ok(account) => Json(AccountResponse::from(&account)).into_response(),
        Err(err) => error_response(err),
    }
}

#[utoipa::path(
    get,
    path = "/auth/verify-link",
    params(VerifyLinkParams),
    responses(
        (status = 200, description = "Account verified", body = AccountResponse, content_type = "application/json"),
        (status = 400, description = "Code expired"),
        (status = 404, description = "Unknown or consumed code"),
    ),
    tag = "auth"
)]
// axum handler for the emailed verification link
#[instrument(skip_all)]
pub async fn verify_link(
    lifecycle: Extension<Arc<AppLifecycle>>,
    Query(params): Query<VerifyLinkParams>,
) -> impl IntoResponse {
    let code = params.code.trim();
    if code.is_empty() {
        return (StatusCode::BAD_REQUEST, "Missing code".to_string()).into_response();
    }

    match lifecycle.verify_by_code(code).await {
        Ok(account) => Json(AccountResponse::from(&account)).into_response(),
        Err(err) => error_response(err),
    }
}
