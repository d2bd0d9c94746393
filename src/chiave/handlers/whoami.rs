use crate::auth::TokenIssuer;
use crate::chiave::handlers::error_response;
use axum::{
    extract::Extension,
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::instrument;
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct WhoamiResponse {
    pub subject: String,
}

#[utoipa::path(
    get,
    path = "/auth/whoami",
    params(
        ("Authorization" = String, Header, description = "Bearer identity token")
    ),
    responses(
        (status = 200, description = "Token subject", body = WhoamiResponse, content_type = "application/json"),
        (status = 401, description = "Missing, malformed or expired token"),
    ),
    tag = "auth"
)]
// axum handler proving a token still holds
#[instrument(skip_all)]
pub async fn whoami(
    issuer: Extension<Arc<TokenIssuer>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|value| !value.is_empty());

    let Some(token) = token else {
        return (StatusCode::UNAUTHORIZED, "Missing bearer token".to_string()).into_response();
    };

    match issuer.validate(token) {
        Ok(subject) => Json(WhoamiResponse { subject }).into_response(),
        Err(err) => error_response(err),
    }
}
