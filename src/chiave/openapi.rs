use utoipa::OpenApi;

use crate::chiave::handlers;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health::health,
        handlers::user_register::register,
        handlers::user_login::login,
        handlers::user_verify::verify,
        handlers::user_verify::verify_link,
        handlers::user_resend::resend,
        handlers::whoami::whoami,
    ),
    tags(
        (name = "auth", description = "Credential lifecycle operations"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_all_routes() {
        let doc = ApiDoc::openapi();
        let paths = doc.paths.paths;

        for path in [
            "/health",
            "/auth/signup",
            "/auth/login",
            "/auth/verify",
            "/auth/verify-link",
            "/auth/resend",
            "/auth/whoami",
        ] {
            assert!(paths.contains_key(path), "missing path: {path}");
        }
    }
}
