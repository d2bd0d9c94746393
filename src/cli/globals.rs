use secrecy::SecretString;

/// Process-wide configuration shared with the server wiring.
///
/// The token secret is the only secret material; it is read-only after
/// startup.
#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub token_secret: SecretString,
    pub token_ttl_seconds: u64,
    pub code_ttl_seconds: i64,
    pub resend_cooldown_seconds: i64,
    pub base_url: String,
    pub mail_url: Option<String>,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(token_secret: SecretString, base_url: String) -> Self {
        Self {
            token_secret,
            token_ttl_seconds: 3600,
            code_ttl_seconds: 900,
            resend_cooldown_seconds: 60,
            base_url,
            mail_url: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_global_args() {
        let args = GlobalArgs::new(
            SecretString::from("hush".to_string()),
            "http://localhost:8080".to_string(),
        );
        assert_eq!(args.token_secret.expose_secret(), "hush");
        assert_eq!(args.base_url, "http://localhost:8080");
        assert_eq!(args.token_ttl_seconds, 3600);
        assert_eq!(args.code_ttl_seconds, 900);
        assert_eq!(args.resend_cooldown_seconds, 60);
        assert!(args.mail_url.is_none());
    }
}
