use anyhow::Result;

/// Outbound delivery of verification codes.
///
/// Delivery is fire-and-forget from the lifecycle's perspective: a
/// failed send is logged and surfaced as a warning, never rolled back
/// into store state. Implementations decide the transport (SMTP relay,
/// HTTP API, or plain logs for local development).
#[allow(async_fn_in_trait)]
pub trait MessageSender: Send + Sync {
    async fn send_verification_code(&self, email: &str, code: &str) -> Result<()>;
}
