use anyhow::{Context, Result};
use base64ct::{Base64UrlUnpadded, Encoding};
use rand::{rngs::OsRng, RngCore};

/// Create a new single-use verification code.
///
/// 32 bytes from the OS CSPRNG, base64url without padding; the raw value
/// goes to the user's mailbox and is matched exactly on verification.
///
/// # Errors
///
/// Returns an error if the OS random source fails.
pub fn generate() -> Result<String> {
    let mut bytes = [0u8; 32];
    OsRng
        .try_fill_bytes(&mut bytes)
        .context("failed to generate verification code")?;
    Ok(Base64UrlUnpadded::encode_string(&bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_code_decodes_to_32_bytes() {
        let decoded_len = generate()
            .ok()
            .and_then(|code| Base64UrlUnpadded::decode_vec(&code).ok())
            .map(|bytes| bytes.len());
        assert_eq!(decoded_len, Some(32));
    }

    #[test]
    fn codes_do_not_repeat() {
        let first = generate().unwrap();
        let second = generate().unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn code_is_url_safe() {
        let code = generate().unwrap();
        assert!(!code.contains('+'));
        assert!(!code.contains('/'));
        assert!(!code.contains('='));
    }
}
