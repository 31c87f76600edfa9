// totp.rs
// TOTP utilities for login codes and enrollment of workers' authenticator apps.

use anyhow::Result;
use data_encoding::BASE32_NOPAD;
use rand::RngCore;
use totp_rs::{Algorithm, Secret, TOTP};

pub const MIN_SECRET_BYTES: usize = 16; // 128 bits
pub const DEFAULT_SECRET_BYTES: usize = 20; // 160 bits
pub const DEFAULT_ISSUER: &str = "Coconut Farm";

/// Build a TOTP for `account` (email, or name when the user has no email),
/// issued by the business name.
pub fn build_totp(issuer: &str, account: &str, base32_secret: &str) -> Result<TOTP> {
    let secret = Secret::Encoded(base32_secret.to_string()).to_bytes()?;
    if secret.len() < MIN_SECRET_BYTES {
        anyhow::bail!(
            "Shared secret too short: {} bytes, need >= {}",
            secret.len(),
            MIN_SECRET_BYTES
        );
    }
    let totp = TOTP::new(
        Algorithm::SHA1, // Google Authenticator compatible
        6,
        1, // ±1 step of clock drift
        30,
        secret,
        Some(issuer.to_string()),
        account.to_string(),
    )?;
    Ok(totp)
}

/// Random Base32 (NOPAD) secret of at least `MIN_SECRET_BYTES`.
pub fn generate_secret(bytes: usize) -> String {
    let n = bytes.max(MIN_SECRET_BYTES);
    let mut buf = vec![0u8; n];
    rand::rng().fill_bytes(&mut buf);
    BASE32_NOPAD.encode(&buf)
}
