//! Random secret generation for server configuration (JWT signing keys,
//! session secrets).

use anyhow::{bail, Result};
use rand::RngCore;

/// Default secret length in bytes
pub const DEFAULT_SECRET_BYTES: usize = 64;

/// Shortest secret worth generating
const MIN_SECRET_BYTES: usize = 16;

/// Longest secret we will generate
const MAX_SECRET_BYTES: usize = 1024;

/// Hex-encoded random secret of `bytes` bytes from the OS-seeded thread RNG
pub fn generate_secret(bytes: usize) -> Result<String> {
    if !(MIN_SECRET_BYTES..=MAX_SECRET_BYTES).contains(&bytes) {
        bail!(
            "Secret length must be between {} and {} bytes, got {}",
            MIN_SECRET_BYTES,
            MAX_SECRET_BYTES,
            bytes
        );
    }

    let mut buf = vec![0u8; bytes];
    rand::thread_rng().fill_bytes(&mut buf);
    Ok(buf.iter().map(|b| format!("{:02x}", b)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_secret_length_and_charset() {
        let secret = generate_secret(DEFAULT_SECRET_BYTES).unwrap();
        assert_eq!(secret.len(), DEFAULT_SECRET_BYTES * 2);
        assert!(secret.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_generate_secret_is_random() {
        assert_ne!(generate_secret(32).unwrap(), generate_secret(32).unwrap());
    }

    #[test]
    fn test_generate_secret_bounds() {
        assert!(generate_secret(MIN_SECRET_BYTES - 1).is_err());
        assert!(generate_secret(MAX_SECRET_BYTES + 1).is_err());
        assert!(generate_secret(MIN_SECRET_BYTES).is_ok());
    }
}
