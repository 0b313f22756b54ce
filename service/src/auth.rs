//! Session tokens and password hashing.

use anyhow::Context;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use cw_token::{decode_key_file, Claims, TokenError, TokenSigner, TokenVerifier};

use crate::config::AuthConfig;

/// Signing and verification keys plus the token lifetime, loaded once at
/// startup so request handling never touches the filesystem.
pub struct AuthTokens {
    signer: TokenSigner,
    verifier: TokenVerifier,
    ttl_secs: i64,
}

impl AuthTokens {
    /// Load key material from the configured key files.
    ///
    /// # Errors
    ///
    /// Fails when either file is unreadable or does not hold a valid
    /// base64url-encoded 32-byte key.
    pub fn load(config: &AuthConfig) -> anyhow::Result<Self> {
        let private = std::fs::read_to_string(&config.private_key_path)
            .with_context(|| format!("reading signing key {}", config.private_key_path))?;
        let public = std::fs::read_to_string(&config.public_key_path)
            .with_context(|| format!("reading verification key {}", config.public_key_path))?;

        let seed = decode_key_file(&private).context("decoding signing key")?;
        let key = decode_key_file(&public).context("decoding verification key")?;

        Ok(Self {
            signer: TokenSigner::from_seed(&seed),
            verifier: TokenVerifier::from_bytes(&key).context("building verifier")?,
            ttl_secs: config.token_ttl_secs,
        })
    }

    /// Build from a raw seed, for tests.
    #[cfg(any(test, feature = "test-utils"))]
    #[must_use]
    pub fn from_seed(seed: &[u8; 32], ttl_secs: i64) -> Self {
        let signer = TokenSigner::from_seed(seed);
        let verifier = signer.verifier();
        Self {
            signer,
            verifier,
            ttl_secs,
        }
    }

    /// Issue a token for an account, valid from now.
    #[must_use]
    pub fn issue(&self, sub: &str, name: &str) -> String {
        self.signer
            .issue(sub, name, chrono::Utc::now().timestamp(), self.ttl_secs)
    }

    /// Configured token lifetime in seconds.
    #[must_use]
    pub fn ttl_secs(&self) -> i64 {
        self.ttl_secs
    }

    /// Verify a token against the current time.
    ///
    /// # Errors
    ///
    /// Propagates the token error (malformed, bad signature, expired).
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        self.verifier.verify(token, chrono::Utc::now().timestamp())
    }
}

/// Hash a password with Argon2id and a fresh random salt.
///
/// # Errors
///
/// Returns the hasher error string; hashing only fails on degenerate
/// parameters, never on input content.
pub fn hash_password(password: &str) -> Result<String, String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| e.to_string())
}

/// Check a password against a stored hash. Any failure, including a
/// corrupt stored hash, reads as a mismatch.
#[must_use]
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}
