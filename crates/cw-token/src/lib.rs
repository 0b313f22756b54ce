//! Signed session tokens for `CapitolWatch`
//!
//! Tokens are compact two-part strings:
//!
//! ```text
//! base64url(claims JSON) "." base64url(Ed25519 signature over the claims bytes)
//! ```
//!
//! The claims carry the account id (`sub`), display name, issue time and
//! expiry. Verification checks the signature first, then the expiry, so a
//! caller never learns anything about an expired token it could not have
//! minted itself.
//!
//! Key material is raw 32-byte Ed25519 seeds / public keys, stored on disk
//! base64url-encoded. The service loads both files once at startup.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};

/// Claims embedded in a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Account identifier (document-store id as a hex string).
    pub sub: String,
    /// Display name at issue time.
    pub name: String,
    /// Issue time, Unix seconds.
    pub iat: i64,
    /// Expiry, Unix seconds.
    pub exp: i64,
}

/// Errors from token creation or verification.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,
    #[error("invalid signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("invalid key material")]
    InvalidKey,
}

/// Decode a key file's contents (base64url, no padding) into 32 raw bytes.
///
/// Surrounding whitespace is tolerated so the files can end with a newline.
///
/// # Errors
///
/// Returns [`TokenError::InvalidKey`] if the contents are not base64url or
/// do not decode to exactly 32 bytes.
pub fn decode_key_file(contents: &str) -> Result<[u8; 32], TokenError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(contents.trim())
        .map_err(|_| TokenError::InvalidKey)?;
    bytes.as_slice().try_into().map_err(|_| TokenError::InvalidKey)
}

/// Token issuer holding the Ed25519 signing key.
pub struct TokenSigner {
    key: SigningKey,
}

impl TokenSigner {
    /// Build a signer from a 32-byte Ed25519 seed.
    #[must_use]
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            key: SigningKey::from_bytes(seed),
        }
    }

    /// The matching verifier, for processes that sign and verify locally.
    #[must_use]
    pub fn verifier(&self) -> TokenVerifier {
        TokenVerifier {
            key: self.key.verifying_key(),
        }
    }

    /// Issue a token for `sub` valid for `ttl_secs` from `now`.
    #[must_use]
    pub fn issue(&self, sub: &str, name: &str, now: i64, ttl_secs: i64) -> String {
        let claims = Claims {
            sub: sub.to_string(),
            name: name.to_string(),
            iat: now,
            exp: now + ttl_secs,
        };
        // Claims are plain strings and integers; serialization cannot fail.
        let payload = serde_json::to_vec(&claims).unwrap_or_default();
        let signature = self.key.sign(&payload);
        format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(&payload),
            URL_SAFE_NO_PAD.encode(signature.to_bytes())
        )
    }
}

/// Token verifier holding the Ed25519 public key.
#[derive(Clone)]
pub struct TokenVerifier {
    key: VerifyingKey,
}

impl TokenVerifier {
    /// Build a verifier from a 32-byte Ed25519 public key.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::InvalidKey`] if the bytes are not a valid
    /// curve point.
    pub fn from_bytes(bytes: &[u8; 32]) -> Result<Self, TokenError> {
        Ok(Self {
            key: VerifyingKey::from_bytes(bytes).map_err(|_| TokenError::InvalidKey)?,
        })
    }

    /// Verify a token and return its claims.
    ///
    /// # Errors
    ///
    /// - [`TokenError::Malformed`] if the token does not parse
    /// - [`TokenError::InvalidSignature`] if the signature check fails
    /// - [`TokenError::Expired`] if `now` is at or past the expiry
    pub fn verify(&self, token: &str, now: i64) -> Result<Claims, TokenError> {
        let (payload_b64, sig_b64) = token.split_once('.').ok_or(TokenError::Malformed)?;

        let payload = URL_SAFE_NO_PAD
            .decode(payload_b64)
            .map_err(|_| TokenError::Malformed)?;
        let sig_bytes = URL_SAFE_NO_PAD
            .decode(sig_b64)
            .map_err(|_| TokenError::Malformed)?;
        let sig_arr: [u8; 64] = sig_bytes
            .as_slice()
            .try_into()
            .map_err(|_| TokenError::Malformed)?;

        self.key
            .verify(&payload, &Signature::from_bytes(&sig_arr))
            .map_err(|_| TokenError::InvalidSignature)?;

        let claims: Claims =
            serde_json::from_slice(&payload).map_err(|_| TokenError::Malformed)?;

        if now >= claims.exp {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const NOW: i64 = 1_700_000_000;
    const TTL: i64 = 7200;

    fn signer() -> TokenSigner {
        TokenSigner::from_seed(&[7u8; 32])
    }

    #[test]
    fn round_trip() {
        let signer = signer();
        let token = signer.issue("abc123", "Ada", NOW, TTL);
        let claims = signer.verifier().verify(&token, NOW + 10).unwrap();
        assert_eq!(claims.sub, "abc123");
        assert_eq!(claims.name, "Ada");
        assert_eq!(claims.iat, NOW);
        assert_eq!(claims.exp, NOW + TTL);
    }

    #[test]
    fn rejects_expired_token() {
        let signer = signer();
        let token = signer.issue("abc123", "Ada", NOW, TTL);
        let result = signer.verifier().verify(&token, NOW + TTL);
        assert!(matches!(result, Err(TokenError::Expired)));
    }

    #[test]
    fn rejects_tampered_payload() {
        let signer = signer();
        let token = signer.issue("abc123", "Ada", NOW, TTL);
        let (_, sig) = token.split_once('.').unwrap();

        let forged_claims = Claims {
            sub: "someone-else".into(),
            name: "Mallory".into(),
            iat: NOW,
            exp: NOW + TTL,
        };
        let forged_payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&forged_claims).unwrap());
        let forged = format!("{forged_payload}.{sig}");

        let result = signer.verifier().verify(&forged, NOW);
        assert!(matches!(result, Err(TokenError::InvalidSignature)));
    }

    #[test]
    fn rejects_wrong_key() {
        let token = signer().issue("abc123", "Ada", NOW, TTL);
        let other = TokenSigner::from_seed(&[9u8; 32]);
        let result = other.verifier().verify(&token, NOW);
        assert!(matches!(result, Err(TokenError::InvalidSignature)));
    }

    #[test]
    fn rejects_malformed_tokens() {
        let verifier = signer().verifier();
        let cases = ["", "no-dot", "a.b.c", "!!!.###", "YWJj."];
        for token in cases {
            let result = verifier.verify(token, NOW);
            assert!(
                matches!(result, Err(TokenError::Malformed)),
                "case {token:?}: {result:?}"
            );
        }
    }

    #[test]
    fn key_file_round_trip() {
        let seed = [42u8; 32];
        let encoded = URL_SAFE_NO_PAD.encode(seed);
        let decoded = decode_key_file(&format!("{encoded}\n")).unwrap();
        assert_eq!(decoded, seed);
    }

    #[test]
    fn key_file_rejects_bad_input() {
        assert!(matches!(
            decode_key_file("not base64!"),
            Err(TokenError::InvalidKey)
        ));
        assert!(matches!(
            decode_key_file("YWJj"),
            Err(TokenError::InvalidKey)
        ));
    }
}
