use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, Secret};
use sha2::Sha256;

/// Signer trait for request authentication
///
/// Implementations produce the `signature` value appended to a signed query.
/// Signing is pure: the same key and payload always yield the same output.
pub trait Signer: Send + Sync {
    /// Sign the exact bytes that will be sent and return the encoded signature
    fn sign(&self, payload: &[u8]) -> String;
}

/// HMAC-SHA256 signer producing lowercase hex digests
pub struct HmacSigner {
    secret_key: Secret<String>,
}

impl HmacSigner {
    /// Create a new HMAC signer
    ///
    /// An empty key is accepted and produces a valid, trivially-keyed
    /// signature which the exchange will reject.
    pub fn new(secret_key: String) -> Self {
        Self {
            secret_key: Secret::new(secret_key),
        }
    }
}

impl Signer for HmacSigner {
    fn sign(&self, payload: &[u8]) -> String {
        let mut mac = Hmac::<Sha256>::new_from_slice(self.secret_key.expose_secret().as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(payload);
        hex::encode(mac.finalize().into_bytes())
    }
}

impl std::fmt::Debug for HmacSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HmacSigner")
            .field("secret_key", &"[REDACTED]")
            .finish()
    }
}
