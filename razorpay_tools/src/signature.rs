//! Webhook body signatures.
//!
//! Razorpay signs the raw request body with HMAC-SHA256, keyed with the webhook secret, and sends the lowercase hex
//! digest in the `X-Razorpay-Signature` header. Verification must happen on the exact bytes received, before any JSON
//! parsing.
use hmac::{Hmac, Mac};
use log::trace;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Calculates the hex-encoded HMAC-SHA256 signature of `data`.
pub fn calculate_signature(secret: &str, data: &[u8]) -> String {
    // HMAC accepts keys of any length
    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(m) => m,
        Err(_) => return String::default(),
    };
    mac.update(data);
    hex::encode(mac.finalize().into_bytes())
}

/// Verifies a hex-encoded signature over `data` in constant time. An empty secret never verifies.
pub fn verify_signature(secret: &str, data: &[u8], signature: &str) -> bool {
    if secret.is_empty() {
        trace!("🔐️ No webhook secret is configured. Signature cannot be verified.");
        return false;
    }
    let Ok(expected) = hex::decode(signature.trim()) else {
        trace!("🔐️ Signature is not valid hex");
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(data);
    mac.verify_slice(&expected).is_ok()
}
