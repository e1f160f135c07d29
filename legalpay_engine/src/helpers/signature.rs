//! # Gateway callback signatures
//!
//! The payment gateway authenticates two kinds of callbacks with an HMAC-SHA256 signature,
//! hex-encoded in a header or form field:
//!
//! * capture callbacks sign the string `{order_id}|{payment_id}` with the API key secret, and
//! * webhook deliveries sign the raw request body with the webhook secret.
//!
//! Verification must not leak timing information: a forger who can measure how far a comparison
//! got can recover a valid signature byte by byte. Comparison therefore goes through
//! [`Mac::verify_slice`], which is constant time. Any malformed input (odd-length hex, stray
//! characters, wrong digest length) verifies as `false` rather than erroring; the HMAC
//! construction itself cannot fail with a non-empty key.

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Hex-encoded HMAC-SHA256 of `payload` under `secret`. This is the signature the gateway is
/// expected to have produced.
pub fn calculate_hmac(secret: &[u8], payload: &[u8]) -> String {
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC accepts keys of any length");
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}

/// Verifies a hex-encoded HMAC-SHA256 signature over `payload` in constant time.
/// Returns `false` for malformed signatures; never errors.
pub fn verify_signature(payload: &[u8], provided_hex: &str, secret: &[u8]) -> bool {
    let provided = match hex::decode(provided_hex) {
        Ok(bytes) => bytes,
        Err(_) => return false,
    };
    let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC accepts keys of any length");
    mac.update(payload);
    mac.verify_slice(&provided).is_ok()
}

/// Verifies a payment-capture signature. The signed payload is `{order_id}|{payment_id}`.
pub fn verify_payment_signature(order_id: &str, payment_id: &str, provided_hex: &str, secret: &[u8]) -> bool {
    let payload = format!("{order_id}|{payment_id}");
    verify_signature(payload.as_bytes(), provided_hex, secret)
}

/// Verifies a webhook delivery signature. The signed payload is the raw request body.
pub fn verify_webhook_signature(body: &[u8], provided_hex: &str, secret: &[u8]) -> bool {
    verify_signature(body, provided_hex, secret)
}
