mod signature;

pub use signature::{calculate_hmac, verify_payment_signature, verify_signature, verify_webhook_signature};
