use log::*;
use lp_common::Secret;

#[derive(Debug, Clone, Default)]
pub struct RazorpayConfig {
    pub base_url: String,
    pub key_id: String,
    pub key_secret: Secret<String>,
    /// Secret used to verify the `X-Razorpay-Signature` header on webhook deliveries.
    pub webhook_secret: Secret<String>,
}

impl RazorpayConfig {
    pub fn new_from_env_or_default() -> Self {
        let base_url = std::env::var("LP_RAZORPAY_BASE_URL").unwrap_or_else(|_| {
            warn!("LP_RAZORPAY_BASE_URL not set, using https://api.razorpay.com/v1 as default");
            "https://api.razorpay.com/v1".to_string()
        });
        let key_id = std::env::var("LP_RAZORPAY_KEY_ID").unwrap_or_else(|_| {
            warn!("LP_RAZORPAY_KEY_ID not set, using (probably useless) default");
            "rzp_test_0000000000".to_string()
        });
        let key_secret = Secret::new(std::env::var("LP_RAZORPAY_KEY_SECRET").unwrap_or_else(|_| {
            warn!("LP_RAZORPAY_KEY_SECRET not set, using (probably useless) default");
            "00000000000000".to_string()
        }));
        let webhook_secret = Secret::new(std::env::var("LP_RAZORPAY_WEBHOOK_SECRET").unwrap_or_else(|_| {
            warn!("LP_RAZORPAY_WEBHOOK_SECRET not set, using (probably useless) default");
            "00000000000000".to_string()
        }));
        Self { base_url, key_id, key_secret, webhook_secret }
    }
}
