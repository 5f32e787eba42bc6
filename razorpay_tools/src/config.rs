use drg_common::{helpers::parse_boolean_flag, Secret};
use log::*;

pub const DEFAULT_RAZORPAY_API_URL: &str = "https://api.razorpay.com/v1";

#[derive(Debug, Clone, Default)]
pub struct RazorpayConfig {
    /// Base URL for the REST API, without a trailing slash.
    pub api_url: String,
    pub key_id: String,
    pub key_secret: Secret<String>,
    /// Shared secret that Razorpay uses to sign webhook bodies.
    pub webhook_secret: Secret<String>,
    /// If true, Razorpay sends the payment link to the customer by SMS and email itself.
    pub notify_customer: bool,
}

impl RazorpayConfig {
    pub fn new_from_env_or_default() -> Self {
        let api_url = std::env::var("DRG_RAZORPAY_API_URL")
            .map(|s| s.trim_end_matches('/').to_string())
            .unwrap_or_else(|_| {
                info!("🪛️ DRG_RAZORPAY_API_URL not set, using {DEFAULT_RAZORPAY_API_URL}");
                DEFAULT_RAZORPAY_API_URL.to_string()
            });
        let key_id = std::env::var("DRG_RAZORPAY_KEY_ID").unwrap_or_else(|_| {
            warn!("🪛️ DRG_RAZORPAY_KEY_ID not set, using (probably useless) default");
            "rzp_test_00000000000000".to_string()
        });
        let key_secret = Secret::new(std::env::var("DRG_RAZORPAY_KEY_SECRET").unwrap_or_else(|_| {
            warn!("🪛️ DRG_RAZORPAY_KEY_SECRET not set, using (probably useless) default");
            "00000000000000".to_string()
        }));
        let webhook_secret = Secret::new(std::env::var("DRG_RAZORPAY_WEBHOOK_SECRET").unwrap_or_else(|_| {
            error!(
                "🪛️ DRG_RAZORPAY_WEBHOOK_SECRET is not set. Every webhook call will be rejected until it is set to the \
                 secret configured in the Razorpay dashboard."
            );
            String::default()
        }));
        let notify_customer = parse_boolean_flag(std::env::var("DRG_RAZORPAY_NOTIFY").ok(), true);
        Self { api_url, key_id, key_secret, webhook_secret, notify_customer }
    }
}
