use std::fs;

use anyhow::{bail, Context, Result};
use razorpay_tools::{signature::calculate_signature, RAZORPAY_SIGNATURE_HEADER};

use crate::SignWebhookParams;

pub fn print_webhook_signature(params: SignWebhookParams) -> Result<()> {
    if params.secret.is_empty() {
        bail!("The webhook secret is empty. Every signature would be rejected.");
    }
    let body = fs::read(&params.file).with_context(|| format!("Could not read {}", params.file))?;
    let signature = calculate_signature(&params.secret, &body);
    println!("{RAZORPAY_SIGNATURE_HEADER}: {signature}");
    Ok(())
}
