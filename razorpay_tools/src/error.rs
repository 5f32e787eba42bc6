use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RazorpayApiError {
    #[error("The HTTP client could not be built. {0}")]
    ClientSetup(String),
    #[error("The request to Razorpay did not complete. {0}")]
    Transport(String),
    #[error("Razorpay sent a response that could not be read. {0}")]
    MalformedResponse(String),
    #[error("Razorpay rejected the request with status {status}. {message}")]
    QueryError { status: u16, message: String },
    #[error("The payment link is not valid. {0}")]
    InvalidPaymentLink(String),
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    code: String,
    #[serde(default)]
    description: String,
}

/// Razorpay reports failures as `{"error": {"code": .., "description": ..}}`. Anything else is passed on as is.
pub fn gateway_error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody { error }) if !error.description.is_empty() => format!("{}: {}", error.code, error.description),
        _ => body.to_string(),
    }
}
