use std::sync::Arc;

use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
    Method,
};
use serde::{de::DeserializeOwned, Serialize};

use crate::{
    config::RazorpayConfig,
    data_objects::{NewPaymentLink, PaymentLink},
    error::gateway_error_message,
    RazorpayApiError,
};

#[derive(Clone)]
pub struct RazorpayApi {
    config: RazorpayConfig,
    client: Arc<Client>,
}

impl RazorpayApi {
    pub fn new(config: RazorpayConfig) -> Result<Self, RazorpayApiError> {
        let mut headers = HeaderMap::with_capacity(1);
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| RazorpayApiError::ClientSetup(e.to_string()))?;
        Ok(Self { config, client: Arc::new(client) })
    }

    pub fn config(&self) -> &RazorpayConfig {
        &self.config
    }

    /// Sends an authenticated request to the Razorpay REST API. All calls use HTTP basic auth with the key id and
    /// key secret.
    pub async fn rest_query<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        path: &str,
        params: &[(&str, &str)],
        body: Option<B>,
    ) -> Result<T, RazorpayApiError> {
        let url = self.url(path);
        trace!("💳️ Sending REST query: {method} {url}");
        let mut req =
            self.client.request(method, url).basic_auth(&self.config.key_id, Some(self.config.key_secret.reveal()));
        if !params.is_empty() {
            req = req.query(params);
        }
        if let Some(body) = body {
            req = req.json(&body);
        }
        let response = req.send().await.map_err(|e| RazorpayApiError::Transport(e.to_string()))?;
        if response.status().is_success() {
            trace!("💳️ REST query successful. {}", response.status());
            response.json::<T>().await.map_err(|e| RazorpayApiError::MalformedResponse(e.to_string()))
        } else {
            let status = response.status().as_u16();
            let body = response.text().await.map_err(|e| RazorpayApiError::MalformedResponse(e.to_string()))?;
            Err(RazorpayApiError::QueryError { status, message: gateway_error_message(&body) })
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.api_url)
    }

    /// Creates a payment link for a single order. The returned link carries the id that Razorpay will use to refer to
    /// this payment in later webhook calls, and the short url that the customer pays at.
    pub async fn create_payment_link(&self, link: &NewPaymentLink) -> Result<PaymentLink, RazorpayApiError> {
        if !link.amount.is_positive() {
            return Err(RazorpayApiError::InvalidPaymentLink(format!(
                "Amount must be positive, but was {} for {}",
                link.amount, link.reference_id
            )));
        }
        debug!("💳️ Creating payment link {} for {}", link.reference_id, link.amount);
        let result = self.rest_query::<PaymentLink, _>(Method::POST, "/payment_links", &[], Some(link)).await?;
        info!("💳️ Payment link {} created for {} ({})", result.id, link.reference_id, result.short_url);
        Ok(result)
    }
}
