//! Reqwest-backed Stripe Checkout adapter.
//!
//! The client is built once with its API key and handed to the payment
//! orchestrator; nothing here touches global state.

use crate::domain::ports::{
    CheckoutRequest, CheckoutSession, PaymentProcessor, ProcessorError, SessionStatus,
};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_STRIPE_API_BASE: &str = "https://api.stripe.com";

pub struct StripeClient {
    client: Client,
    api_base: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct SessionDto {
    id: String,
    url: Option<String>,
    payment_status: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDto,
}

#[derive(Debug, Deserialize)]
struct ErrorDto {
    message: Option<String>,
}

impl StripeClient {
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(
        api_key: impl Into<String>,
        api_base: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ProcessorError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProcessorError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_owned(),
            api_key: api_key.into(),
        })
    }

    fn sessions_endpoint(&self) -> String {
        format!("{}/v1/checkout/sessions", self.api_base)
    }

    /// Session ids are opaque, so each one is appended as a single encoded segment.
    fn session_url(&self, session_id: &str) -> Result<Url, ProcessorError> {
        let mut url = Url::parse(&self.sessions_endpoint())
            .map_err(|e| ProcessorError::Transport(format!("invalid api base: {e}")))?;
        url.path_segments_mut()
            .map_err(|()| ProcessorError::Transport(format!("invalid api base: {}", self.api_base)))?
            .push(session_id);
        Ok(url)
    }
}

/// Form body for `POST /v1/checkout/sessions`: a single line item priced in cents.
fn checkout_form(request: &CheckoutRequest) -> Vec<(&'static str, String)> {
    vec![
        ("mode", "payment".to_owned()),
        ("success_url", request.success_url.clone()),
        ("cancel_url", request.cancel_url.clone()),
        ("line_items[0][quantity]", "1".to_owned()),
        (
            "line_items[0][price_data][currency]",
            request.currency.clone(),
        ),
        (
            "line_items[0][price_data][unit_amount]",
            request.amount_cents.to_string(),
        ),
        (
            "line_items[0][price_data][product_data][name]",
            request.product_name.clone(),
        ),
    ]
}

fn parse_status(payment_status: &str) -> SessionStatus {
    match payment_status {
        "paid" => SessionStatus::Paid,
        "unpaid" => SessionStatus::Unpaid,
        other => SessionStatus::Other(other.to_owned()),
    }
}

fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|envelope| envelope.error.message)
        .unwrap_or_else(|| body.to_owned())
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ProcessorError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ProcessorError::Rejected {
            status: status.as_u16(),
            message: error_message(&body),
        });
    }
    response
        .json::<T>()
        .await
        .map_err(|e| ProcessorError::InvalidResponse(e.to_string()))
}

#[async_trait]
impl PaymentProcessor for StripeClient {
    async fn create_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutSession, ProcessorError> {
        debug!(amount_cents = request.amount_cents, "Opening Stripe checkout session");
        let response = self
            .client
            .post(self.sessions_endpoint())
            .bearer_auth(&self.api_key)
            .form(&checkout_form(request))
            .send()
            .await
            .map_err(|e| ProcessorError::Transport(e.to_string()))?;

        let session: SessionDto = decode(response).await?;
        let url = session.url.ok_or_else(|| {
            ProcessorError::InvalidResponse(format!("session {} has no checkout url", session.id))
        })?;
        Ok(CheckoutSession {
            id: session.id,
            url,
        })
    }

    async fn retrieve_session(&self, session_id: &str) -> Result<SessionStatus, ProcessorError> {
        let response = self
            .client
            .get(self.session_url(session_id)?)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| ProcessorError::Transport(e.to_string()))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(ProcessorError::SessionNotFound(session_id.to_owned()));
        }
        let session: SessionDto = decode(response).await?;
        Ok(parse_status(&session.payment_status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkout_form_prices_single_line_item() {
        let form = checkout_form(&CheckoutRequest {
            amount_cents: 40990,
            currency: "usd".into(),
            product_name: "Car rental payment".into(),
            success_url: "https://carrent.test/payments/success/3?type=PAYMENT".into(),
            cancel_url: "https://carrent.test/payments/cancel/3".into(),
        });
        let value = |key: &str| {
            form.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.as_str())
        };
        assert_eq!(value("mode"), Some("payment"));
        assert_eq!(value("line_items[0][price_data][unit_amount]"), Some("40990"));
        assert_eq!(value("line_items[0][price_data][currency]"), Some("usd"));
        assert_eq!(
            value("success_url"),
            Some("https://carrent.test/payments/success/3?type=PAYMENT")
        );
    }

    #[test]
    fn test_parse_status() {
        assert_eq!(parse_status("paid"), SessionStatus::Paid);
        assert_eq!(parse_status("unpaid"), SessionStatus::Unpaid);
        assert_eq!(
            parse_status("no_payment_required"),
            SessionStatus::Other("no_payment_required".into())
        );
    }

    #[test]
    fn test_session_dto_decodes() {
        let body = r#"{"id":"cs_1","object":"checkout.session","url":"https://checkout.stripe.com/c/cs_1","payment_status":"unpaid"}"#;
        let dto: SessionDto = serde_json::from_str(body).unwrap();
        assert_eq!(dto.id, "cs_1");
        assert_eq!(dto.url.as_deref(), Some("https://checkout.stripe.com/c/cs_1"));
    }

    #[test]
    fn test_error_message_prefers_stripe_envelope() {
        let body = r#"{"error":{"type":"invalid_request_error","message":"No such checkout.session"}}"#;
        assert_eq!(error_message(body), "No such checkout.session");
        assert_eq!(error_message("gateway timeout"), "gateway timeout");
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let client = StripeClient::new("sk_test", "https://stripe.test/", Duration::from_secs(5))
            .unwrap();
        assert_eq!(client.sessions_endpoint(), "https://stripe.test/v1/checkout/sessions");
    }

    #[test]
    fn test_session_id_stays_one_path_segment() {
        let client = StripeClient::new("sk_test", "https://stripe.test", Duration::from_secs(5))
            .unwrap();
        assert_eq!(
            client.session_url("cs_1").unwrap().as_str(),
            "https://stripe.test/v1/checkout/sessions/cs_1"
        );

        let url = client.session_url("cs_1/expire?x=1#y").unwrap();
        assert_eq!(url.path(), "/v1/checkout/sessions/cs_1%2Fexpire%3Fx=1%23y");
        assert_eq!(url.query(), None);
        assert_eq!(url.fragment(), None);
    }

    #[test]
    fn test_unparseable_api_base_is_a_transport_error() {
        let client = StripeClient::new("sk_test", "not a url", Duration::from_secs(5)).unwrap();
        assert!(matches!(
            client.session_url("cs_1"),
            Err(ProcessorError::Transport(_))
        ));
    }
}
