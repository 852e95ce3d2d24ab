//! Runtime configuration, assembled once at startup and injected into the
//! services.

use crate::domain::RentalId;
use crate::domain::payment::PaymentType;
use crate::domain::ports::{ClockRef, NotificationSinkRef, PaymentProcessorRef};
use crate::error::{Result, ServiceError};
use crate::infrastructure::clock::{FixedClock, SystemClock};
use crate::infrastructure::notify::{TelegramNotifier, TracingNotifier};
use crate::infrastructure::sandbox::SandboxProcessor;
use crate::infrastructure::stripe::StripeClient;
use chrono::NaiveDate;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

pub const DEFAULT_PUBLIC_URL: &str = "http://localhost:8080";
pub const DEFAULT_CURRENCY: &str = "usd";
/// How long an abandoned checkout session can still be resumed.
pub const SESSION_RESUME_WINDOW_HOURS: u32 = 24;

/// Where the payment processor sends the customer back to, and in which
/// currency sessions are opened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutConfig {
    pub public_base_url: String,
    pub currency: String,
    pub resume_window_hours: u32,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            public_base_url: DEFAULT_PUBLIC_URL.to_owned(),
            currency: DEFAULT_CURRENCY.to_owned(),
            resume_window_hours: SESSION_RESUME_WINDOW_HOURS,
        }
    }
}

impl CheckoutConfig {
    pub fn new(public_base_url: impl Into<String>, currency: impl Into<String>) -> Self {
        Self {
            public_base_url: public_base_url.into().trim_end_matches('/').to_owned(),
            currency: currency.into().to_lowercase(),
            resume_window_hours: SESSION_RESUME_WINDOW_HOURS,
        }
    }

    pub fn success_url(&self, rental_id: RentalId, kind: PaymentType) -> String {
        format!(
            "{}/payments/success/{}?type={}",
            self.public_base_url, rental_id, kind
        )
    }

    pub fn cancel_url(&self, rental_id: RentalId) -> String {
        format!("{}/payments/cancel/{}", self.public_base_url, rental_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StripeSettings {
    pub api_key: String,
    pub api_base: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelegramSettings {
    pub bot_token: String,
    pub chat_id: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_path: Option<PathBuf>,
    pub checkout: CheckoutConfig,
    pub stripe: Option<StripeSettings>,
    pub telegram: Option<TelegramSettings>,
    /// Pins the business date instead of reading the system clock.
    pub today: Option<NaiveDate>,
    pub http_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            checkout: CheckoutConfig::default(),
            stripe: None,
            telegram: None,
            today: None,
            http_timeout: Duration::from_secs(30),
        }
    }
}

impl AppConfig {
    /// Stripe when an API key is configured, otherwise the in-process sandbox
    /// with sessions that settle as soon as they are opened.
    pub fn payment_processor(&self) -> Result<PaymentProcessorRef> {
        match &self.stripe {
            Some(stripe) => {
                info!(api_base = %stripe.api_base, "Using Stripe payment processor");
                let client = StripeClient::new(&stripe.api_key, &stripe.api_base, self.http_timeout)
                    .map_err(|e| ServiceError::Configuration(e.to_string()))?;
                Ok(Arc::new(client))
            }
            None => {
                info!("No Stripe API key configured, using sandbox payment processor");
                let sandbox =
                    SandboxProcessor::new(&self.checkout.public_base_url).settling_immediately();
                Ok(Arc::new(sandbox))
            }
        }
    }

    pub fn notification_sink(&self) -> Result<NotificationSinkRef> {
        match &self.telegram {
            Some(telegram) => {
                let notifier = TelegramNotifier::new(
                    &telegram.bot_token,
                    &telegram.chat_id,
                    self.http_timeout,
                )
                .map_err(|e| ServiceError::Configuration(e.to_string()))?;
                Ok(Arc::new(notifier))
            }
            None => Ok(Arc::new(TracingNotifier)),
        }
    }

    pub fn clock(&self) -> ClockRef {
        match self.today {
            Some(date) => Arc::new(FixedClock::new(date)),
            None => Arc::new(SystemClock),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_callback_urls() {
        let checkout = CheckoutConfig::new("https://carrent.test/", "USD");
        assert_eq!(
            checkout.success_url(7, PaymentType::Fine),
            "https://carrent.test/payments/success/7?type=FINE"
        );
        assert_eq!(
            checkout.cancel_url(7),
            "https://carrent.test/payments/cancel/7"
        );
        assert_eq!(checkout.currency, "usd");
    }

    #[test]
    fn test_pinned_clock() {
        let config = AppConfig {
            today: NaiveDate::from_ymd_opt(2024, 1, 6),
            ..AppConfig::default()
        };
        assert_eq!(
            config.clock().today(),
            NaiveDate::from_ymd_opt(2024, 1, 6).unwrap()
        );
    }

    #[test]
    fn test_defaults_build_sandbox_and_tracing() {
        let config = AppConfig::default();
        assert!(config.payment_processor().is_ok());
        assert!(config.notification_sink().is_ok());
        assert_eq!(config.checkout.resume_window_hours, 24);
    }
}
