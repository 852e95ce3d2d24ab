//! Notification sink adapters.

use crate::domain::notification::NotificationEvent;
use crate::domain::ports::{NotificationError, NotificationSink};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::info;

pub const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Writes every event to the log. The default sink when no chat bot is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

#[async_trait]
impl NotificationSink for TracingNotifier {
    async fn notify(&self, event: &NotificationEvent) -> Result<(), NotificationError> {
        info!(event = event.kind(), "{}", event.render());
        Ok(())
    }
}

/// Posts rendered events to a Telegram chat through the bot API.
pub struct TelegramNotifier {
    client: Client,
    api_base: String,
    token: String,
    chat_id: String,
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: String,
}

impl TelegramNotifier {
    pub fn new(
        token: impl Into<String>,
        chat_id: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, NotificationError> {
        Self::with_api_base(TELEGRAM_API_BASE, token, chat_id, timeout)
    }

    pub fn with_api_base(
        api_base: impl Into<String>,
        token: impl Into<String>,
        chat_id: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, NotificationError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NotificationError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_owned(),
            token: token.into(),
            chat_id: chat_id.into(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/bot{}/sendMessage", self.api_base, self.token)
    }
}

#[async_trait]
impl NotificationSink for TelegramNotifier {
    async fn notify(&self, event: &NotificationEvent) -> Result<(), NotificationError> {
        let body = SendMessage {
            chat_id: &self.chat_id,
            text: event.render(),
        };
        let response = self
            .client
            .post(self.endpoint())
            .json(&body)
            .send()
            .await
            .map_err(|e| NotificationError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(NotificationError::Rejected {
                status: status.as_u16(),
                message,
            });
        }
        Ok(())
    }
}

/// Keeps delivered events in memory; deliveries can be made to fail on demand.
#[derive(Debug, Default)]
pub struct InMemoryNotifier {
    events: Mutex<Vec<NotificationEvent>>,
    failing: AtomicBool,
}

impl InMemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<NotificationEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    pub fn fail_deliveries(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl NotificationSink for InMemoryNotifier {
    async fn notify(&self, event: &NotificationEvent) -> Result<(), NotificationError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(NotificationError::Transport("sink unavailable".into()));
        }
        self.events
            .lock()
            .map_err(|_| NotificationError::Transport("sink lock poisoned".into()))?
            .push(event.clone());
        Ok(())
    }
}
