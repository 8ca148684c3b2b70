//! Best-effort sale notifications
//!
//! Delivery is a side channel: the engine hands each notice to a detached
//! task, which logs a failure and carries on. A sale is never undone because
//! a notice was lost.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::NotificationConfig;

/// Upper bound on one webhook delivery
const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);

/// What a notifier is told after a sale is recorded
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleNotice {
    pub date: NaiveDate,
    pub item: String,
    pub quantity: i64,
    pub total_amount: Decimal,
    pub remaining_quantity: i64,
    pub user: Uuid,
}

impl SaleNotice {
    pub fn text(&self) -> String {
        format!(
            "Stock updated successfully: sold {} x {} on {}, {} left",
            self.quantity, self.item, self.date, self.remaining_quantity
        )
    }
}

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("failed to reach notification endpoint: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("notification endpoint rejected the notice: {status} {message}")]
    Rejected { status: u16, message: String },
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notice: &SaleNotice) -> Result<(), NotifyError>;
}

/// Writes notices to the log only
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, notice: &SaleNotice) -> Result<(), NotifyError> {
        tracing::info!(item = %notice.item, date = %notice.date, "{}", notice.text());
        Ok(())
    }
}

/// Mail-shaped payload posted to the webhook
#[derive(Debug, Serialize)]
struct WebhookMessage<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: String,
    html: String,
    sale: &'a SaleNotice,
}

/// Webhook error body
#[derive(Debug, Deserialize)]
struct WebhookErrorResponse {
    #[serde(default)]
    message: Option<String>,
}

/// Posts notices as JSON to an HTTP endpoint (a mail relay or chat hook)
#[derive(Clone)]
pub struct WebhookNotifier {
    url: String,
    token: Option<String>,
    from: String,
    to: String,
    subject: String,
    http_client: reqwest::Client,
}

impl WebhookNotifier {
    /// Create a new webhook notifier
    pub fn new(url: String, config: &NotificationConfig) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(WEBHOOK_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Falling back to default HTTP client: {}", e);
                reqwest::Client::new()
            });

        Self {
            url,
            token: config.token.clone(),
            from: config.from.clone(),
            to: config.to.clone(),
            subject: config.subject.clone(),
            http_client,
        }
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, notice: &SaleNotice) -> Result<(), NotifyError> {
        let text = notice.text();
        let message = WebhookMessage {
            from: &self.from,
            to: &self.to,
            subject: &self.subject,
            html: format!("<p>{}</p>", text),
            text,
            sale: notice,
        };

        let mut request = self.http_client.post(&self.url).json(&message);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;

        if response.status().is_success() {
            Ok(())
        } else {
            let status = response.status().as_u16();
            let error: WebhookErrorResponse = response
                .json()
                .await
                .unwrap_or(WebhookErrorResponse { message: None });
            Err(NotifyError::Rejected {
                status,
                message: error.message.unwrap_or_else(|| "Unknown error".to_string()),
            })
        }
    }
}

/// Pick the notifier the configuration asks for
pub fn notifier_from_config(config: &NotificationConfig) -> Arc<dyn Notifier> {
    match &config.webhook_url {
        Some(url) if !url.is_empty() => {
            tracing::info!("Sale notifications go to {}", url);
            Arc::new(WebhookNotifier::new(url.clone(), config))
        }
        _ => Arc::new(LogNotifier),
    }
}
