//! Telegram Bot API alert sink.

use crate::error::{AlertError, AlertResult};
use crate::sink::{AlertSink, BoxFuture};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use sniper_core::Alert;
use sniper_telemetry::Metrics;
use std::time::Duration;
use tracing::{debug, warn};

/// Telegram client settings. Credentials come from the environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    /// Bot API base URL.
    pub api_base: String,
    /// Whole-request timeout.
    pub timeout_secs: u64,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.telegram.org".to_string(),
            timeout_secs: 10,
        }
    }
}

/// `sendMessage` request body.
#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: String,
    parse_mode: &'static str,
    disable_web_page_preview: bool,
}

/// Sink posting alerts to a Telegram chat.
pub struct TelegramSink {
    client: Client,
    /// Contains the bot token; never logged.
    send_message_url: String,
    chat_id: String,
}

impl TelegramSink {
    pub fn new(config: &TelegramConfig, bot_token: &str, chat_id: impl Into<String>) -> AlertResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AlertError::HttpClient(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            send_message_url: format!(
                "{}/bot{}/sendMessage",
                config.api_base.trim_end_matches('/'),
                bot_token
            ),
            chat_id: chat_id.into(),
        })
    }

    async fn deliver(&self, alert: &Alert) -> AlertResult<()> {
        let request = SendMessageRequest {
            chat_id: &self.chat_id,
            text: format_message(alert),
            parse_mode: "HTML",
            disable_web_page_preview: true,
        };

        let response = self
            .client
            .post(&self.send_message_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AlertError::Timeout
                } else {
                    AlertError::HttpClient(e.without_url().to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AlertError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}

impl AlertSink for TelegramSink {
    fn name(&self) -> &'static str {
        "telegram"
    }

    fn send<'a>(&'a self, alert: &'a Alert) -> BoxFuture<'a, ()> {
        Box::pin(async move {
            match self.deliver(alert).await {
                Ok(()) => debug!(title = %alert.title, "Telegram alert delivered"),
                Err(AlertError::Timeout) => {
                    Metrics::sink_failed(self.name());
                    warn!(title = %alert.title, "Telegram timeout");
                }
                Err(e) => {
                    Metrics::sink_failed(self.name());
                    warn!(title = %alert.title, error = %e, "Telegram send failed");
                }
            }
        })
    }
}

/// Escape the characters Telegram's HTML parse mode treats as markup.
fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Render an alert as a Telegram HTML message.
pub(crate) fn format_message(alert: &Alert) -> String {
    format!(
        "<b>{}</b>\n\n{}\n\n<i>{} UTC</i>",
        escape_html(&alert.title),
        escape_html(&alert.message),
        alert.timestamp.format("%Y-%m-%d %H:%M:%S")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_format_message() {
        let ts = Utc.with_ymd_and_hms(2025, 3, 4, 5, 6, 7).unwrap();
        let alert = Alert::at("🟢 BID WALL APPEARED BTCUSDT", "Price: 100.00\nQty: 12", ts);
        assert_eq!(
            format_message(&alert),
            "<b>🟢 BID WALL APPEARED BTCUSDT</b>\n\nPrice: 100.00\nQty: 12\n\n<i>2025-03-04 05:06:07 UTC</i>"
        );
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("a<b> & c"), "a&lt;b&gt; &amp; c");
        assert_eq!(escape_html("&lt;"), "&amp;lt;");
    }

    #[test]
    fn test_request_json() {
        let request = SendMessageRequest {
            chat_id: "-100123",
            text: "hi".to_string(),
            parse_mode: "HTML",
            disable_web_page_preview: true,
        };
        let json: serde_json::Value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "chat_id": "-100123",
                "text": "hi",
                "parse_mode": "HTML",
                "disable_web_page_preview": true
            })
        );
    }

    #[test]
    fn test_url_uses_api_base() {
        let config = TelegramConfig {
            api_base: "http://127.0.0.1:1/".to_string(),
            ..Default::default()
        };
        let sink = TelegramSink::new(&config, "123:abc", "42").unwrap();
        assert_eq!(sink.send_message_url, "http://127.0.0.1:1/bot123:abc/sendMessage");
    }
}
