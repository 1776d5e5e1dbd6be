use std::time::Duration;

use reqwest::Client;

use super::error::TelegramError;
use super::types::{ApiResponse, SendMessageRequest, SendOptions, SentMessage};

const API_URL: &str = "https://api.telegram.org";

/// Narrow interface over the messaging transport: exactly one outbound
/// message per call. Tests substitute recording fakes.
pub trait LinkSender {
    async fn send(
        &self,
        target: &str,
        text: &str,
        options: &SendOptions,
    ) -> Result<SentMessage, TelegramError>;
}

impl<T: LinkSender + Sync> LinkSender for std::sync::Arc<T> {
    async fn send(
        &self,
        target: &str,
        text: &str,
        options: &SendOptions,
    ) -> Result<SentMessage, TelegramError> {
        (**self).send(target, text, options).await
    }
}

/// Telegram Bot API client, pre-authenticated by its bot token.
pub struct TelegramClient {
    token: String,
    client: Client,
    base_url: String,
}

impl TelegramClient {
    pub fn new(token: String) -> Self {
        Self::with_base_url(token, API_URL.to_string())
    }

    /// Create a client pointing at a custom base URL (useful for testing).
    pub fn with_base_url(token: String, base_url: String) -> Self {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .build()
            .expect("failed to build HTTP client");
        Self {
            token,
            client,
            base_url,
        }
    }
}

impl LinkSender for TelegramClient {
    async fn send(
        &self,
        target: &str,
        text: &str,
        options: &SendOptions,
    ) -> Result<SentMessage, TelegramError> {
        let req = SendMessageRequest {
            chat_id: target.to_string(),
            text: text.to_string(),
            disable_web_page_preview: options.disable_preview,
        };

        let response = self
            .client
            .post(format!("{}/bot{}/sendMessage", self.base_url, self.token))
            .json(&req)
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .json::<ApiResponse>()
                .await
                .ok()
                .and_then(|b| b.parameters)
                .and_then(|p| p.retry_after)
                .map(|secs| secs * 1000)
                .unwrap_or(1000);
            return Err(TelegramError::RateLimited {
                retry_after_ms: retry_after,
            });
        }

        if !status.is_success() {
            let message = response
                .json::<ApiResponse>()
                .await
                .ok()
                .and_then(|b| b.description)
                .unwrap_or_else(|| "unknown error".to_string());
            return Err(TelegramError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.json::<ApiResponse>().await?;
        if !body.ok {
            return Err(TelegramError::Api {
                status: body.error_code.unwrap_or(0) as u16,
                message: body
                    .description
                    .unwrap_or_else(|| "unknown error".to_string()),
            });
        }
        body.result
            .ok_or_else(|| TelegramError::Parse("ok response without result".to_string()))
    }
}
