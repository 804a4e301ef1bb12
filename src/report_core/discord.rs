//! Discord REST sink
//!
//! Publishes the report as one channel message and edits it in place.
//!
//! ## API Reference
//!
//! Create: `POST {base}/channels/{channel_id}/messages`
//! Edit:   `PATCH {base}/channels/{channel_id}/messages/{message_id}`
//! Auth:   `Authorization: Bot {token}`

use super::retry::ExponentialBackoff;
use super::sink::{MessageHandle, ReportSink, SinkError};
use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DISCORD_API_BASE: &str = "https://discord.com/api/v10";

/// Discord rejects message content longer than this
pub const MAX_CONTENT_CHARS: usize = 2000;

/// SUPPRESS_NOTIFICATIONS message flag (a "silent" send)
const FLAG_SUPPRESS_NOTIFICATIONS: u64 = 1 << 12;

#[derive(Debug, Serialize)]
struct CreateMessage<'a> {
    content: &'a str,
    flags: u64,
}

#[derive(Debug, Serialize)]
struct EditMessage<'a> {
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct DiscordMessage {
    id: String,
}

/// Error body returned with 4xx responses
#[derive(Debug, Deserialize)]
struct DiscordApiError {
    code: u64,
    message: String,
}

/// Prefer Discord's `{code, message}` error body, fall back to the raw text
fn describe_error_body(body: &str) -> String {
    match serde_json::from_str::<DiscordApiError>(body) {
        Ok(err) => format!("{} (code {})", err.message, err.code),
        Err(_) => body.to_string(),
    }
}

pub struct DiscordSink {
    client: reqwest::Client,
    api_base: String,
    token: String,
    channel_id: String,
    retry_initial_ms: u64,
    retry_max_ms: u64,
    max_retries: u32,
}

impl DiscordSink {
    pub fn new(token: String, channel_id: String) -> Result<Self, SinkError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()?;

        Ok(Self {
            client,
            api_base: DISCORD_API_BASE.to_string(),
            token,
            channel_id,
            retry_initial_ms: 250,
            retry_max_ms: 2_000,
            max_retries: 3,
        })
    }

    /// Point the sink at a different API root (a proxy or a local stub)
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn channel_id(&self) -> &str {
        &self.channel_id
    }

    fn messages_url(&self) -> String {
        format!("{}/channels/{}/messages", self.api_base, self.channel_id)
    }

    fn message_url(&self, handle: &MessageHandle) -> String {
        format!("{}/{}", self.messages_url(), handle)
    }

    /// Send a JSON request, retrying rate limits, server errors and
    /// connection failures with bounded backoff.
    async fn send<T: Serialize + ?Sized>(
        &self,
        method: Method,
        url: &str,
        body: &T,
    ) -> Result<reqwest::Response, SinkError> {
        let mut backoff =
            ExponentialBackoff::new(self.retry_initial_ms, self.retry_max_ms, self.max_retries);

        loop {
            let result = self
                .client
                .request(method.clone(), url)
                .header(reqwest::header::AUTHORIZATION, format!("Bot {}", self.token))
                .json(body)
                .send()
                .await;

            let (last, hint) = match result {
                Ok(response) if response.status().is_success() => return Ok(response),
                Ok(response) if is_transient(response.status()) => {
                    let hint = retry_after(&response);
                    (format!("status {}", response.status()), hint)
                }
                Ok(response) => {
                    let status = response.status().as_u16();
                    let body = response.text().await.unwrap_or_default();
                    return Err(SinkError::Rejected {
                        backend: "Discord",
                        status,
                        body: describe_error_body(&body),
                    });
                }
                Err(e) if e.is_timeout() || e.is_connect() => (e.to_string(), None),
                Err(e) => return Err(e.into()),
            };

            log::warn!("⚠️  Discord {} {} failed: {}", method, url, last);
            if backoff.sleep(hint).await.is_err() {
                return Err(SinkError::RetriesExhausted {
                    attempts: backoff.attempts() + 1,
                    last,
                });
            }
        }
    }
}

fn is_transient(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

/// Discord sends fractional seconds in `retry-after`
fn retry_after(response: &reqwest::Response) -> Option<Duration> {
    response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .and_then(parse_retry_after)
}

fn parse_retry_after(value: &str) -> Option<Duration> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|secs| secs.is_finite() && *secs >= 0.0)
        .map(Duration::from_secs_f64)
}

fn warn_if_oversized(text: &str) {
    let chars = text.chars().count();
    if chars > MAX_CONTENT_CHARS {
        log::warn!(
            "⚠️  Report is {} characters, Discord accepts at most {}",
            chars,
            MAX_CONTENT_CHARS
        );
    }
}

#[async_trait]
impl ReportSink for DiscordSink {
    async fn create(&mut self, initial_text: &str) -> Result<MessageHandle, SinkError> {
        warn_if_oversized(initial_text);
        let body = CreateMessage {
            content: initial_text,
            flags: FLAG_SUPPRESS_NOTIFICATIONS,
        };

        let response = self.send(Method::POST, &self.messages_url(), &body).await?;
        let message: DiscordMessage = response.json().await?;
        Ok(MessageHandle::new(message.id))
    }

    async fn edit(&mut self, handle: &MessageHandle, text: &str) -> Result<(), SinkError> {
        warn_if_oversized(text);
        let body = EditMessage { content: text };

        self.send(Method::PATCH, &self.message_url(handle), &body)
            .await?;
        Ok(())
    }

    fn backend_type(&self) -> &'static str {
        "Discord"
    }
}
