//! Remote participants - reply production over HTTP
//!
//! Each turn POSTs the snapshot to `{base_url}/reply`:
//!
//! ```json
//! { "participant": "dalle", "messages": [ ... ] }
//! ```
//!
//! and expects `{ "message": <Message> }` or `{ "message": null }` back.
//! Replies that arrive without a kind tag are classified by marker text.
//! Timeouts belong to this layer; the engine enforces none.

use super::Participant;
use crate::error::{self, Error, ErrorKind, Result};
use crate::markers::Markers;
use crate::message::{Message, MessageKind};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Request timeout unless configured otherwise
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

fn default_timeout_secs() -> Option<u64> {
    Some(DEFAULT_TIMEOUT_SECS)
}

/// Connection settings for a remote participant
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    pub base_url: String,
    /// `null` disables the timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

impl RemoteConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_secs: default_timeout_secs(),
            headers: HashMap::new(),
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    fn reply_url(&self) -> String {
        format!("{}/reply", self.base_url.trim_end_matches('/'))
    }
}

pub struct RemoteParticipant {
    name: String,
    client: Client,
    config: RemoteConfig,
    markers: Markers,
}

impl RemoteParticipant {
    pub fn new(name: impl Into<String>, config: RemoteConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build().map_err(|e| {
            Error::config_invalid("failed to create HTTP client")
                .with_operation("remote::new")
                .set_source(e)
        })?;

        Ok(Self {
            name: name.into(),
            client,
            config,
            markers: Markers::default(),
        })
    }

    /// Markers used to classify untagged replies
    pub fn with_markers(mut self, markers: Markers) -> Self {
        self.markers = markers;
        self
    }
}

impl Participant for RemoteParticipant {
    fn name(&self) -> &str {
        &self.name
    }

    async fn reply(&self, conversation: &[Message]) -> Result<Option<Message>> {
        let url = self.config.reply_url();
        let body = ReplyRequest {
            participant: &self.name,
            messages: conversation,
        };

        let mut req = self.client.post(&url).json(&body);
        for (key, value) in &self.config.headers {
            req = req.header(key, value);
        }

        tracing::debug!(participant = %self.name, %url, messages = conversation.len(), "requesting remote reply");

        let response = req.send().await.map_err(|e| {
            let reason = if e.is_timeout() {
                "remote participant timed out"
            } else {
                "failed to reach remote participant"
            };
            error::network_failed(&url, reason)
                .with_operation("remote::reply")
                .with_context("participant", self.name.as_str())
                .set_source(e)
        })?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let text = response.text().await.unwrap_or_default();
            let err = match status {
                429 => error::rate_limited(&url),
                401 | 403 => error::permission_denied(&url, status),
                _ => error::remote_rejected(&self.name, status, text),
            };
            return Err(err.with_operation("remote::reply"));
        }

        let envelope: ReplyEnvelope = response.json().await.map_err(|e| {
            Error::new(ErrorKind::ParseFailed, "remote participant sent an undecodable reply")
                .with_operation("remote::reply")
                .with_context("participant", self.name.as_str())
                .set_source(e)
        })?;

        Ok(envelope.message.map(|message| match message.kind() {
            MessageKind::Plain => {
                let kind = self.markers.classify(message.content());
                message.with_kind(kind)
            }
            _ => message,
        }))
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Serialize)]
struct ReplyRequest<'a> {
    participant: &'a str,
    messages: &'a [Message],
}

#[derive(Debug, Deserialize)]
struct ReplyEnvelope {
    #[serde(default)]
    message: Option<Message>,
}
