//! Canonical, version-independent subscription model.

use crate::encoding::PayloadEncoding;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use tracing::warn;

/// Stable subscription identifier, independent of any definition version.
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubscriptionId(String);

impl SubscriptionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for SubscriptionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SubscriptionStatus {
    Active,
    Off,
}

/// Closed set of delivery channel kinds.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChannelKind {
    RestHook,
    MessageQueue,
    Websocket,
    EmailNotify,
}

impl ChannelKind {
    /// Channel kinds that cannot deliver without a configured destination.
    pub fn requires_endpoint(&self) -> bool {
        matches!(self, ChannelKind::RestHook | ChannelKind::MessageQueue)
    }
}

impl Display for ChannelKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ChannelKind::RestHook => "rest-hook",
            ChannelKind::MessageQueue => "message-queue",
            ChannelKind::Websocket => "websocket",
            ChannelKind::EmailNotify => "email-notify",
        };
        f.write_str(label)
    }
}

/// Delivery channel configuration carried by a subscription definition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChannelConfig {
    pub kind: ChannelKind,
    /// Destination endpoint: URL for rest-hook, queue name for message-queue,
    /// mail address for email-notify. Unused by websocket channels.
    #[serde(default)]
    pub endpoint: String,
    /// Free-form outbound header lines, `"Name: value"` per entry.
    #[serde(default)]
    pub headers: Vec<String>,
    /// Raw payload content type as configured, e.g. `application/json; charset=utf-8`.
    /// Absent means the channel carries no payload.
    #[serde(default)]
    pub payload_content_type: Option<String>,
    /// Always re-fetch current resource state instead of using the event snapshot.
    #[serde(default)]
    pub deliver_latest_version: bool,
    /// Remove the version component of the resource identity before delivery.
    #[serde(default)]
    pub strip_version_id: bool,
}

impl ChannelConfig {
    /// Structured encoding mapped from the configured content type, if any.
    pub fn effective_encoding(&self) -> Option<PayloadEncoding> {
        self.payload_content_type
            .as_deref()
            .and_then(PayloadEncoding::from_content_type)
    }

    /// Parses the free-form header lines into name/value pairs.
    ///
    /// Blank lines are skipped. Lines without a `:` separator or with an empty
    /// name are dropped with a warning.
    pub fn parsed_headers(&self) -> Vec<(String, String)> {
        self.headers
            .iter()
            .filter_map(|line| parse_header_line(line))
            .collect()
    }
}

fn parse_header_line(line: &str) -> Option<(String, String)> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    match trimmed.split_once(':') {
        Some((name, value)) if !name.trim().is_empty() => {
            Some((name.trim().to_string(), value.trim().to_string()))
        }
        _ => {
            warn!(header = trimmed, "dropping malformed outbound header line");
            None
        }
    }
}

/// Normalized, version-independent representation of a subscription definition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CanonicalSubscription {
    pub id: SubscriptionId,
    /// Opaque match predicate expression; evaluated only by the matcher's
    /// criteria collaborator, never interpreted here.
    pub criteria: String,
    pub status: SubscriptionStatus,
    pub channel: ChannelConfig,
}

impl CanonicalSubscription {
    pub fn is_active(&self) -> bool {
        self.status == SubscriptionStatus::Active
    }
}
