//! Pluggable transport-client seams consumed by the channel strategies.

use async_trait::async_trait;
use std::error::Error;
use std::fmt::{Display, Formatter};
use subscription_cache::SubscriptionId;

/// Failure inside a transport client.
#[derive(Debug)]
pub struct TransportError {
    detail: String,
}

impl TransportError {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

impl Display for TransportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.detail)
    }
}

impl Error for TransportError {}

/// Outbound verb for a rest-hook request.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RestMethod {
    Post,
    Put,
    Delete,
}

impl RestMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            RestMethod::Post => "POST",
            RestMethod::Put => "PUT",
            RestMethod::Delete => "DELETE",
        }
    }
}

/// One fully resolved rest-hook request.
#[derive(Clone, Debug, PartialEq)]
pub struct RestRequest {
    pub method: RestMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
    pub content_type: Option<&'static str>,
}

#[derive(Clone, Copy, Debug)]
pub struct RestResponse {
    pub status: u16,
}

impl RestResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Generic HTTP client able to carry custom verbs, headers, and bodies.
#[async_trait]
pub trait RestTransport: Send + Sync {
    async fn execute(&self, request: RestRequest) -> Result<RestResponse, TransportError>;
}

/// Message published to a named queue destination.
#[derive(Clone, Debug, PartialEq)]
pub struct QueueMessage {
    pub operation: String,
    pub identity: String,
    pub body: Option<String>,
    pub content_type: Option<&'static str>,
}

#[async_trait]
pub trait QueuePublisher: Send + Sync {
    async fn publish(
        &self,
        destination: &str,
        message: QueueMessage,
    ) -> Result<(), TransportError>;
}

/// Registry of live websocket sessions keyed by subscription id.
#[async_trait]
pub trait WebsocketSessions: Send + Sync {
    /// Pushes a notification to every session registered for the
    /// subscription. Returns the number of sessions reached.
    async fn push(
        &self,
        subscription_id: &SubscriptionId,
        notification: &str,
    ) -> Result<usize, TransportError>;
}

/// Contentless mail notification.
#[derive(Clone, Debug, PartialEq)]
pub struct MailMessage {
    pub to: String,
    pub subject: String,
}

#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, message: MailMessage) -> Result<(), TransportError>;
}
