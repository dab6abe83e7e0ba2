//! Websocket channel strategy: push to live sessions for the subscription.

use crate::channel::transport::WebsocketSessions;
use crate::channel::DeliveryChannel;
use crate::error::DispatchError;
use crate::model::{DeliveryOutcome, ResourceChangeEvent};
use crate::observability::events;
use crate::payload::ResolvedContent;
use async_trait::async_trait;
use std::sync::Arc;
use subscription_cache::CanonicalSubscription;
use tracing::debug;

const COMPONENT: &str = "websocket_channel";

pub(crate) struct WebsocketChannel {
    sessions: Arc<dyn WebsocketSessions>,
}

impl WebsocketChannel {
    pub(crate) fn new(sessions: Arc<dyn WebsocketSessions>) -> Self {
        Self { sessions }
    }
}

#[async_trait]
impl DeliveryChannel for WebsocketChannel {
    /// Pushes the delivery identity to every connected session. Sessions are
    /// ephemeral: zero connected sessions is a skip, not a failure.
    async fn deliver(
        &self,
        _event: &ResourceChangeEvent,
        subscription: &CanonicalSubscription,
        content: &ResolvedContent,
    ) -> Result<DeliveryOutcome, DispatchError> {
        let notification = content.identity.reference();

        match self.sessions.push(&subscription.id, &notification).await {
            Ok(0) => {
                debug!(
                    event = events::WEBSOCKET_NO_SESSIONS,
                    component = COMPONENT,
                    subscription_id = %subscription.id,
                    "no connected sessions, skipping"
                );
                Ok(DeliveryOutcome::Skipped)
            }
            Ok(reached) => {
                debug!(
                    event = events::WEBSOCKET_PUSH,
                    component = COMPONENT,
                    subscription_id = %subscription.id,
                    reached,
                    "pushed notification to connected sessions"
                );
                Ok(DeliveryOutcome::Delivered)
            }
            Err(err) => Err(DispatchError::delivery(
                format!("websocket:{}", subscription.id),
                err.to_string(),
            )),
        }
    }
}
