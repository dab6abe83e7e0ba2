//! Message-queue channel strategy: publish to a named destination.

use crate::channel::transport::{QueueMessage, QueuePublisher};
use crate::channel::DeliveryChannel;
use crate::error::DispatchError;
use crate::model::{DeliveryOutcome, ResourceChangeEvent};
use crate::observability::events;
use crate::payload::ResolvedContent;
use async_trait::async_trait;
use std::sync::Arc;
use subscription_cache::CanonicalSubscription;
use tracing::{debug, warn};

const COMPONENT: &str = "message_queue_channel";

pub(crate) struct MessageQueueChannel {
    publisher: Arc<dyn QueuePublisher>,
}

impl MessageQueueChannel {
    pub(crate) fn new(publisher: Arc<dyn QueuePublisher>) -> Self {
        Self { publisher }
    }
}

#[async_trait]
impl DeliveryChannel for MessageQueueChannel {
    /// Publishes the delivery message to the configured queue. Redelivery to
    /// consumers is the broker's job; nothing here retries.
    async fn deliver(
        &self,
        event: &ResourceChangeEvent,
        subscription: &CanonicalSubscription,
        content: &ResolvedContent,
    ) -> Result<DeliveryOutcome, DispatchError> {
        let destination = subscription.channel.endpoint.trim();
        if destination.is_empty() {
            return Err(DispatchError::configuration(
                subscription.id.to_string(),
                "message-queue subscription has no destination queue",
            ));
        }

        let encoding = subscription.channel.effective_encoding();
        let (body, content_type) = match (&content.body, encoding) {
            (Some(body), Some(encoding)) => {
                (Some(encoding.render(body)), Some(encoding.content_type()))
            }
            _ => (None, None),
        };

        let message = QueueMessage {
            operation: event.operation.to_string(),
            identity: content.identity.reference(),
            body,
            content_type,
        };

        debug!(
            event = events::QUEUE_PUBLISH,
            component = COMPONENT,
            subscription_id = %subscription.id,
            destination = %destination,
            operation = %event.operation,
            "publishing delivery message"
        );

        match self.publisher.publish(destination, message).await {
            Ok(()) => Ok(DeliveryOutcome::Delivered),
            Err(err) => {
                warn!(
                    event = events::QUEUE_PUBLISH_FAILED,
                    component = COMPONENT,
                    subscription_id = %subscription.id,
                    destination = %destination,
                    err = %err,
                    "queue publish failed"
                );
                Err(DispatchError::delivery(destination, err.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::MessageQueueChannel;
    use crate::channel::transport::{QueueMessage, QueuePublisher, TransportError};
    use crate::channel::DeliveryChannel;
    use crate::error::DispatchError;
    use crate::model::{ChangeOperation, DeliveryOutcome, ResourceChangeEvent, ResourceIdentity};
    use crate::payload::ResolvedContent;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Arc;
    use std::sync::Mutex as StdMutex;
    use subscription_cache::{
        CanonicalSubscription, ChannelConfig, ChannelKind, SubscriptionId, SubscriptionStatus,
    };

    #[derive(Default)]
    struct RecordingPublisher {
        published: StdMutex<Vec<(String, QueueMessage)>>,
        fail: bool,
    }

    #[async_trait]
    impl QueuePublisher for RecordingPublisher {
        async fn publish(
            &self,
            destination: &str,
            message: QueueMessage,
        ) -> Result<(), TransportError> {
            if self.fail {
                return Err(TransportError::new("broker unavailable"));
            }
            self.published
                .lock()
                .expect("lock published")
                .push((destination.to_string(), message));
            Ok(())
        }
    }

    fn subscription(endpoint: &str, payload_content_type: Option<&str>) -> CanonicalSubscription {
        CanonicalSubscription {
            id: SubscriptionId::new("sub-q"),
            criteria: "Observation?".to_string(),
            status: SubscriptionStatus::Active,
            channel: ChannelConfig {
                kind: ChannelKind::MessageQueue,
                endpoint: endpoint.to_string(),
                headers: vec![],
                payload_content_type: payload_content_type.map(str::to_string),
                deliver_latest_version: false,
                strip_version_id: false,
            },
        }
    }

    fn update_event() -> ResourceChangeEvent {
        ResourceChangeEvent::new(
            ChangeOperation::Update,
            ResourceIdentity::new("Observation", "123"),
        )
    }

    #[tokio::test]
    async fn publishes_encoded_message_to_named_destination() {
        let publisher = Arc::new(RecordingPublisher::default());
        let channel = MessageQueueChannel::new(publisher.clone());

        let outcome = channel
            .deliver(
                &update_event(),
                &subscription("observation-changes", Some("application/json")),
                &ResolvedContent {
                    identity: ResourceIdentity::new("Observation", "123"),
                    body: Some(json!({"id": "123"})),
                },
            )
            .await
            .expect("publish succeeds");

        assert_eq!(outcome, DeliveryOutcome::Delivered);
        let published = publisher.published.lock().expect("lock published");
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].0, "observation-changes");
        assert_eq!(published[0].1.operation, "update");
        assert_eq!(published[0].1.identity, "Observation/123");
        assert!(published[0].1.body.is_some());
    }

    #[tokio::test]
    async fn missing_destination_is_a_configuration_error() {
        let channel = MessageQueueChannel::new(Arc::new(RecordingPublisher::default()));

        let delivered = channel
            .deliver(
                &update_event(),
                &subscription("", Some("application/json")),
                &ResolvedContent {
                    identity: ResourceIdentity::new("Observation", "123"),
                    body: None,
                },
            )
            .await;

        assert!(matches!(
            delivered,
            Err(DispatchError::Configuration { .. })
        ));
    }

    #[tokio::test]
    async fn broker_failure_surfaces_as_delivery_failure() {
        let publisher = Arc::new(RecordingPublisher {
            published: StdMutex::new(vec![]),
            fail: true,
        });
        let channel = MessageQueueChannel::new(publisher);

        let delivered = channel
            .deliver(
                &update_event(),
                &subscription("observation-changes", None),
                &ResolvedContent {
                    identity: ResourceIdentity::new("Observation", "123"),
                    body: None,
                },
            )
            .await;

        assert!(matches!(delivered, Err(DispatchError::Delivery { .. })));
    }
}
