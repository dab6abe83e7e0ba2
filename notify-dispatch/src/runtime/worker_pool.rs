//! Per-subscription delivery worker pool with bounded FIFO queues.

use crate::dispatcher::DeliveryPipeline;
use crate::model::{DeliveryReport, ResourceChangeEvent};
use crate::observability::events;
use crate::runtime::delivery_worker::DeliveryWorker;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use subscription_cache::{CanonicalSubscription, SubscriptionId};
use tokio::sync::mpsc::{self, Sender};
use tokio::sync::{oneshot, Mutex};
use tracing::debug;

const COMPONENT: &str = "worker_pool";

/// One queued delivery attempt for a single subscription.
pub(crate) struct DeliveryJob {
    pub(crate) event: Arc<ResourceChangeEvent>,
    pub(crate) subscription: Arc<CanonicalSubscription>,
    pub(crate) reply: oneshot::Sender<DeliveryReport>,
}

/// Registry of per-subscription workers.
///
/// Each subscription gets one logical worker draining a bounded FIFO queue,
/// which preserves event order for that subscriber while subscriptions run
/// concurrently with respect to each other. Enqueueing on a full queue awaits,
/// exerting backpressure on the dispatcher.
pub(crate) struct DeliveryWorkers {
    queue_capacity: usize,
    pipeline: Arc<DeliveryPipeline>,
    pub(crate) workers: Mutex<HashMap<SubscriptionId, Sender<DeliveryJob>>>,
}

impl DeliveryWorkers {
    pub(crate) fn new(queue_capacity: usize, pipeline: Arc<DeliveryPipeline>) -> Self {
        Self {
            queue_capacity,
            pipeline,
            workers: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the FIFO job sender for a subscription, spawning its worker on
    /// first use.
    pub(crate) async fn sender_for(&self, subscription_id: &SubscriptionId) -> Sender<DeliveryJob> {
        let mut workers = self.workers.lock().await;

        if let Some(sender) = workers.get(subscription_id) {
            if !sender.is_closed() {
                return sender.clone();
            }
        }

        debug!(
            event = events::WORKER_SPAWNED,
            component = COMPONENT,
            subscription_id = %subscription_id,
            "spawning delivery worker"
        );
        let (sender, receiver) = mpsc::channel(self.queue_capacity);
        DeliveryWorker::spawn(subscription_id.clone(), receiver, self.pipeline.clone());
        workers.insert(subscription_id.clone(), sender.clone());
        sender
    }

    /// Retires workers for subscriptions that left the active set.
    ///
    /// Queued and in-flight jobs drain before a retired worker exits; nothing
    /// is cancelled.
    pub(crate) async fn retain_active(&self, active: &HashSet<SubscriptionId>) {
        let mut workers = self.workers.lock().await;
        workers.retain(|subscription_id, _sender| {
            let keep = active.contains(subscription_id);
            if !keep {
                debug!(
                    event = events::WORKER_RETIRED,
                    component = COMPONENT,
                    subscription_id = %subscription_id,
                    "retiring delivery worker"
                );
            }
            keep
        });
    }
}

#[cfg(test)]
mod tests {
    use super::DeliveryWorkers;
    use crate::channel::transport::{RestRequest, RestResponse, RestTransport, TransportError};
    use crate::channel::{ChannelSet, ChannelTransports};
    use crate::dispatcher::DeliveryPipeline;
    use crate::model::{ChangeOperation, DeliveryOutcome, ResourceChangeEvent, ResourceIdentity};
    use crate::payload::{PayloadResolver, ResourceStore, StoreError};
    use crate::runtime::worker_pool::DeliveryJob;
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::sync::Mutex as StdMutex;
    use std::time::Duration;
    use subscription_cache::{
        CanonicalSubscription, ChannelConfig, ChannelKind, SubscriptionId, SubscriptionStatus,
    };
    use tokio::sync::{oneshot, Semaphore};

    struct NoStore;

    #[async_trait]
    impl ResourceStore for NoStore {
        async fn fetch(
            &self,
            _identity: &ResourceIdentity,
        ) -> Result<serde_json::Value, StoreError> {
            Err(StoreError::NotFound)
        }
    }

    struct SlowRecordingTransport {
        urls: StdMutex<Vec<String>>,
    }

    #[async_trait]
    impl RestTransport for SlowRecordingTransport {
        async fn execute(&self, request: RestRequest) -> Result<RestResponse, TransportError> {
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.urls.lock().expect("lock urls").push(request.url);
            Ok(RestResponse { status: 200 })
        }
    }

    fn pipeline(transport: Arc<dyn RestTransport>) -> Arc<DeliveryPipeline> {
        Arc::new(DeliveryPipeline::new(
            PayloadResolver::new(Arc::new(NoStore)),
            ChannelSet::new(ChannelTransports::new(transport)),
            Duration::from_secs(5),
            Arc::new(Semaphore::new(4)),
        ))
    }

    fn subscription(id: &str) -> Arc<CanonicalSubscription> {
        Arc::new(CanonicalSubscription {
            id: SubscriptionId::new(id),
            criteria: "Observation?".to_string(),
            status: SubscriptionStatus::Active,
            channel: ChannelConfig {
                kind: ChannelKind::RestHook,
                endpoint: "http://sub.example/hook".to_string(),
                headers: vec![],
                payload_content_type: Some("application/json".to_string()),
                deliver_latest_version: false,
                strip_version_id: false,
            },
        })
    }

    fn event(id: &str) -> Arc<ResourceChangeEvent> {
        Arc::new(
            ResourceChangeEvent::new(
                ChangeOperation::Create,
                ResourceIdentity::new("Observation", id),
            )
            .with_snapshot(serde_json::json!({"id": id})),
        )
    }

    #[tokio::test]
    async fn jobs_for_one_subscription_deliver_in_enqueue_order() {
        let transport = Arc::new(SlowRecordingTransport {
            urls: StdMutex::new(vec![]),
        });
        let pool = DeliveryWorkers::new(8, pipeline(transport.clone()));
        let subscription = subscription("sub-1");

        let sender = pool.sender_for(&subscription.id).await;
        let mut replies = vec![];
        for resource_id in ["first", "second", "third"] {
            let (reply, receiver) = oneshot::channel();
            sender
                .send(DeliveryJob {
                    event: event(resource_id),
                    subscription: subscription.clone(),
                    reply,
                })
                .await
                .expect("enqueue succeeds");
            replies.push(receiver);
        }

        for receiver in replies {
            let report = receiver.await.expect("report arrives");
            assert_eq!(report.outcome, DeliveryOutcome::Delivered);
        }

        assert_eq!(
            *transport.urls.lock().expect("lock urls"),
            vec![
                "http://sub.example/hook/Observation/first".to_string(),
                "http://sub.example/hook/Observation/second".to_string(),
                "http://sub.example/hook/Observation/third".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn sender_is_reused_for_the_same_subscription() {
        let transport = Arc::new(SlowRecordingTransport {
            urls: StdMutex::new(vec![]),
        });
        let pool = DeliveryWorkers::new(8, pipeline(transport));
        let subscription_id = SubscriptionId::new("sub-1");

        let sender_a = pool.sender_for(&subscription_id).await;
        let sender_b = pool.sender_for(&subscription_id).await;

        assert!(sender_a.same_channel(&sender_b));
        assert_eq!(pool.workers.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn retain_active_retires_departed_subscriptions() {
        let transport = Arc::new(SlowRecordingTransport {
            urls: StdMutex::new(vec![]),
        });
        let pool = DeliveryWorkers::new(8, pipeline(transport));

        pool.sender_for(&SubscriptionId::new("sub-keep")).await;
        pool.sender_for(&SubscriptionId::new("sub-drop")).await;

        let mut active = HashSet::new();
        active.insert(SubscriptionId::new("sub-keep"));
        pool.retain_active(&active).await;

        let workers = pool.workers.lock().await;
        assert_eq!(workers.len(), 1);
        assert!(workers.contains_key(&SubscriptionId::new("sub-keep")));
    }
}
