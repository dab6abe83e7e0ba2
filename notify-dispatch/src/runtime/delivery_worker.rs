//! Delivery worker: drains one subscription's FIFO queue.

use crate::dispatcher::DeliveryPipeline;
use crate::observability::events;
use crate::runtime::worker_pool::DeliveryJob;
use std::sync::Arc;
use subscription_cache::SubscriptionId;
use tokio::sync::mpsc::Receiver;
use tracing::{debug, warn};

const COMPONENT: &str = "delivery_worker";

pub(crate) struct DeliveryWorker;

impl DeliveryWorker {
    pub(crate) fn spawn(
        subscription_id: SubscriptionId,
        receiver: Receiver<DeliveryJob>,
        pipeline: Arc<DeliveryPipeline>,
    ) {
        tokio::spawn(Self::run(subscription_id, receiver, pipeline));
    }

    async fn run(
        subscription_id: SubscriptionId,
        mut receiver: Receiver<DeliveryJob>,
        pipeline: Arc<DeliveryPipeline>,
    ) {
        while let Some(job) = receiver.recv().await {
            let report = pipeline
                .execute(job.event.as_ref(), job.subscription.as_ref())
                .await;
            if job.reply.send(report).is_err() {
                warn!(
                    event = events::WORKER_REPLY_DROPPED,
                    component = COMPONENT,
                    subscription_id = %subscription_id,
                    "delivery report receiver dropped"
                );
            }
        }
        debug!(
            event = events::WORKER_DRAINED,
            component = COMPONENT,
            subscription_id = %subscription_id,
            "delivery worker exiting after queue drain"
        );
    }
}
