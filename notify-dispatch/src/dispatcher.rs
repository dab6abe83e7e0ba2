/********************************************************************************
 * Copyright (c) 2026 Contributors to the Eclipse Foundation
 *
 * See the NOTICE file(s) distributed with this work for additional
 * information regarding copyright ownership.
 *
 * This program and the accompanying materials are made available under the
 * terms of the Apache License Version 2.0 which is available at
 * https://www.apache.org/licenses/LICENSE-2.0
 *
 * SPDX-License-Identifier: Apache-2.0
 ********************************************************************************/

//! Orchestrator: event → matching subscriptions → isolated deliveries.

use crate::channel::{ChannelSet, ChannelTransports};
use crate::error::DispatchError;
use crate::matching::criteria::CriteriaEvaluator;
use crate::matching::matcher::SubscriptionMatcher;
use crate::model::{DeliveryOutcome, DeliveryReport, ResourceChangeEvent};
use crate::observability::events;
use crate::payload::{PayloadResolver, Resolution, ResourceStore};
use crate::runtime::worker_pool::{DeliveryJob, DeliveryWorkers};
use futures::future::join_all;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use subscription_cache::{
    CanonicalSubscription, ChannelKind, SubscriptionCache, SubscriptionId, SubscriptionRegistry,
};
use tokio::sync::{oneshot, Semaphore};
use tokio::time::timeout;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

const COMPONENT: &str = "dispatcher";

/// Tuning knobs for a [`NotificationDispatcher`].
#[derive(Clone, Debug)]
pub struct DispatcherConfig {
    /// Bounded FIFO queue depth per subscription worker.
    pub queue_capacity: usize,
    /// Cap on simultaneous outbound deliveries across all subscriptions.
    pub max_inflight_deliveries: usize,
    /// Budget for one criteria evaluation.
    pub match_timeout: Duration,
    /// Budget for one delivery attempt, payload resolution and transport
    /// call included.
    pub delivery_timeout: Duration,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 16,
            max_inflight_deliveries: 8,
            match_timeout: Duration::from_secs(1),
            delivery_timeout: Duration::from_secs(30),
        }
    }
}

pub(crate) fn destination_label(subscription: &CanonicalSubscription) -> String {
    match subscription.channel.kind {
        ChannelKind::Websocket => format!("websocket:{}", subscription.id),
        _ => subscription.channel.endpoint.clone(),
    }
}

/// Executes one (event, subscription) attempt through the
/// matched → resolving-payload → delivering → terminal state machine.
///
/// No attempt transitions backward and terminal states are final; there is no
/// internal retry. The upstream event source redelivers at-least-once and the
/// rest-hook verb mapping is idempotent, so replays converge instead of
/// duplicating downstream state.
pub(crate) struct DeliveryPipeline {
    resolver: PayloadResolver,
    channels: ChannelSet,
    delivery_timeout: Duration,
    inflight: Arc<Semaphore>,
}

impl DeliveryPipeline {
    pub(crate) fn new(
        resolver: PayloadResolver,
        channels: ChannelSet,
        delivery_timeout: Duration,
        inflight: Arc<Semaphore>,
    ) -> Self {
        Self {
            resolver,
            channels,
            delivery_timeout,
            inflight,
        }
    }

    pub(crate) async fn execute(
        &self,
        event: &ResourceChangeEvent,
        subscription: &CanonicalSubscription,
    ) -> DeliveryReport {
        let attempt_id = Uuid::new_v4();
        let destination = destination_label(subscription);

        let _permit = match self.inflight.acquire().await {
            Ok(permit) => permit,
            Err(_closed) => {
                return DeliveryReport::new(
                    attempt_id,
                    subscription.id.clone(),
                    destination,
                    event.operation,
                    DeliveryOutcome::Failed,
                )
                .with_error("delivery pool closed");
            }
        };

        let report = match self.attempt(event, subscription, &destination).await {
            Ok(outcome) => DeliveryReport::new(
                attempt_id,
                subscription.id.clone(),
                destination,
                event.operation,
                outcome,
            ),
            Err(err) => {
                error!(
                    event = events::DELIVERY_ATTEMPT_FAILED,
                    component = COMPONENT,
                    attempt_id = %attempt_id,
                    subscription_id = %subscription.id,
                    destination = %destination,
                    operation = %event.operation,
                    err = %err,
                    "delivery attempt failed"
                );
                DeliveryReport::new(
                    attempt_id,
                    subscription.id.clone(),
                    destination,
                    event.operation,
                    DeliveryOutcome::Failed,
                )
                .with_error(err.to_string())
            }
        };

        info!(
            event = events::DELIVERY_OUTCOME,
            component = COMPONENT,
            attempt_id = %report.attempt_id,
            subscription_id = %report.subscription_id,
            destination = %report.destination,
            operation = %report.operation,
            outcome = %report.outcome,
            "delivery attempt finished"
        );
        report
    }

    async fn attempt(
        &self,
        event: &ResourceChangeEvent,
        subscription: &CanonicalSubscription,
        destination: &str,
    ) -> Result<DeliveryOutcome, DispatchError> {
        Self::validate(subscription)?;
        let channel = self.channels.channel_for(subscription)?;

        let content = match self.resolver.resolve(event, subscription).await? {
            Resolution::Gone => return Ok(DeliveryOutcome::Skipped),
            Resolution::Content(content) => content,
        };

        match timeout(
            self.delivery_timeout,
            channel.deliver(event, subscription, &content),
        )
        .await
        {
            Ok(delivered) => delivered,
            Err(_elapsed) => Err(DispatchError::delivery(
                destination,
                format!(
                    "delivery timed out after {}ms",
                    self.delivery_timeout.as_millis()
                ),
            )),
        }
    }

    fn validate(subscription: &CanonicalSubscription) -> Result<(), DispatchError> {
        if subscription.channel.kind.requires_endpoint()
            && subscription.channel.endpoint.trim().is_empty()
        {
            return Err(DispatchError::configuration(
                subscription.id.to_string(),
                format!(
                    "{} subscription requires a non-empty endpoint",
                    subscription.channel.kind
                ),
            ));
        }
        Ok(())
    }
}

/// Change-notification dispatcher.
///
/// The single entry point for the event source's consumer loop: each call to
/// [`dispatch`](NotificationDispatcher::dispatch) re-reads the subscription
/// registry, matches the event against the active set, and fans deliveries
/// out to per-subscription workers. Failures stay contained per
/// (event, subscription) pair.
pub struct NotificationDispatcher {
    name: String,
    registry: Arc<dyn SubscriptionRegistry>,
    cache: SubscriptionCache,
    matcher: SubscriptionMatcher,
    workers: DeliveryWorkers,
}

impl NotificationDispatcher {
    pub fn new(
        name: &str,
        config: DispatcherConfig,
        registry: Arc<dyn SubscriptionRegistry>,
        store: Arc<dyn ResourceStore>,
        evaluator: Arc<dyn CriteriaEvaluator>,
        transports: ChannelTransports,
    ) -> Self {
        let pipeline = Arc::new(DeliveryPipeline::new(
            PayloadResolver::new(store),
            ChannelSet::new(transports),
            config.delivery_timeout,
            Arc::new(Semaphore::new(config.max_inflight_deliveries)),
        ));

        Self {
            name: name.to_string(),
            registry,
            cache: SubscriptionCache::new(),
            matcher: SubscriptionMatcher::new(evaluator, config.match_timeout),
            workers: DeliveryWorkers::new(config.queue_capacity, pipeline),
        }
    }

    /// Dispatches one change event to every matching active subscription.
    ///
    /// Returns one report per matched subscription. Deliveries to different
    /// subscriptions run concurrently with no ordering guarantees between
    /// them; deliveries to the same subscription keep event order. A failure
    /// in one attempt never aborts the others.
    pub async fn dispatch(&self, event: ResourceChangeEvent) -> Vec<DeliveryReport> {
        let event = Arc::new(event);

        if let Err(err) = self.cache.refresh(self.registry.as_ref()).await {
            warn!(
                event = events::REGISTRY_REFRESH_FAILED,
                component = COMPONENT,
                dispatcher = %self.name,
                err = %err,
                "registry refresh failed, dispatching on previous snapshot"
            );
        }
        let snapshot = self.cache.active_snapshot();

        let active_ids: HashSet<SubscriptionId> = snapshot
            .iter()
            .map(|subscription| subscription.id.clone())
            .collect();
        self.workers.retain_active(&active_ids).await;

        let matched = self
            .matcher
            .matching_subscriptions(event.as_ref(), &snapshot)
            .await;
        debug!(
            event = events::EVENT_MATCHED,
            component = COMPONENT,
            dispatcher = %self.name,
            operation = %event.operation,
            identity = %event.identity,
            matched = matched.len(),
            "matched subscriptions for change event"
        );

        let mut reports = Vec::with_capacity(matched.len());
        let mut pending = Vec::with_capacity(matched.len());
        for subscription in matched {
            let (reply, receiver) = oneshot::channel();
            let job = DeliveryJob {
                event: event.clone(),
                subscription: subscription.clone(),
                reply,
            };
            let sender = self.workers.sender_for(&subscription.id).await;
            if sender.send(job).await.is_err() {
                reports.push(
                    DeliveryReport::new(
                        Uuid::new_v4(),
                        subscription.id.clone(),
                        destination_label(&subscription),
                        event.operation,
                        DeliveryOutcome::Failed,
                    )
                    .with_error("delivery worker unavailable"),
                );
                continue;
            }
            pending.push((subscription, receiver));
        }

        let operation = event.operation;
        let collected = join_all(pending.into_iter().map(|(subscription, receiver)| {
            async move {
                receiver.await.unwrap_or_else(|_| {
                    DeliveryReport::new(
                        Uuid::new_v4(),
                        subscription.id.clone(),
                        destination_label(&subscription),
                        operation,
                        DeliveryOutcome::Failed,
                    )
                    .with_error("delivery worker dropped before reporting")
                })
            }
        }))
        .await;

        reports.extend(collected);
        reports
    }
}
