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

//! # notify-dispatch
//!
//! `notify-dispatch` implements the change-notification delivery engine: when
//! a resource is created, updated, or deleted, it determines which standing
//! subscriptions match the change and delivers a notification to each
//! subscription's endpoint over that subscription's channel, with a
//! configurable payload strategy.
//!
//! Typical usage is API-first and centered on [`NotificationDispatcher`]: the
//! event source's consumer loop calls
//! [`dispatch`](NotificationDispatcher::dispatch) once per change event and
//! receives one [`DeliveryReport`] per matched subscription. Collaborators —
//! subscription registry, resource store, criteria evaluator, and transport
//! clients — are injected as trait objects.
//!
//! ```
//! use std::sync::Arc;
//! use notify_dispatch::{
//!     ChangeOperation, ChannelTransports, DispatcherConfig, NotificationDispatcher,
//!     ResourceChangeEvent, ResourceIdentity, ResourceTypeCriteria,
//! };
//! # use async_trait::async_trait;
//! # use notify_dispatch::{
//! #     DeliveryOutcome, ResourceStore, RestRequest, RestResponse, RestTransport, StoreError,
//! #     TransportError,
//! # };
//! # use subscription_cache::{
//! #     CanonicalSubscription, ChannelConfig, ChannelKind, RegistryError, SubscriptionId,
//! #     SubscriptionRegistry, SubscriptionStatus,
//! # };
//! #
//! # struct OkTransport;
//! #
//! # #[async_trait]
//! # impl RestTransport for OkTransport {
//! #     async fn execute(&self, _request: RestRequest) -> Result<RestResponse, TransportError> {
//! #         Ok(RestResponse { status: 200 })
//! #     }
//! # }
//! #
//! # struct EmptyStore;
//! #
//! # #[async_trait]
//! # impl ResourceStore for EmptyStore {
//! #     async fn fetch(
//! #         &self,
//! #         _identity: &ResourceIdentity,
//! #     ) -> Result<serde_json::Value, StoreError> {
//! #         Err(StoreError::NotFound)
//! #     }
//! # }
//! #
//! # struct OneSubscription;
//! #
//! # #[async_trait]
//! # impl SubscriptionRegistry for OneSubscription {
//! #     async fn list_active(&self) -> Result<Vec<CanonicalSubscription>, RegistryError> {
//! #         Ok(vec![CanonicalSubscription {
//! #             id: SubscriptionId::new("sub-1"),
//! #             criteria: "Observation?".to_string(),
//! #             status: SubscriptionStatus::Active,
//! #             channel: ChannelConfig {
//! #                 kind: ChannelKind::RestHook,
//! #                 endpoint: "http://sub.example/hook".to_string(),
//! #                 headers: vec![],
//! #                 payload_content_type: Some("application/json".to_string()),
//! #                 deliver_latest_version: false,
//! #                 strip_version_id: false,
//! #             },
//! #         }])
//! #     }
//! # }
//! #
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let dispatcher = NotificationDispatcher::new(
//!     "quick-start",
//!     DispatcherConfig::default(),
//!     Arc::new(OneSubscription),
//!     Arc::new(EmptyStore),
//!     Arc::new(ResourceTypeCriteria),
//!     ChannelTransports::new(Arc::new(OkTransport)),
//! );
//!
//! let event = ResourceChangeEvent::new(
//!     ChangeOperation::Create,
//!     ResourceIdentity::new("Observation", "123"),
//! )
//! .with_snapshot(serde_json::json!({"resourceType": "Observation", "id": "123"}));
//!
//! let reports = dispatcher.dispatch(event).await;
//! assert_eq!(reports.len(), 1);
//! # assert_eq!(reports[0].outcome, DeliveryOutcome::Delivered);
//! # });
//! ```
//!
//! ## Internal architecture map
//!
//! - Dispatcher: outward `dispatch()` surface and fan-out orchestration
//! - Matching: criteria evaluation policy, timeout-bounded and isolated
//! - Payload: snapshot-vs-refetch resolution and the resource-store seam
//! - Channel: per-kind delivery strategies and transport seams
//! - Runtime: per-subscription FIFO workers and queue lifecycle
//!
//! ## Observability model
//!
//! The workspace uses `tracing` for logs/events. Library code emits
//! events/spans and does not unconditionally initialize a global subscriber.
//! Binaries and tests are responsible for one-time `tracing_subscriber`
//! initialization at process boundaries.

mod channel;
pub use channel::http_client::HttpRestTransport;
pub use channel::transport::{
    MailMessage, MailTransport, QueueMessage, QueuePublisher, RestMethod, RestRequest,
    RestResponse, RestTransport, TransportError, WebsocketSessions,
};
pub use channel::ChannelTransports;

mod dispatcher;
pub use dispatcher::{DispatcherConfig, NotificationDispatcher};

mod error;
pub use error::DispatchError;

mod matching;
pub use matching::criteria::{CriteriaError, CriteriaEvaluator, ResourceTypeCriteria};

mod model;
pub use model::{
    ChangeOperation, DeliveryOutcome, DeliveryReport, ResourceChangeEvent, ResourceIdentity,
};

#[doc(hidden)]
pub mod observability;

mod payload;
pub use payload::{PayloadResolver, Resolution, ResolvedContent, ResourceStore, StoreError};

mod runtime;
