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

//! # subscription-cache
//!
//! Canonical subscription model and the active-set snapshot cache consumed by
//! the delivery engine.
//!
//! A [`CanonicalSubscription`] is the normalized, version-independent form of a
//! subscription definition: identity, opaque match criteria, status, and the
//! channel configuration describing where and how notifications are delivered.
//! Definitions are owned by an external administrative API and are read-only
//! here; the engine sees them through the [`SubscriptionRegistry`] seam and the
//! [`SubscriptionCache`], which publishes an immutable snapshot of the active
//! set once per dispatch cycle.
//!
//! ```
//! use subscription_cache::{
//!     CanonicalSubscription, ChannelConfig, ChannelKind, SubscriptionId, SubscriptionStatus,
//! };
//!
//! let subscription = CanonicalSubscription {
//!     id: SubscriptionId::new("sub-1"),
//!     criteria: "Observation?status=final".to_string(),
//!     status: SubscriptionStatus::Active,
//!     channel: ChannelConfig {
//!         kind: ChannelKind::RestHook,
//!         endpoint: "http://sub.example/hook".to_string(),
//!         headers: vec!["Authorization: Bearer token".to_string()],
//!         payload_content_type: Some("application/json; charset=utf-8".to_string()),
//!         deliver_latest_version: false,
//!         strip_version_id: true,
//!     },
//! };
//!
//! assert!(subscription.is_active());
//! assert!(subscription.channel.effective_encoding().is_some());
//! ```

mod canonical;
pub use canonical::{
    CanonicalSubscription, ChannelConfig, ChannelKind, SubscriptionId, SubscriptionStatus,
};

mod encoding;
pub use encoding::PayloadEncoding;

mod registry;
pub use registry::{RegistryError, SubscriptionRegistry};

mod cache;
pub use cache::SubscriptionCache;
