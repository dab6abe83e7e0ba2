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

//! Channel layer.
//!
//! One strategy per channel kind behind a uniform delivery interface. The
//! kind set is closed: rest-hook, message-queue, websocket, email-notify.
//! Strategies own protocol mapping and failure classification; the actual
//! wire clients stay behind the [`transport`] seams so deployments and tests
//! plug their own.

use crate::error::DispatchError;
use crate::model::{DeliveryOutcome, ResourceChangeEvent};
use crate::payload::ResolvedContent;
use async_trait::async_trait;
use std::sync::Arc;
use subscription_cache::{CanonicalSubscription, ChannelKind};

pub mod http_client;
pub mod transport;

pub(crate) mod email;
pub(crate) mod message_queue;
pub(crate) mod rest_hook;
pub(crate) mod websocket;

use self::transport::{MailTransport, QueuePublisher, RestTransport, WebsocketSessions};

/// Uniform delivery interface implemented by each channel strategy.
#[async_trait]
pub(crate) trait DeliveryChannel: Send + Sync {
    async fn deliver(
        &self,
        event: &ResourceChangeEvent,
        subscription: &CanonicalSubscription,
        content: &ResolvedContent,
    ) -> Result<DeliveryOutcome, DispatchError>;
}

/// Transport clients injected into the channel strategies.
///
/// The rest transport is required; the remaining channels are optional, and a
/// delivery to an unconfigured channel kind fails fast as a configuration
/// error.
pub struct ChannelTransports {
    rest: Arc<dyn RestTransport>,
    queue: Option<Arc<dyn QueuePublisher>>,
    websocket: Option<Arc<dyn WebsocketSessions>>,
    mail: Option<Arc<dyn MailTransport>>,
}

impl ChannelTransports {
    pub fn new(rest: Arc<dyn RestTransport>) -> Self {
        Self {
            rest,
            queue: None,
            websocket: None,
            mail: None,
        }
    }

    pub fn with_queue(mut self, queue: Arc<dyn QueuePublisher>) -> Self {
        self.queue = Some(queue);
        self
    }

    pub fn with_websocket(mut self, websocket: Arc<dyn WebsocketSessions>) -> Self {
        self.websocket = Some(websocket);
        self
    }

    pub fn with_mail(mut self, mail: Arc<dyn MailTransport>) -> Self {
        self.mail = Some(mail);
        self
    }
}

/// Closed set of channel strategies keyed by [`ChannelKind`].
pub(crate) struct ChannelSet {
    rest_hook: rest_hook::RestHookChannel,
    message_queue: Option<message_queue::MessageQueueChannel>,
    websocket: Option<websocket::WebsocketChannel>,
    email: Option<email::EmailChannel>,
}

impl ChannelSet {
    pub(crate) fn new(transports: ChannelTransports) -> Self {
        Self {
            rest_hook: rest_hook::RestHookChannel::new(transports.rest),
            message_queue: transports
                .queue
                .map(message_queue::MessageQueueChannel::new),
            websocket: transports.websocket.map(websocket::WebsocketChannel::new),
            email: transports.mail.map(email::EmailChannel::new),
        }
    }

    pub(crate) fn channel_for(
        &self,
        subscription: &CanonicalSubscription,
    ) -> Result<&dyn DeliveryChannel, DispatchError> {
        let channel: Option<&dyn DeliveryChannel> = match subscription.channel.kind {
            ChannelKind::RestHook => Some(&self.rest_hook),
            ChannelKind::MessageQueue => self
                .message_queue
                .as_ref()
                .map(|channel| channel as &dyn DeliveryChannel),
            ChannelKind::Websocket => self
                .websocket
                .as_ref()
                .map(|channel| channel as &dyn DeliveryChannel),
            ChannelKind::EmailNotify => self
                .email
                .as_ref()
                .map(|channel| channel as &dyn DeliveryChannel),
        };

        channel.ok_or_else(|| {
            DispatchError::configuration(
                subscription.id.to_string(),
                format!(
                    "no transport configured for {} channel",
                    subscription.channel.kind
                ),
            )
        })
    }
}
