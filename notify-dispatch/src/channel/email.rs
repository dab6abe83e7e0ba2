//! Email-notify channel strategy: contentless notification over mail.

use crate::channel::transport::{MailMessage, MailTransport};
use crate::channel::DeliveryChannel;
use crate::error::DispatchError;
use crate::model::{DeliveryOutcome, ResourceChangeEvent};
use crate::observability::events;
use crate::payload::ResolvedContent;
use async_trait::async_trait;
use std::sync::Arc;
use subscription_cache::CanonicalSubscription;
use tracing::debug;

const COMPONENT: &str = "email_channel";

pub(crate) struct EmailChannel {
    mail: Arc<dyn MailTransport>,
}

impl EmailChannel {
    pub(crate) fn new(mail: Arc<dyn MailTransport>) -> Self {
        Self { mail }
    }
}

#[async_trait]
impl DeliveryChannel for EmailChannel {
    /// Always payload-less: resolved content is deliberately not carried.
    async fn deliver(
        &self,
        _event: &ResourceChangeEvent,
        subscription: &CanonicalSubscription,
        _content: &ResolvedContent,
    ) -> Result<DeliveryOutcome, DispatchError> {
        let message = MailMessage {
            to: subscription.channel.endpoint.clone(),
            subject: format!(
                "Resource change notification for subscription {}",
                subscription.id
            ),
        };

        debug!(
            event = events::MAIL_NOTIFY,
            component = COMPONENT,
            subscription_id = %subscription.id,
            to = %message.to,
            "sending mail notification"
        );

        self.mail.send(message).await.map_err(|err| {
            DispatchError::delivery(subscription.channel.endpoint.clone(), err.to_string())
        })?;

        Ok(DeliveryOutcome::Delivered)
    }
}
