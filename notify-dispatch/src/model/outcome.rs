//! Terminal delivery outcomes and per-attempt reports.

use crate::model::event::ChangeOperation;
use std::fmt::{Display, Formatter};
use subscription_cache::SubscriptionId;
use uuid::Uuid;

/// Terminal state of one delivery attempt.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DeliveryOutcome {
    Delivered,
    /// Nothing was sent and nothing is wrong: resource gone before fetch, or
    /// no websocket session connected.
    Skipped,
    Failed,
    /// The operation type is not supported by the subscription's channel kind.
    Ignored,
}

impl Display for DeliveryOutcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            DeliveryOutcome::Delivered => "delivered",
            DeliveryOutcome::Skipped => "skipped",
            DeliveryOutcome::Failed => "failed",
            DeliveryOutcome::Ignored => "ignored",
        };
        f.write_str(label)
    }
}

/// Record of one (event, subscription) delivery attempt.
///
/// Carries enough context to diagnose a broken subscriber without consulting
/// logs of unrelated subscriptions.
#[derive(Clone, Debug)]
pub struct DeliveryReport {
    pub attempt_id: Uuid,
    pub subscription_id: SubscriptionId,
    pub destination: String,
    pub operation: ChangeOperation,
    pub outcome: DeliveryOutcome,
    pub error: Option<String>,
}

impl DeliveryReport {
    pub(crate) fn new(
        attempt_id: Uuid,
        subscription_id: SubscriptionId,
        destination: String,
        operation: ChangeOperation,
        outcome: DeliveryOutcome,
    ) -> Self {
        Self {
            attempt_id,
            subscription_id,
            destination,
            operation,
            outcome,
            error: None,
        }
    }

    pub(crate) fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }
}
