//! Error taxonomy for single delivery attempts.

use std::error::Error;
use std::fmt;
use std::fmt::{Display, Formatter};

/// Failure raised while processing one (event, subscription) pair.
///
/// Errors never cross attempt boundaries: the dispatcher catches, classifies,
/// and records them per attempt, so a failure here cannot affect sibling
/// deliveries or the event source.
#[derive(Debug)]
pub enum DispatchError {
    /// Criteria evaluation failure; treated as no-match, never fatal.
    Match { subscription: String, detail: String },
    /// Payload resolution failure other than resource-gone.
    Fetch { identity: String, detail: String },
    /// Transport or protocol failure while delivering.
    Delivery {
        destination: String,
        detail: String,
    },
    /// Subscription configuration rejected before any delivery was attempted.
    Configuration {
        subscription: String,
        detail: String,
    },
}

impl DispatchError {
    pub(crate) fn match_failure(
        subscription: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        DispatchError::Match {
            subscription: subscription.into(),
            detail: detail.into(),
        }
    }

    pub(crate) fn fetch(identity: impl Into<String>, detail: impl Into<String>) -> Self {
        DispatchError::Fetch {
            identity: identity.into(),
            detail: detail.into(),
        }
    }

    pub(crate) fn delivery(destination: impl Into<String>, detail: impl Into<String>) -> Self {
        DispatchError::Delivery {
            destination: destination.into(),
            detail: detail.into(),
        }
    }

    pub(crate) fn configuration(subscription: impl Into<String>, detail: impl Into<String>) -> Self {
        DispatchError::Configuration {
            subscription: subscription.into(),
            detail: detail.into(),
        }
    }
}

impl Display for DispatchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            DispatchError::Match {
                subscription,
                detail,
            } => {
                write!(
                    f,
                    "criteria evaluation failed for subscription {subscription}: {detail}"
                )
            }
            DispatchError::Fetch { identity, detail } => {
                write!(f, "payload resolution failed for {identity}: {detail}")
            }
            DispatchError::Delivery {
                destination,
                detail,
            } => {
                write!(f, "delivery to {destination} failed: {detail}")
            }
            DispatchError::Configuration {
                subscription,
                detail,
            } => {
                write!(f, "subscription {subscription} misconfigured: {detail}")
            }
        }
    }
}

impl Error for DispatchError {}
