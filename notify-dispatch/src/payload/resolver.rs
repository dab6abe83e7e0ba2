//! Payload resolution policy and the resource-store seam.

use crate::error::DispatchError;
use crate::model::{ChangeOperation, ResourceChangeEvent, ResourceIdentity};
use crate::observability::events;
use async_trait::async_trait;
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use subscription_cache::CanonicalSubscription;
use tracing::warn;

const COMPONENT: &str = "payload_resolver";

/// Error raised by the resource store collaborator.
#[derive(Debug)]
pub enum StoreError {
    /// The resource existed and has since been deleted.
    Gone,
    /// The resource never existed.
    NotFound,
    /// Backend failure.
    Backend(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Gone => f.write_str("resource deleted"),
            StoreError::NotFound => f.write_str("resource not found"),
            StoreError::Backend(detail) => write!(f, "resource store failure: {detail}"),
        }
    }
}

impl Error for StoreError {}

/// Read access to current resource state, keyed by versionless identity.
#[async_trait]
pub trait ResourceStore: Send + Sync {
    async fn fetch(&self, identity: &ResourceIdentity) -> Result<Value, StoreError>;
}

/// Content resolved for one delivery attempt: the identity to deliver under
/// and an optional body. A `None` body routes the channel down its
/// contentless-notify path.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedContent {
    pub identity: ResourceIdentity,
    pub body: Option<Value>,
}

/// Outcome of payload resolution.
#[derive(Clone, Debug, PartialEq)]
pub enum Resolution {
    Content(ResolvedContent),
    /// The resource is gone; the attempt must be recorded as skipped.
    Gone,
}

pub struct PayloadResolver {
    store: Arc<dyn ResourceStore>,
}

impl PayloadResolver {
    pub fn new(store: Arc<dyn ResourceStore>) -> Self {
        Self { store }
    }

    /// Resolves delivery content for one (event, subscription) pair.
    ///
    /// Policy, in order: no configured encoding means no payload; an embedded
    /// snapshot is used unless the subscription asks for the latest version;
    /// otherwise current state is fetched by versionless identity. A store
    /// answer of gone resolves to [`Resolution::Gone`] rather than an error.
    /// Deletes deliver by identity alone and never consult the store.
    pub async fn resolve(
        &self,
        event: &ResourceChangeEvent,
        subscription: &CanonicalSubscription,
    ) -> Result<Resolution, DispatchError> {
        let identity = self.delivery_identity(event, subscription);

        if event.operation == ChangeOperation::Delete {
            return Ok(Resolution::Content(ResolvedContent {
                identity,
                body: None,
            }));
        }

        if subscription.channel.effective_encoding().is_none() {
            return Ok(Resolution::Content(ResolvedContent {
                identity,
                body: None,
            }));
        }

        if let Some(snapshot) = &event.snapshot {
            if !subscription.channel.deliver_latest_version {
                return Ok(Resolution::Content(ResolvedContent {
                    identity,
                    body: Some(snapshot.clone()),
                }));
            }
        }

        let versionless = event.identity.versionless();
        match self.store.fetch(&versionless).await {
            Ok(body) => Ok(Resolution::Content(ResolvedContent {
                identity,
                body: Some(body),
            })),
            Err(StoreError::Gone) => {
                warn!(
                    event = events::PAYLOAD_RESOURCE_GONE,
                    component = COMPONENT,
                    identity = %versionless,
                    subscription_id = %subscription.id,
                    "resource deleted before fetch, skipping delivery"
                );
                Ok(Resolution::Gone)
            }
            Err(err) => Err(DispatchError::fetch(versionless.reference(), err.to_string())),
        }
    }

    fn delivery_identity(
        &self,
        event: &ResourceChangeEvent,
        subscription: &CanonicalSubscription,
    ) -> ResourceIdentity {
        if subscription.channel.strip_version_id {
            event.identity.versionless()
        } else {
            event.identity.clone()
        }
    }
}
