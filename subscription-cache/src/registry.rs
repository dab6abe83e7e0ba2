//! Subscription-registry collaborator seam.

use crate::canonical::CanonicalSubscription;
use async_trait::async_trait;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Error raised by a registry backend while listing subscription definitions.
#[derive(Debug)]
pub struct RegistryError {
    detail: String,
}

impl RegistryError {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

impl Display for RegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "subscription registry failure: {}", self.detail)
    }
}

impl Error for RegistryError {}

/// Source of truth for subscription definitions.
///
/// Implementations are owned by the surrounding system (database-backed,
/// file-backed, in-memory). The engine re-lists at least once per dispatch
/// cycle so a definition change becomes visible to the next matching cycle.
#[async_trait]
pub trait SubscriptionRegistry: Send + Sync {
    async fn list_active(&self) -> Result<Vec<CanonicalSubscription>, RegistryError>;
}
