//! Active-subscription snapshot cache refreshed once per dispatch cycle.

use crate::canonical::CanonicalSubscription;
use crate::registry::{RegistryError, SubscriptionRegistry};
use arc_swap::ArcSwap;
use std::sync::Arc;
use tracing::debug;

/// Lock-free snapshot of the active subscription set.
///
/// A refresh replaces the whole snapshot atomically; readers holding the
/// previous snapshot keep a stable view for the duration of their delivery
/// attempt. The cache never mutates a snapshot already handed out.
pub struct SubscriptionCache {
    snapshot: ArcSwap<Vec<Arc<CanonicalSubscription>>>,
}

impl SubscriptionCache {
    pub fn new() -> Self {
        Self {
            snapshot: ArcSwap::from_pointee(Vec::new()),
        }
    }

    /// Re-lists the registry and publishes a fresh active-set snapshot.
    ///
    /// Definitions whose status is not active are discarded even if the
    /// backend returns them. Returns the number of active subscriptions now
    /// visible.
    pub async fn refresh(
        &self,
        registry: &dyn SubscriptionRegistry,
    ) -> Result<usize, RegistryError> {
        let listed = registry.list_active().await?;
        let active: Vec<Arc<CanonicalSubscription>> = listed
            .into_iter()
            .filter(CanonicalSubscription::is_active)
            .map(Arc::new)
            .collect();
        let count = active.len();
        self.snapshot.store(Arc::new(active));
        debug!(active = count, "subscription snapshot refreshed");
        Ok(count)
    }

    /// Current active-set snapshot.
    pub fn active_snapshot(&self) -> Arc<Vec<Arc<CanonicalSubscription>>> {
        self.snapshot.load_full()
    }
}

impl Default for SubscriptionCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::SubscriptionCache;
    use crate::canonical::{
        CanonicalSubscription, ChannelConfig, ChannelKind, SubscriptionId, SubscriptionStatus,
    };
    use crate::registry::{RegistryError, SubscriptionRegistry};
    use async_trait::async_trait;
    use std::sync::Mutex as StdMutex;

    fn subscription(id: &str, status: SubscriptionStatus) -> CanonicalSubscription {
        CanonicalSubscription {
            id: SubscriptionId::new(id),
            criteria: "Observation?".to_string(),
            status,
            channel: ChannelConfig {
                kind: ChannelKind::RestHook,
                endpoint: "http://sub.example/hook".to_string(),
                headers: vec![],
                payload_content_type: None,
                deliver_latest_version: false,
                strip_version_id: false,
            },
        }
    }

    struct StaticRegistry {
        listings: StdMutex<Vec<Vec<CanonicalSubscription>>>,
    }

    impl StaticRegistry {
        fn new(listings: Vec<Vec<CanonicalSubscription>>) -> Self {
            Self {
                listings: StdMutex::new(listings),
            }
        }
    }

    #[async_trait]
    impl SubscriptionRegistry for StaticRegistry {
        async fn list_active(&self) -> Result<Vec<CanonicalSubscription>, RegistryError> {
            let mut listings = self.listings.lock().expect("lock listings");
            if listings.is_empty() {
                return Err(RegistryError::new("backend exhausted"));
            }
            Ok(listings.remove(0))
        }
    }

    #[tokio::test]
    async fn refresh_discards_inactive_definitions() {
        let cache = SubscriptionCache::new();
        let registry = StaticRegistry::new(vec![vec![
            subscription("sub-active", SubscriptionStatus::Active),
            subscription("sub-off", SubscriptionStatus::Off),
        ]]);

        let count = cache.refresh(&registry).await.expect("refresh succeeds");

        assert_eq!(count, 1);
        let snapshot = cache.active_snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].id.as_str(), "sub-active");
    }

    #[tokio::test]
    async fn snapshot_held_across_refresh_stays_stable() {
        let cache = SubscriptionCache::new();
        let registry = StaticRegistry::new(vec![
            vec![subscription("sub-1", SubscriptionStatus::Active)],
            vec![],
        ]);

        cache.refresh(&registry).await.expect("first refresh");
        let held = cache.active_snapshot();

        cache.refresh(&registry).await.expect("second refresh");

        assert_eq!(held.len(), 1);
        assert!(cache.active_snapshot().is_empty());
    }

    #[tokio::test]
    async fn refresh_error_keeps_previous_snapshot() {
        let cache = SubscriptionCache::new();
        let registry =
            StaticRegistry::new(vec![vec![subscription("sub-1", SubscriptionStatus::Active)]]);

        cache.refresh(&registry).await.expect("first refresh");
        let refresh_err = cache.refresh(&registry).await;

        assert!(refresh_err.is_err());
        assert_eq!(cache.active_snapshot().len(), 1);
    }
}
