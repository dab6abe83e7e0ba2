//! Timeout-bounded, error-isolated subscription matching.

use crate::error::DispatchError;
use crate::matching::criteria::CriteriaEvaluator;
use crate::model::ResourceChangeEvent;
use crate::observability::events;
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use subscription_cache::CanonicalSubscription;
use tokio::time::timeout;
use tracing::warn;

const COMPONENT: &str = "matcher";

pub(crate) struct SubscriptionMatcher {
    evaluator: Arc<dyn CriteriaEvaluator>,
    evaluation_timeout: Duration,
}

impl SubscriptionMatcher {
    pub(crate) fn new(evaluator: Arc<dyn CriteriaEvaluator>, evaluation_timeout: Duration) -> Self {
        Self {
            evaluator,
            evaluation_timeout,
        }
    }

    /// Pure predicate over the event and one subscription snapshot.
    ///
    /// Inactive subscriptions never match. Evaluator errors and timeouts both
    /// count as no-match for this subscription only; each is surfaced as a
    /// match-error event, never as a crash.
    pub(crate) async fn matches(
        &self,
        event: &ResourceChangeEvent,
        subscription: &CanonicalSubscription,
    ) -> bool {
        if !subscription.is_active() {
            return false;
        }

        let evaluation = self.evaluator.evaluate(event, &subscription.criteria);
        match timeout(self.evaluation_timeout, evaluation).await {
            Ok(Ok(matched)) => matched,
            Ok(Err(err)) => {
                let err =
                    DispatchError::match_failure(subscription.id.to_string(), err.to_string());
                warn!(
                    event = events::MATCH_EVALUATION_FAILED,
                    component = COMPONENT,
                    subscription_id = %subscription.id,
                    criteria = %subscription.criteria,
                    err = %err,
                    "criteria evaluation failed, treating as no-match"
                );
                false
            }
            Err(_elapsed) => {
                let err = DispatchError::match_failure(
                    subscription.id.to_string(),
                    format!(
                        "evaluation timed out after {}ms",
                        self.evaluation_timeout.as_millis()
                    ),
                );
                warn!(
                    event = events::MATCH_EVALUATION_TIMED_OUT,
                    component = COMPONENT,
                    subscription_id = %subscription.id,
                    criteria = %subscription.criteria,
                    err = %err,
                    "criteria evaluation timed out, treating as no-match"
                );
                false
            }
        }
    }

    /// Evaluates all subscriptions concurrently and returns the matching ones.
    pub(crate) async fn matching_subscriptions(
        &self,
        event: &ResourceChangeEvent,
        snapshot: &[Arc<CanonicalSubscription>],
    ) -> Vec<Arc<CanonicalSubscription>> {
        let evaluations = snapshot.iter().map(|subscription| async move {
            if self.matches(event, subscription).await {
                Some(subscription.clone())
            } else {
                None
            }
        });

        join_all(evaluations).await.into_iter().flatten().collect()
    }
}
