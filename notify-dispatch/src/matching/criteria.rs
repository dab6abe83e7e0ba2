//! Opaque criteria-predicate seam.

use crate::model::ResourceChangeEvent;
use async_trait::async_trait;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Error raised by a criteria evaluator.
#[derive(Debug)]
pub struct CriteriaError {
    detail: String,
}

impl CriteriaError {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

impl Display for CriteriaError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "criteria evaluation failure: {}", self.detail)
    }
}

impl Error for CriteriaError {}

/// Evaluates whether a change event satisfies a subscription's criteria
/// expression.
///
/// The expression is opaque to the engine; implementations own its language.
/// Evaluation must be side-effect free over the event and the expression.
#[async_trait]
pub trait CriteriaEvaluator: Send + Sync {
    async fn evaluate(
        &self,
        event: &ResourceChangeEvent,
        criteria: &str,
    ) -> Result<bool, CriteriaError>;
}

/// Evaluator matching the criteria's leading resource-type segment.
///
/// `"Observation?status=final"` matches any Observation change; search
/// parameters after the `?` are not interpreted. Suitable for tests and
/// demos; production deployments plug in a full criteria engine.
pub struct ResourceTypeCriteria;

#[async_trait]
impl CriteriaEvaluator for ResourceTypeCriteria {
    async fn evaluate(
        &self,
        event: &ResourceChangeEvent,
        criteria: &str,
    ) -> Result<bool, CriteriaError> {
        let resource_type = criteria.split('?').next().unwrap_or("").trim();
        if resource_type.is_empty() {
            return Err(CriteriaError::new(format!(
                "criteria has no resource type segment: '{criteria}'"
            )));
        }
        Ok(resource_type == event.identity.resource_type)
    }
}
