//! Resource-change events as handed over by the external event source.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::{Display, Formatter};

/// Operation that produced a change event.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChangeOperation {
    Create,
    Update,
    Delete,
}

impl Display for ChangeOperation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ChangeOperation::Create => "create",
            ChangeOperation::Update => "update",
            ChangeOperation::Delete => "delete",
        };
        f.write_str(label)
    }
}

/// Subject identity of a change: resource type, id, and an optional version.
#[derive(Clone, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct ResourceIdentity {
    pub resource_type: String,
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl ResourceIdentity {
    pub fn new(resource_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            id: id.into(),
            version: None,
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// The same identity with the version component removed.
    pub fn versionless(&self) -> Self {
        Self {
            resource_type: self.resource_type.clone(),
            id: self.id.clone(),
            version: None,
        }
    }

    /// Relative reference: `Type/id`, or `Type/id/_history/version` when the
    /// identity still carries a version component.
    pub fn reference(&self) -> String {
        match &self.version {
            Some(version) => format!("{}/{}/_history/{}", self.resource_type, self.id, version),
            None => format!("{}/{}", self.resource_type, self.id),
        }
    }
}

impl Display for ResourceIdentity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.reference())
    }
}

/// One resource change, consumed exactly once per matched subscription and
/// never persisted by the engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResourceChangeEvent {
    pub operation: ChangeOperation,
    pub identity: ResourceIdentity,
    /// Payload snapshot captured at event-creation time, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<Value>,
}

impl ResourceChangeEvent {
    pub fn new(operation: ChangeOperation, identity: ResourceIdentity) -> Self {
        Self {
            operation,
            identity,
            snapshot: None,
        }
    }

    pub fn with_snapshot(mut self, snapshot: Value) -> Self {
        self.snapshot = Some(snapshot);
        self
    }
}
