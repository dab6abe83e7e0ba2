//! Structured logging event names.
//!
//! The crate emits `tracing` events carrying these names in their `event`
//! field and never installs a global subscriber; binaries and tests own
//! one-time `tracing_subscriber` initialization at process boundaries.

pub mod events {
    pub const MATCH_EVALUATION_FAILED: &str = "match_evaluation_failed";
    pub const MATCH_EVALUATION_TIMED_OUT: &str = "match_evaluation_timed_out";
    pub const EVENT_MATCHED: &str = "event_matched";
    pub const REGISTRY_REFRESH_FAILED: &str = "registry_refresh_failed";
    pub const PAYLOAD_RESOURCE_GONE: &str = "payload_resource_gone";
    pub const REST_HOOK_DELIVERY: &str = "rest_hook_delivery";
    pub const REST_HOOK_DELIVERY_FAILED: &str = "rest_hook_delivery_failed";
    pub const QUEUE_PUBLISH: &str = "queue_publish";
    pub const QUEUE_PUBLISH_FAILED: &str = "queue_publish_failed";
    pub const WEBSOCKET_PUSH: &str = "websocket_push";
    pub const WEBSOCKET_NO_SESSIONS: &str = "websocket_no_sessions";
    pub const MAIL_NOTIFY: &str = "mail_notify";
    pub const DELIVERY_OUTCOME: &str = "delivery_outcome";
    pub const DELIVERY_ATTEMPT_FAILED: &str = "delivery_attempt_failed";
    pub const WORKER_SPAWNED: &str = "delivery_worker_spawned";
    pub const WORKER_RETIRED: &str = "delivery_worker_retired";
    pub const WORKER_DRAINED: &str = "delivery_worker_drained";
    pub const WORKER_REPLY_DROPPED: &str = "delivery_worker_reply_dropped";
}
