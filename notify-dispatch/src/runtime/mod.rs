//! Worker runtime layer.
//!
//! Owns per-subscription FIFO delivery queues and their worker tasks so
//! concurrency behavior stays localized: fan-out across subscriptions is
//! concurrent, order within one subscription is strict, and retiring a
//! subscription drains its queue instead of cancelling in-flight work.

pub(crate) mod delivery_worker;
pub(crate) mod worker_pool;
