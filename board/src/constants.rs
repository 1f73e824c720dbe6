/// Redis namespace of cached per-post like counters.
pub const LIKE_COUNT_NAMESPACE: &str = "like-count";

pub const MAX_RECONCILE_BATCH: usize = 100;

/// How long a materialized event id is remembered for redelivery dedup.
pub const PROCESSED_EVENT_RETENTION_SECS: u64 = 60 * 60;
