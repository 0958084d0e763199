pub mod deferred_log;
pub mod metrics;
