//! # Wavefront Provisioner Library
//!
//! Makes sure an application exporting metrics to Wavefront has an api token
//! without manual setup: an explicitly configured token wins, then a token
//! cached in `~/.wavefront_token`, then a freshly provisioned trial account.
//!
//! Modules:
//! - `account` — credential resolution, outcome report and lifecycle hooks
//! - `cache` — local token file
//! - `config` — config file, layered property environment, application info
//! - `sources` — the provisioning HTTP client
//! - `observability` — deferred log records and metrics

pub mod account;
pub mod cache;
pub mod config;
pub mod observability;
pub mod sources;
pub mod tests;
pub mod utils;

pub use crate::account::lifecycle::{AccountProvisioning, LifecycleEvent, LifecycleListener};
pub use crate::account::resolver::{CredentialResolver, Resolution, ResolveError};
pub use crate::config::properties::Environment;
