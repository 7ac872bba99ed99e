//! Configuration models for the transport, batch window and retry policy.

pub mod reporter;

pub use reporter::{HttpOptions, InventoryConfig, RetryConfig, ENV_PREFIX};
