//! # Inventory Batcher
//!
//! Batches descriptions of runtime resources discovered inside a running
//! process (HTTP clients and servers, net clients and servers, datagram
//! sockets, the event bus) and periodically ships them to a remote inventory
//! service over HTTP.
//!
//! ## How it works
//!
//! - **Bootstrap**: `start()` creates the feed entity, then the root resource
//!   under it. Periodic batching begins only after both succeed; a failed
//!   bootstrap leaves the reporter inert until `start()` is called again.
//! - **Batching**: registrations accumulate in a pending queue. On every timer
//!   tick, if at least one batch delay has passed and the queue is non-empty,
//!   every queued reporter is dispatched and the queue is cleared.
//! - **Retry**: a failed report is re-armed with an attempt counter and a
//!   backoff deadline and handed back to the scheduler. Retries are unbounded
//!   unless the configuration caps them.
//! - **Single owner**: one task owns the queue, the address buffers and the
//!   batch window; every public call is a message to that task.
//!
//! ```rust,ignore
//! use inventory_batcher::builders::build_http_reporter;
//! use inventory_batcher::config::InventoryConfig;
//! use inventory_batcher::runtime::ExecutionContext;
//!
//! let cfg = InventoryConfig::from_env()?;
//! let reporter = build_http_reporter(&cfg, ExecutionContext::current())?;
//! reporter.start();
//!
//! reporter.register_http_server("0.0.0.0:8080".parse()?);
//! reporter.add_http_client_address("10.0.0.7:443".parse()?);
//!
//! // on shutdown
//! reporter.stop();
//! ```
//!
//! For complete scenarios, see `tests/scheduler_test.rs`.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Core scheduling abstractions: reporters, retry, lifecycle, scheduler.
pub mod core;
/// Configuration models for the transport, batch window and retries.
pub mod config;
/// Builders to construct reporters from configuration.
pub mod builders;
/// Transports, address registries and reporter variants.
pub mod infra;
/// Execution context and the application-facing API.
pub mod runtime;
/// Shared utilities.
pub mod util;
