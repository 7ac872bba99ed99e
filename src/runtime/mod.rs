//! Execution context and the application-facing API.

pub mod api;
pub mod context;

pub use api::InventoryReporter;
pub use context::ExecutionContext;
