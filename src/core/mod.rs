//! Core scheduling abstractions: reporters, retry state, lifecycle and the
//! batch scheduler.

pub mod audit;
pub mod error;
pub mod lifecycle;
pub mod reporter;
pub mod retry;
pub mod scheduler;

pub use audit::{build_audit_event, AuditAction, AuditEvent, AuditSink, InMemoryAuditSink};
pub use error::{AppResult, ReportError, SchedulerError};
pub use lifecycle::{bootstrap, BootstrapError, BootstrapStage, LifecycleState};
pub use reporter::{AddressBuffered, AddressSlot, EntityReporter, ResourceKind};
pub use retry::{DispatchJob, RetryPolicy};
pub use scheduler::{BatchScheduler, BatchWindow, SchedulerParts, SchedulerSettings};
