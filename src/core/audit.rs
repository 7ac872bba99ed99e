//! Audit trail of bootstrap and dispatch outcomes.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::core::ResourceKind;
use crate::util::clock::now_ms;

/// What happened to a reporter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditAction {
    /// Feed or root resource created during bootstrap.
    Bootstrap,
    /// Report attempt started.
    Dispatched,
    /// Report attempt succeeded.
    Completed,
    /// Report attempt failed; a retry may follow.
    Failed,
    /// Retry budget exhausted; the reporter is dropped.
    Abandoned,
    /// Pending entry discarded because the scheduler stopped.
    Cancelled,
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Bootstrap => "bootstrap",
            Self::Dispatched => "dispatched",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Abandoned => "abandoned",
            Self::Cancelled => "cancelled",
        })
    }
}

/// Audit event structure.
#[derive(Debug, Clone)]
pub struct AuditEvent {
    /// Event identifier.
    pub event_id: String,
    /// Reporter identity.
    pub reporter: String,
    /// Resource kind of the reporter.
    pub kind: ResourceKind,
    /// Action taken.
    pub action: AuditAction,
    /// Attempt number the event belongs to (1-based, 0 for bootstrap).
    pub attempt: u32,
    /// Timestamp milliseconds.
    pub created_at_ms: u128,
    /// Failure cause or other context.
    pub detail: Option<String>,
}

/// Audit sink abstraction.
pub trait AuditSink: Send {
    /// Record an audit event.
    fn record(&mut self, event: AuditEvent);
}

/// Bounded in-memory audit sink. Clones share the same buffer, so a test can
/// keep one clone and hand another to the scheduler.
#[derive(Clone)]
pub struct InMemoryAuditSink {
    events: Arc<Mutex<VecDeque<AuditEvent>>>,
    max_events: usize,
}

impl InMemoryAuditSink {
    /// Create a new in-memory sink with a bounded buffer.
    pub fn new(max_events: usize) -> Self {
        Self {
            events: Arc::new(Mutex::new(VecDeque::with_capacity(max_events.min(1024)))),
            max_events,
        }
    }

    /// Retrieve a snapshot of stored events.
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().iter().cloned().collect()
    }

    /// Count events for `reporter` with the given action.
    pub fn count(&self, reporter: &str, action: AuditAction) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|e| e.reporter == reporter && e.action == action)
            .count()
    }

    /// Count events with the given action across all reporters.
    pub fn count_action(&self, action: AuditAction) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|e| e.action == action)
            .count()
    }
}

impl AuditSink for InMemoryAuditSink {
    fn record(&mut self, event: AuditEvent) {
        let mut events = self.events.lock();
        if events.len() >= self.max_events {
            events.pop_front();
        }
        events.push_back(event);
    }
}

/// Helper to build an audit event stamped with the current time.
pub fn build_audit_event(
    reporter: impl Into<String>,
    kind: ResourceKind,
    action: AuditAction,
    attempt: u32,
    detail: Option<String>,
) -> AuditEvent {
    let reporter = reporter.into();
    let created_at_ms = now_ms();
    AuditEvent {
        event_id: format!("{reporter}-{action}-{attempt}-{created_at_ms}"),
        reporter,
        kind,
        action,
        attempt,
        created_at_ms,
        detail,
    }
}
