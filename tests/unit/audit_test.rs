//! Tests for audit sink

use inventory_batcher::core::{
    build_audit_event, AuditAction, AuditSink, InMemoryAuditSink, ResourceKind,
};

#[test]
fn test_in_memory_audit_sink() {
    let mut sink = InMemoryAuditSink::new(10);
    let view = sink.clone();

    sink.record(build_audit_event(
        "event-bus",
        ResourceKind::EventBus,
        AuditAction::Failed,
        1,
        Some("inventory responded 503: busy".to_string()),
    ));

    let events = view.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].reporter, "event-bus");
    assert_eq!(events[0].action, AuditAction::Failed);
    assert_eq!(events[0].attempt, 1);
    assert!(events[0].created_at_ms > 0);
}

#[test]
fn test_audit_sink_overflow() {
    let mut sink = InMemoryAuditSink::new(2);

    for attempt in 1..=3 {
        sink.record(build_audit_event(
            "net-client",
            ResourceKind::NetClient,
            AuditAction::Dispatched,
            attempt,
            None,
        ));
    }

    let events = sink.events();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].attempt, 2); // first one popped
    assert_eq!(events[1].attempt, 3);
}

#[test]
fn test_audit_counts() {
    let mut sink = InMemoryAuditSink::new(16);
    sink.record(build_audit_event("a", ResourceKind::HttpServer, AuditAction::Failed, 1, None));
    sink.record(build_audit_event("a", ResourceKind::HttpServer, AuditAction::Completed, 2, None));
    sink.record(build_audit_event("b", ResourceKind::NetServer, AuditAction::Failed, 1, None));

    assert_eq!(sink.count("a", AuditAction::Failed), 1);
    assert_eq!(sink.count("a", AuditAction::Completed), 1);
    assert_eq!(sink.count_action(AuditAction::Failed), 2);
}

#[test]
fn test_event_id_embeds_action() {
    let event = build_audit_event("feed[x]", ResourceKind::Feed, AuditAction::Bootstrap, 0, None);
    assert!(event.event_id.starts_with("feed[x]-bootstrap-0-"));
    assert_eq!(event.kind, ResourceKind::Feed);
}
