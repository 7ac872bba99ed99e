//! Tests for reporter variants against the in-memory transport

use std::net::SocketAddr;
use std::sync::Arc;

use inventory_batcher::core::{AddressBuffered, AddressSlot, EntityReporter, ResourceKind};
use inventory_batcher::infra::reporters::{
    ClientReporter, EventBusReporter, FeedReporter, ReporterContext, RootResourceReporter,
    ServerReporter,
};
use inventory_batcher::infra::InMemoryTransport;

fn setup() -> (InMemoryTransport, ReporterContext) {
    let transport = InMemoryTransport::new();
    let ctx = ReporterContext::new("feed-7", Arc::new(transport.clone()));
    (transport, ctx)
}

#[test]
fn test_slot_owners() {
    assert_eq!(AddressSlot::HttpClient.owner(), ResourceKind::HttpClient);
    assert_eq!(AddressSlot::DatagramSent.owner(), ResourceKind::DatagramSocket);
    assert_eq!(AddressSlot::DatagramReceived.owner(), ResourceKind::DatagramSocket);
    assert_eq!(AddressSlot::NetClient.owner(), ResourceKind::NetClient);
}

#[tokio::test]
async fn test_feed_and_root_paths() {
    let (transport, ctx) = setup();
    FeedReporter::new(ctx.clone()).report().await.unwrap();
    RootResourceReporter::new(ctx).report().await.unwrap();

    let sent = transport.accepted();
    assert_eq!(sent[0].path, "/entity/feed");
    assert_eq!(sent[0].body["id"], "feed-7");
    assert_eq!(sent[1].path, "/entity/f;feed-7/resource");
    assert_eq!(sent[1].body["id"], "feed-7.root");
}

#[tokio::test]
async fn test_server_reporter_identity_and_payload() {
    let (transport, ctx) = setup();
    let address: SocketAddr = "0.0.0.0:8443".parse().unwrap();
    let reporter = ServerReporter::net(ctx, address);
    assert_eq!(reporter.to_string(), "net-server[0.0.0.0:8443]");
    assert_eq!(reporter.kind(), ResourceKind::NetServer);

    reporter.report().await.unwrap();
    let props = &transport.accepted()[0].body["properties"];
    assert_eq!(props["host"], "0.0.0.0");
    assert_eq!(props["port"], 8443);
}

#[tokio::test]
async fn test_event_bus_reporter() {
    let (transport, ctx) = setup();
    EventBusReporter::new(ctx).report().await.unwrap();
    assert_eq!(transport.accepted_matching("event-bus").len(), 1);
}

#[test]
fn test_client_reporter_ignores_foreign_slots() {
    let (_, ctx) = setup();
    let reporter = ClientReporter::net(ctx);
    reporter.add_address(AddressSlot::HttpClient, "10.1.1.1:80".parse().unwrap());
    assert!(!reporter.has_pending());
    reporter.add_address(AddressSlot::NetClient, "10.1.1.1:5432".parse().unwrap());
    assert!(reporter.has_pending());
}
