//! Registration API used by the embedding application.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::sync::watch;

use crate::core::{AddressSlot, BatchScheduler, LifecycleState};
use crate::infra::reporters::{ReporterContext, ServerReporter};

/// Inventory reporter for one process: a batch scheduler plus the identity
/// its reporters share.
///
/// Every method is fire-and-forget and safe to call from any thread; the
/// call is marshaled onto the scheduler task.
#[derive(Debug, Clone)]
pub struct InventoryReporter {
    scheduler: BatchScheduler,
    ctx: ReporterContext,
}

impl InventoryReporter {
    /// Wrap a scheduler and the context its reporters were built with.
    pub const fn new(scheduler: BatchScheduler, ctx: ReporterContext) -> Self {
        Self { scheduler, ctx }
    }

    /// Create the feed and root resource, then start periodic batching.
    pub fn start(&self) {
        self.scheduler.start();
    }

    /// Stop batching and release the transport.
    pub fn stop(&self) {
        self.scheduler.stop();
    }

    /// Report an HTTP server bound to `address`.
    pub fn register_http_server(&self, address: SocketAddr) {
        self.scheduler
            .register_sub_resource(Arc::new(ServerReporter::http(self.ctx.clone(), address)));
    }

    /// Report a net server bound to `address`.
    pub fn register_net_server(&self, address: SocketAddr) {
        self.scheduler
            .register_sub_resource(Arc::new(ServerReporter::net(self.ctx.clone(), address)));
    }

    /// Record a remote address contacted by an HTTP client.
    pub fn add_http_client_address(&self, address: SocketAddr) {
        self.scheduler.add_address(AddressSlot::HttpClient, address);
    }

    /// Record a peer a datagram was sent to.
    pub fn add_datagram_sent_address(&self, address: SocketAddr) {
        self.scheduler.add_address(AddressSlot::DatagramSent, address);
    }

    /// Record a peer a datagram was received from.
    pub fn add_datagram_received_address(&self, address: SocketAddr) {
        self.scheduler.add_address(AddressSlot::DatagramReceived, address);
    }

    /// Record a remote address contacted by a net client.
    pub fn add_net_client_remote_address(&self, address: SocketAddr) {
        self.scheduler.add_address(AddressSlot::NetClient, address);
    }

    /// Feed identifier used for every entity.
    pub fn feed_id(&self) -> &str {
        &self.ctx.feed_id
    }

    /// Current lifecycle state.
    pub fn state(&self) -> LifecycleState {
        self.scheduler.state()
    }

    /// Watch lifecycle transitions.
    pub fn subscribe(&self) -> watch::Receiver<LifecycleState> {
        self.scheduler.subscribe()
    }

    /// Underlying scheduler handle.
    pub const fn scheduler(&self) -> &BatchScheduler {
        &self.scheduler
    }
}
