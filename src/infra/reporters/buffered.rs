//! Per-kind reporters fed through address buffers.
//!
//! These are registered once and mutated in place. The first report creates
//! the entity and later ones replace it with every known address. A report
//! acknowledges exactly the pending snapshot it carried, so addresses added
//! while the request is in flight are kept for the next flush.

use std::fmt;
use std::net::SocketAddr;
use std::sync::atomic::AtomicBool;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::json;

use super::ReporterContext;
use crate::core::{AddressBuffered, AddressSlot, EntityReporter, ReportError, ResourceKind};
use crate::infra::registry::AddressBuffer;

fn render(addresses: &[SocketAddr]) -> Vec<String> {
    addresses.iter().map(ToString::to_string).collect()
}

/// Remote targets of HTTP or net clients.
#[derive(Debug)]
pub struct ClientReporter {
    ctx: ReporterContext,
    kind: ResourceKind,
    slot: AddressSlot,
    remotes: Mutex<AddressBuffer>,
    created: AtomicBool,
}

impl ClientReporter {
    /// Reporter for HTTP client remote addresses.
    pub fn http(ctx: ReporterContext) -> Self {
        Self::with_kind(ctx, ResourceKind::HttpClient, AddressSlot::HttpClient)
    }

    /// Reporter for net client remote addresses.
    pub fn net(ctx: ReporterContext) -> Self {
        Self::with_kind(ctx, ResourceKind::NetClient, AddressSlot::NetClient)
    }

    fn with_kind(ctx: ReporterContext, kind: ResourceKind, slot: AddressSlot) -> Self {
        Self {
            ctx,
            kind,
            slot,
            remotes: Mutex::new(AddressBuffer::new()),
            created: AtomicBool::new(false),
        }
    }

    /// Addresses waiting for the next successful report.
    pub fn pending(&self) -> Vec<SocketAddr> {
        self.remotes.lock().snapshot()
    }
}

impl fmt::Display for ClientReporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind.as_str())
    }
}

#[async_trait]
impl EntityReporter for ClientReporter {
    fn kind(&self) -> ResourceKind {
        self.kind
    }

    async fn report(&self) -> Result<(), ReportError> {
        let (snapshot, known) = {
            let remotes = self.remotes.lock();
            (remotes.snapshot(), remotes.known())
        };
        self.ctx
            .upsert_sub_resource(
                &self.created,
                self.kind,
                json!({ "remoteAddresses": render(&known) }),
            )
            .await?;
        self.remotes.lock().acknowledge(&snapshot);
        Ok(())
    }
}

impl AddressBuffered for ClientReporter {
    fn add_address(&self, slot: AddressSlot, address: SocketAddr) {
        if slot == self.slot && !self.remotes.lock().add(address) {
            tracing::trace!(kind = %self.kind, %address, "address already known");
        }
    }

    fn has_pending(&self) -> bool {
        !self.remotes.lock().is_empty()
    }
}

#[derive(Debug, Default)]
struct DatagramBuffers {
    sent: AddressBuffer,
    received: AddressBuffer,
}

/// Peers of datagram sockets, split by direction.
#[derive(Debug)]
pub struct DatagramSocketReporter {
    ctx: ReporterContext,
    buffers: Mutex<DatagramBuffers>,
    created: AtomicBool,
}

impl DatagramSocketReporter {
    /// Create a datagram socket reporter.
    pub fn new(ctx: ReporterContext) -> Self {
        Self {
            ctx,
            buffers: Mutex::new(DatagramBuffers::default()),
            created: AtomicBool::new(false),
        }
    }

    /// Pending (sent, received) addresses.
    pub fn pending(&self) -> (Vec<SocketAddr>, Vec<SocketAddr>) {
        let buffers = self.buffers.lock();
        (buffers.sent.snapshot(), buffers.received.snapshot())
    }
}

impl fmt::Display for DatagramSocketReporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(ResourceKind::DatagramSocket.as_str())
    }
}

#[async_trait]
impl EntityReporter for DatagramSocketReporter {
    fn kind(&self) -> ResourceKind {
        ResourceKind::DatagramSocket
    }

    async fn report(&self) -> Result<(), ReportError> {
        let (sent, received, properties) = {
            let buffers = self.buffers.lock();
            let properties = json!({
                "sentAddresses": render(&buffers.sent.known()),
                "receivedAddresses": render(&buffers.received.known()),
            });
            (buffers.sent.snapshot(), buffers.received.snapshot(), properties)
        };
        self.ctx
            .upsert_sub_resource(&self.created, ResourceKind::DatagramSocket, properties)
            .await?;
        let mut buffers = self.buffers.lock();
        buffers.sent.acknowledge(&sent);
        buffers.received.acknowledge(&received);
        Ok(())
    }
}

impl AddressBuffered for DatagramSocketReporter {
    fn add_address(&self, slot: AddressSlot, address: SocketAddr) {
        let mut buffers = self.buffers.lock();
        match slot {
            AddressSlot::DatagramSent => {
                buffers.sent.add(address);
            }
            AddressSlot::DatagramReceived => {
                buffers.received.add(address);
            }
            AddressSlot::HttpClient | AddressSlot::NetClient => {}
        }
    }

    fn has_pending(&self) -> bool {
        let buffers = self.buffers.lock();
        !buffers.sent.is_empty() || !buffers.received.is_empty()
    }
}
