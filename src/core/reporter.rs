//! Reporter capability and resource kinds.

use std::fmt;
use std::net::SocketAddr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::ReportError;

/// Kind of inventory entity a reporter produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// The reporting process itself.
    Feed,
    /// Entity directly under the feed that parents all sub-resources.
    RootResource,
    /// Outbound HTTP client targets.
    HttpClient,
    /// A bound HTTP server.
    HttpServer,
    /// Outbound TCP client targets.
    NetClient,
    /// A bound TCP server.
    NetServer,
    /// Datagram socket peers.
    DatagramSocket,
    /// Event-bus endpoint.
    EventBus,
}

impl ResourceKind {
    /// Stable identifier used in resource type paths and logs.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Feed => "feed",
            Self::RootResource => "root-resource",
            Self::HttpClient => "http-client",
            Self::HttpServer => "http-server",
            Self::NetClient => "net-client",
            Self::NetServer => "net-server",
            Self::DatagramSocket => "datagram-socket",
            Self::EventBus => "event-bus",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Address buffers that callers can feed without creating new reporters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddressSlot {
    /// Remote address targeted by an HTTP client.
    HttpClient,
    /// Peer a datagram was sent to.
    DatagramSent,
    /// Peer a datagram was received from.
    DatagramReceived,
    /// Remote address targeted by a net client.
    NetClient,
}

impl AddressSlot {
    /// Resource kind whose reporter owns this buffer.
    pub const fn owner(self) -> ResourceKind {
        match self {
            Self::HttpClient => ResourceKind::HttpClient,
            Self::DatagramSent | Self::DatagramReceived => ResourceKind::DatagramSocket,
            Self::NetClient => ResourceKind::NetClient,
        }
    }
}

/// A unit of work that produces and sends the current snapshot of one
/// resource kind.
///
/// The `Display` implementation is the reporter's identity in logs and audit
/// events.
///
/// # Example
///
/// ```rust,ignore
/// use async_trait::async_trait;
/// use inventory_batcher::core::{EntityReporter, ReportError, ResourceKind};
///
/// struct Heartbeat;
///
/// impl std::fmt::Display for Heartbeat {
///     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
///         f.write_str("heartbeat")
///     }
/// }
///
/// #[async_trait]
/// impl EntityReporter for Heartbeat {
///     fn kind(&self) -> ResourceKind {
///         ResourceKind::EventBus
///     }
///
///     async fn report(&self) -> Result<(), ReportError> {
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait EntityReporter: fmt::Display + Send + Sync + 'static {
    /// Kind of entity this reporter sends.
    fn kind(&self) -> ResourceKind;

    /// Send the current snapshot.
    ///
    /// Reporters that buffer state clear what they sent only after a
    /// successful send; the scheduler does not track buffer contents.
    async fn report(&self) -> Result<(), ReportError>;
}

/// Reporter that owns one or more address buffers.
pub trait AddressBuffered: EntityReporter {
    /// Buffer `address` for the next report. Slots the reporter does not own
    /// are ignored.
    fn add_address(&self, slot: AddressSlot, address: SocketAddr);

    /// True when at least one buffered address has not been sent yet. An
    /// address that was already reported does not count.
    fn has_pending(&self) -> bool;
}
