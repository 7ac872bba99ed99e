//! Address buffers backing the per-kind reporters.

use std::collections::BTreeSet;
use std::net::SocketAddr;

/// Addresses of one reporter, split into those already stored remotely and
/// those waiting for the next successful send.
#[derive(Debug, Default, Clone)]
pub struct AddressBuffer {
    pending: BTreeSet<SocketAddr>,
    reported: BTreeSet<SocketAddr>,
}

impl AddressBuffer {
    /// Create an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffer an address. Returns false if it was already pending or
    /// already reported.
    pub fn add(&mut self, address: SocketAddr) -> bool {
        !self.reported.contains(&address) && self.pending.insert(address)
    }

    /// Addresses currently pending, in sorted order.
    pub fn snapshot(&self) -> Vec<SocketAddr> {
        self.pending.iter().copied().collect()
    }

    /// Every address, reported or pending, in sorted order. This is the full
    /// property value a replace must carry.
    pub fn known(&self) -> Vec<SocketAddr> {
        self.pending.union(&self.reported).copied().collect()
    }

    /// Mark exactly the addresses that were sent as reported. Addresses added
    /// after the snapshot was taken stay pending.
    pub fn acknowledge(&mut self, sent: &[SocketAddr]) {
        for address in sent {
            if self.pending.remove(address) {
                self.reported.insert(*address);
            }
        }
    }

    /// Number of pending addresses.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// True when nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
