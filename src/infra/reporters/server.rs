//! Reporters for servers bound to a specific address.

use std::fmt;
use std::net::SocketAddr;

use async_trait::async_trait;
use serde_json::json;

use super::ReporterContext;
use crate::core::{EntityReporter, ReportError, ResourceKind};

/// One bound HTTP or net server. Each bind gets its own reporter and its own
/// queue entry.
#[derive(Debug)]
pub struct ServerReporter {
    ctx: ReporterContext,
    kind: ResourceKind,
    address: SocketAddr,
}

impl ServerReporter {
    /// Reporter for an HTTP server bound to `address`.
    pub const fn http(ctx: ReporterContext, address: SocketAddr) -> Self {
        Self {
            ctx,
            kind: ResourceKind::HttpServer,
            address,
        }
    }

    /// Reporter for a net server bound to `address`.
    pub const fn net(ctx: ReporterContext, address: SocketAddr) -> Self {
        Self {
            ctx,
            kind: ResourceKind::NetServer,
            address,
        }
    }

    /// Bound address.
    pub const fn address(&self) -> SocketAddr {
        self.address
    }
}

impl fmt::Display for ServerReporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.kind, self.address)
    }
}

#[async_trait]
impl EntityReporter for ServerReporter {
    fn kind(&self) -> ResourceKind {
        self.kind
    }

    async fn report(&self) -> Result<(), ReportError> {
        let address = self.address.to_string();
        let request = self.ctx.sub_resource_request(
            self.kind,
            Some(&address),
            json!({ "host": self.address.ip().to_string(), "port": self.address.port() }),
        );
        self.ctx.transport.send(request).await?;
        Ok(())
    }
}
