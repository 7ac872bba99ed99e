//! Feed and root resource reporters used during bootstrap.

use std::fmt;

use async_trait::async_trait;
use serde_json::json;

use super::ReporterContext;
use crate::core::{EntityReporter, ReportError, ResourceKind};
use crate::infra::transport::InventoryRequest;

/// Creates the feed entity for this process.
#[derive(Debug)]
pub struct FeedReporter {
    ctx: ReporterContext,
}

impl FeedReporter {
    /// Create a feed reporter.
    pub const fn new(ctx: ReporterContext) -> Self {
        Self { ctx }
    }
}

impl fmt::Display for FeedReporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "feed[{}]", self.ctx.feed_id)
    }
}

#[async_trait]
impl EntityReporter for FeedReporter {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Feed
    }

    async fn report(&self) -> Result<(), ReportError> {
        let request = InventoryRequest::post(
            "/entity/feed",
            json!({ "id": self.ctx.feed_id, "name": self.ctx.feed_id }),
        );
        // a feed left over from an earlier run is reused as is
        self.ctx.transport.send(request).await?;
        Ok(())
    }
}

/// Creates the root resource directly under the feed.
#[derive(Debug)]
pub struct RootResourceReporter {
    ctx: ReporterContext,
}

impl RootResourceReporter {
    /// Create a root resource reporter.
    pub const fn new(ctx: ReporterContext) -> Self {
        Self { ctx }
    }
}

impl fmt::Display for RootResourceReporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "root-resource[{}]", self.ctx.root_id)
    }
}

#[async_trait]
impl EntityReporter for RootResourceReporter {
    fn kind(&self) -> ResourceKind {
        ResourceKind::RootResource
    }

    async fn report(&self) -> Result<(), ReportError> {
        let request = InventoryRequest::post(
            format!("/entity/f;{}/resource", self.ctx.feed_id),
            json!({
                "id": self.ctx.root_id,
                "name": self.ctx.root_id,
                "resourceTypePath": format!("/rt;{}", ResourceKind::RootResource),
                "properties": { "pid": std::process::id() },
            }),
        );
        self.ctx.transport.send(request).await?;
        Ok(())
    }
}
