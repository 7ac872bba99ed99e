//! Event-bus endpoint reporter.

use std::fmt;

use async_trait::async_trait;
use serde_json::json;

use super::ReporterContext;
use crate::core::{EntityReporter, ReportError, ResourceKind};

/// Reports the process event bus as a single sub-resource.
#[derive(Debug)]
pub struct EventBusReporter {
    ctx: ReporterContext,
}

impl EventBusReporter {
    /// Create an event-bus reporter.
    pub const fn new(ctx: ReporterContext) -> Self {
        Self { ctx }
    }
}

impl fmt::Display for EventBusReporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("event-bus")
    }
}

#[async_trait]
impl EntityReporter for EventBusReporter {
    fn kind(&self) -> ResourceKind {
        ResourceKind::EventBus
    }

    async fn report(&self) -> Result<(), ReportError> {
        let request = self
            .ctx
            .sub_resource_request(ResourceKind::EventBus, None, json!({}));
        self.ctx.transport.send(request).await?;
        Ok(())
    }
}
