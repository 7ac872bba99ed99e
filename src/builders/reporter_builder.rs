//! Builders assembling an inventory reporter from configuration.

use std::sync::Arc;

use crate::config::InventoryConfig;
use crate::core::{
    AddressBuffered, AuditSink, BatchScheduler, EntityReporter, RetryPolicy, SchedulerError,
    SchedulerParts, SchedulerSettings,
};
use crate::infra::reporters::{
    ClientReporter, DatagramSocketReporter, EventBusReporter, FeedReporter, ReporterContext,
    RootResourceReporter,
};
use crate::infra::transport::{HttpTransport, InventoryTransport};
use crate::runtime::{ExecutionContext, InventoryReporter};

/// Build a reporter around an injected transport.
///
/// The returned reporter is `Uninitialized` until its task runs setup, then
/// `Initializing` until [`InventoryReporter::start`] bootstraps it.
pub fn build_reporter(
    cfg: &InventoryConfig,
    transport: Arc<dyn InventoryTransport>,
    context: ExecutionContext,
    audit: Option<Box<dyn AuditSink>>,
) -> Result<InventoryReporter, SchedulerError> {
    cfg.validate().map_err(SchedulerError::InvalidConfig)?;

    let feed_id = cfg
        .feed_id
        .clone()
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let ctx = ReporterContext::new(feed_id, transport);

    let buffered: Vec<Arc<dyn AddressBuffered>> = vec![
        Arc::new(ClientReporter::http(ctx.clone())),
        Arc::new(DatagramSocketReporter::new(ctx.clone())),
        Arc::new(ClientReporter::net(ctx.clone())),
    ];
    let initial: Vec<Arc<dyn EntityReporter>> = vec![Arc::new(EventBusReporter::new(ctx.clone()))];

    let parts = SchedulerParts {
        feed: Arc::new(FeedReporter::new(ctx.clone())),
        root: Arc::new(RootResourceReporter::new(ctx.clone())),
        buffered,
        initial,
    };
    let settings = SchedulerSettings {
        batch_delay: cfg.batch_delay(),
        retry: RetryPolicy::from(&cfg.retry),
    };

    tracing::debug!(feed = %ctx.feed_id, host = %cfg.host, port = cfg.port, "building inventory reporter");
    let scheduler = BatchScheduler::spawn(parts, settings, context, audit);
    Ok(InventoryReporter::new(scheduler, ctx))
}

/// Build a reporter that talks HTTP to the configured inventory host.
pub fn build_http_reporter(
    cfg: &InventoryConfig,
    context: ExecutionContext,
) -> Result<InventoryReporter, SchedulerError> {
    cfg.validate().map_err(SchedulerError::InvalidConfig)?;
    let transport = HttpTransport::new(cfg)?;
    build_reporter(cfg, Arc::new(transport), context, None)
}
