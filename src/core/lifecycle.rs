//! Lifecycle states and the bootstrap sequence.
//!
//! The inventory backend only accepts children of existing entities, so the
//! feed must exist before the root resource, and the root resource before any
//! periodic report.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::core::{EntityReporter, ReportError};

/// Scheduler lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Constructed; setup not yet run on the owning context.
    Uninitialized,
    /// Setup done; waiting for (or running) bootstrap.
    Initializing,
    /// Bootstrap succeeded and the periodic timer is armed.
    Ready,
    /// Terminal.
    Stopped,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Uninitialized => "uninitialized",
            Self::Initializing => "initializing",
            Self::Ready => "ready",
            Self::Stopped => "stopped",
        })
    }
}

/// Bootstrap step that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapStage {
    /// Feed creation.
    Feed,
    /// Root resource creation.
    RootResource,
}

impl fmt::Display for BootstrapStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Feed => "feed",
            Self::RootResource => "root resource",
        })
    }
}

/// Bootstrap failure with the stage that caused it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("bootstrap failed creating {stage}: {cause}")]
pub struct BootstrapError {
    /// Failing stage.
    pub stage: BootstrapStage,
    /// Underlying report failure.
    pub cause: ReportError,
}

/// Create the feed, then the root resource. The root resource is never
/// attempted when feed creation fails.
pub async fn bootstrap(
    feed: &Arc<dyn EntityReporter>,
    root: &Arc<dyn EntityReporter>,
) -> Result<(), BootstrapError> {
    feed.report().await.map_err(|cause| BootstrapError {
        stage: BootstrapStage::Feed,
        cause,
    })?;
    tracing::info!(reporter = %feed, "feed created");

    root.report().await.map_err(|cause| BootstrapError {
        stage: BootstrapStage::RootResource,
        cause,
    })?;
    tracing::info!(reporter = %root, "root resource created");
    Ok(())
}
