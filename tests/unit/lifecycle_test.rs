//! Tests for the bootstrap sequence

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use inventory_batcher::core::{
    bootstrap, BootstrapStage, EntityReporter, LifecycleState, ReportError, ResourceKind,
};

struct Step {
    kind: ResourceKind,
    fail: bool,
    calls: Arc<AtomicUsize>,
}

impl Step {
    fn new(kind: ResourceKind, fail: bool) -> (Arc<dyn EntityReporter>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let step: Arc<dyn EntityReporter> = Arc::new(Self {
            kind,
            fail,
            calls: Arc::clone(&calls),
        });
        (step, calls)
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "step[{}]", self.kind)
    }
}

#[async_trait]
impl EntityReporter for Step {
    fn kind(&self) -> ResourceKind {
        self.kind
    }

    async fn report(&self) -> Result<(), ReportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            Err(ReportError::Transport("unreachable".into()))
        } else {
            Ok(())
        }
    }
}

#[tokio::test]
async fn test_bootstrap_success_runs_both() {
    let (feed, feed_calls) = Step::new(ResourceKind::Feed, false);
    let (root, root_calls) = Step::new(ResourceKind::RootResource, false);

    assert!(bootstrap(&feed, &root).await.is_ok());
    assert_eq!(feed_calls.load(Ordering::SeqCst), 1);
    assert_eq!(root_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_bootstrap_feed_failure_skips_root() {
    let (feed, _) = Step::new(ResourceKind::Feed, true);
    let (root, root_calls) = Step::new(ResourceKind::RootResource, false);

    let err = bootstrap(&feed, &root).await.unwrap_err();
    assert_eq!(err.stage, BootstrapStage::Feed);
    assert_eq!(root_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_bootstrap_root_failure_reported() {
    let (feed, _) = Step::new(ResourceKind::Feed, false);
    let (root, _) = Step::new(ResourceKind::RootResource, true);

    let err = bootstrap(&feed, &root).await.unwrap_err();
    assert_eq!(err.stage, BootstrapStage::RootResource);
    assert_eq!(err.cause, ReportError::Transport("unreachable".into()));
}

#[test]
fn test_state_display() {
    assert_eq!(LifecycleState::Initializing.to_string(), "initializing");
    assert_eq!(LifecycleState::Stopped.to_string(), "stopped");
}
