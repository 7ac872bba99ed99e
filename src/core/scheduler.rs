//! Batch scheduler: pending queue, periodic flush and retry-wrapped dispatch.
//!
//! One task owns every piece of mutable state (pending queue, address
//! registry, batch window, lifecycle). The cloneable [`BatchScheduler`]
//! handle only sends [`Command`]s to it, so callers on any thread never touch
//! that state directly. Spawned work (bootstrap, report attempts, retry
//! timers) reports back through the same channel.

use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::core::lifecycle::{bootstrap, BootstrapError, BootstrapStage, LifecycleState};
use crate::core::retry::{DispatchJob, RetryPolicy};
use crate::core::{
    build_audit_event, AddressBuffered, AddressSlot, AuditAction, AuditSink, EntityReporter,
    ReportError, ResourceKind,
};
use crate::runtime::ExecutionContext;

/// Timing and retry settings for one scheduler.
#[derive(Debug, Clone)]
pub struct SchedulerSettings {
    /// Flush window; also the period of the timer.
    pub batch_delay: Duration,
    /// Retry policy for failed periodic reports.
    pub retry: RetryPolicy,
}

/// Reporters handed to the scheduler at construction.
pub struct SchedulerParts {
    /// Creates the feed during bootstrap.
    pub feed: Arc<dyn EntityReporter>,
    /// Creates the root resource during bootstrap.
    pub root: Arc<dyn EntityReporter>,
    /// Per-kind reporters owning address buffers. Seeded into the first batch.
    pub buffered: Vec<Arc<dyn AddressBuffered>>,
    /// Other reporters seeded into the first batch.
    pub initial: Vec<Arc<dyn EntityReporter>>,
}

/// Flush-window bookkeeping.
///
/// A flush happens only when at least `delay` has passed since `last_send`
/// and something is pending. The caller resets the window on every tick,
/// whether or not it flushed.
#[derive(Debug, Clone, Copy)]
pub struct BatchWindow {
    last_send: Instant,
    delay: Duration,
}

impl BatchWindow {
    /// Open a window starting at `now`.
    pub const fn new(delay: Duration, now: Instant) -> Self {
        Self {
            last_send: now,
            delay,
        }
    }

    /// True when a tick at `now` with `pending` queued reporters must flush.
    pub fn is_eligible(&self, now: Instant, pending: usize) -> bool {
        pending > 0 && now.saturating_duration_since(self.last_send) >= self.delay
    }

    /// Restart the window at `now`.
    pub fn reset(&mut self, now: Instant) {
        self.last_send = now;
    }

    /// Start of the current window.
    pub const fn last_send(&self) -> Instant {
        self.last_send
    }
}

/// Messages processed by the scheduler task.
enum Command {
    Start,
    RegisterSubResource(Arc<dyn EntityReporter>),
    AddAddress(AddressSlot, SocketAddr),
    Stop,
    BootstrapFinished(Result<(), BootstrapError>),
    DispatchFinished(DispatchJob, Result<(), ReportError>),
    RetryDue(DispatchJob),
}

/// Handle to a running batch scheduler.
///
/// All operations are fire-and-forget: failures surface only in logs and the
/// optional audit sink.
#[derive(Clone)]
pub struct BatchScheduler {
    tx: mpsc::UnboundedSender<Command>,
    state: watch::Receiver<LifecycleState>,
}

impl BatchScheduler {
    /// Create the scheduler and spawn its task on `context`. Setup (registry
    /// and initial batch) runs on that task before any command is handled.
    pub fn spawn(
        parts: SchedulerParts,
        settings: SchedulerSettings,
        context: ExecutionContext,
        audit: Option<Box<dyn AuditSink>>,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(LifecycleState::Uninitialized);

        let actor = SchedulerTask {
            rx,
            self_tx: tx.downgrade(),
            context: context.clone(),
            state: state_tx,
            settings: settings.clone(),
            window: BatchWindow::new(settings.batch_delay, Instant::now()),
            feed: parts.feed,
            root: parts.root,
            registry: HashMap::new(),
            queue: Vec::new(),
            queued_buffered: HashSet::new(),
            ticker: None,
            bootstrapping: false,
            in_flight: 0,
            cancel: CancellationToken::new(),
            audit,
        };
        context.spawn(actor.run(parts.buffered, parts.initial));

        Self {
            tx,
            state: state_rx,
        }
    }

    /// Run bootstrap (feed, then root resource) and arm the periodic timer on
    /// success. Call once; a failed bootstrap needs another explicit call.
    pub fn start(&self) {
        self.send(Command::Start);
    }

    /// Queue a freshly built reporter for the next flush.
    pub fn register_sub_resource(&self, reporter: Arc<dyn EntityReporter>) {
        self.send(Command::RegisterSubResource(reporter));
    }

    /// Buffer an address in the per-kind reporter owning `slot`.
    ///
    /// If that reporter was already flushed and the address is new to it, the
    /// reporter is queued again (at most once per flush) so the address goes
    /// out with the next batch.
    pub fn add_address(&self, slot: AddressSlot, address: SocketAddr) {
        self.send(Command::AddAddress(slot, address));
    }

    /// Cancel the timer and any pending retries, then release reporters and
    /// the transport. Terminal.
    pub fn stop(&self) {
        self.send(Command::Stop);
    }

    /// Current lifecycle state.
    pub fn state(&self) -> LifecycleState {
        *self.state.borrow()
    }

    /// Watch lifecycle transitions.
    pub fn subscribe(&self) -> watch::Receiver<LifecycleState> {
        self.state.clone()
    }

    fn send(&self, cmd: Command) {
        if self.tx.send(cmd).is_err() {
            tracing::debug!("inventory scheduler already stopped; command dropped");
        }
    }
}

impl std::fmt::Debug for BatchScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchScheduler")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

struct SchedulerTask {
    rx: mpsc::UnboundedReceiver<Command>,
    self_tx: mpsc::WeakUnboundedSender<Command>,
    context: ExecutionContext,
    state: watch::Sender<LifecycleState>,
    settings: SchedulerSettings,
    window: BatchWindow,
    feed: Arc<dyn EntityReporter>,
    root: Arc<dyn EntityReporter>,
    registry: HashMap<ResourceKind, Arc<dyn AddressBuffered>>,
    queue: Vec<Arc<dyn EntityReporter>>,
    /// Buffered kinds currently sitting in `queue`.
    queued_buffered: HashSet<ResourceKind>,
    ticker: Option<Interval>,
    bootstrapping: bool,
    in_flight: usize,
    cancel: CancellationToken,
    audit: Option<Box<dyn AuditSink>>,
}

/// Scheduled instant of the next tick. Never resolves while unarmed.
async fn next_tick(ticker: &mut Option<Interval>) -> Instant {
    match ticker {
        Some(interval) => interval.tick().await,
        None => std::future::pending().await,
    }
}

impl SchedulerTask {
    async fn run(
        mut self,
        buffered: Vec<Arc<dyn AddressBuffered>>,
        initial: Vec<Arc<dyn EntityReporter>>,
    ) {
        self.setup(buffered, initial);

        loop {
            tokio::select! {
                cmd = self.rx.recv() => {
                    let Some(cmd) = cmd else {
                        tracing::debug!("all scheduler handles dropped");
                        self.shutdown();
                        break;
                    };
                    if !self.handle(cmd) {
                        break;
                    }
                }
                at = next_tick(&mut self.ticker) => self.on_tick(at),
            }
        }
    }

    fn setup(
        &mut self,
        buffered: Vec<Arc<dyn AddressBuffered>>,
        initial: Vec<Arc<dyn EntityReporter>>,
    ) {
        for reporter in buffered {
            let kind = reporter.kind();
            let entity: Arc<dyn EntityReporter> = reporter.clone();
            self.queue.push(entity);
            self.queued_buffered.insert(kind);
            self.registry.insert(kind, reporter);
        }
        self.queue.extend(initial);
        self.set_state(LifecycleState::Initializing);
        tracing::info!(pending = self.queue.len(), "inventory scheduler initialized");
    }

    /// Returns false once the task must exit.
    fn handle(&mut self, cmd: Command) -> bool {
        match cmd {
            Command::Start => self.on_start(),
            Command::RegisterSubResource(reporter) => {
                tracing::debug!(reporter = %reporter, "sub-resource registered");
                self.queue.push(reporter);
            }
            Command::AddAddress(slot, address) => self.on_add_address(slot, address),
            Command::Stop => {
                self.shutdown();
                return false;
            }
            Command::BootstrapFinished(result) => self.on_bootstrap_finished(result),
            Command::DispatchFinished(job, outcome) => self.on_dispatch_finished(job, outcome),
            Command::RetryDue(job) => self.dispatch(job),
        }
        true
    }

    fn on_start(&mut self) {
        match self.current_state() {
            LifecycleState::Ready => {
                tracing::warn!("inventory scheduler already started; ignoring start");
            }
            LifecycleState::Stopped => {
                tracing::warn!("inventory scheduler stopped; ignoring start");
            }
            LifecycleState::Uninitialized | LifecycleState::Initializing => {
                if self.bootstrapping {
                    tracing::warn!("bootstrap already running; ignoring start");
                    return;
                }
                let Some(tx) = self.self_tx.upgrade() else {
                    return;
                };
                self.bootstrapping = true;
                let feed = Arc::clone(&self.feed);
                let root = Arc::clone(&self.root);
                let token = self.cancel.clone();
                self.context.spawn(async move {
                    let result = tokio::select! {
                        result = bootstrap(&feed, &root) => result,
                        () = token.cancelled() => return,
                    };
                    let _ = tx.send(Command::BootstrapFinished(result));
                });
            }
        }
    }

    fn on_bootstrap_finished(&mut self, result: Result<(), BootstrapError>) {
        self.bootstrapping = false;
        match result {
            Ok(()) => {
                let (feed, root) = (self.feed.to_string(), self.root.to_string());
                self.record(&feed, ResourceKind::Feed, AuditAction::Bootstrap, 0, None);
                self.record(&root, ResourceKind::RootResource, AuditAction::Bootstrap, 0, None);
                let delay = self.settings.batch_delay;
                let mut interval = tokio::time::interval_at(Instant::now() + delay, delay);
                interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
                self.ticker = Some(interval);
                self.set_state(LifecycleState::Ready);
                tracing::info!(batch_delay = ?delay, "inventory reporting started");
            }
            Err(err) => {
                tracing::error!(stage = %err.stage, error = %err.cause, "inventory bootstrap failed");
                let (reporter, kind) = match err.stage {
                    BootstrapStage::Feed => (self.feed.to_string(), ResourceKind::Feed),
                    BootstrapStage::RootResource => {
                        (self.root.to_string(), ResourceKind::RootResource)
                    }
                };
                self.record(&reporter, kind, AuditAction::Failed, 0, Some(err.cause.to_string()));
            }
        }
    }

    fn on_add_address(&mut self, slot: AddressSlot, address: SocketAddr) {
        let kind = slot.owner();
        let Some(reporter) = self.registry.get(&kind) else {
            tracing::debug!(?slot, %address, "no reporter for address slot");
            return;
        };
        reporter.add_address(slot, address);
        // a reporter flushed earlier goes back into the queue, once, and only
        // when the address was new to it
        if reporter.has_pending() && self.queued_buffered.insert(kind) {
            let entity: Arc<dyn EntityReporter> = reporter.clone();
            self.queue.push(entity);
        }
    }

    /// `at` is the instant the tick was scheduled for, not when it was
    /// handled, so handling latency never shifts the window.
    fn on_tick(&mut self, at: Instant) {
        if self.window.is_eligible(at, self.queue.len()) {
            let batch = std::mem::take(&mut self.queue);
            self.queued_buffered.clear();
            tracing::debug!(reporters = batch.len(), "flushing inventory batch");
            for reporter in batch {
                self.dispatch(DispatchJob::new(reporter));
            }
        }
        self.window.reset(at);
    }

    fn dispatch(&mut self, job: DispatchJob) {
        let Some(tx) = self.self_tx.upgrade() else {
            return;
        };
        self.record(
            &job.reporter.to_string(),
            job.reporter.kind(),
            AuditAction::Dispatched,
            job.attempt(),
            None,
        );
        self.in_flight += 1;
        let token = self.cancel.clone();
        self.context.spawn(async move {
            let outcome = tokio::select! {
                outcome = job.reporter.report() => outcome,
                () = token.cancelled() => Err(ReportError::Cancelled),
            };
            let _ = tx.send(Command::DispatchFinished(job, outcome));
        });
    }

    fn on_dispatch_finished(&mut self, job: DispatchJob, outcome: Result<(), ReportError>) {
        self.in_flight = self.in_flight.saturating_sub(1);
        let reporter = job.reporter.to_string();
        let kind = job.reporter.kind();
        let attempt = job.attempt();

        match outcome {
            Ok(()) => {
                tracing::info!(reporter = %reporter, attempt, "DONE");
                self.record(&reporter, kind, AuditAction::Completed, attempt, None);
            }
            Err(ReportError::Cancelled) => {
                tracing::debug!(reporter = %reporter, attempt, "report cancelled");
            }
            Err(err) => {
                tracing::error!(reporter = %reporter, attempt, error = %err, "FAIL");
                self.record(&reporter, kind, AuditAction::Failed, attempt, Some(err.to_string()));
                match job.rearm(&self.settings.retry, Instant::now()) {
                    Some(job) => self.schedule_retry(job),
                    None => {
                        tracing::warn!(reporter = %reporter, attempts = attempt, "giving up on report");
                        self.record(&reporter, kind, AuditAction::Abandoned, attempt, None);
                    }
                }
            }
        }
    }

    fn schedule_retry(&mut self, job: DispatchJob) {
        let due = job.next_eligible.unwrap_or_else(Instant::now);
        if due <= Instant::now() {
            self.dispatch(job);
            return;
        }
        let Some(tx) = self.self_tx.upgrade() else {
            return;
        };
        tracing::debug!(reporter = %job.reporter, failures = job.failures, "retry scheduled");
        let token = self.cancel.clone();
        self.context.spawn(async move {
            tokio::select! {
                () = tokio::time::sleep_until(due) => {
                    let _ = tx.send(Command::RetryDue(job));
                }
                () = token.cancelled() => {}
            }
        });
    }

    fn shutdown(&mut self) {
        self.ticker = None;
        self.cancel.cancel();
        let unsent = std::mem::take(&mut self.queue);
        for reporter in &unsent {
            self.record(&reporter.to_string(), reporter.kind(), AuditAction::Cancelled, 0, None);
        }
        self.queued_buffered.clear();
        self.registry.clear();
        self.set_state(LifecycleState::Stopped);
        tracing::info!(
            unsent = unsent.len(),
            in_flight = self.in_flight,
            "inventory scheduler stopped"
        );
    }

    fn record(
        &mut self,
        reporter: &str,
        kind: ResourceKind,
        action: AuditAction,
        attempt: u32,
        detail: Option<String>,
    ) {
        if let Some(sink) = self.audit.as_mut() {
            sink.record(build_audit_event(reporter, kind, action, attempt, detail));
        }
    }

    fn current_state(&self) -> LifecycleState {
        *self.state.borrow()
    }

    fn set_state(&self, state: LifecycleState) {
        self.state.send_replace(state);
    }
}
