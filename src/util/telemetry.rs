//! Telemetry helpers for structured logging and tracing.

/// Initialize tracing for the reporter. Embedding applications usually install
/// their own subscriber; this helper installs an `EnvFilter`-driven fmt
/// subscriber (defaulting to `info` for this crate) only if none is set.
pub fn init_tracing() {
    if tracing::dispatcher::has_been_set() {
        return;
    }
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("inventory_batcher=info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
