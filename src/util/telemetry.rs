//! Telemetry helpers for structured logging.

/// Install a default env-filtered tracing subscriber if none is set.
///
/// Library users with their own subscriber are left untouched; this exists so
/// tests and examples get `RUST_LOG`-driven output with one call.
pub fn init_tracing() {
    if tracing::dispatcher::has_been_set() {
        return;
    }
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}
