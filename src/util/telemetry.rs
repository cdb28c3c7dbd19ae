//! Tracing setup for binaries and tests that embed the queue.
//!
//! The library only emits `tracing` events; installing a subscriber is the
//! host application's choice.

use tracing_subscriber::EnvFilter;

/// Install a fmt subscriber filtered by `RUST_LOG`, unless one is already set.
pub fn init_tracing() {
    install(EnvFilter::from_default_env());
}

/// Install a fmt subscriber with an explicit filter such as
/// `"lane_queue=debug"`, unless one is already set. Falls back to `RUST_LOG`
/// when the directive does not parse.
pub fn init_tracing_with(directives: &str) {
    let filter = EnvFilter::try_new(directives).unwrap_or_else(|_| EnvFilter::from_default_env());
    install(filter);
}

fn install(filter: EnvFilter) {
    if tracing::dispatcher::has_been_set() {
        return;
    }
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
