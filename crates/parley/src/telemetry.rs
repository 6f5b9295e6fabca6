//! Tracing setup for embedding applications.
//!
//! The engine itself only emits `tracing` events; hosts that want output can
//! call [`init`] once at startup, or install their own subscriber.

use tracing_subscriber::prelude::*;

/// Install a console subscriber.
///
/// `RUST_LOG` overrides the built-in filter. Panics if a global subscriber
/// is already set, so call it once from the host's entry point.
pub fn init(verbose: bool) {
    let filter = if verbose {
        "parley=debug,parley_memory=debug,parley_session=debug,parley_signals=debug,parley_planner=debug,info"
    } else {
        "parley=info,parley_memory=info,parley_session=info,parley_planner=info,warn"
    };

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_filter(env_filter),
        )
        .init();
}

/// Install a JSON subscriber for structured log collection.
pub fn init_json() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("parley=info,warn"));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_filter(env_filter),
        )
        .init();
}
