//! # Observability
//!
//! One call initialises structured logging for the whole process.
//!
//! Actors, workers and clients log with structured fields (`entity_type`, `id`, `worker`,
//! `attempt`) rather than formatted strings, so output can be filtered by field.
//!
//! ```bash
//! RUST_LOG=info cargo run            # lifecycle and outcomes
//! RUST_LOG=debug cargo run           # full request payloads
//! RUST_LOG=storefront=debug cargo run
//! ```

/// Installs a compact `fmt` subscriber filtered by `RUST_LOG` (default `info`).
///
/// Safe to call more than once; later calls are ignored.
pub fn setup_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .try_init();
}
