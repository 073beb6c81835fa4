//! Telemetry initialization (tracing/tracing-subscriber).
//!
//! LOG_LEVEL sets the filter, either a plain level ("debug") or full
//! directives ("info,scoring=debug,tally_backend=debug"). LOG_FORMAT
//! selects "pretty" (default) or "json" structured output.
//!
//! Targets are included in the output so domain events (`scoring`) are easy
//! to separate from service plumbing (`tally_backend`) and the per-request
//! spans added by the tower-http TraceLayer.

use tracing_subscriber::EnvFilter;

pub fn init_tracing() {
    let filter = EnvFilter::try_from_env("LOG_LEVEL").unwrap_or_else(|_| {
        EnvFilter::new("info,scoring=debug,tally_backend=debug,tower_http=info,axum=info")
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    // One builder, two terminal shapes; don't try to store different layer types.
    match std::env::var("LOG_FORMAT").as_deref() {
        Ok("json") => builder.json().init(),
        _ => builder.init(),
    }
}
