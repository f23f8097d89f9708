//! Internal settings.
//!
//! This module initializes the logging configuration at startup. The
//! behavior is controlled by the `RTREE_DEBUG` environment variable. If
//! `RTREE_DEBUG` is not set or is set to a falsy value (`"0"`, `"false"`, or
//! empty), logging remains disabled. Otherwise, a `DEBUG`-level subscriber is
//! installed. Only compiled in with the `setup_tracing` feature.

use ctor::ctor;
use tracing::Level;

#[ctor]
fn init_tracing() {
    if std::env::var("RTREE_DEBUG").map_or(true, |v| v == "0" || v == "false" || v.is_empty()) {
        // Falsy or unset: leave the default no-op subscriber in place.
    } else {
        tracing_subscriber::fmt()
            .with_max_level(Level::DEBUG)
            .init();
    }
}
