//! Tracing/logging initialization.
//!
//! Gateway refresh attempts and teardown events log through `tracing`; this
//! wires the subscriber up for host builds and tests.

use tracing_subscriber::EnvFilter;

/// Default directives when `RUST_LOG` is unset.
///
/// The gateway and session crates log their refresh/teardown decisions at
/// `debug`; everything else stays at `info` so reqwest internals don't
/// drown the interesting lines.
const DEFAULT_DIRECTIVES: &str = "info,vitrine_gateway=debug,vitrine_session=debug";

/// Initialize tracing/logging for the process.
///
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES));

    // JSON logs + timestamps, configurable via RUST_LOG.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_directives_parse_and_scope_the_client_crates() {
        let filter: EnvFilter = DEFAULT_DIRECTIVES.parse().expect("directives must parse");
        let rendered = filter.to_string();
        assert!(rendered.contains("vitrine_gateway=debug"));
        assert!(rendered.contains("vitrine_session=debug"));
    }
}
