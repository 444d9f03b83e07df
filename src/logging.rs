use std::io::IsTerminal;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter when verbose mode is on
pub const VERBOSE_FILTER: &str = "workerpool=debug";

/// Filter when verbose mode is off; nothing is ever emitted
pub const QUIET_FILTER: &str = "off";

/// Default filter directives for the given verbosity
pub fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        VERBOSE_FILTER
    } else {
        QUIET_FILTER
    }
}

/// Filter for the given verbosity.
///
/// `RUST_LOG` is only consulted in verbose mode. Without `--verbose` the
/// filter is always `off`.
pub fn build_filter(verbose: bool) -> EnvFilter {
    if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(VERBOSE_FILTER))
    } else {
        EnvFilter::new(QUIET_FILTER)
    }
}

/// Install the global tracing subscriber.
///
/// Diagnostics go to stderr so stdout only ever carries result JSON. Colour
/// is only used when stderr is a terminal.
/// Calling this twice is harmless; the second call is ignored.
pub fn init_tracing(verbose: bool) {
    let _ = tracing_subscriber::registry()
        .with(build_filter(verbose))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(std::io::stderr().is_terminal()),
        )
        .try_init();
}
