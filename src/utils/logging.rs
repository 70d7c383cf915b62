//! Diagnostic logging setup.
//!
//! Diagnostics go to stderr so they never interleave with the chat transcript
//! on stdout. Verbosity is controlled with `REVCHAT_LOG` using the usual
//! `EnvFilter` syntax, e.g. `REVCHAT_LOG=revchat=debug`.

use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "REVCHAT_LOG";
const DEFAULT_DIRECTIVE: &str = "warn";

pub fn env_filter() -> EnvFilter {
    filter_from(std::env::var(LOG_ENV).ok().as_deref())
}

/// Build a filter from a directive string, falling back to `warn` when it is
/// missing or does not parse.
fn filter_from(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|value| EnvFilter::try_new(value).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_DIRECTIVE))
}

/// Install the global subscriber. Safe to call more than once.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
