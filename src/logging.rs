//! Tracing subscriber setup.
//!
//! Logs go to stderr so stdout stays machine-readable for JSON and SARIF.
//! `MAPPCHECK_LOG` takes any `EnvFilter` directive; without it the level is
//! `warn`, or `debug` with `--verbose`.

use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "MAPPCHECK_LOG";

fn filter(verbose: bool) -> EnvFilter {
    match std::env::var(LOG_ENV) {
        Ok(directives) if !directives.trim().is_empty() => EnvFilter::new(directives),
        _ if verbose => EnvFilter::new("mappcheck=debug"),
        _ => EnvFilter::new("warn"),
    }
}

/// Install the global subscriber. Safe to call more than once.
pub fn init(verbose: bool) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter(verbose))
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
