//! Diagnostic logging to stderr
//!
//! The level comes from the command line only; stdout stays reserved for
//! the report and the derived keyword.

use tracing_subscriber::EnvFilter;

use crate::cli::VerbosityLevel;

/// Filter directive for a verbosity level. Dependencies stay at `warn`
/// so HTTP internals do not drown out the client's own messages.
pub fn filter_directive(verbosity: VerbosityLevel) -> String {
    let level = match verbosity {
        VerbosityLevel::Quiet => "error",
        VerbosityLevel::Normal => "warn",
        VerbosityLevel::Verbose => "debug",
    };
    let dependencies = if verbosity == VerbosityLevel::Quiet {
        "error"
    } else {
        "warn"
    };
    format!("{},docval_client={}", dependencies, level)
}

/// Install the global subscriber
pub fn init_logging(
    verbosity: VerbosityLevel,
) -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter_directive(verbosity)))
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(atty::is(atty::Stream::Stderr))
        .compact()
        .try_init()
}
