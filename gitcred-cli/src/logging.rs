//! # Logging Setup
//!
//! Every log line goes to stderr. Standard output carries the credential
//! protocol response and anything else written there would be read by git.

use std::env;

use tracing::{Level, debug};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

/// Environment variable holding comma-separated helper flags
pub const FLAGS_ENV: &str = "GIT_CRED_STORE_FLAGS";

/// Flag that turns on protocol tracing
pub const TRACE_FLAG: &str = "trace";

/// Map the `-v` count to a tracing level
pub fn level_for_verbosity(verbose: u8) -> Level {
  match verbose {
    0 => Level::WARN,  // Default: warnings and errors
    1 => Level::INFO,  // -v: info, warnings, and errors
    2 => Level::DEBUG, // -vv: debug, info, warnings, and errors
    _ => Level::TRACE, // -vvv or more: trace and everything else
  }
}

/// Whether the flag list contains `trace`
pub fn trace_requested(flags: &str) -> bool {
  flags
    .split(',')
    .any(|flag| flag.trim().eq_ignore_ascii_case(TRACE_FLAG))
}

/// Resolve the effective level from verbosity and the helper flags
pub fn effective_level(verbose: u8, flags: Option<&str>) -> Level {
  let level = level_for_verbosity(verbose);
  if flags.is_some_and(trace_requested) {
    level.max(Level::DEBUG)
  } else {
    level
  }
}

/// Install the global subscriber
pub fn init(verbose: u8) {
  let flags = env::var(FLAGS_ENV).ok();
  let level = effective_level(verbose, flags.as_deref());

  tracing_subscriber::registry()
    .with(fmt::layer().with_writer(std::io::stderr))
    .with(EnvFilter::from_default_env().add_directive(level.into()))
    .init();

  debug!("Tracing initialized with level: {}", level);
}
