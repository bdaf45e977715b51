//! Error taxonomy for a single helper invocation.
//!
//! Every variant ends the current command with a diagnostic on stderr. None of
//! them is allowed to crash the process: git treats a crashed helper as a hard
//! failure of the whole credential pipeline.

use thiserror::Error;

use crate::prompt::PromptError;
use crate::store::StoreError;
use crate::target::TargetError;

/// Errors surfaced while serving a credential request
#[derive(Debug, Error)]
pub enum Error {
  /// The command name is not one of `get`, `store` or `erase`
  #[error("Unknown command: '{0}'")]
  UnknownCommand(String),

  /// The `debug` pseudo-command was used without a `cmd` attribute
  #[error("The debug command requires a 'cmd' attribute in the request")]
  MissingDebugCommand,

  /// The request stream could not be read
  #[error("Malformed protocol stream: {0}")]
  Protocol(#[source] std::io::Error),

  /// The response could not be framed or written. Diagnostics the command
  /// produced before that are kept alongside.
  #[error("Malformed protocol stream: {source}")]
  Response {
    #[source]
    source: std::io::Error,
    diagnostics: Vec<Error>,
  },

  /// A required attribute was absent or empty
  #[error("{0} parameter must be provided")]
  MissingField(&'static str),

  /// The request attributes do not form a usable URL
  #[error(transparent)]
  InvalidTarget(#[from] TargetError),

  /// The secret store rejected an operation
  #[error("Failed to {operation} credential: {source}")]
  Store {
    operation: &'static str,
    #[source]
    source: StoreError,
  },

  /// The interactive prompt failed (not cancelled, failed)
  #[error("Error prompting for credentials: {0}")]
  Prompt(#[from] PromptError),
}

impl Error {
  pub(crate) const fn store(operation: &'static str, source: StoreError) -> Self {
    Self::Store { operation, source }
  }
}

pub type Result<T> = std::result::Result<T, Error>;
