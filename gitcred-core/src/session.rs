//! # Protocol Session
//!
//! Drives one invocation end to end: decode the request block, dispatch the
//! command, encode the response. The session tracks which phase it is in so a
//! failure can be attributed precisely in the logs.

use std::fmt;
use std::io::{BufRead, Write};
use std::str::FromStr;

use tracing::{error, trace};

use crate::dispatch::{Command, Dispatcher, Reply};
use crate::error::{Error, Result};
use crate::protocol::{self, AttributeMap};

/// Attribute naming the real command for the `debug` pseudo-command
pub const DEBUG_COMMAND_ATTRIBUTE: &str = "cmd";

/// What the helper was asked to do on its command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Invocation {
  Command(Command),
  /// Read the command from the request's `cmd` attribute
  Debug,
}

impl FromStr for Invocation {
  type Err = Error;

  fn from_str(name: &str) -> Result<Self> {
    if name.eq_ignore_ascii_case("debug") {
      return Ok(Self::Debug);
    }
    name.parse().map(Self::Command)
  }
}

/// Phases of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
  Idle,
  Decoding,
  Dispatching,
  Getting,
  Storing,
  Erasing,
  Encoding,
  Done,
  Error,
}

impl Phase {
  const fn for_command(command: Command) -> Self {
    match command {
      Command::Get => Self::Getting,
      Command::Store => Self::Storing,
      Command::Erase => Self::Erasing,
    }
  }
}

impl fmt::Display for Phase {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    fmt::Debug::fmt(self, f)
  }
}

/// A single request/response exchange with git
pub struct Session<'a> {
  dispatcher: &'a Dispatcher<'a>,
  phase: Phase,
}

impl<'a> Session<'a> {
  pub fn new(dispatcher: &'a Dispatcher<'a>) -> Self {
    Self {
      dispatcher,
      phase: Phase::Idle,
    }
  }

  pub fn phase(&self) -> Phase {
    self.phase
  }

  /// Serve one invocation, reading the request from `input` and writing the
  /// response to `output`.
  ///
  /// Handler diagnostics are returned in the [`Reply`]; only failures of the
  /// streams themselves (or a `debug` request without a usable `cmd`) are
  /// returned as errors, after which the session is in [`Phase::Error`].
  pub fn run<R: BufRead, W: Write>(&mut self, invocation: Invocation, input: R, output: W) -> Result<Reply> {
    let result = self.serve(invocation, input, output);
    match &result {
      Ok(_) => self.advance(Phase::Done),
      Err(err) => {
        error!("Session failed while {}: {err}", self.phase);
        self.advance(Phase::Error);
      }
    }
    result
  }

  fn serve<R: BufRead, W: Write>(&mut self, invocation: Invocation, input: R, output: W) -> Result<Reply> {
    self.advance(Phase::Decoding);
    let mut attributes = protocol::decode(input).map_err(Error::Protocol)?;

    self.advance(Phase::Dispatching);
    let command = resolve_command(invocation, &mut attributes)?;

    self.advance(Phase::for_command(command));
    let reply = self.dispatcher.dispatch(command, &attributes);

    self.advance(Phase::Encoding);
    match protocol::encode(&reply.response, output) {
      Ok(()) => Ok(reply),
      Err(source) => Err(Error::Response {
        source,
        diagnostics: reply.diagnostics,
      }),
    }
  }

  fn advance(&mut self, next: Phase) {
    trace!("Session phase {} -> {next}", self.phase);
    self.phase = next;
  }
}

fn resolve_command(invocation: Invocation, attributes: &mut AttributeMap) -> Result<Command> {
  match invocation {
    Invocation::Command(command) => Ok(command),
    Invocation::Debug => attributes
      .remove(DEBUG_COMMAND_ATTRIBUTE)
      .ok_or(Error::MissingDebugCommand)?
      .parse(),
  }
}
