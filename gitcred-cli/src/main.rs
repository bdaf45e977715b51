//! # gitcred Entry Point
//!
//! Git runs this binary as `git-credential-gitcred <operation>`; started with
//! no arguments it installs itself as git's credential helper.

use std::process::ExitCode;

use clap::Parser;
use gitcred_cli::cli::{self, Cli};
use gitcred_cli::logging;

fn main() -> ExitCode {
  let cmd = Cli::parse();

  logging::init(cmd.verbose);

  cli::handle_cli(cmd)
}
