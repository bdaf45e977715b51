//! # Credential Helper Mode
//!
//! Builds the platform's store and prompt and runs one protocol session over
//! the process's standard streams.

use std::env;
use std::io;
use std::process::ExitCode;

use anyhow::Result;
use gitcred_core::prompt::{CredentialPrompt, DisabledPrompt, TerminalPrompt};
use gitcred_core::store::SecretStore;
use gitcred_core::{Dispatcher, Error, Invocation, Session};
use tracing::debug;

use crate::config::{ConfigDirs, HelperConfig, TERMINAL_PROMPT_ENV};
use crate::output::print_error;

/// Credential Manager on Windows
#[cfg(windows)]
pub fn build_store(config: &HelperConfig, _dirs: Option<&ConfigDirs>) -> Result<Box<dyn SecretStore>> {
  use gitcred_core::store::CredentialManagerStore;

  debug!("Using Windows Credential Manager");
  Ok(Box::new(CredentialManagerStore::new(config.persist.into())))
}

/// The netrc store everywhere else
#[cfg(not(windows))]
pub fn build_store(config: &HelperConfig, dirs: Option<&ConfigDirs>) -> Result<Box<dyn SecretStore>> {
  use gitcred_core::store::NetrcStore;

  let path = config.resolve_netrc_path(dirs)?;
  debug!("Using netrc store at {}", path.display());
  Ok(Box::new(NetrcStore::new(path)))
}

/// Prompt for this platform plus whether the dispatcher may use it
pub fn build_prompt(config: &HelperConfig) -> (Box<dyn CredentialPrompt>, bool) {
  let git_terminal_prompt = env::var(TERMINAL_PROMPT_ENV).ok();
  let terminal = TerminalPrompt::new();
  let supported = config.interactive_prompt_supported(git_terminal_prompt.as_deref(), terminal.is_interactive());
  debug!("Interactive prompt supported: {}", supported);

  if supported {
    (platform_prompt(terminal), true)
  } else {
    (Box::new(DisabledPrompt), false)
  }
}

#[cfg(windows)]
fn platform_prompt(_terminal: TerminalPrompt) -> Box<dyn CredentialPrompt> {
  Box::new(gitcred_core::prompt::CredUiPrompt)
}

#[cfg(not(windows))]
fn platform_prompt(terminal: TerminalPrompt) -> Box<dyn CredentialPrompt> {
  Box::new(terminal)
}

/// Run one helper invocation against stdin and stdout
pub fn run(invocation: Invocation, config: &HelperConfig, dirs: Option<&ConfigDirs>) -> ExitCode {
  let store = match build_store(config, dirs) {
    Ok(store) => store,
    Err(err) => {
      print_error(&format!("{err:#}"));
      return ExitCode::FAILURE;
    }
  };
  let (prompt, interactive) = build_prompt(config);
  let dispatcher = Dispatcher::new(store.as_ref(), prompt.as_ref()).with_interactive_prompt(interactive);

  let mut session = Session::new(&dispatcher);
  match session.run(invocation, io::stdin().lock(), io::stdout().lock()) {
    Ok(reply) => {
      for diagnostic in &reply.diagnostics {
        print_error(&diagnostic.to_string());
      }
      ExitCode::SUCCESS
    }
    Err(err @ Error::UnknownCommand(_)) => {
      print_error(&err.to_string());
      eprintln!("{}", crate::cli::usage());
      ExitCode::FAILURE
    }
    Err(Error::Response { source, diagnostics }) => {
      print_error(&format!("Failed to write the response: {source}"));
      for diagnostic in &diagnostics {
        print_error(&diagnostic.to_string());
      }
      ExitCode::SUCCESS
    }
    Err(err) => {
      print_error(&err.to_string());
      ExitCode::SUCCESS
    }
  }
}
