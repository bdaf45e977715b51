//! # Command Dispatch
//!
//! Implements the three credential operations on top of a secret store and a
//! prompt. Handlers never fail outright: every problem ends up as a
//! diagnostic next to a (possibly empty) response, so git always receives a
//! well-formed answer.

use std::fmt;
use std::str::FromStr;

use tracing::{debug, info, warn};

use crate::credential::Credential;
use crate::error::Error;
use crate::prompt::{CredentialPrompt, PromptContext, PromptOutcome};
use crate::protocol::AttributeMap;
use crate::store::{DeleteOutcome, SecretStore};
use crate::target::TargetKey;

/// The operations a credential helper understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
  Get,
  Store,
  Erase,
}

impl Command {
  pub const fn as_str(self) -> &'static str {
    match self {
      Self::Get => "get",
      Self::Store => "store",
      Self::Erase => "erase",
    }
  }
}

impl fmt::Display for Command {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for Command {
  type Err = Error;

  fn from_str(name: &str) -> Result<Self, Self::Err> {
    [Self::Get, Self::Store, Self::Erase]
      .into_iter()
      .find(|command| command.as_str().eq_ignore_ascii_case(name))
      .ok_or_else(|| Error::UnknownCommand(name.to_string()))
  }
}

/// Outcome of one command: the response for git and the diagnostics for the
/// user
#[derive(Debug, Default)]
pub struct Reply {
  pub response: AttributeMap,
  pub diagnostics: Vec<Error>,
}

impl Reply {
  fn credential(credential: &Credential) -> Self {
    let mut response = AttributeMap::new();
    response.insert("username", credential.username.as_str());
    response.insert("password", credential.secret());
    Self {
      response,
      diagnostics: Vec::new(),
    }
  }

  fn diagnostic(error: Error) -> Self {
    Self {
      response: AttributeMap::new(),
      diagnostics: vec![error],
    }
  }
}

/// Routes commands to the store and prompt capabilities
pub struct Dispatcher<'a> {
  store: &'a dyn SecretStore,
  prompt: &'a dyn CredentialPrompt,
  interactive_prompt_supported: bool,
}

impl<'a> Dispatcher<'a> {
  /// Create a dispatcher that may prompt when the store has no entry
  pub fn new(store: &'a dyn SecretStore, prompt: &'a dyn CredentialPrompt) -> Self {
    Self {
      store,
      prompt,
      interactive_prompt_supported: true,
    }
  }

  /// Declare whether the environment can show an interactive prompt
  pub fn with_interactive_prompt(mut self, supported: bool) -> Self {
    self.interactive_prompt_supported = supported;
    self
  }

  pub fn dispatch(&self, command: Command, attributes: &AttributeMap) -> Reply {
    info!("Executing command: '{command}'");
    match command {
      Command::Get => self.get(attributes),
      Command::Store => self.store(attributes),
      Command::Erase => self.erase(attributes),
    }
  }

  fn get(&self, attributes: &AttributeMap) -> Reply {
    let target = match TargetKey::derive(attributes) {
      Ok(target) => target,
      Err(err) => return Reply::diagnostic(err.into()),
    };
    let username = attributes.get("username");
    debug!("Looking up credential for '{}' on {}", username.unwrap_or_default(), target.origin());

    match self.store.read(&target) {
      Ok(Some(credential)) => return Reply::credential(&credential),
      Ok(None) => debug!("No credential found"),
      Err(err) => warn!("Failed to read credential for {target}, falling back to prompt: {err}"),
    }

    if !self.interactive_prompt_supported {
      debug!("Interactive prompting unavailable, leaving the prompt to git");
      return Reply::default();
    }

    let context = PromptContext::for_origin(target.origin(), username);
    match self.prompt.prompt(&context) {
      Ok(PromptOutcome::Prompted(credential)) if credential.is_complete() => Reply::credential(&credential),
      Ok(PromptOutcome::Prompted(_)) => {
        debug!("Prompt returned an incomplete credential");
        Reply::default()
      }
      Ok(PromptOutcome::Cancelled) => {
        debug!("Prompt cancelled");
        Reply::default()
      }
      Ok(PromptOutcome::Unavailable) => {
        debug!("Prompt unavailable");
        Reply::default()
      }
      Err(err) => Reply::diagnostic(err.into()),
    }
  }

  fn store(&self, attributes: &AttributeMap) -> Reply {
    let username = attributes.get_non_empty("username");
    let password = attributes.get_non_empty("password");

    let (username, password) = match (username, password) {
      (Some(username), Some(password)) => (username, password),
      _ => {
        let mut reply = Reply::default();
        if username.is_none() {
          reply.diagnostics.push(Error::MissingField("username"));
        }
        if password.is_none() {
          reply.diagnostics.push(Error::MissingField("password"));
        }
        return reply;
      }
    };

    let target = match TargetKey::derive(attributes) {
      Ok(target) => target,
      Err(err) => return Reply::diagnostic(err.into()),
    };
    info!("Storing credentials for '{username}' in {target}");

    let credential = Credential::new(username, password);
    match self.store.write(&target, &credential) {
      Ok(()) => Reply::default(),
      Err(err) => Reply::diagnostic(Error::store("write", err)),
    }
  }

  fn erase(&self, attributes: &AttributeMap) -> Reply {
    let target = match TargetKey::derive(attributes) {
      Ok(target) => target,
      Err(err) => return Reply::diagnostic(err.into()),
    };
    info!("Erasing credentials for '{}'", target.origin());

    match self.store.delete(&target) {
      Ok(DeleteOutcome::Deleted) => Reply::default(),
      Ok(DeleteOutcome::NotFound) => {
        debug!("No credentials to erase");
        Reply::default()
      }
      Err(err) => Reply::diagnostic(Error::store("erase", err)),
    }
  }
}
