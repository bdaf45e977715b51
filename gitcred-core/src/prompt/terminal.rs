//! Terminal prompt rendered on stderr.
//!
//! Standard output belongs to the credential protocol and standard input is
//! the request pipe from git, so the prompt draws on stderr and `console`
//! reads keys from the controlling terminal.

use std::io;

use console::{Style, Term};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Password};
use tracing::debug;

use super::{CredentialPrompt, PromptContext, PromptError, PromptOutcome};
use crate::credential::Credential;

/// Returns the dialoguer theme used for credential prompts.
///
/// - Cyan bold prompt text
/// - Green `❯` prefix on active item
pub fn prompt_theme() -> ColorfulTheme {
  ColorfulTheme {
    prompt_style: Style::new().cyan().bold(),
    active_item_prefix: Style::new().green().apply_to("❯ ".to_string()),
    active_item_style: Style::new().green(),
    ..ColorfulTheme::default()
  }
}

/// Prompt that asks for a username and hidden password on the terminal
#[derive(Debug, Clone)]
pub struct TerminalPrompt {
  term: Term,
}

impl Default for TerminalPrompt {
  fn default() -> Self {
    Self { term: Term::stderr() }
  }
}

impl TerminalPrompt {
  pub fn new() -> Self {
    Self::default()
  }

  /// Whether a user is attached to the terminal this prompt draws on
  pub fn is_interactive(&self) -> bool {
    self.term.is_term()
  }

  fn ask(&self, context: &PromptContext) -> dialoguer::Result<Option<Credential>> {
    let theme = prompt_theme();

    self.term.write_line(&format!("{}: {}", context.caption, context.message))?;

    let mut input = Input::<String>::with_theme(&theme)
      .with_prompt("Username")
      .allow_empty(true);
    if let Some(prefill) = &context.prefill_username {
      input = input.with_initial_text(prefill);
    }
    let username = input.interact_text_on(&self.term)?;
    let username = username.trim();
    if username.is_empty() {
      return Ok(None);
    }

    let password = Password::with_theme(&theme)
      .with_prompt("Password")
      .allow_empty_password(true)
      .interact_on(&self.term)?;

    let credential = Credential::new(username, password);
    Ok(credential.is_complete().then_some(credential))
  }
}

impl CredentialPrompt for TerminalPrompt {
  fn prompt(&self, context: &PromptContext) -> Result<PromptOutcome, PromptError> {
    if !self.is_interactive() {
      return Ok(PromptOutcome::Unavailable);
    }

    match self.ask(context) {
      Ok(Some(credential)) => Ok(PromptOutcome::Prompted(credential)),
      Ok(None) => {
        debug!("Empty username or password entered, treating prompt as cancelled");
        Ok(PromptOutcome::Cancelled)
      }
      Err(err) => {
        let err = io::Error::from(err);
        if err.kind() == io::ErrorKind::Interrupted {
          Ok(PromptOutcome::Cancelled)
        } else {
          Err(PromptError::Io(err))
        }
      }
    }
  }
}
