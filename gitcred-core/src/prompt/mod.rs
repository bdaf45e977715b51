//! # Interactive Prompts
//!
//! When the store has nothing for a target, `get` may ask the user directly.
//! The prompt is a capability: the Windows credential dialog, a terminal
//! prompt, or nothing at all when the environment cannot show one.

use std::io;

use thiserror::Error;

use crate::credential::Credential;

pub mod terminal;
#[cfg(windows)]
pub mod windows;

pub use terminal::TerminalPrompt;
#[cfg(windows)]
pub use windows::CredUiPrompt;

/// Dialog caption shown for every prompt
pub const PROMPT_CAPTION: &str = "Git Credentials";

/// What the prompt shows the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptContext {
  pub caption: String,
  pub message: String,
  /// Username to pre-fill, taken from the request when it carried one
  pub prefill_username: Option<String>,
}

impl PromptContext {
  /// Build the standard context for credentials on `origin`
  pub fn for_origin(origin: &str, prefill_username: Option<&str>) -> Self {
    Self {
      caption: PROMPT_CAPTION.to_string(),
      message: format!("Enter your credentials for: {origin}"),
      prefill_username: prefill_username
        .filter(|name| !name.trim().is_empty())
        .map(str::to_string),
    }
  }
}

/// Terminal states of a prompt
#[derive(Debug, PartialEq, Eq)]
pub enum PromptOutcome {
  Prompted(Credential),
  Cancelled,
  Unavailable,
}

/// Failures while showing a prompt or reading its result
#[derive(Debug, Error)]
pub enum PromptError {
  #[error("{message}")]
  Native { code: u32, message: String },

  #[error(transparent)]
  Io(#[from] io::Error),
}

impl PromptError {
  pub fn native(code: u32) -> Self {
    let message = match i32::try_from(code) {
      Ok(raw) => io::Error::from_raw_os_error(raw).to_string(),
      Err(_) => "Unknown error".to_string(),
    };
    Self::Native { code, message }
  }
}

/// Capability interface over an interactive credential prompt
pub trait CredentialPrompt {
  /// Ask the user for a credential.
  ///
  /// Cancellation and unavailability are outcomes, not errors.
  fn prompt(&self, context: &PromptContext) -> Result<PromptOutcome, PromptError>;
}

impl<P: CredentialPrompt + ?Sized> CredentialPrompt for Box<P> {
  fn prompt(&self, context: &PromptContext) -> Result<PromptOutcome, PromptError> {
    (**self).prompt(context)
  }
}

/// Prompt for environments that cannot interact with the user
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledPrompt;

impl CredentialPrompt for DisabledPrompt {
  fn prompt(&self, _context: &PromptContext) -> Result<PromptOutcome, PromptError> {
    Ok(PromptOutcome::Unavailable)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_context_for_origin() {
    let context = PromptContext::for_origin("https://example.com", Some("alice"));

    assert_eq!(context.caption, "Git Credentials");
    assert_eq!(context.message, "Enter your credentials for: https://example.com");
    assert_eq!(context.prefill_username.as_deref(), Some("alice"));
  }

  #[test]
  fn test_context_drops_blank_prefill() {
    let context = PromptContext::for_origin("https://example.com", Some("   "));
    assert_eq!(context.prefill_username, None);
  }

  #[test]
  fn test_disabled_prompt_is_unavailable() {
    let context = PromptContext::for_origin("https://example.com", None);
    assert_eq!(DisabledPrompt.prompt(&context).unwrap(), PromptOutcome::Unavailable);
  }
}
