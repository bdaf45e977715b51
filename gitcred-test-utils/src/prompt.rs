//! Prompt double with a fixed answer

use std::cell::RefCell;

use gitcred_core::Credential;
use gitcred_core::prompt::{CredentialPrompt, PromptContext, PromptError, PromptOutcome};

/// What a [`ScriptedPrompt`] answers
#[derive(Debug, Clone)]
pub enum PromptScript {
  Enter { username: String, password: String },
  Cancel,
  Unavailable,
  Fail,
}

/// Prompt that always gives the same answer and remembers what it was shown
#[derive(Debug)]
pub struct ScriptedPrompt {
  script: PromptScript,
  shown: RefCell<Vec<PromptContext>>,
}

impl ScriptedPrompt {
  pub fn new(script: PromptScript) -> Self {
    Self {
      script,
      shown: RefCell::new(Vec::new()),
    }
  }

  pub fn entering(username: &str, password: &str) -> Self {
    Self::new(PromptScript::Enter {
      username: username.to_string(),
      password: password.to_string(),
    })
  }

  pub fn cancelling() -> Self {
    Self::new(PromptScript::Cancel)
  }

  /// Contexts the prompt was invoked with, in order
  pub fn shown(&self) -> Vec<PromptContext> {
    self.shown.borrow().clone()
  }

  pub fn times_shown(&self) -> usize {
    self.shown.borrow().len()
  }
}

impl CredentialPrompt for ScriptedPrompt {
  fn prompt(&self, context: &PromptContext) -> Result<PromptOutcome, PromptError> {
    self.shown.borrow_mut().push(context.clone());
    match &self.script {
      PromptScript::Enter { username, password } => {
        Ok(PromptOutcome::Prompted(Credential::new(username.as_str(), password.as_str())))
      }
      PromptScript::Cancel => Ok(PromptOutcome::Cancelled),
      PromptScript::Unavailable => Ok(PromptOutcome::Unavailable),
      PromptScript::Fail => Err(PromptError::Native {
        code: 1312,
        message: "A specified logon session does not exist.".to_string(),
      }),
    }
  }
}
