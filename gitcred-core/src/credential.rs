//! # Credentials
//!
//! The username/secret pair that flows between the store, the prompt and the
//! response encoder.

use secrecy::{ExposeSecret, SecretString};

/// A username and its secret for one target.
///
/// The secret is zeroized when the credential is dropped and is redacted from
/// `Debug` output. Whatever copies the protocol encoder or a native API makes
/// while the value is in flight are outside this guarantee.
#[derive(Debug)]
pub struct Credential {
  pub username: String,
  secret: SecretString,
}

impl Credential {
  /// Create a credential from a username and secret
  pub fn new(username: impl Into<String>, secret: impl Into<String>) -> Self {
    Self {
      username: username.into(),
      secret: SecretString::from(secret.into()),
    }
  }

  /// Borrow the secret in clear text
  pub fn secret(&self) -> &str {
    self.secret.expose_secret()
  }

  /// Whether both halves of the credential carry a value
  pub fn is_complete(&self) -> bool {
    !self.username.is_empty() && !self.secret().is_empty()
  }
}

impl Clone for Credential {
  fn clone(&self) -> Self {
    Self::new(self.username.clone(), self.secret())
  }
}

impl PartialEq for Credential {
  fn eq(&self, other: &Self) -> bool {
    self.username == other.username && self.secret() == other.secret()
  }
}

impl Eq for Credential {}
