//! # Secret Stores
//!
//! The helper never encrypts anything itself. It hands credentials to a store
//! that is trusted to keep them safe: Windows Credential Manager on Windows, a
//! permission-restricted netrc file elsewhere.

use std::io;

use thiserror::Error;

use crate::credential::Credential;
use crate::target::TargetKey;

pub mod netrc;
#[cfg(windows)]
pub mod windows;

pub use netrc::NetrcStore;
#[cfg(windows)]
pub use windows::CredentialManagerStore;

/// Errors reported by a secret store
#[derive(Debug, Error)]
pub enum StoreError {
  /// The host store failed with a native error code
  #[error("{message}")]
  Native { code: u32, message: String },

  /// The backing file could not be read or written
  #[error(transparent)]
  Io(#[from] io::Error),

  /// The store cannot represent the value it was asked to keep
  #[error("{0}")]
  Unsupported(String),
}

impl StoreError {
  /// Build a native error, resolving the code to the host's message text
  pub fn native(code: u32) -> Self {
    let message = match i32::try_from(code) {
      Ok(raw) => io::Error::from_raw_os_error(raw).to_string(),
      Err(_) => "Unknown error".to_string(),
    };
    Self::Native { code, message }
  }
}

/// How long a native credential outlives the logon session.
///
/// Only Windows Credential Manager honours this; the netrc store always
/// persists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Persistence {
  /// Dropped at logoff
  Session,
  /// Kept on this machine only
  LocalMachine,
  /// Kept and roamed with the user profile
  #[default]
  Enterprise,
}

/// Result of a delete request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
  Deleted,
  NotFound,
}

/// Capability interface over a secure credential store
pub trait SecretStore {
  /// Look up the credential stored under `target`
  fn read(&self, target: &TargetKey) -> Result<Option<Credential>, StoreError>;

  /// Create or replace the credential stored under `target`
  fn write(&self, target: &TargetKey, credential: &Credential) -> Result<(), StoreError>;

  /// Remove the credential stored under `target`
  fn delete(&self, target: &TargetKey) -> Result<DeleteOutcome, StoreError>;
}

impl<S: SecretStore + ?Sized> SecretStore for Box<S> {
  fn read(&self, target: &TargetKey) -> Result<Option<Credential>, StoreError> {
    (**self).read(target)
  }

  fn write(&self, target: &TargetKey, credential: &Credential) -> Result<(), StoreError> {
    (**self).write(target, credential)
  }

  fn delete(&self, target: &TargetKey) -> Result<DeleteOutcome, StoreError> {
    (**self).delete(target)
  }
}
