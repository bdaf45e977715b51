//! In-memory secret store for dispatcher tests

use std::cell::RefCell;
use std::collections::BTreeMap;

use gitcred_core::Credential;
use gitcred_core::store::{DeleteOutcome, SecretStore, StoreError};
use gitcred_core::target::TargetKey;

/// Windows `ERROR_ACCESS_DENIED`, used for injected failures
pub const ACCESS_DENIED: u32 = 5;

/// A call made against a [`MemoryStore`], keyed by target
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
  Read(String),
  Write(String),
  Delete(String),
}

/// Secret store backed by a map, recording every call it receives
#[derive(Debug, Default)]
pub struct MemoryStore {
  entries: RefCell<BTreeMap<String, Credential>>,
  calls: RefCell<Vec<StoreCall>>,
  failing: bool,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  /// A store whose every operation fails with a native error
  pub fn failing() -> Self {
    Self {
      failing: true,
      ..Self::default()
    }
  }

  /// Seed an entry without recording a call
  pub fn with_entry(self, key: &str, username: &str, secret: &str) -> Self {
    self
      .entries
      .borrow_mut()
      .insert(key.to_string(), Credential::new(username, secret));
    self
  }

  pub fn calls(&self) -> Vec<StoreCall> {
    self.calls.borrow().clone()
  }

  pub fn writes(&self) -> usize {
    self
      .calls
      .borrow()
      .iter()
      .filter(|call| matches!(call, StoreCall::Write(_)))
      .count()
  }

  pub fn entry(&self, key: &str) -> Option<Credential> {
    self.entries.borrow().get(key).cloned()
  }

  pub fn len(&self) -> usize {
    self.entries.borrow().len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.borrow().is_empty()
  }

  fn record(&self, call: StoreCall) -> Result<(), StoreError> {
    self.calls.borrow_mut().push(call);
    if self.failing {
      return Err(StoreError::Native {
        code: ACCESS_DENIED,
        message: "Access is denied.".to_string(),
      });
    }
    Ok(())
  }
}

impl SecretStore for MemoryStore {
  fn read(&self, target: &TargetKey) -> Result<Option<Credential>, StoreError> {
    self.record(StoreCall::Read(target.to_string()))?;
    Ok(self.entries.borrow().get(target.as_str()).cloned())
  }

  fn write(&self, target: &TargetKey, credential: &Credential) -> Result<(), StoreError> {
    self.record(StoreCall::Write(target.to_string()))?;
    self
      .entries
      .borrow_mut()
      .insert(target.to_string(), credential.clone());
    Ok(())
  }

  fn delete(&self, target: &TargetKey) -> Result<DeleteOutcome, StoreError> {
    self.record(StoreCall::Delete(target.to_string()))?;
    match self.entries.borrow_mut().remove(target.as_str()) {
      Some(_) => Ok(DeleteOutcome::Deleted),
      None => Ok(DeleteOutcome::NotFound),
    }
  }
}
