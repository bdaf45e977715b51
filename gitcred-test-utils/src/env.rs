//! Environment variable management for testing
//!
//! The helper reads a handful of environment variables (`GITCRED_CONFIG`,
//! `GITCRED_NETRC`, `GIT_TERMINAL_PROMPT`, `GIT_CRED_STORE_FLAGS`). This guard
//! sets or clears them for the duration of a test and restores the previous
//! values afterwards.

use std::env;

/// Overrides environment variables and restores them when dropped
#[derive(Default)]
pub struct EnvVarGuard {
  /// Original values, in the order they were first touched
  saved: Vec<(String, Option<String>)>,
}

impl EnvVarGuard {
  pub fn new() -> Self {
    Self::default()
  }

  /// Set `key` to `value` until the guard drops
  pub fn set(mut self, key: &str, value: impl AsRef<std::ffi::OsStr>) -> Self {
    self.save(key);
    // SAFETY: tests touching a variable run while holding this guard
    unsafe {
      env::set_var(key, value);
    }
    self
  }

  /// Clear `key` until the guard drops
  pub fn unset(mut self, key: &str) -> Self {
    self.save(key);
    // SAFETY: see `set`
    unsafe {
      env::remove_var(key);
    }
    self
  }

  fn save(&mut self, key: &str) {
    if !self.saved.iter().any(|(saved, _)| saved == key) {
      self.saved.push((key.to_string(), env::var(key).ok()));
    }
  }
}

impl Drop for EnvVarGuard {
  fn drop(&mut self) {
    for (key, original) in self.saved.drain(..).rev() {
      // SAFETY: see `set`
      unsafe {
        match original {
          Some(value) => env::set_var(&key, value),
          None => env::remove_var(&key),
        }
      }
    }
  }
}
