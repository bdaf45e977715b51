//! Temporary netrc files for store tests

use std::fs;
use std::path::{Path, PathBuf};

use gitcred_core::store::NetrcStore;
use tempfile::TempDir;

/// RAII guard for test netrc files
///
/// Creates a temporary directory holding a netrc file (optionally with initial
/// content). The directory and file are removed when the guard is dropped.
pub struct NetrcGuard {
  temp_dir: TempDir,
  netrc_path: PathBuf,
}

impl NetrcGuard {
  /// Create a guard whose netrc file does not exist yet
  pub fn empty() -> Self {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let netrc_path = temp_dir.path().join("credentials.netrc");
    Self { temp_dir, netrc_path }
  }

  /// Create a guard with the given netrc content
  pub fn new(content: &str) -> Self {
    let guard = Self::empty();
    fs::write(&guard.netrc_path, content).expect("Failed to write test netrc");
    guard
  }

  /// Get the path to the netrc file
  pub fn netrc_path(&self) -> &Path {
    &self.netrc_path
  }

  /// Get the path to the temporary directory
  pub fn dir(&self) -> &Path {
    self.temp_dir.path()
  }

  /// A store reading and writing this guard's file
  pub fn store(&self) -> NetrcStore {
    NetrcStore::new(&self.netrc_path)
  }

  /// Current file content, empty when the file does not exist
  pub fn content(&self) -> String {
    fs::read_to_string(&self.netrc_path).unwrap_or_default()
  }
}
