//! netrc-backed secret store.
//!
//! Each target becomes one `machine` entry whose name is the full target key
//! (`git:https://example.com`), so entries written by the helper never collide
//! with the plain host names other tools keep in their own netrc files. The
//! file is kept owner-only and replaced atomically on every change.

use std::fs;
use std::io::{self, Write};
use std::ops::Range;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, warn};

use super::{DeleteOutcome, SecretStore, StoreError};
use crate::credential::Credential;
use crate::platform::{FilePermissions, NativeFilePermissions};
use crate::target::TargetKey;

/// Secret store that keeps credentials in a netrc-formatted file
#[derive(Debug, Clone)]
pub struct NetrcStore {
  path: PathBuf,
}

impl NetrcStore {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }
}

impl SecretStore for NetrcStore {
  fn read(&self, target: &TargetKey) -> Result<Option<Credential>, StoreError> {
    if !self.path.exists() {
      return Ok(None);
    }

    if !NativeFilePermissions::has_secure_permissions(&self.path)? {
      warn!("{} is readable by other users", self.path.display());
    }

    let content = fs::read_to_string(&self.path)?;
    Ok(find_entry(&content, target.as_str()))
  }

  fn write(&self, target: &TargetKey, credential: &Credential) -> Result<(), StoreError> {
    ensure_token("username", &credential.username)?;
    ensure_token("password", credential.secret())?;

    let existing = read_existing(&self.path)?;
    let (mut content, _) = remove_entry(&existing, target.as_str());
    if !content.is_empty() && !content.ends_with('\n') {
      content.push('\n');
    }
    content.push_str(&format!("machine {target}\n"));
    content.push_str(&format!("  login {}\n", credential.username));
    content.push_str(&format!("  password {}\n", credential.secret()));

    write_private(&self.path, &content)?;
    debug!("Wrote netrc entry for {target} to {}", self.path.display());
    Ok(())
  }

  fn delete(&self, target: &TargetKey) -> Result<DeleteOutcome, StoreError> {
    if !self.path.exists() {
      return Ok(DeleteOutcome::NotFound);
    }

    let existing = fs::read_to_string(&self.path)?;
    let (content, removed) = remove_entry(&existing, target.as_str());
    if !removed {
      return Ok(DeleteOutcome::NotFound);
    }

    write_private(&self.path, &content)?;
    Ok(DeleteOutcome::Deleted)
  }
}

/// netrc values are whitespace-delimited tokens, so empty values and values
/// containing whitespace cannot be stored
fn ensure_token(field: &str, value: &str) -> Result<(), StoreError> {
  if value.is_empty() || value.chars().any(char::is_whitespace) {
    return Err(StoreError::Unsupported(format!(
      "netrc store cannot hold a {field} that is empty or contains whitespace"
    )));
  }
  Ok(())
}

fn read_existing(path: &Path) -> io::Result<String> {
  match fs::read_to_string(path) {
    Ok(content) => Ok(content),
    Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(String::new()),
    Err(err) => Err(err),
  }
}

/// Replace `path` with `content` through a private sibling temp file, so
/// readers see either the old or the new file
fn write_private(path: &Path, content: &str) -> io::Result<()> {
  let parent = path
    .parent()
    .filter(|parent| !parent.as_os_str().is_empty())
    .unwrap_or_else(|| Path::new("."));
  fs::create_dir_all(parent)?;

  let mut file = NamedTempFile::new_in(parent)?;
  file.write_all(content.as_bytes())?;
  file.as_file().sync_all()?;
  NativeFilePermissions::set_secure_permissions(file.path())?;
  file.persist(path)?;
  Ok(())
}

/// One `machine` or `default` block and the byte range it occupies
#[derive(Debug)]
struct Entry<'a> {
  /// `None` for the `default` block
  machine: Option<&'a str>,
  login: Option<&'a str>,
  password: Option<&'a str>,
  span: Range<usize>,
}

impl Entry<'_> {
  fn credential(&self) -> Option<Credential> {
    match (self.login, self.password) {
      (Some(login), Some(password)) => Some(Credential::new(login, password)),
      _ => None,
    }
  }
}

/// Whitespace-separated tokens with their byte offsets
fn tokenize(content: &str) -> Vec<(usize, &str)> {
  let mut tokens = Vec::new();
  let mut start = None;

  for (index, ch) in content.char_indices() {
    match (ch.is_whitespace(), start) {
      (true, Some(begin)) => {
        tokens.push((begin, &content[begin..index]));
        start = None;
      }
      (false, None) => start = Some(index),
      _ => {}
    }
  }
  if let Some(begin) = start {
    tokens.push((begin, &content[begin..]));
  }

  tokens
}

/// Split netrc content into blocks.
///
/// A block starts at a `machine` or `default` token anywhere in the file and
/// runs up to the next one, so single-line and multi-line layouts parse the
/// same way. Text before the first block belongs to no entry.
fn parse_entries(content: &str) -> Vec<Entry<'_>> {
  let mut entries: Vec<Entry<'_>> = Vec::new();
  let mut tokens = tokenize(content).into_iter();

  while let Some((offset, token)) = tokens.next() {
    match token {
      "machine" | "default" => {
        if let Some(last) = entries.last_mut() {
          last.span.end = offset;
        }
        let machine = if token == "machine" {
          tokens.next().map(|(_, name)| name)
        } else {
          None
        };
        entries.push(Entry {
          machine,
          login: None,
          password: None,
          span: offset..content.len(),
        });
      }
      "login" | "password" | "account" | "macdef" => {
        let value = tokens.next().map(|(_, value)| value);
        if let Some(entry) = entries.last_mut() {
          match token {
            "login" => entry.login = value,
            "password" => entry.password = value,
            _ => {}
          }
        }
      }
      _ => {}
    }
  }

  entries
}

/// Find the complete `login`/`password` pair for `machine`.
///
/// Entries missing either value are treated as absent.
pub fn find_entry(content: &str, machine: &str) -> Option<Credential> {
  parse_entries(content)
    .iter()
    .filter(|entry| entry.machine == Some(machine))
    .find_map(|entry| entry.credential())
}

/// Drop every block belonging to `machine`, returning the remaining content
/// and whether anything was removed.
pub fn remove_entry(content: &str, machine: &str) -> (String, bool) {
  let mut kept = String::with_capacity(content.len());
  let mut cursor = 0;
  let mut removed = false;

  for entry in parse_entries(content)
    .iter()
    .filter(|entry| entry.machine == Some(machine))
  {
    kept.push_str(&content[cursor..entry.span.start]);
    cursor = entry.span.end;
    removed = true;
  }
  kept.push_str(&content[cursor..]);

  (kept, removed)
}
