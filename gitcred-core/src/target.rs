//! # Target Key Derivation
//!
//! Git describes the remote in pieces (`protocol`, `host`, `path`). These are
//! assembled into an absolute URL and reduced to a key that identifies the
//! credential in the secret store.
//!
//! Keys are host-scoped: the path, any user-info and the query never take part
//! in the key, so a credential stored while pushing to one repository is found
//! again for every other repository on the same server.

use std::fmt;

use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::protocol::AttributeMap;

/// Prefix shared by every key this helper writes
pub const TARGET_PREFIX: &str = "git:";

pub const DEFAULT_PROTOCOL: &str = "https";
pub const DEFAULT_HOST: &str = "no-host.git";

/// Errors raised while turning request attributes into a target
#[derive(Debug, Error)]
pub enum TargetError {
  #[error("Failed to parse url: {url}: {source}")]
  Unparseable {
    url: String,
    #[source]
    source: url::ParseError,
  },
  #[error("Url has no host: {0}")]
  MissingHost(String),
}

/// A canonical, host-scoped secret store key such as
/// `git:https://example.com`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TargetKey {
  key: String,
  origin: String,
}

impl TargetKey {
  /// Derive the key from the `protocol`, `host` and `path` attributes.
  ///
  /// Missing attributes fall back to `https`, `no-host.git` and `/`.
  ///
  /// # Errors
  ///
  /// Returns [`TargetError`] when the pieces do not form an absolute URL with
  /// a host.
  pub fn derive(attributes: &AttributeMap) -> Result<Self, TargetError> {
    let url = build_url(attributes)?;

    let host = url
      .host_str()
      .ok_or_else(|| TargetError::MissingHost(url.to_string()))?;
    let origin = match url.port() {
      Some(port) => format!("{}://{host}:{port}", url.scheme()),
      None => format!("{}://{host}", url.scheme()),
    };

    let target = Self {
      key: format!("{TARGET_PREFIX}{origin}"),
      origin,
    };
    debug!("Credential name: {target}");
    Ok(target)
  }

  /// The key used in the secret store
  pub fn as_str(&self) -> &str {
    &self.key
  }

  /// Scheme, host and port without the key prefix, e.g. `https://example.com`
  pub fn origin(&self) -> &str {
    &self.origin
  }
}

impl fmt::Display for TargetKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.key)
  }
}

impl AsRef<str> for TargetKey {
  fn as_ref(&self) -> &str {
    &self.key
  }
}

/// Assemble `scheme://host/path` from the request and parse it
fn build_url(attributes: &AttributeMap) -> Result<Url, TargetError> {
  let scheme = attributes.get("protocol").unwrap_or(DEFAULT_PROTOCOL);
  let host = attributes.get("host").unwrap_or(DEFAULT_HOST);
  let path = attributes.get("path").unwrap_or_default().trim_start_matches('/');

  let candidate = format!("{scheme}://{host}/{path}");
  Url::parse(&candidate).map_err(|source| TargetError::Unparseable { url: candidate, source })
}
