//! # Credential Protocol Codec
//!
//! Git talks to credential helpers with blocks of `key=value` lines. A request
//! block ends at the first blank line or at end of input; a response block is
//! simply every pair followed by a newline.

use std::io::{self, BufRead, Write};

use tracing::debug;

/// Attribute whose value is never written to the trace log
const MASKED_ATTRIBUTE: &str = "password";

/// An ordered set of protocol attributes.
///
/// Keys keep the case they arrived with, but every lookup is
/// case-insensitive. Iteration follows insertion order so responses are
/// encoded deterministically.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeMap {
  entries: Vec<(String, String)>,
}

impl AttributeMap {
  pub fn new() -> Self {
    Self::default()
  }

  /// Insert a pair, dropping any earlier entry whose key differs only in case
  pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
    let key = key.into();
    self.entries.retain(|(existing, _)| !existing.eq_ignore_ascii_case(&key));
    self.entries.push((key, value.into()));
  }

  /// Look up a value by case-insensitive key
  pub fn get(&self, key: &str) -> Option<&str> {
    self
      .entries
      .iter()
      .rev()
      .find(|(existing, _)| existing.eq_ignore_ascii_case(key))
      .map(|(_, value)| value.as_str())
  }

  /// Look up a value, treating an empty string as absent
  pub fn get_non_empty(&self, key: &str) -> Option<&str> {
    self.get(key).filter(|value| !value.is_empty())
  }

  /// Remove the entry matching `key` case-insensitively
  pub fn remove(&mut self, key: &str) -> Option<String> {
    let index = self
      .entries
      .iter()
      .position(|(existing, _)| existing.eq_ignore_ascii_case(key))?;
    Some(self.entries.remove(index).1)
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
    self.entries.iter().map(|(key, value)| (key.as_str(), value.as_str()))
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}

impl<K, V> FromIterator<(K, V)> for AttributeMap
where
  K: Into<String>,
  V: Into<String>,
{
  fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
    let mut map = Self::new();
    for (key, value) in iter {
      map.insert(key, value);
    }
    map
  }
}

/// Read one request block from `reader`.
///
/// Reading stops at the first empty or whitespace-only line, or at end of
/// input. Each line is split on its first `=`, so values may contain `=`
/// themselves. Lines without a separator are skipped.
///
/// # Errors
///
/// Returns an error if the stream cannot be read or is not valid UTF-8.
pub fn decode<R: BufRead>(mut reader: R) -> io::Result<AttributeMap> {
  let mut attributes = AttributeMap::new();
  let mut line = String::new();

  loop {
    line.clear();
    if reader.read_line(&mut line)? == 0 {
      break;
    }

    let content = line.trim_end_matches(['\n', '\r']);
    if content.trim().is_empty() {
      break;
    }

    match content.split_once('=') {
      Some((key, value)) => {
        trace_attribute("From Git", key, value);
        attributes.insert(key, value);
      }
      None => debug!("Ignoring request line without a '=' separator"),
    }
  }

  Ok(attributes)
}

/// Write a response block to `writer` and flush it.
///
/// # Errors
///
/// Returns an error if the writer fails, or with
/// [`io::ErrorKind::InvalidData`] when a key or value contains a newline or
/// NUL byte, which the line protocol cannot frame.
pub fn encode<W: Write>(attributes: &AttributeMap, mut writer: W) -> io::Result<()> {
  if let Some((key, _)) = attributes.iter().find(|(key, value)| !is_frameable(key) || !is_frameable(value)) {
    return Err(io::Error::new(
      io::ErrorKind::InvalidData,
      format!("attribute '{}' cannot be encoded on a single line", key.escape_debug()),
    ));
  }

  for (key, value) in attributes.iter() {
    trace_attribute("To Git", key, value);
    writeln!(writer, "{key}={value}")?;
  }

  writer.flush()
}

fn is_frameable(text: &str) -> bool {
  !text.contains(['\n', '\0'])
}

fn trace_attribute(direction: &str, key: &str, value: &str) {
  let shown = if key.eq_ignore_ascii_case(MASKED_ATTRIBUTE) {
    "****"
  } else {
    value
  };
  debug!("{direction}: {key} = {shown}");
}

#[cfg(test)]
mod tests {
  use std::io::Cursor;

  use super::*;

  #[test]
  fn test_decode_basic_request() {
    let input = "protocol=https\nhost=example.com\npath=/a/b\n\n";
    let attributes = decode(Cursor::new(input)).unwrap();

    let expected: AttributeMap = [("protocol", "https"), ("host", "example.com"), ("path", "/a/b")]
      .into_iter()
      .collect();
    assert_eq!(attributes, expected);
  }

  #[test]
  fn test_decode_skips_lines_without_separator() {
    let input = "protocol=https\ngarbage\nhost=example.com\n\n";
    let attributes = decode(Cursor::new(input)).unwrap();

    assert_eq!(attributes.len(), 2);
    assert_eq!(attributes.get("host"), Some("example.com"));
    assert_eq!(attributes.get("garbage"), None);
  }

  #[test]
  fn test_decode_splits_on_first_separator_only() {
    let attributes = decode(Cursor::new("path=repo.git?ref=a=b\n")).unwrap();
    assert_eq!(attributes.get("path"), Some("repo.git?ref=a=b"));
  }

  #[test]
  fn test_decode_last_duplicate_wins() {
    let attributes = decode(Cursor::new("host=first.com\nhost=second.com\n\n")).unwrap();
    assert_eq!(attributes.len(), 1);
    assert_eq!(attributes.get("host"), Some("second.com"));
  }

  #[test]
  fn test_decode_last_duplicate_wins_across_case() {
    let mut attributes = decode(Cursor::new("host=first.com\nHost=second.com\nhost=third.com\n\n")).unwrap();

    assert_eq!(attributes.len(), 1);
    assert_eq!(attributes.get("HOST"), Some("third.com"));
    assert_eq!(attributes.remove("Host").as_deref(), Some("third.com"));
    assert!(attributes.is_empty());
  }

  #[test]
  fn test_decode_stops_at_whitespace_only_line() {
    let attributes = decode(Cursor::new("host=example.com\n   \nusername=ignored\n")).unwrap();
    assert_eq!(attributes.get("host"), Some("example.com"));
    assert_eq!(attributes.get("username"), None);
  }

  #[test]
  fn test_decode_handles_crlf_and_missing_terminator() {
    let attributes = decode(Cursor::new("protocol=https\r\nhost=example.com")).unwrap();
    assert_eq!(attributes.get("protocol"), Some("https"));
    assert_eq!(attributes.get("host"), Some("example.com"));
  }

  #[test]
  fn test_decode_empty_input() {
    let attributes = decode(Cursor::new("")).unwrap();
    assert!(attributes.is_empty());
  }

  #[test]
  fn test_decode_rejects_invalid_utf8() {
    let result = decode(Cursor::new(vec![b'h', b'=', 0xff, 0xfe, b'\n']));
    assert!(result.is_err());
  }

  #[test]
  fn test_lookup_is_case_insensitive() {
    let mut attributes = AttributeMap::new();
    attributes.insert("Host", "example.com");

    assert_eq!(attributes.get("host"), Some("example.com"));
    assert_eq!(attributes.get("HOST"), Some("example.com"));
    assert_eq!(attributes.iter().next(), Some(("Host", "example.com")));
  }

  #[test]
  fn test_get_non_empty_filters_empty_values() {
    let attributes: AttributeMap = [("username", "")].into_iter().collect();
    assert_eq!(attributes.get("username"), Some(""));
    assert_eq!(attributes.get_non_empty("username"), None);
  }

  #[test]
  fn test_remove_is_case_insensitive() {
    let mut attributes: AttributeMap = [("CMD", "get"), ("host", "example.com")].into_iter().collect();

    assert_eq!(attributes.remove("cmd"), Some("get".to_string()));
    assert_eq!(attributes.len(), 1);
    assert_eq!(attributes.remove("cmd"), None);
  }

  #[test]
  fn test_encode_preserves_insertion_order() {
    let mut response = AttributeMap::new();
    response.insert("username", "alice");
    response.insert("password", "s3cr3t");

    let mut output = Vec::new();
    encode(&response, &mut output).unwrap();

    assert_eq!(String::from_utf8(output).unwrap(), "username=alice\npassword=s3cr3t\n");
  }

  #[test]
  fn test_encode_empty_map_writes_nothing() {
    let mut output = Vec::new();
    encode(&AttributeMap::new(), &mut output).unwrap();
    assert!(output.is_empty());
  }

  #[test]
  fn test_encode_rejects_embedded_newline() {
    let response: AttributeMap = [("username", "alice\npassword=injected")].into_iter().collect();

    let mut output = Vec::new();
    let err = encode(&response, &mut output).unwrap_err();

    assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    assert!(output.is_empty());
  }
}
