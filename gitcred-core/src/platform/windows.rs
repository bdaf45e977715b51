//! Windows helpers: UTF-16 conversion for the credential APIs and the
//! (permissive) file permission implementation.

use std::ffi::OsStr;
use std::fs;
use std::io;
use std::iter::once;
use std::os::windows::ffi::OsStrExt;
use std::path::Path;

use super::FilePermissions;

/// Windows implementation of file permissions.
///
/// Files under the user profile already inherit an owner-only ACL, so there is
/// nothing to tighten.
pub struct WindowsFilePermissions;

impl FilePermissions for WindowsFilePermissions {
  fn set_secure_permissions(_path: &Path) -> io::Result<()> {
    Ok(())
  }

  fn has_secure_permissions(path: &Path) -> io::Result<bool> {
    Ok(fs::File::open(path).is_ok())
  }
}

/// Convert a Rust string into a null-terminated UTF-16 vector suitable for
/// Windows API calls.
pub(crate) fn to_wide(value: &str) -> Vec<u16> {
  OsStr::new(value).encode_wide().chain(once(0)).collect()
}

/// Convert a pointer to a null-terminated UTF-16 string into a Rust `String`.
///
/// # Safety
///
/// `value` must be null or point to a valid null-terminated UTF-16 string.
pub(crate) unsafe fn pwstr_to_string(value: *const u16) -> String {
  if value.is_null() {
    return String::new();
  }

  let mut len = 0usize;
  loop {
    // SAFETY: The caller guarantees a null terminator before the end of the
    // allocation, and we stop reading at it
    let current = unsafe { *value.add(len) };
    if current == 0 {
      break;
    }
    len += 1;
  }

  // SAFETY: `len` elements were just read from `value`
  let slice = unsafe { std::slice::from_raw_parts(value, len) };
  String::from_utf16_lossy(slice)
}

/// Decode a fixed-size UTF-16 buffer filled by the API, stopping at the first
/// null
pub(crate) fn buffer_to_string(buffer: &[u16]) -> String {
  let end = buffer.iter().position(|&unit| unit == 0).unwrap_or(buffer.len());
  String::from_utf16_lossy(&buffer[..end])
}
