//! Platform-specific helpers
//!
//! File permission handling for the netrc store, plus the UTF-16 conversions
//! the Windows credential APIs need.

use std::io;
use std::path::Path;

#[cfg(unix)]
mod unix;
#[cfg(windows)]
pub(crate) mod windows;

#[cfg(unix)]
pub use unix::UnixFilePermissions as NativeFilePermissions;
#[cfg(windows)]
pub use windows::WindowsFilePermissions as NativeFilePermissions;

/// Trait for platform-specific file permission operations
pub trait FilePermissions {
  /// Set secure permissions on a credential file
  fn set_secure_permissions(path: &Path) -> io::Result<()>;

  /// Check if a file has secure permissions
  fn has_secure_permissions(path: &Path) -> io::Result<bool>;
}
