//! Unix file permissions for credential files

use std::fs;
use std::io;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use super::FilePermissions;

const OWNER_READ_WRITE: u32 = 0o600;

/// Unix implementation of file permissions using chmod-style permissions
pub struct UnixFilePermissions;

impl FilePermissions for UnixFilePermissions {
  fn set_secure_permissions(path: &Path) -> io::Result<()> {
    let mut perms = fs::metadata(path)?.permissions();
    perms.set_mode(OWNER_READ_WRITE);
    fs::set_permissions(path, perms)
  }

  fn has_secure_permissions(path: &Path) -> io::Result<bool> {
    let mode = fs::metadata(path)?.permissions().mode();

    // No group/other bits
    Ok(mode & 0o077 == 0)
  }
}
