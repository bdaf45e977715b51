//! Windows Credential Manager store.
//!
//! Credentials are kept as generic credentials whose target name is the
//! target key. The secret is stored as a UTF-16 blob without terminator, the
//! same layout other Windows git helpers use, so entries stay readable from
//! the Credential Manager control panel.

use std::ffi::c_void;
use std::ptr;

use tracing::debug;
use windows_sys::Win32::Foundation::{ERROR_NOT_FOUND, GetLastError};
use windows_sys::Win32::Security::Credentials::{
  CRED_PERSIST_ENTERPRISE, CRED_PERSIST_LOCAL_MACHINE, CRED_PERSIST_SESSION, CRED_TYPE_GENERIC, CREDENTIALW,
  CredDeleteW, CredFree, CredReadW, CredWriteW,
};
use zeroize::Zeroizing;

use super::{DeleteOutcome, Persistence, SecretStore, StoreError};
use crate::credential::Credential;
use crate::platform::windows::{pwstr_to_string, to_wide};
use crate::target::TargetKey;

/// Secret store backed by Windows Credential Manager
#[derive(Debug, Clone, Default)]
pub struct CredentialManagerStore {
  persistence: Persistence,
}

impl CredentialManagerStore {
  pub fn new(persistence: Persistence) -> Self {
    Self { persistence }
  }

  const fn persist_flag(&self) -> u32 {
    match self.persistence {
      Persistence::Session => CRED_PERSIST_SESSION,
      Persistence::LocalMachine => CRED_PERSIST_LOCAL_MACHINE,
      Persistence::Enterprise => CRED_PERSIST_ENTERPRISE,
    }
  }
}

/// Owns a `CREDENTIALW` allocated by `CredReadW` and frees it exactly once
struct CredentialHandle(*mut CREDENTIALW);

impl Drop for CredentialHandle {
  fn drop(&mut self) {
    if !self.0.is_null() {
      // SAFETY: The pointer came from a successful CredReadW call and is
      // released only here
      unsafe { CredFree(self.0 as *const c_void) };
    }
  }
}

fn last_error() -> u32 {
  // SAFETY: GetLastError has no preconditions
  unsafe { GetLastError() }
}

impl SecretStore for CredentialManagerStore {
  fn read(&self, target: &TargetKey) -> Result<Option<Credential>, StoreError> {
    let mut target_name = to_wide(target.as_str());
    let mut raw: *mut CREDENTIALW = ptr::null_mut();

    // SAFETY: `target_name` is null-terminated and `raw` is a valid out
    // pointer
    let ok = unsafe { CredReadW(target_name.as_mut_ptr(), CRED_TYPE_GENERIC, 0, &mut raw) };
    if ok == 0 {
      let code = last_error();
      if code == ERROR_NOT_FOUND {
        debug!("No credential found for {target}");
        return Ok(None);
      }
      return Err(StoreError::native(code));
    }

    let handle = CredentialHandle(raw);
    // SAFETY: CredReadW succeeded, so the handle points at a valid record that
    // lives until the handle is dropped
    let record = unsafe { &*handle.0 };

    // SAFETY: UserName is null or a null-terminated string inside the record
    let username = unsafe { pwstr_to_string(record.UserName) };
    let secret = if record.CredentialBlob.is_null() || record.CredentialBlobSize == 0 {
      String::new()
    } else {
      // Blob size is in bytes, the blob holds UTF-16 code units
      let units = (record.CredentialBlobSize / 2) as usize;
      // SAFETY: The blob is valid for CredentialBlobSize bytes and the API
      // allocates it with at least 2-byte alignment
      let blob = unsafe { std::slice::from_raw_parts(record.CredentialBlob as *const u16, units) };
      String::from_utf16_lossy(blob)
    };

    debug!("Found a credential for {target}");
    Ok(Some(Credential::new(username, secret)))
  }

  fn write(&self, target: &TargetKey, credential: &Credential) -> Result<(), StoreError> {
    let mut target_name = to_wide(target.as_str());
    let mut username = to_wide(&credential.username);
    let mut blob: Zeroizing<Vec<u16>> = Zeroizing::new(credential.secret().encode_utf16().collect());
    let blob_size = u32::try_from(blob.len() * 2)
      .map_err(|_| StoreError::Unsupported("Secret is too large for Credential Manager".to_string()))?;

    // SAFETY: CREDENTIALW is a plain C struct for which all-zero is valid
    let mut record: CREDENTIALW = unsafe { std::mem::zeroed() };
    record.Type = CRED_TYPE_GENERIC;
    record.TargetName = target_name.as_mut_ptr();
    record.UserName = username.as_mut_ptr();
    record.CredentialBlob = blob.as_mut_ptr().cast::<u8>();
    record.CredentialBlobSize = blob_size;
    record.Persist = self.persist_flag();

    // SAFETY: Every pointer in `record` refers to a buffer that outlives the
    // call
    let ok = unsafe { CredWriteW(&record, 0) };
    if ok == 0 {
      return Err(StoreError::native(last_error()));
    }

    debug!("Stored credential for {target}");
    Ok(())
  }

  fn delete(&self, target: &TargetKey) -> Result<DeleteOutcome, StoreError> {
    let mut target_name = to_wide(target.as_str());

    // SAFETY: `target_name` is null-terminated
    let ok = unsafe { CredDeleteW(target_name.as_mut_ptr(), CRED_TYPE_GENERIC, 0) };
    if ok == 0 {
      let code = last_error();
      if code == ERROR_NOT_FOUND {
        return Ok(DeleteOutcome::NotFound);
      }
      return Err(StoreError::native(code));
    }

    Ok(DeleteOutcome::Deleted)
  }
}
