//! Windows credential dialog (`CredUIPromptForWindowsCredentialsW`).
//!
//! Three native buffers are involved and each has exactly one owner:
//! - the packed input buffer carrying the pre-filled username (Rust-owned,
//!   zeroized on drop),
//! - the output buffer allocated by CredUI (zeroized and released with
//!   `CoTaskMemFree` by [`AuthBuffer`]),
//! - the fixed UTF-16 buffers the output is unpacked into (zeroized on drop).

use std::ffi::c_void;
use std::ptr;

use tracing::debug;
use windows_sys::Win32::Foundation::{ERROR_CANCELLED, ERROR_INSUFFICIENT_BUFFER, GetLastError, NO_ERROR};
use windows_sys::Win32::Security::Credentials::{
  CRED_PACK_GENERIC_CREDENTIALS, CREDUI_INFOW, CREDUIWIN_GENERIC, CredPackAuthenticationBufferW,
  CredUIPromptForWindowsCredentialsW, CredUnPackAuthenticationBufferW,
};
use windows_sys::Win32::System::Com::CoTaskMemFree;
use zeroize::{Zeroize, Zeroizing};

use super::{CredentialPrompt, PromptContext, PromptError, PromptOutcome};
use crate::credential::Credential;
use crate::platform::windows::{buffer_to_string, to_wide};

// CREDUI_MAX_USERNAME_LENGTH, CREDUI_MAX_DOMAIN_TARGET_LENGTH and
// CREDUI_MAX_PASSWORD_LENGTH, plus the terminator
const MAX_USERNAME: usize = 514;
const MAX_DOMAIN: usize = 338;
const MAX_PASSWORD: usize = 257;

/// Prompt backed by the Windows "Git Credentials" dialog
#[derive(Debug, Clone, Copy, Default)]
pub struct CredUiPrompt;

/// Output buffer allocated by CredUI, wiped and freed exactly once
struct AuthBuffer {
  ptr: *mut c_void,
  len: u32,
}

impl Drop for AuthBuffer {
  fn drop(&mut self) {
    if self.ptr.is_null() {
      return;
    }
    // SAFETY: CredUI returned `ptr` valid for `len` bytes and nothing else
    // references it once the guard drops
    unsafe {
      std::slice::from_raw_parts_mut(self.ptr.cast::<u8>(), self.len as usize).zeroize();
      CoTaskMemFree(self.ptr);
    }
  }
}

fn last_error() -> u32 {
  // SAFETY: GetLastError has no preconditions
  unsafe { GetLastError() }
}

/// Pack `username` into an input authentication buffer.
///
/// The first call asks for the required size, the second fills the buffer.
fn pack_username(username: &str) -> Result<Zeroizing<Vec<u8>>, PromptError> {
  let mut wide_username = to_wide(username);
  let mut empty_password = to_wide("");
  let mut size = 0u32;

  // SAFETY: Null output buffer with a size pointer is the documented size query
  let ok = unsafe {
    CredPackAuthenticationBufferW(
      CRED_PACK_GENERIC_CREDENTIALS,
      wide_username.as_mut_ptr(),
      empty_password.as_mut_ptr(),
      ptr::null_mut(),
      &mut size,
    )
  };
  if ok == 0 {
    let code = last_error();
    if code != ERROR_INSUFFICIENT_BUFFER {
      return Err(PromptError::native(code));
    }
  }

  let mut buffer = Zeroizing::new(vec![0u8; size as usize]);
  // SAFETY: `buffer` holds exactly `size` bytes
  let ok = unsafe {
    CredPackAuthenticationBufferW(
      CRED_PACK_GENERIC_CREDENTIALS,
      wide_username.as_mut_ptr(),
      empty_password.as_mut_ptr(),
      buffer.as_mut_ptr(),
      &mut size,
    )
  };
  if ok == 0 {
    return Err(PromptError::native(last_error()));
  }

  buffer.truncate(size as usize);
  Ok(buffer)
}

fn unpack(buffer: &AuthBuffer) -> Result<Credential, PromptError> {
  let mut username = Zeroizing::new(vec![0u16; MAX_USERNAME]);
  let mut domain = Zeroizing::new(vec![0u16; MAX_DOMAIN]);
  let mut password = Zeroizing::new(vec![0u16; MAX_PASSWORD]);
  let mut username_len = MAX_USERNAME as u32;
  let mut domain_len = MAX_DOMAIN as u32;
  let mut password_len = MAX_PASSWORD as u32;

  // SAFETY: Every output buffer is as long as the length passed with it
  let ok = unsafe {
    CredUnPackAuthenticationBufferW(
      0,
      buffer.ptr,
      buffer.len,
      username.as_mut_ptr(),
      &mut username_len,
      domain.as_mut_ptr(),
      &mut domain_len,
      password.as_mut_ptr(),
      &mut password_len,
    )
  };
  if ok == 0 {
    return Err(PromptError::native(last_error()));
  }

  let secret = Zeroizing::new(buffer_to_string(&password));
  Ok(Credential::new(buffer_to_string(&username), secret.as_str()))
}

impl CredentialPrompt for CredUiPrompt {
  fn prompt(&self, context: &PromptContext) -> Result<PromptOutcome, PromptError> {
    let input = match context.prefill_username.as_deref() {
      Some(username) => pack_username(username)?,
      None => Zeroizing::new(Vec::new()),
    };
    let input_ptr = if input.is_empty() {
      ptr::null()
    } else {
      input.as_ptr().cast::<c_void>()
    };
    let input_len =
      u32::try_from(input.len()).map_err(|_| PromptError::Native { code: 0, message: "Username too long".into() })?;

    let mut caption = to_wide(&context.caption);
    let mut message = to_wide(&context.message);
    let ui = CREDUI_INFOW {
      cbSize: std::mem::size_of::<CREDUI_INFOW>() as u32,
      hwndParent: ptr::null_mut(),
      pszMessageText: message.as_mut_ptr(),
      pszCaptionText: caption.as_mut_ptr(),
      hbmBanner: ptr::null_mut(),
    };

    let mut auth_package = 0u32;
    let mut out_ptr: *mut c_void = ptr::null_mut();
    let mut out_len = 0u32;
    let mut save: i32 = 0;

    // SAFETY: All pointers refer to live locals; the output buffer is handed
    // to an AuthBuffer guard immediately after the call
    let status = unsafe {
      CredUIPromptForWindowsCredentialsW(
        &ui,
        0,
        &mut auth_package,
        input_ptr,
        input_len,
        &mut out_ptr,
        &mut out_len,
        &mut save,
        CREDUIWIN_GENERIC,
      )
    };
    let output = AuthBuffer {
      ptr: out_ptr,
      len: out_len,
    };

    match status {
      NO_ERROR => {}
      ERROR_CANCELLED => {
        debug!("Credential dialog cancelled");
        return Ok(PromptOutcome::Cancelled);
      }
      code => return Err(PromptError::native(code)),
    }

    unpack(&output).map(PromptOutcome::Prompted)
  }
}
