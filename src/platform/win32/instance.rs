// ── Single-instance lock ──────────────────────────────────────────────────────
//
// A named mutex "qwcl".  Launchers also probe this name to tell whether the
// client is alive.

#![allow(unsafe_code)]

use windows::{
    core::w,
    Win32::{
        Foundation::{CloseHandle, GetLastError, ERROR_ALREADY_EXISTS, HANDLE},
        System::Threading::CreateMutexW,
    },
};

use super::win32_err;
use crate::error::{Error, Result};

pub(crate) struct InstanceLock {
    handle: HANDLE,
}

impl InstanceLock {
    /// Claim the slot, or fail with `Error::AlreadyRunning`.
    pub(crate) fn acquire() -> Result<Self> {
        // SAFETY: default security, not initially owned, static name.
        // CreateMutexW opens the existing object when the name is taken and
        // reports that through the last-error value, read immediately below.
        let handle = unsafe { CreateMutexW(None, false, w!("qwcl")) }
            .map_err(win32_err("CreateMutexW"))?;
        // SAFETY: thread-local read right after CreateMutexW.
        let existed = unsafe { GetLastError() } == ERROR_ALREADY_EXISTS;

        if existed {
            // SAFETY: handle was just returned by CreateMutexW.
            unsafe {
                let _ = CloseHandle(handle);
            }
            return Err(Error::AlreadyRunning);
        }
        Ok(Self { handle })
    }
}

impl Drop for InstanceLock {
    fn drop(&mut self) {
        // SAFETY: we own the handle and close it exactly once.
        unsafe {
            let _ = CloseHandle(self.handle);
        }
    }
}
