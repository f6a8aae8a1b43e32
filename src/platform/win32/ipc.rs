// ── IPC transport: mailslot ───────────────────────────────────────────────────
//
// The running client owns `\\.\mailslot\ezquake`; a second launch opens it
// as a file and writes one message.  Mailslots keep message boundaries.

#![allow(unsafe_code)]

use windows::{
    core::PCWSTR,
    Win32::{
        Foundation::{CloseHandle, GENERIC_WRITE, HANDLE},
        Storage::FileSystem::{
            CreateFileW, ReadFile, WriteFile, FILE_ATTRIBUTE_NORMAL, FILE_SHARE_READ, OPEN_EXISTING,
        },
        System::Mailslots::{CreateMailslotW, GetMailslotInfo},
    },
};

use super::{wide, win32_err};
use crate::error::Result;
use crate::sys::ipc::{ENDPOINT_NAME, MAX_MESSAGE_BYTES};

/// `GetMailslotInfo` next-size value meaning "queue empty".
const MAILSLOT_NO_MESSAGE: u32 = u32::MAX;

fn mailslot_name() -> Vec<u16> {
    wide(&format!(r"\\.\mailslot\{ENDPOINT_NAME}"))
}

/// Receiving end, owned by the running client.
pub(crate) struct IpcServer {
    handle: HANDLE,
}

impl IpcServer {
    pub(crate) fn bind() -> Result<Self> {
        let name = mailslot_name();
        // SAFETY: name is a valid null-terminated UTF-16 string that outlives
        // the call; read timeout 0 makes reads non-blocking.
        let handle = unsafe {
            CreateMailslotW(PCWSTR(name.as_ptr()), MAX_MESSAGE_BYTES as u32, 0, None)
        }
        .map_err(win32_err("CreateMailslotW"))?;
        Ok(Self { handle })
    }

    /// One pending message, if any.  Never blocks.
    pub(crate) fn try_recv(&mut self) -> Result<Option<Vec<u8>>> {
        let mut next_size = 0u32;
        // SAFETY: handle is our mailslot; only the next-size out-pointer is
        // requested and it points at a live local.
        unsafe { GetMailslotInfo(self.handle, None, Some(&mut next_size), None, None) }
            .map_err(win32_err("GetMailslotInfo"))?;
        if next_size == MAILSLOT_NO_MESSAGE {
            return Ok(None);
        }

        let mut buf = vec![0u8; MAX_MESSAGE_BYTES];
        let mut read = 0u32;
        // SAFETY: buf is a live, writable buffer; ReadFile writes at most
        // buf.len() bytes and reports the count through `read`.
        unsafe { ReadFile(self.handle, Some(&mut buf), Some(&mut read), None) }
            .map_err(win32_err("ReadFile"))?;
        buf.truncate(read as usize);
        Ok(Some(buf))
    }
}

impl Drop for IpcServer {
    fn drop(&mut self) {
        // SAFETY: we own the mailslot handle and close it exactly once.
        unsafe {
            let _ = CloseHandle(self.handle);
        }
    }
}

/// Deliver `payload` to the running client.
pub(crate) fn send(payload: &[u8]) -> Result<()> {
    let name = mailslot_name();
    // SAFETY: name outlives the call; mailslot clients must open with
    // FILE_SHARE_READ and OPEN_EXISTING.
    let handle = unsafe {
        CreateFileW(
            PCWSTR(name.as_ptr()),
            GENERIC_WRITE.0,
            FILE_SHARE_READ,
            None,
            OPEN_EXISTING,
            FILE_ATTRIBUTE_NORMAL,
            HANDLE::default(),
        )
    }
    .map_err(win32_err("CreateFileW"))?;

    let mut written = 0u32;
    // SAFETY: handle was just opened for writing; payload outlives the call.
    let result = unsafe { WriteFile(handle, Some(payload), Some(&mut written), None) };
    // SAFETY: handle is ours and closed exactly once.
    unsafe {
        let _ = CloseHandle(handle);
    }
    result.map_err(win32_err("WriteFile"))?;
    Ok(())
}
