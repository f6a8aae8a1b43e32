// ── System clipboard ──────────────────────────────────────────────────────────
//
// Text goes in and out as CF_UNICODETEXT; Windows synthesises CF_TEXT for
// older readers.  Every path that opens the clipboard closes it through
// `OpenClipboardGuard`.

#![allow(unsafe_code)]

use windows::{
    core::PCWSTR,
    Win32::{
        Foundation::{HANDLE, HGLOBAL, HWND},
        System::{
            DataExchange::{
                CloseClipboard, EmptyClipboard, GetClipboardData, OpenClipboard, SetClipboardData,
            },
            Memory::{GlobalAlloc, GlobalFree, GlobalLock, GlobalUnlock, GMEM_MOVEABLE},
            Ole::CF_UNICODETEXT,
        },
    },
};

use super::{wide, win32_err};
use crate::error::Result;
use crate::sys::clipboard::{sanitize, ClipboardProvider};

/// Closes the clipboard when dropped.
struct OpenClipboardGuard;

impl OpenClipboardGuard {
    fn open() -> Result<Self> {
        // SAFETY: a null owner associates the clipboard with the current
        // task; the guard guarantees the matching CloseClipboard.
        unsafe { OpenClipboard(HWND::default()) }.map_err(win32_err("OpenClipboard"))?;
        Ok(Self)
    }
}

impl Drop for OpenClipboardGuard {
    fn drop(&mut self) {
        // SAFETY: only constructed after a successful OpenClipboard.
        unsafe {
            let _ = CloseClipboard();
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct SystemClipboard;

impl ClipboardProvider for SystemClipboard {
    fn get_text(&mut self) -> Option<String> {
        let _open = OpenClipboardGuard::open().ok()?;

        // SAFETY: the clipboard is open; the returned handle is owned by the
        // clipboard and stays valid until CloseClipboard.
        let handle = unsafe { GetClipboardData(u32::from(CF_UNICODETEXT.0)) }.ok()?;
        let hglobal = HGLOBAL(handle.0);

        // SAFETY: CF_UNICODETEXT data is a null-terminated UTF-16 string in a
        // global memory block.  The pointer is used only between Lock/Unlock.
        unsafe {
            let ptr = GlobalLock(hglobal) as *const u16;
            if ptr.is_null() {
                return None;
            }
            let text = PCWSTR(ptr).to_string().ok();
            let _ = GlobalUnlock(hglobal);
            text.map(|t| sanitize(&t))
        }
    }

    fn set_text(&mut self, text: &str) -> Result<()> {
        let data = wide(text);
        let bytes = data.len() * std::mem::size_of::<u16>();

        let _open = OpenClipboardGuard::open()?;
        // SAFETY: the clipboard is open on this thread.
        unsafe { EmptyClipboard() }.map_err(win32_err("EmptyClipboard"))?;

        // SAFETY: a movable block of `bytes` bytes is allocated, locked,
        // filled with exactly `data.len()` u16s and unlocked.  On success the
        // clipboard owns the block; on failure we free it.
        unsafe {
            let hglobal = GlobalAlloc(GMEM_MOVEABLE, bytes).map_err(win32_err("GlobalAlloc"))?;
            let dst = GlobalLock(hglobal) as *mut u16;
            if dst.is_null() {
                let _ = GlobalFree(hglobal);
                return Err(super::last_error("GlobalLock"));
            }
            std::ptr::copy_nonoverlapping(data.as_ptr(), dst, data.len());
            let _ = GlobalUnlock(hglobal);

            if let Err(e) = SetClipboardData(u32::from(CF_UNICODETEXT.0), HANDLE(hglobal.0)) {
                let _ = GlobalFree(hglobal);
                return Err(win32_err("SetClipboardData")(e));
            }
        }
        Ok(())
    }
}
