// ── Win32 platform implementation ─────────────────────────────────────────────
//
// This is the only module tree in the codebase where `unsafe` code is
// permitted.  Every `unsafe` block MUST carry a `// SAFETY:` comment that
// states:
//   • which invariant makes the operation sound, and
//   • what the caller is responsible for maintaining.
//
// Nothing in this module is `pub` beyond what callers genuinely need; keep the
// unsafe surface as small as possible.

#![allow(unsafe_code)]

use windows::Win32::Foundation::GetLastError;

use crate::error::Error;

// ── Sub-modules ───────────────────────────────────────────────────────────────

pub mod clipboard; // CF_UNICODETEXT read/write
pub mod console; // dedicated-server console, Ctrl+C handler
pub mod dialog; // fatal error message box
pub mod events; // message pump, idle wait, screensaver
pub mod instance; // named mutex
pub mod ipc; // mailslot
pub mod keyhook; // WH_KEYBOARD_LL hook for the Windows keys
pub mod process; // priority classes, memory status

// ── Shared helpers ────────────────────────────────────────────────────────────

/// Capture the current Win32 last-error code and wrap it in an `Error`.
///
/// Call immediately after a Win32 function that signals failure — `GetLastError`
/// reads thread-local state that can be overwritten by any subsequent API call.
pub(crate) fn last_error(function: &'static str) -> Error {
    // SAFETY: GetLastError reads thread-local state set by the last Win32 call.
    // It is always safe to call and never fails.
    let code = unsafe { GetLastError() };
    Error::Win32 {
        function,
        code: code.0,
    }
}

/// Tag a windows-crate error with the name of the call that produced it.
pub(crate) fn win32_err(function: &'static str) -> impl FnOnce(windows::core::Error) -> Error {
    move |e| Error::Win32 {
        function,
        code: e.code().0 as u32,
    }
}

/// Null-terminated UTF-16 copy of `s`.
pub(crate) fn wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}
