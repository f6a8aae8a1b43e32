// ── Fatal error dialog ────────────────────────────────────────────────────────

#![allow(unsafe_code)]

use windows::{
    core::PCWSTR,
    Win32::{
        Foundation::HWND,
        UI::WindowsAndMessaging::{MessageBoxW, MB_ICONERROR, MB_OK},
    },
};

use super::wide;

/// Show a modal error dialog with the given message.
///
/// Safe to call from any context; performs the UTF-16 conversion internally.
pub(crate) fn show_error_dialog(message: &str) {
    let msg_wide = wide(message);
    let title_wide = wide("Error");

    // SAFETY: msg_wide and title_wide are valid null-terminated UTF-16 strings
    // that remain allocated for the duration of the MessageBoxW call.
    // HWND::default() (null) means the dialog has no owner window.
    // Return value (button pressed) is intentionally unused for an error dialog.
    unsafe {
        let _ = MessageBoxW(
            HWND::default(),
            PCWSTR(msg_wide.as_ptr()),
            PCWSTR(title_wide.as_ptr()),
            MB_OK | MB_ICONERROR,
        );
    }
}
