// ── Message pump, idle wait, screensaver ──────────────────────────────────────

#![allow(unsafe_code)]

use std::ffi::c_void;
use std::time::Duration;

use windows::Win32::{
    Foundation::{BOOL, HWND},
    UI::WindowsAndMessaging::{
        DispatchMessageW, MsgWaitForMultipleObjects, PeekMessageW, SystemParametersInfoW,
        TranslateMessage, MSG, PM_REMOVE, QS_ALLINPUT, SPIF_SENDWININICHANGE,
        SPI_GETSCREENSAVEACTIVE, SPI_SETSCREENSAVEACTIVE, SYSTEM_PARAMETERS_INFO_UPDATE_FLAGS,
        WM_QUIT,
    },
};

/// Drain and dispatch every pending message on this thread.
///
/// Returns `false` once `WM_QUIT` has been seen.
pub(crate) fn pump_messages() -> bool {
    let mut msg = MSG::default();
    // SAFETY: &mut msg is a valid MSG pointer; HWND::default() retrieves
    // messages for all windows on this thread; 0,0 filter accepts all.
    while unsafe { PeekMessageW(&mut msg, HWND::default(), 0, 0, PM_REMOVE) }.as_bool() {
        if msg.message == WM_QUIT {
            return false;
        }
        // SAFETY: msg was populated by a successful PeekMessageW call.
        // TranslateMessage return value (whether it generated WM_CHAR)
        // and DispatchMessageW's LRESULT are intentionally unused.
        unsafe {
            let _ = TranslateMessage(&msg);
            let _ = DispatchMessageW(&msg);
        }
    }
    true
}

/// Block until any input message arrives or `timeout` elapses.
pub(crate) fn sleep_until_input(timeout: Duration) {
    let ms = u32::try_from(timeout.as_millis()).unwrap_or(u32::MAX);
    // SAFETY: no handles to wait on; only the thread's input queue.
    unsafe {
        let _ = MsgWaitForMultipleObjects(None, false, ms, QS_ALLINPUT);
    }
}

/// Turn the screensaver off for the session if it is on.
///
/// Returns `true` when it was switched off, meaning `restore_screensaver`
/// must be called on exit.
pub(crate) fn suppress_screensaver() -> bool {
    let mut enabled = BOOL::default();
    // SAFETY: SPI_GETSCREENSAVEACTIVE writes one BOOL through pvparam, which
    // points at a live local.
    let queried = unsafe {
        SystemParametersInfoW(
            SPI_GETSCREENSAVEACTIVE,
            0,
            Some(&mut enabled as *mut BOOL as *mut c_void),
            SYSTEM_PARAMETERS_INFO_UPDATE_FLAGS(0),
        )
    };
    if queried.is_err() || !enabled.as_bool() {
        return false;
    }
    // SAFETY: SPI_SETSCREENSAVEACTIVE takes its value in uiparam; no pointer.
    unsafe { SystemParametersInfoW(SPI_SETSCREENSAVEACTIVE, 0, None, SPIF_SENDWININICHANGE) }
        .is_ok()
}

pub(crate) fn restore_screensaver() {
    // SAFETY: as in suppress_screensaver.
    unsafe {
        let _ = SystemParametersInfoW(SPI_SETSCREENSAVEACTIVE, 1, None, SPIF_SENDWININICHANGE);
    }
}
