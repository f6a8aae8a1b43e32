// ── OS event pump (portable) ──────────────────────────────────────────────────
//
// A console process has no window message queue.  Input arrives through the
// stdin reader thread, so idle sleeping is a plain sleep.

use std::time::Duration;

/// Drain pending OS messages.  `false` means the OS asked us to quit.
pub(crate) fn pump_messages() -> bool {
    true
}

/// Block for up to `timeout`.
pub(crate) fn sleep_until_input(timeout: Duration) {
    std::thread::sleep(timeout);
}

/// Screensaver control is a desktop-session concern; nothing to do here.
pub(crate) fn suppress_screensaver() -> bool {
    false
}

pub(crate) fn restore_screensaver() {}
