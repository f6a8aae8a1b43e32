// ── Low-level keyboard hook (portable) ────────────────────────────────────────

use crossbeam_channel::Sender;

use crate::error::{Error, Result};
use crate::sys::HookedKey;

/// Never constructed: global key hooks need a Win32 desktop.
pub(crate) struct KeyHook {
    _private: (),
}

impl KeyHook {
    pub(crate) fn install(_events: Sender<(HookedKey, bool)>) -> Result<Self> {
        Err(Error::Unsupported("the Windows-key hook"))
    }

    pub(crate) fn set_active(&self, _active: bool) {}
}
