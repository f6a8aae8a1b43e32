// ── Low-level keyboard hook ───────────────────────────────────────────────────
//
// While the client has focus the Windows, Menu and Print Screen keys are
// swallowed and reported as ordinary key events, so they can be bound
// instead of opening the Start menu.  The hook runs on the installing
// thread's message pump (`events::pump_messages`).

#![allow(unsafe_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crossbeam_channel::Sender;
use windows::Win32::{
    Foundation::{HINSTANCE, LPARAM, LRESULT, WPARAM},
    System::LibraryLoader::GetModuleHandleW,
    UI::{
        Input::KeyboardAndMouse::{VK_APPS, VK_LWIN, VK_RWIN, VK_SNAPSHOT},
        WindowsAndMessaging::{
            CallNextHookEx, SetWindowsHookExW, UnhookWindowsHookEx, HHOOK, KBDLLHOOKSTRUCT,
            LLKHF_UP, WH_KEYBOARD_LL,
        },
    },
};

use super::win32_err;
use crate::error::Result;
use crate::sys::HookedKey;

static ACTIVE: AtomicBool = AtomicBool::new(false);
static EVENTS: Mutex<Option<Sender<(HookedKey, bool)>>> = Mutex::new(None);

pub(crate) struct KeyHook {
    hook: HHOOK,
}

impl KeyHook {
    pub(crate) fn install(events: Sender<(HookedKey, bool)>) -> Result<Self> {
        if let Ok(mut slot) = EVENTS.lock() {
            *slot = Some(events);
        }

        // SAFETY: GetModuleHandleW(None) returns the .exe's own HMODULE, which is
        // always valid for the process lifetime.
        let hmodule = unsafe { GetModuleHandleW(None) }.map_err(win32_err("GetModuleHandleW"))?;

        // SAFETY: hook_proc is a valid `extern "system"` HOOKPROC that lives
        // for the whole process; thread id 0 installs a global LL hook.
        let hook = unsafe {
            SetWindowsHookExW(WH_KEYBOARD_LL, Some(hook_proc), HINSTANCE(hmodule.0), 0)
        }
        .map_err(win32_err("SetWindowsHookExW"))?;

        Ok(Self { hook })
    }

    /// Only swallow keys while the client has focus.
    pub(crate) fn set_active(&self, active: bool) {
        ACTIVE.store(active, Ordering::Relaxed);
    }
}

impl Drop for KeyHook {
    fn drop(&mut self) {
        // SAFETY: the hook was installed by `install` and is removed once.
        unsafe {
            let _ = UnhookWindowsHookEx(self.hook);
        }
        if let Ok(mut slot) = EVENTS.lock() {
            *slot = None;
        }
    }
}

fn hooked_key(vk: u32) -> Option<HookedKey> {
    match vk {
        v if v == u32::from(VK_LWIN.0) => Some(HookedKey::LeftWin),
        v if v == u32::from(VK_RWIN.0) => Some(HookedKey::RightWin),
        v if v == u32::from(VK_APPS.0) => Some(HookedKey::Menu),
        v if v == u32::from(VK_SNAPSHOT.0) => Some(HookedKey::PrintScreen),
        _ => None,
    }
}

// SAFETY: called by the system on the installing thread with a valid
// KBDLLHOOKSTRUCT pointer in lparam whenever code >= 0.
unsafe extern "system" fn hook_proc(code: i32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
    if code >= 0 && ACTIVE.load(Ordering::Relaxed) {
        let info = &*(lparam.0 as *const KBDLLHOOKSTRUCT);
        if let Some(key) = hooked_key(info.vkCode) {
            let down = info.flags.0 & LLKHF_UP.0 == 0;
            if let Ok(slot) = EVENTS.lock() {
                if let Some(tx) = slot.as_ref() {
                    let _ = tx.send((key, down));
                }
            }
            return LRESULT(1);
        }
    }
    CallNextHookEx(HHOOK::default(), code, wparam, lparam)
}
