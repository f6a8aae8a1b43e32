// ── Process and thread priority, memory status ────────────────────────────────

#![allow(unsafe_code)]

use std::os::windows::io::AsRawHandle;
use std::thread::JoinHandle;

use windows::Win32::{
    Foundation::HANDLE,
    System::{
        SystemInformation::{GlobalMemoryStatusEx, MEMORYSTATUSEX},
        Threading::{
            GetCurrentProcess, SetPriorityClass, SetThreadPriority, HIGH_PRIORITY_CLASS,
            IDLE_PRIORITY_CLASS, NORMAL_PRIORITY_CLASS, REALTIME_PRIORITY_CLASS,
            THREAD_PRIORITY_HIGHEST,
        },
    },
};

use super::win32_err;
use crate::error::Result;
use crate::sys::settings::Priority;
use crate::sys::MemoryStatus;

pub(crate) fn set_priority(priority: Priority) -> Result<()> {
    let class = match priority {
        Priority::Idle => IDLE_PRIORITY_CLASS,
        Priority::Normal => NORMAL_PRIORITY_CLASS,
        Priority::High => HIGH_PRIORITY_CLASS,
        Priority::Realtime => REALTIME_PRIORITY_CLASS,
    };
    // SAFETY: GetCurrentProcess returns a pseudo-handle that is always valid
    // for the calling process and never needs closing.
    unsafe { SetPriorityClass(GetCurrentProcess(), class) }.map_err(win32_err("SetPriorityClass"))?;
    Ok(())
}

/// Best-effort bump of a worker thread to the highest normal priority.
pub(crate) fn raise_thread_priority<T>(handle: &JoinHandle<T>) {
    let raw = HANDLE(handle.as_raw_handle());
    // SAFETY: the JoinHandle keeps the thread handle open for this call.
    if let Err(e) = unsafe { SetThreadPriority(raw, THREAD_PRIORITY_HIGHEST) } {
        log::warn!("SetThreadPriority failed: {e}");
    }
}

pub(crate) fn memory_status() -> Option<MemoryStatus> {
    let mut status = MEMORYSTATUSEX {
        dwLength: std::mem::size_of::<MEMORYSTATUSEX>() as u32,
        ..Default::default()
    };
    // SAFETY: status is a live, correctly sized MEMORYSTATUSEX.
    unsafe { GlobalMemoryStatusEx(&mut status) }.ok()?;
    Some(MemoryStatus {
        avail_phys: status.ullAvailPhys,
        total_phys: status.ullTotalPhys,
    })
}
