// ── Process and thread priority, memory status (portable) ─────────────────────

use std::thread::JoinHandle;

use crate::error::{Error, Result};
use crate::sys::settings::Priority;
use crate::sys::MemoryStatus;

/// Only `Normal` is accepted: raising priority needs privileges a game
/// client should not ask for, and lowering it is one-way on Unix.
pub(crate) fn set_priority(priority: Priority) -> Result<()> {
    match priority {
        Priority::Normal => Ok(()),
        _ => Err(Error::Unsupported("changing the process priority class")),
    }
}

/// Thread priorities are left to the scheduler.
pub(crate) fn raise_thread_priority<T>(_handle: &JoinHandle<T>) {}

/// Physical memory figures from `/proc/meminfo`, where available.
pub(crate) fn memory_status() -> Option<MemoryStatus> {
    let text = std::fs::read_to_string("/proc/meminfo").ok()?;
    parse_meminfo(&text)
}

/// Pull `MemAvailable` and `MemTotal` (reported in KiB) out of a meminfo dump.
fn parse_meminfo(text: &str) -> Option<MemoryStatus> {
    let field = |key: &str| -> Option<u64> {
        let line = text.lines().find(|l| l.starts_with(key))?;
        let kib: u64 = line[key.len()..]
            .trim()
            .trim_end_matches("kB")
            .trim()
            .parse()
            .ok()?;
        Some(kib * 1024)
    };
    Some(MemoryStatus {
        avail_phys: field("MemAvailable:")?,
        total_phys: field("MemTotal:")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_meminfo() {
        let text = "MemTotal:       16318480 kB\nMemFree:         1037232 kB\nMemAvailable:    9427244 kB\n";
        let m = parse_meminfo(text).expect("parse");
        assert_eq!(m.total_phys, 16_318_480 * 1024);
        assert_eq!(m.avail_phys, 9_427_244 * 1024);
    }

    #[test]
    fn missing_fields_give_none() {
        assert!(parse_meminfo("MemTotal: 1 kB\n").is_none());
    }

    #[test]
    fn only_normal_priority_is_supported() {
        assert!(set_priority(Priority::Normal).is_ok());
        assert!(matches!(set_priority(Priority::High), Err(Error::Unsupported(_))));
    }
}
