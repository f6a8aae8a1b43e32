// ── Platform abstraction layer ────────────────────────────────────────────────
//
// Two backends with the same module layout and function names:
//   • `win32`    – Win32 FFI through the `windows` crate (unsafe confined here);
//   • `portable` – std + crossbeam-channel, for Unix-like hosts.
//
// The rest of the crate only ever names `platform::native`.

#[cfg(windows)]
pub mod win32;
#[cfg(windows)]
pub(crate) use self::win32 as native;

#[cfg(unix)]
pub mod portable;
#[cfg(unix)]
pub(crate) use self::portable as native;
