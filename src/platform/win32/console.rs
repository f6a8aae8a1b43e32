// ── Dedicated-server console ──────────────────────────────────────────────────
//
// Raw key records are read from the console input buffer without blocking
// and handed to `sys::console::LineEditor`; echo and `print` go straight to
// the console output handle.

#![allow(unsafe_code)]

use std::io::{self, Write};
use std::sync::OnceLock;

use crossbeam_channel::Sender;
use windows::{
    core::PCWSTR,
    Win32::{
        Foundation::{BOOL, HANDLE},
        Storage::FileSystem::WriteFile,
        System::Console::{
            AllocConsole, GetNumberOfConsoleInputEvents, GetStdHandle, ReadConsoleInputW,
            SetConsoleCtrlHandler, SetConsoleTitleW, WriteConsoleW, CTRL_BREAK_EVENT, CTRL_CLOSE_EVENT,
            CTRL_C_EVENT, CTRL_LOGOFF_EVENT, CTRL_SHUTDOWN_EVENT, INPUT_RECORD, STD_INPUT_HANDLE,
            STD_OUTPUT_HANDLE,
        },
    },
};

use super::{wide, win32_err};
use crate::error::Result;
use crate::sys::console::KeyEvent;

/// `INPUT_RECORD::EventType` for keyboard records.
const KEY_EVENT: u16 = 0x0001;
/// `dwControlKeyState` bit for either Shift key.
const SHIFT_PRESSED: u32 = 0x0010;

/// Writes to a console output handle.  Text goes out as UTF-16 through
/// WriteConsoleW so it shows correctly whatever the console code page;
/// redirected output (not a console) falls back to raw UTF-8 bytes.
struct ConsoleOut(HANDLE);

impl Write for ConsoleOut {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let units: Vec<u16> = String::from_utf8_lossy(buf).encode_utf16().collect();
        let mut written = 0u32;
        // SAFETY: the handle is the process's standard output; units outlives
        // the call and WriteConsoleW reads at most units.len() u16s from it.
        if unsafe { WriteConsoleW(self.0, &units, Some(&mut written), None) }.is_ok() {
            return Ok(buf.len());
        }
        // SAFETY: as above; WriteFile reads at most buf.len() bytes.
        unsafe { WriteFile(self.0, Some(buf), Some(&mut written), None) }
            .map_err(io::Error::other)?;
        Ok(written as usize)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Rebuild a character from UTF-16 units delivered one key record at a
/// time.  A high surrogate is held in `pending` until its low half arrives;
/// unpaired halves are dropped.
fn decode_unit(pending: &mut Option<u16>, unit: u16) -> Option<char> {
    match unit {
        0xD800..=0xDBFF => {
            *pending = Some(unit);
            None
        }
        0xDC00..=0xDFFF => {
            let high = pending.take()?;
            char::decode_utf16([high, unit]).next().and_then(|r| r.ok())
        }
        _ => {
            *pending = None;
            Some(char::from_u32(u32::from(unit)).unwrap_or('\0'))
        }
    }
}

pub(crate) struct Console {
    input: HANDLE,
    output: ConsoleOut,
    high_surrogate: Option<u16>,
}

impl Console {
    /// Attach to the console, allocating one first for a dedicated server.
    pub(crate) fn open(dedicated: bool) -> Result<Self> {
        if dedicated {
            // SAFETY: no preconditions; fails only if a console is attached.
            unsafe { AllocConsole() }.map_err(win32_err("AllocConsole"))?;
        }
        // SAFETY: GetStdHandle has no preconditions.
        let input = unsafe { GetStdHandle(STD_INPUT_HANDLE) }.map_err(win32_err("GetStdHandle"))?;
        // SAFETY: as above.
        let output =
            unsafe { GetStdHandle(STD_OUTPUT_HANDLE) }.map_err(win32_err("GetStdHandle"))?;
        Ok(Self {
            input,
            output: ConsoleOut(output),
            high_surrogate: None,
        })
    }

    /// Key events queued since the last call.  Never blocks.
    pub(crate) fn read_events(&mut self) -> Result<Vec<KeyEvent>> {
        let mut out = Vec::new();
        loop {
            let mut pending = 0u32;
            // SAFETY: input is the console input handle; pending is a live local.
            unsafe { GetNumberOfConsoleInputEvents(self.input, &mut pending) }
                .map_err(win32_err("GetNumberOfConsoleInputEvents"))?;
            if pending == 0 {
                return Ok(out);
            }

            let mut records = [INPUT_RECORD::default(); 1];
            let mut read = 0u32;
            // SAFETY: records is a live one-element buffer; at least one event
            // is pending, so the call returns without blocking.
            unsafe { ReadConsoleInputW(self.input, &mut records, &mut read) }
                .map_err(win32_err("ReadConsoleInputW"))?;
            if read != 1 {
                return Ok(out);
            }

            let rec = &records[0];
            if rec.EventType != KEY_EVENT {
                continue;
            }
            // SAFETY: EventType == KEY_EVENT selects the KeyEvent union member.
            let key = unsafe { rec.Event.KeyEvent };
            // SAFETY: UnicodeChar is the active member for ReadConsoleInputW.
            let unit = unsafe { key.uChar.UnicodeChar };
            let down = key.bKeyDown.as_bool();
            let ch = if down {
                match decode_unit(&mut self.high_surrogate, unit) {
                    Some(c) => c,
                    None => continue,
                }
            } else {
                '\0'
            };
            out.push(KeyEvent {
                down,
                ch,
                shift: key.dwControlKeyState & SHIFT_PRESSED != 0,
                virtual_key: key.wVirtualKeyCode,
            });
        }
    }

    /// Where the line editor writes its echo.
    pub(crate) fn echo(&mut self) -> &mut dyn Write {
        &mut self.output
    }

    /// Console output for `Sys_Printf`-style messages.
    pub(crate) fn print(&mut self, text: &str) -> Result<()> {
        self.output.write_all(text.as_bytes())?;
        Ok(())
    }

    pub(crate) fn set_title(&mut self, title: &str) {
        let title = wide(title);
        // SAFETY: title is a valid null-terminated UTF-16 string for the call.
        unsafe {
            let _ = SetConsoleTitleW(PCWSTR(title.as_ptr()));
        }
    }
}

// ── Ctrl+C / close handling ───────────────────────────────────────────────────

static CTRL_COMMANDS: OnceLock<Sender<String>> = OnceLock::new();

/// Turn Ctrl+C, Ctrl+Break, console close, logoff and shutdown into a `quit`
/// command delivered through `commands`.
pub(crate) fn install_ctrl_handler(commands: Sender<String>) -> Result<()> {
    let _ = CTRL_COMMANDS.set(commands);
    // SAFETY: ctrl_handler is a valid `extern "system"` routine that lives for
    // the whole process.
    unsafe { SetConsoleCtrlHandler(Some(ctrl_handler), true) }
        .map_err(win32_err("SetConsoleCtrlHandler"))?;
    Ok(())
}

// SAFETY: called by the system on its own thread; only touches the
// thread-safe channel sender.
unsafe extern "system" fn ctrl_handler(ctrl_type: u32) -> BOOL {
    match ctrl_type {
        CTRL_C_EVENT | CTRL_BREAK_EVENT | CTRL_CLOSE_EVENT | CTRL_LOGOFF_EVENT
        | CTRL_SHUTDOWN_EVENT => {
            if let Some(tx) = CTRL_COMMANDS.get() {
                let _ = tx.send("quit".to_owned());
            }
            BOOL::from(true)
        }
        _ => BOOL::from(false),
    }
}
