// ── Central error type ────────────────────────────────────────────────────────
//
// All fallible operations in qwcl return `error::Result<T>`.  Errors that
// reach the main loop are fatal: `sys::System::fatal` prints them and exits
// the process.  Recoverable cases (a settings change the OS refuses, a
// matrix-stack underflow) are logged at the call site and the loop goes on.

/// Every error that qwcl can produce.
#[derive(Debug)]
pub enum Error {
    /// A Win32 API call returned a failure code.
    Win32 {
        /// The name of the failing function, for display purposes.
        function: &'static str,
        /// The raw Win32 error code (`GetLastError()` value) or HRESULT.
        code: u32,
    },

    /// A standard I/O error (file open, socket, console, …).
    Io(std::io::Error),

    /// Another client instance already owns the single-instance slot.
    AlreadyRunning,

    /// An IPC payload does not fit in one message.
    MessageTooLong {
        /// Encoded length, terminator included.
        len: usize,
        /// Largest accepted length.
        max: usize,
    },

    /// `pop` was called on an empty saved-matrix stack.
    MatrixStackUnderflow,

    /// The operation has no implementation on this platform.
    Unsupported(&'static str),

    /// The settings file could not be parsed or written.
    Config(serde_json::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Win32 { function, code } => {
                write!(f, "{function} failed (error {code:#010x})")
            }
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::AlreadyRunning => write!(f, "QWCL is already running on this system"),
            Self::MessageTooLong { len, max } => {
                write!(f, "IPC message is {len} bytes, limit is {max}")
            }
            Self::MatrixStackUnderflow => write!(f, "matrix stack underflow"),
            Self::Unsupported(what) => write!(f, "{what} is not supported on this platform"),
            Self::Config(e) => write!(f, "settings error: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Config(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Config(e)
    }
}

// Convert a windows-crate error (HRESULT) directly into an Error so that
// `?` can be used on `windows::core::Result<T>` throughout the platform module.
#[cfg(windows)]
impl From<windows::core::Error> for Error {
    fn from(e: windows::core::Error) -> Self {
        // HRESULT.0 is i32; reinterpret bits as u32 for display purposes.
        // Win32 errors appear as 0x8007xxxx HRESULTs.
        Self::Win32 {
            function: "windows",
            code: e.code().0 as u32,
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn win32_error_formats_code_as_hex() {
        let e = Error::Win32 {
            function: "CreateMailslotW",
            code: 5,
        };
        assert_eq!(e.to_string(), "CreateMailslotW failed (error 0x00000005)");
    }

    #[test]
    fn io_error_keeps_its_source() {
        let e: Error = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(std::error::Error::source(&e).is_some());
        assert!(e.to_string().contains("gone"));
    }
}
