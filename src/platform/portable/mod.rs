// ── Portable platform implementation ──────────────────────────────────────────
//
// Safe Rust only.  Where a Unix host has no counterpart to a Win32 facility
// (system clipboard, low-level key hooks, priority classes) the function
// reports `Error::Unsupported` or degrades to a process-local stand-in.

pub mod clipboard;
pub mod console;
pub mod dialog;
pub mod events;
pub mod instance;
pub mod ipc;
pub mod keyhook;
pub mod process;

use std::fs::{self, DirBuilder};
use std::os::unix::fs::{DirBuilderExt, MetadataExt};
use std::path::{Path, PathBuf};

use directories::{BaseDirs, ProjectDirs};

use crate::error::{Error, Result};

/// Per-user directory for the instance lock and the IPC socket:
/// `$XDG_RUNTIME_DIR/qwcl` where there is one, else `<tmp>/qwcl-<uid>`.
/// Created `0700`; an existing directory owned by someone else is refused.
pub(crate) fn runtime_dir() -> Result<PathBuf> {
    let runtime = ProjectDirs::from("", "", "qwcl").and_then(|d| d.runtime_dir().map(Path::to_path_buf));
    let uid = match BaseDirs::new() {
        Some(b) => fs::metadata(b.home_dir())?.uid(),
        None => return Err(Error::Unsupported("a per-user runtime directory without a home")),
    };
    let dir = runtime.unwrap_or_else(|| std::env::temp_dir().join(format!("qwcl-{uid}")));
    private_dir(&dir, uid)?;
    Ok(dir)
}

fn private_dir(dir: &Path, uid: u32) -> Result<()> {
    DirBuilder::new().recursive(true).mode(0o700).create(dir)?;
    if fs::metadata(dir)?.uid() != uid {
        return Err(Error::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            format!("{} belongs to another user", dir.display()),
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::fs::PermissionsExt;

    #[test]
    fn private_dir_is_owner_only() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let uid = fs::metadata(tmp.path()).expect("meta").uid();
        let dir = tmp.path().join("qwcl-test");

        private_dir(&dir, uid).expect("create");
        let mode = fs::metadata(&dir).expect("meta").permissions().mode();
        assert_eq!(mode & 0o077, 0);
        // Existing directory is fine.
        private_dir(&dir, uid).expect("reuse");
    }

    #[test]
    fn foreign_owner_is_refused() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let uid = fs::metadata(tmp.path()).expect("meta").uid();
        assert!(private_dir(tmp.path(), uid.wrapping_add(1)).is_err());
    }
}
