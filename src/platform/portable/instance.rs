// ── Single-instance lock (portable) ───────────────────────────────────────────
//
// A bound Unix datagram socket in the per-user runtime directory plays the
// role of the named mutex: binding succeeds for exactly one live process.  A
// socket file left behind by a crashed client refuses connections and is replaced.

use std::io;
use std::os::unix::net::UnixDatagram;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

const LOCK_NAME: &str = "qwcl.lock";

pub(crate) struct InstanceLock {
    _socket: UnixDatagram,
    path: PathBuf,
}

impl InstanceLock {
    /// Claim the slot, or fail with `Error::AlreadyRunning`.
    pub(crate) fn acquire() -> Result<Self> {
        let path = super::runtime_dir()?.join(LOCK_NAME);
        let socket = bind_exclusive(&path)?;
        Ok(Self {
            _socket: socket,
            path,
        })
    }
}

impl Drop for InstanceLock {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

/// Bind a datagram socket at `path`, taking over stale socket files.
pub(crate) fn bind_exclusive(path: &Path) -> Result<UnixDatagram> {
    match UnixDatagram::bind(path) {
        Ok(s) => Ok(s),
        Err(e) if e.kind() == io::ErrorKind::AddrInUse => {
            let probe = UnixDatagram::unbound()?;
            if probe.connect(path).is_ok() {
                return Err(Error::AlreadyRunning);
            }
            log::debug!("removing stale socket {}", path.display());
            std::fs::remove_file(path)?;
            Ok(UnixDatagram::bind(path)?)
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_bind_reports_already_running() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("test.lock");

        let first = bind_exclusive(&path).expect("first bind");
        assert!(matches!(bind_exclusive(&path), Err(Error::AlreadyRunning)));
        drop(first);

        // The socket file outlives the socket; the next bind takes it over.
        assert!(path.exists());
        bind_exclusive(&path).expect("rebind over stale file");
    }
}
