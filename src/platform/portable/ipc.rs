// ── IPC transport (portable) ──────────────────────────────────────────────────
//
// One Unix datagram socket named after `sys::ipc::ENDPOINT_NAME` in the
// per-user runtime directory.  Datagrams keep message boundaries, like a mailslot.

use std::io;
use std::os::unix::net::UnixDatagram;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::platform::portable::instance::bind_exclusive;
use crate::sys::ipc::{ENDPOINT_NAME, MAX_MESSAGE_BYTES};

fn endpoint_path() -> Result<PathBuf> {
    Ok(super::runtime_dir()?.join(format!("{ENDPOINT_NAME}.sock")))
}

/// Receiving end, owned by the running client.
pub(crate) struct IpcServer {
    socket: UnixDatagram,
    path: PathBuf,
}

impl IpcServer {
    pub(crate) fn bind() -> Result<Self> {
        Self::bind_at(endpoint_path()?)
    }

    fn bind_at(path: PathBuf) -> Result<Self> {
        let socket = bind_exclusive(&path)?;
        socket.set_nonblocking(true)?;
        Ok(Self { socket, path })
    }

    /// One pending message, if any.  Never blocks.
    pub(crate) fn try_recv(&mut self) -> Result<Option<Vec<u8>>> {
        let mut buf = vec![0u8; MAX_MESSAGE_BYTES];
        match self.socket.recv(&mut buf) {
            Ok(n) => {
                buf.truncate(n);
                Ok(Some(buf))
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

impl Drop for IpcServer {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

/// Deliver `payload` to the running client.
pub(crate) fn send(payload: &[u8]) -> Result<()> {
    send_to(&endpoint_path()?, payload)
}

fn send_to(path: &Path, payload: &[u8]) -> Result<()> {
    let socket = UnixDatagram::unbound()?;
    socket.send_to(payload, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sys::ipc::{decode, encode, IpcMessage};

    #[test]
    fn message_reaches_server() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("ipc.sock");
        let mut server = IpcServer::bind_at(path.clone()).expect("bind");
        assert_eq!(server.try_recv().expect("recv"), None);

        send_to(&path, &encode("qw://127.0.0.1:27500").expect("encode")).expect("send");
        let got = server.try_recv().expect("recv").expect("a message");
        assert_eq!(
            decode(&got),
            Some(IpcMessage::Connect("qw://127.0.0.1:27500".to_owned()))
        );
    }

    #[test]
    fn send_without_server_fails() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(send_to(&dir.path().join("nobody.sock"), b"x\0").is_err());
    }
}
