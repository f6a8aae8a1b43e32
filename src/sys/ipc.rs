// ── Single-instance IPC message format ────────────────────────────────────────
//
// A second launch (typically a browser handing over a `qw://` link) forwards
// its `+qwurl` argument to the running client and exits.  One message is one
// NUL-terminated string of at most `MAX_MESSAGE_BYTES` bytes; the transport
// lives in the platform backend.

use crate::error::{Error, Result};

/// Endpoint name shared by both sides.
pub const ENDPOINT_NAME: &str = "ezquake";

/// Largest message, terminator included.
pub const MAX_MESSAGE_BYTES: usize = 1024;

/// A decoded IPC request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IpcMessage {
    /// A `qw://host[:port][/command]` link to act on.
    Connect(String),
    /// Any other text, run as a console command.
    Command(String),
}

/// Wire form of `text`: its UTF-8 bytes plus a trailing NUL.
pub fn encode(text: &str) -> Result<Vec<u8>> {
    let len = text.len() + 1;
    if len > MAX_MESSAGE_BYTES {
        return Err(Error::MessageTooLong {
            len,
            max: MAX_MESSAGE_BYTES,
        });
    }
    let mut out = Vec::with_capacity(len);
    out.extend_from_slice(text.as_bytes());
    out.push(0);
    Ok(out)
}

/// Parse a received datagram.  Text after the first NUL is ignored;
/// blank payloads decode to `None`.
pub fn decode(bytes: &[u8]) -> Option<IpcMessage> {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    let text = String::from_utf8_lossy(&bytes[..end]);
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if text.get(..5).is_some_and(|p| p.eq_ignore_ascii_case("qw://")) {
        Some(IpcMessage::Connect(text.to_owned()))
    } else {
        Some(IpcMessage::Command(text.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_appends_terminator() {
        assert_eq!(encode("qw://a").expect("encode"), b"qw://a\0");
    }

    #[test]
    fn encode_rejects_oversize_payloads() {
        assert!(encode(&"x".repeat(MAX_MESSAGE_BYTES - 1)).is_ok());
        let err = encode(&"x".repeat(MAX_MESSAGE_BYTES)).unwrap_err();
        assert!(matches!(err, Error::MessageTooLong { len: 1025, max: 1024 }));
    }

    #[test]
    fn decode_classifies_urls_and_commands() {
        assert_eq!(
            decode(b"QW://qw.example.net:27500/observe\0"),
            Some(IpcMessage::Connect("QW://qw.example.net:27500/observe".to_owned()))
        );
        assert_eq!(decode(b"  status \0"), Some(IpcMessage::Command("status".to_owned())));
    }

    #[test]
    fn decode_stops_at_first_nul() {
        assert_eq!(decode(b"say hi\0garbage"), Some(IpcMessage::Command("say hi".to_owned())));
    }

    #[test]
    fn decode_ignores_blank_payloads() {
        assert_eq!(decode(b""), None);
        assert_eq!(decode(b"\0\0\0"), None);
        assert_eq!(decode(b" \t\0"), None);
    }
}
