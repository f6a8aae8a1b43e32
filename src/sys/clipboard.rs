// ── Clipboard ─────────────────────────────────────────────────────────────────
//
// Pasted text is only ever used as a single console/chat line, so whatever
// the OS hands back is cut at the first line break or backspace and capped at
// the size of the input line.

use crate::error::Result;

/// Maximum characters handed back by `sanitize`, matching the console line.
pub const CLIPBOARD_MAX_CHARS: usize = 255;

/// Read/write access to the system clipboard (or a stand-in).
pub trait ClipboardProvider {
    /// Current clipboard text, already passed through [`sanitize`].
    /// `None` when the clipboard is empty, holds no text, or cannot be opened.
    fn get_text(&mut self) -> Option<String>;

    /// Replace the clipboard contents with `text`.
    fn set_text(&mut self, text: &str) -> Result<()>;
}

/// First line of `raw`, stopping at `\n`, `\r` or `\b`, at most
/// [`CLIPBOARD_MAX_CHARS`] characters.
pub fn sanitize(raw: &str) -> String {
    raw.chars()
        .take_while(|&c| c != '\n' && c != '\r' && c != '\u{8}')
        .take(CLIPBOARD_MAX_CHARS)
        .collect()
}

/// Process-local clipboard.  Used where no system clipboard is reachable and
/// as a test double.
#[derive(Debug, Default)]
pub struct LocalClipboard {
    text: Option<String>,
}

impl ClipboardProvider for LocalClipboard {
    fn get_text(&mut self) -> Option<String> {
        self.text.as_deref().map(sanitize)
    }

    fn set_text(&mut self, text: &str) -> Result<()> {
        self.text = Some(text.to_owned());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stops_at_first_line_break() {
        assert_eq!(sanitize("connect qw.example.net\r\nsecond"), "connect qw.example.net");
        assert_eq!(sanitize("abc\ndef"), "abc");
        assert_eq!(sanitize("ab\u{8}c"), "ab");
    }

    #[test]
    fn caps_length() {
        let long = "x".repeat(1000);
        assert_eq!(sanitize(&long).chars().count(), CLIPBOARD_MAX_CHARS);
    }

    #[test]
    fn keeps_non_ascii() {
        assert_eq!(sanitize("żółw"), "żółw");
    }

    #[test]
    fn local_clipboard_round_trip_is_sanitised() {
        let mut clip = LocalClipboard::default();
        assert_eq!(clip.get_text(), None);
        clip.set_text("say hi\nsay bye").expect("set");
        assert_eq!(clip.get_text().as_deref(), Some("say hi"));
    }
}
