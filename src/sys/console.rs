// ── Dedicated-server console line editor ──────────────────────────────────────
//
// Turns raw key events into complete command lines and echoes the edits back
// to the console.  The platform backends only produce `KeyEvent`s; all
// editing rules live here so they behave the same everywhere.

use std::collections::VecDeque;
use std::io::Write;

use crate::error::Result;
use crate::sys::clipboard::ClipboardProvider;

/// Longest line the editor will hold, in bytes.
pub const LINE_MAX_BYTES: usize = 255;

/// Ctrl+V as delivered in a console key record.
const CTRL_V: char = '\u{16}';

/// Virtual-key code of the Insert key.
pub const VK_INSERT: u16 = 0x2D;

/// One console key record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub down: bool,
    pub ch: char,
    pub shift: bool,
    pub virtual_key: u16,
}

impl KeyEvent {
    /// A key-down carrying `ch`, no modifiers.
    pub fn char(ch: char) -> Self {
        Self {
            down: true,
            ch,
            shift: false,
            virtual_key: 0,
        }
    }

    fn is_paste(&self) -> bool {
        self.ch == CTRL_V || (self.shift && self.virtual_key == VK_INSERT)
    }
}

/// Key events for `line` followed by Enter.  Lets line-oriented sources
/// (a piped stdin, the Ctrl+C handler) feed the same editor.
pub fn events_for_line(line: &str) -> impl Iterator<Item = KeyEvent> + '_ {
    line.chars()
        .map(KeyEvent::char)
        .chain(std::iter::once(KeyEvent::char('\r')))
}

/// Line-editing state that survives between polls.
#[derive(Debug, Default)]
pub struct LineEditor {
    text: String,
    pending: VecDeque<KeyEvent>,
}

impl LineEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// The partially typed line.
    pub fn current(&self) -> &str {
        &self.text
    }

    /// Queue `events` and process them until a line completes.
    ///
    /// Returns the first completed non-empty line.  Events after it stay
    /// queued for the next call.
    pub fn poll(
        &mut self,
        events: impl IntoIterator<Item = KeyEvent>,
        clipboard: &mut dyn ClipboardProvider,
        echo: &mut dyn Write,
    ) -> Result<Option<String>> {
        self.pending.extend(events);

        while let Some(ev) = self.pending.pop_front() {
            if !ev.down {
                continue;
            }
            if let Some(line) = self.key(ev, clipboard, echo)? {
                echo.flush()?;
                return Ok(Some(line));
            }
        }

        echo.flush()?;
        Ok(None)
    }

    fn key(
        &mut self,
        ev: KeyEvent,
        clipboard: &mut dyn ClipboardProvider,
        echo: &mut dyn Write,
    ) -> Result<Option<String>> {
        match ev.ch {
            '\r' | '\n' => {
                echo.write_all(b"\r\n")?;
                if !self.text.is_empty() {
                    return Ok(Some(std::mem::take(&mut self.text)));
                }
            }

            '\u{8}' => {
                echo.write_all(b"\x08 \x08")?;
                self.text.pop();
            }

            _ if ev.is_paste() => {
                if let Some(pasted) = clipboard.get_text() {
                    let room = LINE_MAX_BYTES - self.text.len();
                    let fitted = truncate_to(&pasted, room);
                    if !fitted.is_empty() {
                        echo.write_all(fitted.as_bytes())?;
                        self.text.push_str(fitted);
                    }
                }
            }

            c if c >= ' ' => {
                if self.text.len() + c.len_utf8() <= LINE_MAX_BYTES {
                    let mut buf = [0u8; 4];
                    echo.write_all(c.encode_utf8(&mut buf).as_bytes())?;
                    self.text.push(c);
                }
            }

            _ => {}
        }
        Ok(None)
    }
}

/// Longest prefix of `s` that fits in `max` bytes without splitting a char.
fn truncate_to(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sys::clipboard::LocalClipboard;

    fn typed(s: &str) -> Vec<KeyEvent> {
        s.chars().map(KeyEvent::char).collect()
    }

    fn run(editor: &mut LineEditor, clip: &mut LocalClipboard, events: Vec<KeyEvent>) -> (Option<String>, String) {
        let mut echo = Vec::new();
        let line = editor.poll(events, clip, &mut echo).expect("poll");
        (line, String::from_utf8(echo).expect("utf8 echo"))
    }

    #[test]
    fn enter_completes_line_and_echoes_crlf() {
        let mut ed = LineEditor::new();
        let mut clip = LocalClipboard::default();
        let (line, echo) = run(&mut ed, &mut clip, events_for_line("status").collect());
        assert_eq!(line.as_deref(), Some("status"));
        assert_eq!(echo, "status\r\n");
        assert_eq!(ed.current(), "");
    }

    #[test]
    fn enter_on_empty_line_returns_nothing() {
        let mut ed = LineEditor::new();
        let mut clip = LocalClipboard::default();
        let (line, echo) = run(&mut ed, &mut clip, typed("\r"));
        assert_eq!(line, None);
        assert_eq!(echo, "\r\n");
    }

    #[test]
    fn partial_line_survives_between_polls() {
        let mut ed = LineEditor::new();
        let mut clip = LocalClipboard::default();
        assert_eq!(run(&mut ed, &mut clip, typed("ma")).0, None);
        assert_eq!(ed.current(), "ma");
        assert_eq!(run(&mut ed, &mut clip, typed("p\r")).0.as_deref(), Some("map"));
    }

    #[test]
    fn backspace_erases() {
        let mut ed = LineEditor::new();
        let mut clip = LocalClipboard::default();
        let (_, echo) = run(&mut ed, &mut clip, typed("ab\u{8}"));
        assert_eq!(ed.current(), "a");
        assert_eq!(echo, "ab\x08 \x08");

        // Backspace on an empty line still echoes but changes nothing.
        let mut ed = LineEditor::new();
        run(&mut ed, &mut clip, typed("\u{8}"));
        assert_eq!(ed.current(), "");
    }

    #[test]
    fn key_up_and_control_chars_are_ignored() {
        let mut ed = LineEditor::new();
        let mut clip = LocalClipboard::default();
        let mut up = KeyEvent::char('x');
        up.down = false;
        let (_, echo) = run(&mut ed, &mut clip, vec![up, KeyEvent::char('\u{1}')]);
        assert_eq!(ed.current(), "");
        assert_eq!(echo, "");
    }

    #[test]
    fn ctrl_v_and_shift_insert_paste() {
        let mut ed = LineEditor::new();
        let mut clip = LocalClipboard::default();
        clip.set_text("connect qw.example.net\nignored").expect("set");

        let mut events = typed("/");
        events.push(KeyEvent::char(CTRL_V));
        let (_, echo) = run(&mut ed, &mut clip, events);
        assert_eq!(ed.current(), "/connect qw.example.net");
        assert_eq!(echo, "/connect qw.example.net");

        let shift_insert = KeyEvent {
            down: true,
            ch: '\0',
            shift: true,
            virtual_key: VK_INSERT,
        };
        let mut ed = LineEditor::new();
        run(&mut ed, &mut clip, vec![shift_insert]);
        assert_eq!(ed.current(), "connect qw.example.net");
    }

    #[test]
    fn paste_is_truncated_to_line_capacity() {
        let mut ed = LineEditor::new();
        let mut clip = LocalClipboard::default();
        clip.set_text(&"y".repeat(200)).expect("set");

        let mut events = typed(&"x".repeat(100));
        events.push(KeyEvent::char(CTRL_V));
        run(&mut ed, &mut clip, events);
        assert_eq!(ed.current().len(), LINE_MAX_BYTES);
        assert!(ed.current().ends_with('y'));
    }

    #[test]
    fn typing_past_capacity_drops_characters() {
        let mut ed = LineEditor::new();
        let mut clip = LocalClipboard::default();
        run(&mut ed, &mut clip, typed(&"z".repeat(300)));
        assert_eq!(ed.current().len(), LINE_MAX_BYTES);
        let (line, _) = run(&mut ed, &mut clip, typed("\r"));
        assert_eq!(line.map(|l| l.len()), Some(LINE_MAX_BYTES));
    }

    #[test]
    fn events_after_a_completed_line_stay_queued() {
        let mut ed = LineEditor::new();
        let mut clip = LocalClipboard::default();
        let (first, _) = run(&mut ed, &mut clip, typed("one\rtwo\r"));
        assert_eq!(first.as_deref(), Some("one"));
        let (second, _) = run(&mut ed, &mut clip, Vec::new());
        assert_eq!(second.as_deref(), Some("two"));
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate_to("aż", 2), "a");
        assert_eq!(truncate_to("abc", 10), "abc");
    }
}
