// ── Console (portable) ────────────────────────────────────────────────────────
//
// stdin is read line-by-line on a helper thread; the terminal already echoes
// what the user types, so the editor's echo goes to a sink.  On a dedicated
// server end of input is turned into a `quit` command so a closed pipe shuts
// it down; a client just stops reading.

use std::io::{self, BufRead, Write};

use crossbeam_channel::{Receiver, Sender, TryRecvError};

use crate::error::Result;
use crate::sys::console::{events_for_line, KeyEvent};

/// Send every line of `input` to `tx`.  At end of input a dedicated server
/// also gets `quit`.
fn forward_lines(input: impl BufRead, tx: &Sender<String>, dedicated: bool) {
    for line in input.lines() {
        let Ok(line) = line else { return };
        if tx.send(line).is_err() {
            return;
        }
    }
    log::info!("stdin closed");
    if dedicated {
        let _ = tx.send("quit".to_owned());
    }
}

pub(crate) struct Console {
    lines: Receiver<String>,
    sink: io::Sink,
    stdout: io::Stdout,
}

impl Console {
    /// Start the stdin reader.
    pub(crate) fn open(dedicated: bool) -> Result<Self> {
        let (tx, rx) = crossbeam_channel::unbounded();
        crate::sys::spawn_thread("stdin", move || {
            forward_lines(io::stdin().lock(), &tx, dedicated);
        })?;

        Ok(Self {
            lines: rx,
            sink: io::sink(),
            stdout: io::stdout(),
        })
    }

    /// Key events for every line received since the last call.  Never blocks.
    pub(crate) fn read_events(&mut self) -> Result<Vec<KeyEvent>> {
        let mut out = Vec::new();
        loop {
            match self.lines.try_recv() {
                Ok(line) => out.extend(events_for_line(&line)),
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }
        Ok(out)
    }

    /// Where the line editor writes its echo.
    pub(crate) fn echo(&mut self) -> &mut dyn Write {
        &mut self.sink
    }

    /// Console output for `Sys_Printf`-style messages.
    pub(crate) fn print(&mut self, text: &str) -> Result<()> {
        let mut out = self.stdout.lock();
        out.write_all(text.as_bytes())?;
        out.flush()?;
        Ok(())
    }

    pub(crate) fn set_title(&mut self, _title: &str) {}
}

/// Ctrl+C keeps its default meaning on Unix; closing stdin sends `quit`.
pub(crate) fn install_ctrl_handler(_commands: Sender<String>) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedicated_server_quits_at_end_of_input() {
        let (tx, rx) = crossbeam_channel::unbounded();
        forward_lines(io::Cursor::new("status\nmap dm2\n"), &tx, true);
        let got: Vec<String> = rx.try_iter().collect();
        assert_eq!(got, ["status", "map dm2", "quit"]);
    }

    #[test]
    fn client_ignores_closed_stdin() {
        let (tx, rx) = crossbeam_channel::unbounded();
        forward_lines(io::Cursor::new(""), &tx, false);
        assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));

        forward_lines(io::Cursor::new("echo hi\n"), &tx, false);
        let got: Vec<String> = rx.try_iter().collect();
        assert_eq!(got, ["echo hi"]);
    }
}
