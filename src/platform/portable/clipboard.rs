// ── Clipboard (portable) ──────────────────────────────────────────────────────
//
// There is no system clipboard reachable from plain std on Unix, so copy and
// paste stay inside the process.

pub(crate) use crate::sys::clipboard::LocalClipboard as SystemClipboard;
