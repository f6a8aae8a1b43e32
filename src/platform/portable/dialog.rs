// ── Fatal error output (portable) ─────────────────────────────────────────────

/// Print `message` to stderr; a console process has nowhere better to put it.
pub(crate) fn show_error_dialog(message: &str) {
    eprintln!("qwcl: fatal error: {message}");
}
