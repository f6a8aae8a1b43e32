// ── Command line ──────────────────────────────────────────────────────────────
//
// Tokenises a raw command-line string the way the client always has, so
// launchers that build `+connect`/`+qwurl` lines keep working:
//   • argv[0] is the executable's bare file name;
//   • separators are any byte <= 32 or > 126;
//   • a token opening with `"` runs to the next `"` and may contain spaces.
//
// No OS calls; `from_env` is the only place that reads process state.

use std::path::Path;

/// Upper bound on argv entries, argv[0] included.
pub const MAX_NUM_ARGVS: usize = 50;

/// Parsed process arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    argv: Vec<String>,
}

impl CommandLine {
    /// Tokenise `raw`, with argv[0] taken from `exe_path`.
    pub fn parse(exe_path: &Path, raw: &str) -> Self {
        let exe_name = exe_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let mut argv = vec![exe_name];
        let bytes = raw.as_bytes();
        let mut i = 0;

        while i < bytes.len() && argv.len() < MAX_NUM_ARGVS {
            while i < bytes.len() && is_separator(bytes[i]) {
                i += 1;
            }
            if i >= bytes.len() {
                break;
            }

            let start;
            if bytes[i] == b'"' {
                i += 1;
                start = i;
                while i < bytes.len() && bytes[i] != b'"' {
                    i += 1;
                }
            } else {
                start = i;
                while i < bytes.len() && !is_separator(bytes[i]) {
                    i += 1;
                }
            }
            argv.push(String::from_utf8_lossy(&bytes[start..i]).into_owned());

            // Step over the terminator (closing quote or separator).
            if i < bytes.len() {
                i += 1;
            }
        }

        Self { argv }
    }

    /// Build from the running process.
    pub fn from_env() -> Self {
        let exe = std::env::current_exe().unwrap_or_default();
        Self::from_args(
            &exe,
            std::env::args_os()
                .skip(1)
                .map(|a| a.to_string_lossy().into_owned()),
        )
    }

    /// Build from already-split arguments.  They are re-joined and run
    /// through the same tokenizer so quoting rules match `parse`; any
    /// argument the tokenizer would split is quoted first.
    pub fn from_args(exe_path: &Path, args: impl IntoIterator<Item = String>) -> Self {
        let raw = args
            .into_iter()
            .map(|a| {
                if a.is_empty() || a.bytes().any(is_separator) {
                    format!("\"{a}\"")
                } else {
                    a
                }
            })
            .collect::<Vec<_>>()
            .join(" ");
        Self::parse(exe_path, &raw)
    }

    /// Argument `i`, or `""` past the end.
    pub fn arg(&self, i: usize) -> &str {
        self.argv.get(i).map(String::as_str).unwrap_or("")
    }

    pub fn args(&self) -> &[String] {
        &self.argv
    }

    /// Index of `parm` (ASCII case-insensitive), skipping argv[0].
    pub fn check_parm(&self, parm: &str) -> Option<usize> {
        self.argv
            .iter()
            .skip(1)
            .position(|a| a.eq_ignore_ascii_case(parm))
            .map(|p| p + 1)
    }

    pub fn has(&self, parm: &str) -> bool {
        self.check_parm(parm).is_some()
    }

    /// The argument following `parm`, if both exist.
    pub fn value_of(&self, parm: &str) -> Option<&str> {
        let i = self.check_parm(parm)?;
        self.argv.get(i + 1).map(String::as_str)
    }
}

fn is_separator(b: u8) -> bool {
    b <= 32 || b > 126
}
