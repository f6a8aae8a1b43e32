// ── File system helpers ───────────────────────────────────────────────────────
//
// Portable: everything here goes through `std::fs`, which maps onto
// FindFirstFile/FindNextFile on Windows and readdir elsewhere.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use glob::{MatchOptions, Pattern};

use crate::error::Result;

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: false,
    require_literal_separator: true,
    require_literal_leading_dot: true,
};

// ── Wildcard enumeration ──────────────────────────────────────────────────────

/// Report every entry under `gpath` that matches `pattern`.
///
/// `pattern` is relative to `gpath` and may contain directory components;
/// only its last component is a wildcard (`*`, `?`, case-insensitive).  Each
/// match is passed to `f` as `(name, size)` where `name` keeps the directory
/// part of `pattern` and directories get a trailing `/`.  Names starting with
/// `.` are never reported.
///
/// `f` returns `false` to stop early.  The result is `true` when the
/// enumeration ran to completion, including when the directory is missing.
pub fn enumerate_files<F>(gpath: &Path, pattern: &str, mut f: F) -> Result<bool>
where
    F: FnMut(&str, u64) -> bool,
{
    let (dir_part, file_part) = match pattern.rfind('/') {
        Some(i) => (&pattern[..i], &pattern[i + 1..]),
        None => ("", pattern),
    };
    let prefix = if dir_part.is_empty() {
        String::new()
    } else {
        format!("{dir_part}/")
    };

    let search_dir = gpath.join(dir_part);
    let entries = match fs::read_dir(&search_dir) {
        Ok(rd) => rd,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(true),
        Err(e) => return Err(e.into()),
    };

    let matcher = wildcard(file_part)?;
    let matches = |name: &str| matcher.matches_with(name, MATCH_OPTIONS);

    let mut found: Vec<(String, bool, u64)> = Vec::new();
    for entry in entries {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') || !matches(&name) {
            continue;
        }
        let meta = entry.metadata()?;
        found.push((name, meta.is_dir(), meta.len()));
    }
    found.sort_by(|a, b| a.0.cmp(&b.0));

    for (name, is_dir, size) in found {
        let reported = if is_dir {
            format!("{prefix}{name}/")
        } else {
            format!("{prefix}{name}")
        };
        if !f(&reported, if is_dir { 0 } else { size }) {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Compile a `*`/`?` wildcard.  Every other character, brackets included,
/// matches itself; runs of `*` count as one.
fn wildcard(pattern: &str) -> Result<Pattern> {
    let mut escaped = String::with_capacity(pattern.len());
    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '*' => {
                while chars.peek() == Some(&'*') {
                    chars.next();
                }
                escaped.push('*');
            }
            '?' => escaped.push('?'),
            _ => {
                let mut buf = [0u8; 4];
                escaped.push_str(&Pattern::escape(c.encode_utf8(&mut buf)));
            }
        }
    }
    Pattern::new(&escaped)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, format!("{pattern}: {e}")).into())
}

// ── Directory listing ─────────────────────────────────────────────────────────

/// One entry of a directory listing.
#[derive(Debug, Clone)]
pub struct SysDirent {
    pub name: String,
    /// Size in bytes; files over 4 GiB report `u32::MAX`.
    pub size: u32,
    pub modified: Option<DateTime<Local>>,
    pub directory: bool,
    pub hidden: bool,
}

impl SysDirent {
    fn from_entry(entry: &fs::DirEntry) -> io::Result<Self> {
        let name = entry.file_name().to_string_lossy().into_owned();
        let meta = entry.metadata()?;
        Ok(Self {
            hidden: is_hidden(&name, &meta),
            size: u32::try_from(meta.len()).unwrap_or(u32::MAX),
            modified: meta.modified().ok().map(DateTime::<Local>::from),
            directory: meta.is_dir(),
            name,
        })
    }
}

#[cfg(windows)]
fn is_hidden(_name: &str, meta: &fs::Metadata) -> bool {
    use std::os::windows::fs::MetadataExt;
    const FILE_ATTRIBUTE_HIDDEN: u32 = 0x2;
    const FILE_ATTRIBUTE_SYSTEM: u32 = 0x4;
    meta.file_attributes() & (FILE_ATTRIBUTE_HIDDEN | FILE_ATTRIBUTE_SYSTEM) != 0
}

#[cfg(not(windows))]
fn is_hidden(name: &str, _meta: &fs::Metadata) -> bool {
    name.starts_with('.')
}

/// Iterate the entries of `path`.  Entries whose metadata cannot be read are
/// skipped with a warning.
pub fn read_dir(path: &Path) -> Result<impl Iterator<Item = SysDirent>> {
    let rd = fs::read_dir(path)?;
    Ok(rd.filter_map(|entry| {
        let entry = entry.ok()?;
        match SysDirent::from_entry(&entry) {
            Ok(d) => Some(d),
            Err(e) => {
                log::warn!("skipping {}: {e}", entry.path().display());
                None
            }
        }
    }))
}

// ── Path wrappers ─────────────────────────────────────────────────────────────

/// Create `path` and any missing parents.  Existing directories are fine.
pub fn mkdir(path: &Path) -> Result<()> {
    fs::create_dir_all(path)?;
    Ok(())
}

pub fn remove(path: &Path) -> Result<()> {
    fs::remove_file(path)?;
    Ok(())
}

pub fn chdir(path: &Path) -> Result<()> {
    std::env::set_current_dir(path)?;
    Ok(())
}

pub fn getcwd() -> Result<PathBuf> {
    Ok(std::env::current_dir()?)
}

/// Absolute form of `path`, without touching the file system.
pub fn full_path(path: &Path) -> Result<PathBuf> {
    Ok(std::path::absolute(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> tempfile::TempDir {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path();
        fs::create_dir_all(root.join("qw/skins")).expect("mkdir");
        fs::create_dir_all(root.join("qw/demos")).expect("mkdir");
        fs::write(root.join("qw/config.cfg"), b"name player\n").expect("write");
        fs::write(root.join("qw/AUTOEXEC.CFG"), b"").expect("write");
        fs::write(root.join("qw/.hidden.cfg"), b"").expect("write");
        fs::write(root.join("qw/skins/base.pcx"), [0u8; 64]).expect("write");
        fs::write(root.join("qw/skins/blue.pcx"), [0u8; 32]).expect("write");
        fs::write(root.join("qw/skins/notes.txt"), b"").expect("write");
        dir
    }

    fn collect(gpath: &Path, pattern: &str) -> Vec<(String, u64)> {
        let mut out = Vec::new();
        let done = enumerate_files(gpath, pattern, |name, size| {
            out.push((name.to_owned(), size));
            true
        })
        .expect("enumerate");
        assert!(done);
        out
    }

    #[test]
    fn wildcard_matches_case_insensitively_and_skips_dotfiles() {
        let dir = fixture();
        let names: Vec<String> = collect(&dir.path().join("qw"), "*.cfg")
            .into_iter()
            .map(|(n, _)| n)
            .collect();
        assert_eq!(names, ["AUTOEXEC.CFG", "config.cfg"]);
    }

    #[test]
    fn directory_part_of_pattern_is_kept_in_names() {
        let dir = fixture();
        let found = collect(dir.path(), "qw/skins/*.pcx");
        assert_eq!(
            found,
            [
                ("qw/skins/base.pcx".to_owned(), 64),
                ("qw/skins/blue.pcx".to_owned(), 32)
            ]
        );
    }

    #[test]
    fn directories_get_trailing_slash() {
        let dir = fixture();
        let names: Vec<String> = collect(dir.path(), "qw/*s")
            .into_iter()
            .map(|(n, _)| n)
            .collect();
        assert_eq!(names, ["qw/demos/", "qw/skins/"]);
    }

    #[test]
    fn question_mark_matches_one_char() {
        let dir = fixture();
        let found = collect(dir.path(), "qw/skins/b???.pcx");
        assert_eq!(found.len(), 2);
        assert!(collect(dir.path(), "qw/skins/b?.pcx").is_empty());
    }

    #[test]
    fn brackets_are_literal_and_stars_collapse() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join("[sr]vs[tvr].mvd"), b"").expect("write");
        fs::write(dir.path().join("svs.mvd"), b"").expect("write");

        let names = |pattern: &str| -> Vec<String> {
            collect(dir.path(), pattern).into_iter().map(|(n, _)| n).collect()
        };
        assert_eq!(names("[sr]*.mvd"), ["[sr]vs[tvr].mvd"]);
        assert_eq!(names("[sr*"), ["[sr]vs[tvr].mvd"]);
        assert_eq!(names("*]"), Vec::<String>::new());
        assert_eq!(names("**.mvd"), ["[sr]vs[tvr].mvd", "svs.mvd"]);
        assert_eq!(names("s?s.MVD"), ["svs.mvd"]);
    }

    #[test]
    fn callback_can_stop_enumeration() {
        let dir = fixture();
        let mut calls = 0;
        let done = enumerate_files(dir.path(), "qw/skins/*", |_, _| {
            calls += 1;
            false
        })
        .expect("enumerate");
        assert!(!done);
        assert_eq!(calls, 1);
    }

    #[test]
    fn missing_directory_is_not_an_error() {
        let dir = fixture();
        let mut calls = 0;
        let done = enumerate_files(dir.path(), "nope/*.bsp", |_, _| {
            calls += 1;
            true
        })
        .expect("enumerate");
        assert!(done);
        assert_eq!(calls, 0);
    }

    #[test]
    fn read_dir_reports_kind_and_size() {
        let dir = fixture();
        let mut entries: Vec<SysDirent> = read_dir(&dir.path().join("qw/skins")).expect("read_dir").collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name));

        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].name, "base.pcx");
        assert_eq!(entries[0].size, 64);
        assert!(!entries[0].directory);
        assert!(entries[0].modified.is_some());

        let qw: Vec<SysDirent> = read_dir(&dir.path().join("qw")).expect("read_dir").collect();
        assert!(qw.iter().any(|d| d.name == "skins" && d.directory));
    }

    #[cfg(not(windows))]
    #[test]
    fn dotfiles_are_hidden() {
        let dir = fixture();
        let qw: Vec<SysDirent> = read_dir(&dir.path().join("qw")).expect("read_dir").collect();
        let hidden: Vec<&str> = qw.iter().filter(|d| d.hidden).map(|d| d.name.as_str()).collect();
        assert_eq!(hidden, [".hidden.cfg"]);
    }

    #[test]
    fn mkdir_remove_and_full_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let nested = dir.path().join("a/b/c");
        mkdir(&nested).expect("mkdir");
        mkdir(&nested).expect("mkdir twice");
        assert!(nested.is_dir());

        let file = nested.join("x.dem");
        fs::write(&file, b"").expect("write");
        remove(&file).expect("remove");
        assert!(!file.exists());
        assert!(remove(&file).is_err());

        assert!(full_path(Path::new("id1/pak0.pak")).expect("full").is_absolute());
    }
}
