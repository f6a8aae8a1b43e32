// ── System settings ───────────────────────────────────────────────────────────
//
// Reads and writes `<config dir>/qwcl/settings.json`.
// No `unsafe` — pure safe Rust + serde_json.

use std::{fs, io, path::PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::error::Result;

// ── Format version ────────────────────────────────────────────────────────────

const SETTINGS_VERSION: u32 = 1;

// ── On-disk type ──────────────────────────────────────────────────────────────

/// The `sys_*` variables, persisted between runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SysSettings {
    pub version: u32,
    /// `1` = high, `-1` = low (idle), anything else = normal.
    #[serde(default)]
    pub high_priority: i32,
    /// Give up the rest of the time slice every frame.
    #[serde(default)]
    pub yield_cpu: bool,
    /// Sleep while minimised, paused or unfocused.
    #[serde(default = "default_true")]
    pub inactive_sleep: bool,
    /// Swallow the Windows and Menu keys while the client has focus.
    #[serde(default)]
    pub disable_win_keys: bool,
}

fn default_true() -> bool {
    true
}

impl Default for SysSettings {
    fn default() -> Self {
        Self {
            version: SETTINGS_VERSION,
            high_priority: 0,
            yield_cpu: false,
            inactive_sleep: true,
            disable_win_keys: false,
        }
    }
}

// ── Priority ──────────────────────────────────────────────────────────────────

/// Process priority classes, numbered 0..=3 like the `Sys_SetPriority` levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    Idle,
    Normal,
    High,
    Realtime,
}

impl Priority {
    /// `0` idle, `1` normal, `2` high, `3` realtime; anything else is rejected.
    pub fn from_level(level: i32) -> Option<Self> {
        match level {
            0 => Some(Self::Idle),
            1 => Some(Self::Normal),
            2 => Some(Self::High),
            3 => Some(Self::Realtime),
            _ => None,
        }
    }

    /// Mapping used by the `high_priority` setting.
    pub fn from_high_priority(value: i32) -> Self {
        match value {
            1 => Self::High,
            -1 => Self::Idle,
            _ => Self::Normal,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "low",
            Self::Normal => "normal",
            Self::High => "high",
            Self::Realtime => "realtime",
        }
    }
}

// ── Path ──────────────────────────────────────────────────────────────────────

/// `%APPDATA%\qwcl\config\settings.json` on Windows, the XDG config
/// directory elsewhere.  `None` when no home directory can be determined.
pub fn settings_path() -> Option<PathBuf> {
    let dirs = ProjectDirs::from("", "", "qwcl")?;
    Some(dirs.config_dir().join("settings.json"))
}

// ── Load / save ───────────────────────────────────────────────────────────────

impl SysSettings {
    /// Parse settings from JSON text.  Unknown versions are rejected.
    pub fn from_json(text: &str) -> Result<Self> {
        let s: Self = serde_json::from_str(text)?;
        if s.version != SETTINGS_VERSION {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("unsupported settings version {}", s.version),
            )
            .into());
        }
        Ok(s)
    }

    /// Read the settings file.  Any failure — missing file, bad JSON, wrong
    /// version — falls back to defaults.
    pub fn load() -> Self {
        let Some(path) = settings_path() else {
            return Self::default();
        };
        match fs::read_to_string(&path) {
            Ok(text) => Self::from_json(&text).unwrap_or_else(|e| {
                log::warn!("ignoring {}: {e}", path.display());
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Write the settings file, creating its directory if needed.
    pub fn save(&self) -> Result<()> {
        let path = settings_path()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no config directory"))?;
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let file = fs::File::create(&path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let s = SysSettings::default();
        assert_eq!(s.high_priority, 0);
        assert!(s.inactive_sleep);
        assert!(!s.yield_cpu);
        assert!(!s.disable_win_keys);
    }

    #[test]
    fn roundtrip() {
        let s = SysSettings {
            high_priority: -1,
            disable_win_keys: true,
            ..SysSettings::default()
        };
        let json = serde_json::to_string(&s).expect("serialize");
        assert_eq!(SysSettings::from_json(&json).expect("parse"), s);
    }

    /// Files that only carry a version parse with every field defaulted;
    /// `inactive_sleep` must come back on.
    #[test]
    fn missing_fields_take_defaults() {
        let s = SysSettings::from_json(r#"{"version":1}"#).expect("parse");
        assert_eq!(s, SysSettings::default());
    }

    #[test]
    fn wrong_version_is_rejected() {
        assert!(SysSettings::from_json(r#"{"version":99}"#).is_err());
        assert!(SysSettings::from_json("not json").is_err());
    }

    #[test]
    fn priority_levels() {
        assert_eq!(Priority::from_level(0), Some(Priority::Idle));
        assert_eq!(Priority::from_level(3), Some(Priority::Realtime));
        assert_eq!(Priority::from_level(4), None);
        assert_eq!(Priority::from_level(-1), None);

        assert_eq!(Priority::from_high_priority(1), Priority::High);
        assert_eq!(Priority::from_high_priority(-1), Priority::Idle);
        assert_eq!(Priority::from_high_priority(7), Priority::Normal);
        assert_eq!(Priority::Idle.as_str(), "low");
    }
}
