/// Local profile: best score and registered nickname.
///
/// ## File format
///   Key-value lines in `profile.dat`:
///     best=120
///     nickname=fab
///   The nickname line is absent until the player registers one.
///
/// Stored next to the executable when that directory is writable
/// (portable installs), otherwise under ~/.local/share/simon.

use std::path::PathBuf;

const PROFILE_FILE: &str = "profile.dat";

/// The locally persisted player profile.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Profile {
    pub best: u32,
    pub nickname: Option<String>,
}

// ══════════════════════════════════════════════════════════════
// Paths
// ══════════════════════════════════════════════════════════════

pub fn data_dir() -> PathBuf {
    // 1. Try exe directory (works for local/portable installs)
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            // Check if writable (system installs like /usr/games/ won't be)
            let test_path = parent.join(".write_test_simon");
            if std::fs::write(&test_path, "").is_ok() {
                let _ = std::fs::remove_file(&test_path);
                return parent.to_path_buf();
            }
        }
    }

    // 2. XDG data home (~/.local/share/simon) for system installs
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/simon");
        if std::fs::create_dir_all(&xdg).is_ok() {
            return xdg;
        }
    }

    // 3. Fallback to CWD
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

fn profile_path() -> PathBuf {
    data_dir().join(PROFILE_FILE)
}

// ══════════════════════════════════════════════════════════════
// Load / save
// ══════════════════════════════════════════════════════════════

/// Read the profile from disk. Missing or unreadable file yields the
/// default profile (best 0, no nickname) — first run is not an error.
pub fn load_profile() -> Profile {
    let candidates = [profile_path(), PathBuf::from(PROFILE_FILE)];
    for path in &candidates {
        if let Ok(content) = std::fs::read_to_string(path) {
            return parse_profile(&content);
        }
    }
    Profile::default()
}

pub fn save_profile(profile: &Profile) -> Result<(), String> {
    let content = serialize_profile(profile);
    let path = profile_path();
    std::fs::write(&path, content).map_err(|e| format!("Profile save failed: {}", e))
}

// ══════════════════════════════════════════════════════════════
// Serialization
// ══════════════════════════════════════════════════════════════

fn serialize_profile(profile: &Profile) -> String {
    let mut out = String::with_capacity(64);
    out.push_str(&format!("best={}\n", profile.best));
    if let Some(nick) = &profile.nickname {
        out.push_str(&format!("nickname={}\n", nick));
    }
    out
}

fn parse_profile(content: &str) -> Profile {
    let mut profile = Profile::default();
    for line in content.lines() {
        let line = line.trim();
        if let Some(val) = line.strip_prefix("best=") {
            profile.best = val.trim().parse().unwrap_or(0);
        } else if let Some(val) = line.strip_prefix("nickname=") {
            let nick = val.trim();
            if !nick.is_empty() {
                profile.nickname = Some(nick.to_string());
            }
        }
    }
    profile
}
