/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.

use serde::Deserialize;
use std::path::PathBuf;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub timing: TimingConfig,
    pub points_per_level: u32,
    pub server: ServerConfig,
}

/// Every gameplay duration, in ticks of `tick_rate_ms`.
/// Defaults reproduce the classic pacing at a 25 ms tick:
/// 500 ms lead-in, 400 ms gap and reveal, 200 ms feedback,
/// 1000 ms settle, 500 ms game-over strike.
#[derive(Clone, Debug)]
pub struct TimingConfig {
    pub tick_rate_ms: u64,
    pub lead_in_ticks: u32,
    pub gap_ticks: u32,
    pub reveal_ticks: u32,
    pub feedback_ticks: u32,
    pub settle_ticks: u32,
    pub strike_ticks: u32,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Leaderboard base URL. Empty = play offline.
    pub url: String,
    pub timeout_ms: u64,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    timing: TomlTiming,
    #[serde(default)]
    scoring: TomlScoring,
    #[serde(default)]
    server: TomlServer,
}

#[derive(Deserialize, Debug)]
struct TomlTiming {
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
    #[serde(default = "default_lead_in")]
    lead_in_ticks: u32,
    #[serde(default = "default_gap")]
    gap_ticks: u32,
    #[serde(default = "default_reveal")]
    reveal_ticks: u32,
    #[serde(default = "default_feedback")]
    feedback_ticks: u32,
    #[serde(default = "default_settle")]
    settle_ticks: u32,
    #[serde(default = "default_strike")]
    strike_ticks: u32,
}

#[derive(Deserialize, Debug)]
struct TomlScoring {
    #[serde(default = "default_points_per_level")]
    points_per_level: u32,
}

#[derive(Deserialize, Debug)]
struct TomlServer {
    #[serde(default)]
    url: String,
    #[serde(default = "default_timeout")]
    timeout_ms: u64,
}

// ── Defaults ──

fn default_tick_rate() -> u64 { 25 }
fn default_lead_in() -> u32 { 20 }   // 500ms
fn default_gap() -> u32 { 16 }       // 400ms
fn default_reveal() -> u32 { 16 }    // 400ms
fn default_feedback() -> u32 { 8 }   // 200ms
fn default_settle() -> u32 { 40 }    // 1000ms
fn default_strike() -> u32 { 20 }    // 500ms

fn default_points_per_level() -> u32 { 10 }
fn default_timeout() -> u64 { 3000 }

impl Default for TomlTiming {
    fn default() -> Self {
        TomlTiming {
            tick_rate_ms: default_tick_rate(),
            lead_in_ticks: default_lead_in(),
            gap_ticks: default_gap(),
            reveal_ticks: default_reveal(),
            feedback_ticks: default_feedback(),
            settle_ticks: default_settle(),
            strike_ticks: default_strike(),
        }
    }
}

impl Default for TomlScoring {
    fn default() -> Self {
        TomlScoring {
            points_per_level: default_points_per_level(),
        }
    }
}

impl Default for TomlServer {
    fn default() -> Self {
        TomlServer {
            url: String::new(),
            timeout_ms: default_timeout(),
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let toml_cfg = load_toml(&candidate_dirs());

        GameConfig {
            timing: TimingConfig {
                tick_rate_ms: toml_cfg.timing.tick_rate_ms.max(1),
                lead_in_ticks: toml_cfg.timing.lead_in_ticks,
                gap_ticks: toml_cfg.timing.gap_ticks,
                reveal_ticks: toml_cfg.timing.reveal_ticks.max(1),
                feedback_ticks: toml_cfg.timing.feedback_ticks.max(1),
                settle_ticks: toml_cfg.timing.settle_ticks,
                strike_ticks: toml_cfg.timing.strike_ticks,
            },
            points_per_level: toml_cfg.scoring.points_per_level,
            server: ServerConfig {
                url: toml_cfg.server.url,
                timeout_ms: toml_cfg.server.timeout_ms,
            },
        }
    }
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        // Resolve symlinks so a /usr/bin shim still finds data
        // relative to the real binary.
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    // 3. Fallback
    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                    Ok(cfg) => return cfg,
                    Err(e) => {
                        eprintln!("Warning: config.toml parse error: {e}");
                        eprintln!("Using default settings.");
                        return TomlConfig::default();
                    }
                },
                Err(e) => {
                    eprintln!("Warning: could not read {}: {e}", path.display());
                }
            }
        }
    }
    TomlConfig::default()
}
