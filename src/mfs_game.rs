// Game session and configuration management
// Wraps the mine field with timer and phase tracking, and persists preferences and records

use chrono::Local;
use directories::ProjectDirs;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use crate::mfs_field::{FieldError, FlagOutcome, MineField, RevealOutcome};

/// Difficulty presets and custom settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Difficulty {
    Easy,                        // 9x9, 10 mines
    Medium,                      // 16x16, 40 mines
    Hard,                        // 16 rows x 30 cols, 99 mines
    Custom(usize, usize, usize), // rows, cols, mines
}

impl Serialize for Difficulty {
    /// Serialize difficulty as its name, custom dimensions live in separate fields
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Difficulty {
    fn deserialize<D>(deserializer: D) -> Result<Difficulty, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Difficulty::from_name(&s).ok_or_else(|| serde::de::Error::custom("unknown difficulty"))
    }
}

impl Difficulty {
    /// Game dimensions (rows, cols, mine count)
    pub fn params(&self) -> (usize, usize, usize) {
        match self {
            Difficulty::Easy => (9, 9, 10),
            Difficulty::Medium => (16, 16, 40),
            Difficulty::Hard => (16, 30, 99),
            Difficulty::Custom(r, c, n) => (*r, *c, *n),
        }
    }

    /// Stable identifier used in the config file
    pub fn name(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
            Difficulty::Custom(_, _, _) => "Custom",
        }
    }

    /// Parse a difficulty name, case-insensitive
    /// Custom comes back empty and is filled from the config's custom fields
    pub fn from_name(s: &str) -> Option<Difficulty> {
        match s.to_ascii_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "medium" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            "custom" => Some(Difficulty::Custom(0, 0, 0)),
            _ => None,
        }
    }

    /// Next preset in the Easy -> Medium -> Hard cycle
    pub fn next_preset(&self) -> Difficulty {
        match self {
            Difficulty::Easy => Difficulty::Medium,
            Difficulty::Medium => Difficulty::Hard,
            _ => Difficulty::Easy,
        }
    }
}

/// Record entry for best completion time
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub secs: u64,    // Completion time in seconds
    pub date: String, // YYYY-MM-DD
}

/// User configuration and best times, persisted as TOML
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub difficulty: Difficulty,

    pub best_easy: Option<Record>,
    pub best_medium: Option<Record>,
    pub best_hard: Option<Record>,

    pub custom_rows: usize,
    pub custom_cols: usize,
    pub custom_mines: usize,

    pub ascii_icons: bool, // ASCII glyphs in the terminal UI
}

impl Default for Config {
    fn default() -> Self {
        Config {
            difficulty: Difficulty::Easy,
            best_easy: None,
            best_medium: None,
            best_hard: None,
            custom_rows: 20,
            custom_cols: 36,
            custom_mines: 150,
            ascii_icons: false,
        }
    }
}

impl Config {
    /// Best time for a difficulty, None for Custom
    pub fn get_record(&self, d: &Difficulty) -> Option<&Record> {
        match d {
            Difficulty::Easy => self.best_easy.as_ref(),
            Difficulty::Medium => self.best_medium.as_ref(),
            Difficulty::Hard => self.best_hard.as_ref(),
            Difficulty::Custom(_, _, _) => None,
        }
    }

    /// Store `secs` if it beats the current best, returns true on a new record
    /// Custom games are never recorded
    pub fn set_record(&mut self, d: &Difficulty, secs: u64) -> bool {
        let slot = match d {
            Difficulty::Easy => &mut self.best_easy,
            Difficulty::Medium => &mut self.best_medium,
            Difficulty::Hard => &mut self.best_hard,
            Difficulty::Custom(_, _, _) => return false,
        };
        if slot.as_ref().is_some_and(|r| r.secs <= secs) {
            return false;
        }
        let date = Local::now().format("%Y-%m-%d").to_string();
        *slot = Some(Record { secs, date });
        true
    }

    /// Restore Custom dimensions after deserializing, falling back to Easy
    /// when the saved values cannot form a field
    fn normalize(&mut self) {
        if matches!(self.difficulty, Difficulty::Custom(_, _, _)) {
            let d = Difficulty::Custom(self.custom_rows, self.custom_cols, self.custom_mines);
            let (r, c, n) = d.params();
            self.difficulty = if r > 0 && c > 0 && n < r.saturating_mul(c) {
                d
            } else {
                warn!(r, c, n, "saved custom difficulty is invalid, using Easy");
                Difficulty::Easy
            };
        }
    }
}

/// Platform project directories, None on systems without a home directory
pub fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "mfswpr", "mfswpr")
}

/// Get the configuration file path
/// Uses the platform config directory (e.g. ~/.config/mfswpr/mfswpr.toml on Linux)
/// Falls back to the current directory
pub fn config_path() -> Option<PathBuf> {
    match project_dirs() {
        Some(proj) => Some(proj.config_dir().join("mfswpr.toml")),
        None => env::current_dir().ok().map(|p| p.join("mfswpr.toml")),
    }
}

/// Parse config text, None when it is not valid TOML for Config
pub fn parse_config(s: &str) -> Option<Config> {
    match toml::from_str::<Config>(s) {
        Ok(mut cfg) => {
            cfg.normalize();
            Some(cfg)
        }
        Err(e) => {
            warn!("config parse failed: {}", e);
            None
        }
    }
}

/// Load configuration from disk, or create default if not found
pub fn load_or_create_config() -> Config {
    let Some(path) = config_path() else {
        return Config::default();
    };
    if path.exists() {
        match fs::read_to_string(&path) {
            Ok(s) => {
                if let Some(cfg) = parse_config(&s) {
                    return cfg;
                }
            }
            Err(e) => warn!("cannot read {}: {}", path.display(), e),
        }
    }
    let cfg = Config::default();
    save_config(&cfg);
    cfg
}

/// Save configuration to disk as TOML
pub fn save_config(cfg: &Config) {
    let Some(path) = config_path() else {
        return;
    };
    let s = match toml::to_string(cfg) {
        Ok(s) => s,
        Err(e) => {
            warn!("config serialize failed: {}", e);
            return;
        }
    };
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    match fs::write(&path, s) {
        Ok(()) => info!("config saved to {}", path.display()),
        Err(e) => warn!("cannot write {}: {}", path.display(), e),
    }
}

/// Where a session stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Ready,                            // No move made yet
    Playing,                          // Timer running
    Won,
    Lost { row: usize, col: usize }, // Exploded mine
}

/// One game: the mine field plus the state the front-ends share
#[derive(Debug, Clone)]
pub struct Session {
    pub difficulty: Difficulty,
    pub field: MineField,
    pub cursor: (usize, usize), // (row, col)
    phase: Phase,
    start_time: Option<Instant>,
    elapsed: Duration,
}

impl Session {
    /// Start a new session, seeded placement when `seed` is given
    pub fn new(difficulty: Difficulty, seed: Option<u64>) -> Result<Self, FieldError> {
        let (rows, cols, mines) = difficulty.params();
        let field = match seed {
            Some(s) => MineField::with_rng(rows, cols, mines, &mut StdRng::seed_from_u64(s))?,
            None => MineField::new(rows, cols, mines)?,
        };
        info!(rows, cols, mines, difficulty = difficulty.name(), "new game");
        Ok(Self::from_field(difficulty, field))
    }

    /// Wrap an existing field, e.g. one built with fixed mine positions
    pub fn from_field(difficulty: Difficulty, field: MineField) -> Self {
        Session {
            difficulty,
            field,
            cursor: (0, 0),
            phase: Phase::Ready,
            start_time: None,
            elapsed: Duration::ZERO,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_over(&self) -> bool {
        matches!(self.phase, Phase::Won | Phase::Lost { .. })
    }

    /// Seconds on the clock, frozen once the game ends
    pub fn elapsed_secs(&self) -> u64 {
        match (self.phase, self.start_time) {
            (Phase::Playing, Some(t0)) => t0.elapsed().as_secs(),
            _ => self.elapsed.as_secs(),
        }
    }

    pub fn remaining_mines(&self) -> isize {
        self.field.remaining_mines()
    }

    fn start_clock(&mut self) {
        if self.phase == Phase::Ready {
            self.phase = Phase::Playing;
            self.start_time = Some(Instant::now());
        }
    }

    fn stop_clock(&mut self, phase: Phase) {
        if let Some(t0) = self.start_time {
            self.elapsed = t0.elapsed();
        }
        self.phase = phase;
    }

    /// Reveal a cell, ignored once the game is over
    pub fn reveal(&mut self, row: isize, col: isize) -> RevealOutcome {
        if self.is_over() {
            return RevealOutcome::NoOp;
        }
        let outcome = self.field.reveal(row, col);
        match outcome {
            RevealOutcome::NoOp => {}
            RevealOutcome::Detonated { row, col } => {
                self.start_clock();
                self.stop_clock(Phase::Lost { row, col });
                info!(row, col, secs = self.elapsed.as_secs(), "mine detonated");
            }
            RevealOutcome::Revealed { .. } => {
                self.start_clock();
                if self.field.is_won() {
                    self.stop_clock(Phase::Won);
                    info!(secs = self.elapsed.as_secs(), "game won");
                }
            }
        }
        outcome
    }

    /// Toggle a flag, ignored once the game is over
    pub fn toggle_flag(&mut self, row: isize, col: isize) -> FlagOutcome {
        if self.is_over() {
            return FlagOutcome::NoOp;
        }
        let outcome = self.field.toggle_flag(row, col);
        if outcome != FlagOutcome::NoOp {
            self.start_clock();
        }
        outcome
    }

    pub fn reveal_at_cursor(&mut self) -> RevealOutcome {
        let (r, c) = self.cursor;
        self.reveal(r as isize, c as isize)
    }

    pub fn flag_at_cursor(&mut self) -> FlagOutcome {
        let (r, c) = self.cursor;
        self.toggle_flag(r as isize, c as isize)
    }

    /// Move the cursor, clamped to the grid
    pub fn step_cursor(&mut self, dr: isize, dc: isize) {
        let max_r = (self.field.rows() - 1) as isize;
        let max_c = (self.field.cols() - 1) as isize;
        let nr = (self.cursor.0 as isize + dr).clamp(0, max_r) as usize;
        let nc = (self.cursor.1 as isize + dc).clamp(0, max_c) as usize;
        self.cursor = (nr, nc);
    }

    /// Record the time of a won game, returns true on a new best
    pub fn record_win(&self, cfg: &mut Config) -> bool {
        self.phase == Phase::Won && cfg.set_record(&self.difficulty, self.elapsed_secs())
    }
}
