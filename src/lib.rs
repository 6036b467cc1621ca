// Minesweeper board engine with console and terminal front-ends

pub mod mfs_args;    // Command-line options
pub mod mfs_console; // Line-based text front-end
pub mod mfs_field;   // Board-logic engine
pub mod mfs_game;    // Session, difficulty presets and configuration
pub mod mfs_log;     // Tracing subscriber setup
pub mod mfs_ui;      // Full-screen terminal front-end

pub use mfs_field::{Cell, FieldError, FlagOutcome, MineField, RevealOutcome};
