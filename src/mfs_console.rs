// Text-mode front-end
// Reads "r row col" / "f row col" commands and prints a bordered ASCII grid after each move

use std::io::{self, BufRead, Write};
use thiserror::Error;
use tracing::debug;

use crate::mfs_field::MineField;
use crate::mfs_game::{Phase, Session};

pub const PROMPT: &str = "Enter command (r row col | f row col): ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Reveal(isize, isize),
    Flag(isize, isize),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("Unknown command.")]
    Unknown,
    #[error("Invalid input.")]
    Invalid,
}

/// Parse one input line
pub fn parse_command(line: &str) -> Result<Command, CommandError> {
    let mut parts = line.split_whitespace();
    let action = parts.next().ok_or(CommandError::Invalid)?;
    let mut coord = || -> Result<isize, CommandError> {
        parts
            .next()
            .and_then(|s| s.parse().ok())
            .ok_or(CommandError::Invalid)
    };
    let cmd = match action.to_ascii_lowercase().as_str() {
        "r" => Command::Reveal(coord()?, coord()?),
        "f" => Command::Flag(coord()?, coord()?),
        _ => return Err(CommandError::Unknown),
    };
    if parts.next().is_some() {
        return Err(CommandError::Invalid);
    }
    Ok(cmd)
}

/// Column index rows, one digit per two-character cell
/// Wide boards get a tens row above the units row
fn column_header(cols: usize) -> String {
    let mut out = String::new();
    if cols > 10 {
        out.push_str("   ");
        for c in 0..cols {
            match c {
                c if c % 10 == 0 && c > 0 => out.push_str(&format!("{} ", (c / 10) % 10)),
                _ => out.push_str("  "),
            }
        }
        out.push('\n');
    }
    out.push_str("   ");
    for c in 0..cols {
        out.push_str(&format!("{} ", c % 10));
    }
    out.push('\n');
    out
}

/// Bordered grid as printed by the console loop
/// With `show_mines`, hidden unflagged mines are drawn as '*'
pub fn render_grid(field: &MineField, show_mines: bool) -> String {
    let cols = field.cols();
    let border = format!("  +{}+\n", "-".repeat(cols * 2));
    let mut out = column_header(cols);
    out.push_str(&border);
    for r in 0..field.rows() {
        out.push_str(&format!("{:2}|", r));
        for c in 0..cols {
            let Some(cell) = field.cell(r as isize, c as isize) else {
                continue;
            };
            let s = if cell.is_flagged {
                "F".to_string()
            } else if cell.is_mine && (cell.is_revealed || show_mines) {
                "*".to_string()
            } else if !cell.is_revealed {
                "#".to_string()
            } else if cell.adjacent_mines == 0 {
                " ".to_string()
            } else {
                cell.adjacent_mines.to_string()
            };
            out.push_str(&s);
            out.push(' ');
        }
        out.push_str("|\n");
    }
    out.push_str(&border);
    out
}

/// Run the console loop until the game ends or input runs out
/// Returns the final phase
pub fn play<R: BufRead, W: Write>(session: &mut Session, input: R, out: &mut W) -> io::Result<Phase> {
    let mut lines = input.lines();
    loop {
        write!(out, "{}", render_grid(&session.field, false))?;
        write!(out, "{}", PROMPT)?;
        out.flush()?;

        let Some(line) = lines.next().transpose()? else {
            writeln!(out)?;
            return Ok(session.phase());
        };
        let cmd = match parse_command(&line) {
            Ok(cmd) => cmd,
            Err(e) => {
                writeln!(out, "{}", e)?;
                continue;
            }
        };
        let (Command::Reveal(r, c) | Command::Flag(r, c)) = cmd;
        if session.field.cell(r, c).is_none() {
            writeln!(out, "Invalid coordinates.")?;
            continue;
        }
        debug!(?cmd, "console command");
        match cmd {
            Command::Reveal(r, c) => {
                session.reveal(r, c);
            }
            Command::Flag(r, c) => {
                session.toggle_flag(r, c);
            }
        }

        match session.phase() {
            Phase::Won => {
                write!(out, "{}", render_grid(&session.field, false))?;
                writeln!(out, "Congratulations! You win!")?;
                return Ok(Phase::Won);
            }
            phase @ Phase::Lost { .. } => {
                write!(out, "{}", render_grid(&session.field, true))?;
                writeln!(out, "Game over! You hit a mine.")?;
                return Ok(phase);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mfs_game::Difficulty;
    use std::io::Cursor;

    fn session(rows: usize, cols: usize, mines: &[(usize, usize)]) -> Session {
        let field = MineField::with_mines(rows, cols, mines).unwrap();
        Session::from_field(Difficulty::Custom(rows, cols, mines.len()), field)
    }

    fn run(s: &mut Session, input: &str) -> (Phase, String) {
        let mut out = Vec::new();
        let phase = play(s, Cursor::new(input), &mut out).unwrap();
        (phase, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_parse_command() {
        assert_eq!(parse_command("r 1 2"), Ok(Command::Reveal(1, 2)));
        assert_eq!(parse_command("  F 0 -3 "), Ok(Command::Flag(0, -3)));
        assert_eq!(parse_command("x 1 1"), Err(CommandError::Unknown));
        assert_eq!(parse_command("r 1"), Err(CommandError::Invalid));
        assert_eq!(parse_command("r a b"), Err(CommandError::Invalid));
        assert_eq!(parse_command("r 1 1 1"), Err(CommandError::Invalid));
        assert_eq!(parse_command(""), Err(CommandError::Invalid));
    }

    #[test]
    fn test_render_grid() {
        let mut s = session(2, 3, &[(0, 0)]);
        s.toggle_flag(1, 0);
        s.reveal(0, 2);
        let expected = "   0 1 2 \n  +------+\n 0|# 1   |\n 1|F 1   |\n  +------+\n";
        assert_eq!(render_grid(&s.field, false), expected);
        assert!(render_grid(&s.field, true).contains(" 0|* 1   |"));
    }

    #[test]
    fn test_wide_grid_header_stays_aligned() {
        let field = MineField::with_mines(2, 16, &[(0, 0)]).unwrap();
        let grid = render_grid(&field, false);
        let mut lines = grid.lines();
        let tens = lines.next().unwrap();
        let units = lines.next().unwrap();
        assert!(!grid.contains("1011"));
        assert_eq!(units, "   0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 ");
        assert_eq!(tens.find('1'), Some(3 + 10 * 2));
        // every header line is as wide as a board row
        let row = lines.nth(1).unwrap();
        assert_eq!(units.len(), row.len() - 1);
    }

    #[test]
    fn test_win_message() {
        let mut s = session(1, 1, &[]);
        let (phase, out) = run(&mut s, "r 0 0\n");
        assert_eq!(phase, Phase::Won);
        assert!(out.ends_with("Congratulations! You win!\n"));
    }

    #[test]
    fn test_loss_shows_mines() {
        let mut s = session(2, 2, &[(0, 0), (1, 1)]);
        let (phase, out) = run(&mut s, "r 0 0\n");
        assert_eq!(phase, Phase::Lost { row: 0, col: 0 });
        assert!(out.contains(" 0|* # |"));
        assert!(out.contains(" 1|# * |"));
        assert!(out.ends_with("Game over! You hit a mine.\n"));
    }

    #[test]
    fn test_invalid_input_keeps_playing() {
        let mut s = session(3, 3, &[(0, 0)]);
        let (phase, out) = run(&mut s, "r 3 0\nr -1 0\nq\nr x y\nf 0 0\n");
        assert_eq!(phase, Phase::Playing);
        assert_eq!(out.matches("Invalid coordinates.").count(), 2);
        assert!(out.contains("Unknown command."));
        assert!(out.contains("Invalid input."));
        assert!(s.field.cell(0, 0).unwrap().is_flagged);
    }
}
