use crossterm::event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Span, Spans, Text};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::{Frame, Terminal};
use std::error::Error;
use std::io;
use std::time::Duration;
use tracing::{debug, info};
use unicode_width::UnicodeWidthStr;

use crate::mfs_field::Cell;
use crate::mfs_game::{Config, Difficulty, Phase, Session, save_config};

// Menu row items (key, label)
const MENU_ITEMS: [(&str, &str); 5] = [
    ("F2", "New"),
    ("F5", "Difficulty"),
    ("Space", "Reveal"),
    ("F", "Flag"),
    ("Esc", "Exit"),
];

// Number colors for revealed cells 1..8
const NUM_COLORS: [Color; 8] = [
    Color::Blue,
    Color::Green,
    Color::Red,
    Color::Magenta,
    Color::Yellow,
    Color::Cyan,
    Color::White,
    Color::Gray,
];

const BOARD_BG: Color = Color::DarkGray;
const CURSOR_BG: Color = Color::LightBlue;
const EXPLODED_BG: Color = Color::Red;
const MENU_KEY_FG: Color = Color::Yellow;

/// Runtime UI variables that are not part of the game itself
#[derive(Debug, Default)]
struct UiState {
    board_rect: Option<Rect>,
    result_handled: bool, // win/loss already logged and recorded
    new_record: bool,
}

/// Glyph and foreground color for one cell
/// With `show_mines` (after a loss) every mine is drawn and wrong flags are crossed out
fn cell_glyph(cell: Cell, show_mines: bool, ascii: bool) -> (&'static str, Color) {
    const DIGITS: [&str; 9] = [" ", "1", "2", "3", "4", "5", "6", "7", "8"];
    if cell.is_flagged {
        // wrong flags are marked once the board is exposed
        if show_mines && !cell.is_mine {
            return (if ascii { "x" } else { "✗" }, Color::Red);
        }
        return (if ascii { "F" } else { "⚑" }, Color::Red);
    }
    if cell.is_mine && (cell.is_revealed || show_mines) {
        return (if ascii { "*" } else { "☼" }, Color::White);
    }
    if !cell.is_revealed {
        return (if ascii { "#" } else { "■" }, Color::Gray);
    }
    let n = cell.adjacent_mines as usize;
    let color = if n == 0 { BOARD_BG } else { NUM_COLORS[n - 1] };
    (DIGITS[n.min(8)], color)
}

/// Map a terminal position to a board cell (row, col)
/// Cells are drawn two columns wide inside a one-character border
fn cell_at(board: Rect, column: u16, row: u16, rows: usize, cols: usize) -> Option<(usize, usize)> {
    let x = column.checked_sub(board.x + 1)? as usize;
    let y = row.checked_sub(board.y + 1)? as usize;
    let (r, c) = (y, x / 2);
    (r < rows && c < cols).then_some((r, c))
}

/// Board block size (width, height) including borders and padding column
/// Saturates at u16::MAX so oversized custom boards hit the size warning
fn board_size(rows: usize, cols: usize) -> (u16, u16) {
    let clamp = |n: usize| u16::try_from(n).unwrap_or(u16::MAX);
    let w = clamp(cols.saturating_mul(2)).saturating_add(3);
    let h = clamp(rows).saturating_add(2);
    (w, h)
}

fn center_rect(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}

fn board_title(session: &Session, ui: &UiState) -> String {
    let name = session.difficulty.name();
    match session.phase() {
        Phase::Won if ui.new_record => format!(" {} - You win! New record! ", name),
        Phase::Won => format!(" {} - You win! ", name),
        Phase::Lost { .. } => format!(" {} - Boom! F2 to retry ", name),
        _ => format!(" {} ", name),
    }
}

fn draw<B: Backend>(f: &mut Frame<B>, session: &Session, cfg: &Config, ui: &mut UiState) {
    let size = f.size();
    let rows = session.field.rows();
    let cols = session.field.cols();
    let (board_w, board_h) = board_size(rows, cols);

    // layout: top menu row, center board, bottom status
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(board_h), Constraint::Length(3)].as_ref())
        .split(size);

    if size.width < board_w.max(60) || chunks[1].height < board_h {
        let warn_lines = vec![
            Spans::from(Span::raw("Terminal size too small.")),
            Spans::from(Span::raw(format!(
                "Minimum required: {} x {}",
                board_w.max(60),
                board_h.saturating_add(6)
            ))),
        ];
        let warn = Paragraph::new(Text::from(warn_lines))
            .block(Block::default().borders(Borders::ALL).title("Resize Terminal"))
            .alignment(Alignment::Center);
        f.render_widget(Clear, size);
        f.render_widget(warn, center_rect(40, 4, size));
        ui.board_rect = None;
        return;
    }

    // menu row
    let key_style = Style::default().fg(MENU_KEY_FG).add_modifier(Modifier::BOLD);
    let mut spans: Vec<Span> = vec![Span::raw(" ")];
    for (i, (key, label)) in MENU_ITEMS.iter().take(MENU_ITEMS.len() - 1).enumerate() {
        if i > 0 {
            spans.push(Span::raw("   "));
        }
        spans.push(Span::styled(key.to_string(), key_style));
        spans.push(Span::raw(format!(": {}", label)));
    }
    let menu = Paragraph::new(Spans::from(spans)).block(Block::default().borders(Borders::ALL));
    f.render_widget(menu, chunks[0]);

    // status row: mine counter and timer on the left, Esc: Exit on the right
    let left_text = format!(" Mines: {}   Time: {}s ", session.remaining_mines(), session.elapsed_secs());
    let (esc_key, esc_label) = MENU_ITEMS[MENU_ITEMS.len() - 1];
    let inner_w = chunks[2].width.saturating_sub(2) as usize;
    let right_w = esc_key.width() + 2 + esc_label.width();
    let mid = inner_w.saturating_sub(left_text.as_str().width() + right_w + 1).max(1);
    let status = Paragraph::new(Spans::from(vec![
        Span::raw(left_text),
        Span::raw(" ".repeat(mid)),
        Span::styled(esc_key, key_style),
        Span::raw(format!(": {} ", esc_label)),
    ]))
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(status, chunks[2]);

    // board
    let board_area = center_rect(board_w, board_h, chunks[1]);
    ui.board_rect = Some(board_area);
    let (show_mines, exploded) = match session.phase() {
        Phase::Lost { row, col } => (true, Some((row, col))),
        _ => (false, None),
    };
    let mut lines = Vec::with_capacity(rows);
    for r in 0..rows {
        let mut spans = Vec::with_capacity(cols + 1);
        for c in 0..cols {
            let Some(cell) = session.field.cell(r as isize, c as isize) else {
                continue;
            };
            let (glyph, fg) = cell_glyph(cell, show_mines, cfg.ascii_icons);
            let mut style = Style::default().fg(fg).bg(BOARD_BG);
            if exploded == Some((r, c)) {
                style = style.bg(EXPLODED_BG).add_modifier(Modifier::BOLD);
            } else if session.cursor == (r, c) && !session.is_over() {
                style = style.bg(CURSOR_BG);
            }
            spans.push(Span::styled(format!(" {}", glyph), style));
        }
        // padding column so the right edge uses the board background
        spans.push(Span::styled(" ", Style::default().bg(BOARD_BG)));
        lines.push(Spans::from(spans));
    }
    let board = Paragraph::new(Text::from(lines)).block(
        Block::default()
            .borders(Borders::ALL)
            .title(board_title(session, ui))
            .title_alignment(Alignment::Center),
    );
    f.render_widget(board, board_area);
}

/// Run the full-screen terminal UI until the player exits
/// `difficulty` is the first board's difficulty, only F5 changes the saved one
pub fn run(cfg: &mut Config, difficulty: Difficulty, seed: Option<u64>) -> Result<(), Box<dyn Error>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnableMouseCapture, terminal::EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, cfg, difficulty, seed);

    // Save preferences and records before leaving
    save_config(cfg);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), DisableMouseCapture, terminal::LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    result
}

fn event_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    cfg: &mut Config,
    mut difficulty: Difficulty,
    seed: Option<u64>,
) -> Result<(), Box<dyn Error>> {
    let mut session = Session::new(difficulty, seed)?;
    let mut ui = UiState::default();
    // redraw at least this often so the timer keeps moving
    let tick_rate = Duration::from_millis(200);

    loop {
        terminal.draw(|f| draw(f, &session, cfg, &mut ui))?;

        if !event::poll(tick_rate)? {
            continue;
        }
        match event::read()? {
            Event::Key(KeyEvent { code, kind: KeyEventKind::Press, .. }) => match code {
                KeyCode::Esc => break,
                KeyCode::F(2) => {
                    // a fixed seed only applies to the first board
                    session = Session::new(difficulty, None)?;
                    ui = UiState::default();
                }
                KeyCode::F(5) => {
                    difficulty = difficulty.next_preset();
                    cfg.difficulty = difficulty;
                    session = Session::new(difficulty, None)?;
                    ui = UiState::default();
                }
                KeyCode::Left => session.step_cursor(0, -1),
                KeyCode::Right => session.step_cursor(0, 1),
                KeyCode::Up => session.step_cursor(-1, 0),
                KeyCode::Down => session.step_cursor(1, 0),
                KeyCode::Char(' ') | KeyCode::Enter => {
                    let outcome = session.reveal_at_cursor();
                    debug!(?outcome, cursor = ?session.cursor, "reveal");
                }
                KeyCode::Char('f') | KeyCode::Char('F') => {
                    let outcome = session.flag_at_cursor();
                    debug!(?outcome, cursor = ?session.cursor, "flag");
                }
                _ => {}
            },
            Event::Mouse(MouseEvent { kind: MouseEventKind::Down(button), column, row, .. }) => {
                let hit = ui.board_rect.and_then(|rect| {
                    cell_at(rect, column, row, session.field.rows(), session.field.cols())
                });
                if let Some((r, c)) = hit {
                    session.cursor = (r, c);
                    match button {
                        MouseButton::Left => {
                            session.reveal(r as isize, c as isize);
                        }
                        MouseButton::Right => {
                            session.toggle_flag(r as isize, c as isize);
                        }
                        MouseButton::Middle => {}
                    }
                }
            }
            _ => {}
        }

        if session.is_over() && !ui.result_handled {
            ui.result_handled = true;
            ui.new_record = session.record_win(cfg);
            if ui.new_record {
                info!(secs = session.elapsed_secs(), difficulty = session.difficulty.name(), "new best time");
                save_config(cfg);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mfs_field::MineField;

    #[test]
    fn test_cell_at_maps_two_column_cells() {
        let board = Rect::new(10, 5, 2 * 4 + 3, 3 + 2);
        assert_eq!(cell_at(board, 11, 6, 3, 4), Some((0, 0)));
        assert_eq!(cell_at(board, 12, 6, 3, 4), Some((0, 0)));
        assert_eq!(cell_at(board, 13, 8, 3, 4), Some((2, 1)));
        assert_eq!(cell_at(board, 10, 6, 3, 4), None); // border
        assert_eq!(cell_at(board, 19, 6, 3, 4), None); // padding column
        assert_eq!(cell_at(board, 11, 9, 3, 4), None);
    }

    #[test]
    fn test_board_size_saturates() {
        assert_eq!(board_size(9, 9), (21, 11));
        assert_eq!(board_size(16, 30), (63, 18));
        assert_eq!(board_size(2, 32767), (u16::MAX, 4));
        assert_eq!(board_size(2, 32768), (u16::MAX, 4));
        assert_eq!(board_size(usize::MAX, usize::MAX), (u16::MAX, u16::MAX));
    }

    #[test]
    fn test_glyphs_after_loss() {
        let mut field = MineField::with_mines(2, 2, &[(0, 0), (1, 1)]).unwrap();
        field.toggle_flag(0, 1);
        field.reveal(0, 0);
        let glyph = |r, c, show| cell_glyph(field.cell(r, c).unwrap(), show, true).0;
        assert_eq!(glyph(1, 1, false), "#");
        assert_eq!(glyph(1, 1, true), "*");
        assert_eq!(glyph(0, 0, false), "*");
        assert_eq!(glyph(0, 1, false), "F");
        assert_eq!(glyph(0, 1, true), "x");
        // mines must stand out against the board background
        let (_, mine_fg) = cell_glyph(field.cell(0, 0).unwrap(), true, false);
        assert_ne!(mine_fg, BOARD_BG);
        assert_eq!(mine_fg, Color::White);
        assert!(!NUM_COLORS.contains(&BOARD_BG) && !NUM_COLORS.contains(&Color::Black));
    }

    #[test]
    fn test_board_title_reports_result() {
        let field = MineField::with_mines(1, 2, &[(0, 0)]).unwrap();
        let mut session = Session::from_field(Difficulty::Easy, field);
        let ui = UiState::default();
        assert_eq!(board_title(&session, &ui), " Easy ");
        session.reveal(0, 1);
        assert_eq!(board_title(&session, &ui), " Easy - You win! ");
    }
}
