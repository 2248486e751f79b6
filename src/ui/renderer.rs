/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (grid of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// This eliminates flicker caused by full-screen redraws — important
/// here because pad pulses redraw large colored areas every few frames.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color as TermColor, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::color::Color;
use crate::net::leaderboard::ScoreBoard;
use crate::sim::session::{Phase, Session};

/// Everything outside the Session that the renderer displays:
/// profile data, leaderboard, nickname prompt. Read-only views
/// assembled by the main loop each frame.
pub struct HudView<'a> {
    pub best: u32,
    pub nickname: Option<&'a str>,
    pub board: Option<&'a ScoreBoard>,
    pub prompt: Option<&'a str>,
    pub online: bool,
}

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: char,
    fg: TermColor,
    bg: TermColor,
}

impl Cell {
    /// Explicit dark background for all "empty" terminal cells, so the
    /// diff never depends on the terminal's configured default.
    const BASE_BG: TermColor = TermColor::Rgb { r: 16, g: 16, b: 28 };

    const BLANK: Cell = Cell {
        ch: ' ',
        fg: TermColor::White,
        bg: Cell::BASE_BG,
    };

    /// Sentinel used to invalidate the back buffer: differs from any
    /// real cell, so every position will be diff'd.
    const INVALID: Cell = Cell {
        ch: '?',
        fg: TermColor::Magenta,
        bg: TermColor::Magenta,
    };
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer {
            width: w,
            height: h,
            cells: vec![Cell::BLANK; w * h],
        }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    /// Write a string at (x, y) with given colors.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: TermColor, bg: TermColor) {
        let mut cx = x;
        for ch in s.chars() {
            if cx >= self.width {
                break;
            }
            self.set(cx, y, Cell { ch, fg, bg });
            cx += 1;
        }
    }

    /// Centered string on a row.
    fn put_centered(&mut self, y: usize, s: &str, fg: TermColor, bg: TermColor) {
        let len = s.chars().count();
        let x = (self.width.saturating_sub(len)) / 2;
        self.put_str(x, y, s, fg, bg);
    }

    /// Solid rectangle of background color.
    fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, bg: TermColor) {
        for ry in y..y + h {
            for rx in x..x + w {
                self.set(rx, ry, Cell { ch: ' ', fg: TermColor::White, bg });
            }
        }
    }
}

// ── Pad board geometry ──

const PAD_W: usize = 16;
const PAD_H: usize = 6;
const PAD_GAP: usize = 3;
const BOARD_W: usize = PAD_W * 2 + PAD_GAP;
const BOARD_H: usize = PAD_H * 2 + 1;

/// Pad fill colors, dim when idle and bright while lit.
fn pad_bg(color: Color, lit: bool) -> TermColor {
    match (color, lit) {
        (Color::Green, false) => TermColor::Rgb { r: 12, g: 72, b: 28 },
        (Color::Green, true) => TermColor::Rgb { r: 48, g: 222, b: 100 },
        (Color::Red, false) => TermColor::Rgb { r: 96, g: 22, b: 22 },
        (Color::Red, true) => TermColor::Rgb { r: 248, g: 72, b: 72 },
        (Color::Yellow, false) => TermColor::Rgb { r: 104, g: 86, b: 10 },
        (Color::Yellow, true) => TermColor::Rgb { r: 252, g: 212, b: 40 },
        (Color::Blue, false) => TermColor::Rgb { r: 20, g: 42, b: 96 },
        (Color::Blue, true) => TermColor::Rgb { r: 72, g: 132, b: 250 },
    }
}

/// Key labels shown for each pad, in `Color::ALL` order. The bindings
/// themselves live in the main loop's KEYS_* constants.
const PAD_KEYS: [char; 4] = ['Q', 'W', 'A', 'S'];

const HUD_BG: TermColor = TermColor::Rgb { r: 20, g: 20, b: 60 };
const DIM: TermColor = TermColor::Rgb { r: 120, g: 120, b: 140 };
const GOLD: TermColor = TermColor::Rgb { r: 250, g: 204, b: 21 };

// ── Renderer ──

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_phase: Option<Phase>,
    last_prompt: bool,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_phase: None,
            last_prompt: false,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        // Force full repaint on first frame: back ≠ front for every cell.
        self.back.cells.fill(Cell::INVALID);

        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    pub fn render(&mut self, session: &Session, hud: &HudView) -> io::Result<()> {
        // Detect terminal resize
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        // Phase change or prompt toggle → clear for a clean transition
        let prompt_open = hud.prompt.is_some();
        if self.last_phase != Some(session.phase) || self.last_prompt != prompt_open {
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
            self.last_phase = Some(session.phase);
            self.last_prompt = prompt_open;
        }

        self.front.clear();

        match session.phase {
            Phase::Idle => self.compose_title(hud),
            Phase::GameOver => {
                self.compose_board(session, hud);
                self.compose_scores_panel(hud);
            }
            _ => self.compose_board(session, hud),
        }

        if let Some(text) = hud.prompt {
            self.compose_prompt_overlay(text);
        }

        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);

        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = TermColor::White;
        let mut last_bg = Cell::BASE_BG;
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;

        // Set explicit base colors at start of frame. No ResetColor:
        // the terminal's native default may differ from BASE_BG.
        queue!(
            self.writer,
            SetForegroundColor(TermColor::White),
            SetBackgroundColor(Cell::BASE_BG),
        )?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    need_move = true;
                    continue;
                }

                if need_move || x != last_x + 1 || y != last_y {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
                }

                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }

                let mut buf = [0u8; 4];
                queue!(self.writer, Print(&*cell.ch.encode_utf8(&mut buf)))?;

                last_x = x;
                last_y = y;
            }
        }

        self.writer.flush()
    }

    // ── Compose: title screen ──

    fn compose_title(&mut self, hud: &HudView) {
        let h = self.front.height;

        self.front.put_centered(h / 6, "S I M O N", GOLD, Cell::BASE_BG);
        self.front.put_centered(
            h / 6 + 1,
            "watch the sequence, play it back",
            DIM,
            Cell::BASE_BG,
        );

        let best = format!("Best: {}", hud.best);
        self.front.put_centered(h / 6 + 3, &best, TermColor::White, Cell::BASE_BG);
        if let Some(nick) = hud.nickname {
            let line = format!("Playing as {}", nick);
            self.front.put_centered(h / 6 + 4, &line, DIM, Cell::BASE_BG);
        }

        self.compose_scores_panel(hud);

        self.front.put_centered(
            h.saturating_sub(2),
            "[Enter] Start    [Esc] Quit",
            TermColor::White,
            Cell::BASE_BG,
        );
    }

    // ── Compose: pad board + HUD (all in-game phases) ──

    fn compose_board(&mut self, session: &Session, hud: &HudView) {
        let buf_w = self.front.width;

        // HUD row
        let online = if hud.online { "" } else { " offline" };
        let text = format!(
            " Score:{:<7} Level:{:<4} Best:{:<7}{}",
            session.score, session.level, hud.best, online
        );
        for x in 0..buf_w {
            self.front.set(x, 0, Cell { ch: ' ', fg: TermColor::White, bg: HUD_BG });
        }
        self.front.put_str(0, 0, &text, TermColor::White, HUD_BG);

        // Pad grid, centered
        let ox = (buf_w.saturating_sub(BOARD_W)) / 2;
        let oy = 2;
        for &color in &Color::ALL {
            let col = color.index() % 2;
            let row = color.index() / 2;
            let x = ox + col * (PAD_W + PAD_GAP);
            let y = oy + row * (PAD_H + 1);
            let bg = pad_bg(color, session.pad_lit(color));
            self.front.fill_rect(x, y, PAD_W, PAD_H, bg);
        }

        // Keys hint inside the board gap, in board order
        let hint_y = oy + BOARD_H + 1;
        let hint = Color::ALL
            .iter()
            .zip(PAD_KEYS)
            .map(|(c, k)| format!("[{}]{}", k, c.name()))
            .collect::<Vec<_>>()
            .join("  ");
        self.front.put_centered(hint_y, &hint, DIM, Cell::BASE_BG);

        // Message line
        if !session.message.is_empty() {
            let fg = match session.phase {
                Phase::GameOver => TermColor::Rgb { r: 248, g: 100, b: 100 },
                Phase::RoundWon | Phase::AwaitingInput => TermColor::Rgb { r: 100, g: 230, b: 130 },
                _ => TermColor::White,
            };
            self.front.put_centered(hint_y + 2, &session.message, fg, Cell::BASE_BG);
        }

        if session.phase == Phase::GameOver {
            self.front.put_centered(
                self.front.height.saturating_sub(2),
                "[Enter] Retry    [Esc] Title",
                TermColor::White,
                Cell::BASE_BG,
            );
        }
    }

    // ── Compose: leaderboard panel (title + game over) ──

    fn compose_scores_panel(&mut self, hud: &HudView) {
        let Some(board) = hud.board else { return };
        let w = self.front.width;
        if w < BOARD_W + 30 {
            return; // no room next to the pads on narrow terminals
        }
        let x = w - 24;
        let mut y = 2;

        self.front.put_str(x, y, "TOP SCORES", GOLD, Cell::BASE_BG);
        y += 1;
        if let Some(high) = &board.highest {
            let line = format!("record {} ({})", high.score, high.nickname);
            self.front.put_str(x, y, &line, DIM, Cell::BASE_BG);
        }
        y += 2;
        for (i, rec) in board.top_15.iter().take(10).enumerate() {
            let line = format!("{:>2}. {:<10} {:>6}", i + 1, rec.nickname, rec.score);
            self.front.put_str(x, y + i, &line, TermColor::White, Cell::BASE_BG);
        }
    }

    // ── Compose: nickname prompt overlay ──

    fn compose_prompt_overlay(&mut self, text: &str) {
        let w = self.front.width;
        let h = self.front.height;
        let box_w = 44.min(w);
        let box_h = 5;
        let x = (w.saturating_sub(box_w)) / 2;
        let y = (h.saturating_sub(box_h)) / 2;

        self.front.fill_rect(x, y, box_w, box_h, HUD_BG);
        self.front.put_str(x + 2, y + 1, "New record! Enter a nickname:", GOLD, HUD_BG);
        let entry = format!("> {}_", text);
        self.front.put_str(x + 2, y + 2, &entry, TermColor::White, HUD_BG);
        self.front.put_str(x + 2, y + 3, "[Enter] OK   [Esc] Skip", DIM, HUD_BG);
    }
}
