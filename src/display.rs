/// Terminal host drawing: a character-grid surface plus the menu overlays.
///
/// [`TerminalSurface`] rasterises the simulation's virtual canvas into a grid
/// of character cells; the overlay functions draw the start, pause and
/// game-over screens on top of it.  No game logic is performed here.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal,
    QueueableCommand,
};
use survival_mode::render::{Paint, Surface};

// ── Colour palette ────────────────────────────────────────────────────────────

const C_TITLE: Color = Color::Cyan;
const C_HINT: Color = Color::DarkGrey;
const C_OVERLAY: Color = Color::Yellow;
const C_GAME_OVER: Color = Color::Red;
const C_SCORE: Color = Color::Yellow;

const CONTROLS: &str = "WASD/←↑→↓ : Move  SPACE : Shoot  Q : Shield  E : Dash  P : Pause  ESC : Quit";

fn color_of(paint: Paint) -> Color {
    match paint {
        Paint::Blue => Color::Blue,
        Paint::Cyan => Color::Cyan,
        Paint::Red => Color::Red,
        Paint::Green => Color::Green,
        Paint::Orange => Color::DarkYellow,
        Paint::Yellow => Color::Yellow,
        Paint::White => Color::White,
    }
}

// ── Terminal surface ──────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq)]
struct Cell {
    ch: char,
    color: Color,
}

/// A character-cell canvas standing in for a `width` × `height` pixel surface.
/// The last terminal row is kept free for the player's name and the controls
/// hint.
pub struct TerminalSurface {
    width: f32,
    height: f32,
    cols: u16,
    rows: u16,
    cells: Vec<Option<Cell>>,
    player_name: String,
}

impl TerminalSurface {
    pub fn new(width: f32, height: f32, cols: u16, rows: u16) -> Self {
        let mut surface = Self {
            width,
            height,
            cols: 0,
            rows: 0,
            cells: Vec::new(),
            player_name: String::new(),
        };
        surface.resize(cols, rows);
        surface
    }

    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.cols = cols.max(1);
        self.rows = rows.saturating_sub(1).max(1);
        self.cells = vec![None; self.cols as usize * self.rows as usize];
    }

    pub fn set_player_name(&mut self, name: &str) {
        self.player_name = name.to_string();
    }

    /// Bottom row: who is playing, then the controls.
    fn hint_line(&self) -> String {
        if self.player_name.is_empty() {
            CONTROLS.to_string()
        } else {
            format!("{} :  {CONTROLS}", self.player_name)
        }
    }

    pub fn cols(&self) -> u16 {
        self.cols
    }

    /// Terminal rows including the hint row.
    pub fn rows(&self) -> u16 {
        self.rows + 1
    }

    fn col_of(&self, x: f32) -> f32 {
        x * self.cols as f32 / self.width.max(1.0)
    }

    fn row_of(&self, y: f32) -> f32 {
        y * self.rows as f32 / self.height.max(1.0)
    }

    fn put(&mut self, col: i32, row: i32, ch: char, paint: Paint) {
        if col < 0 || row < 0 || col >= self.cols as i32 || row >= self.rows as i32 {
            return;
        }
        let idx = row as usize * self.cols as usize + col as usize;
        self.cells[idx] = Some(Cell { ch, color: color_of(paint) });
    }

    #[cfg(test)]
    fn char_at(&self, col: u16, row: u16) -> Option<char> {
        self.cells
            .get(row as usize * self.cols as usize + col as usize)
            .copied()
            .flatten()
            .map(|c| c.ch)
    }

    /// Queue the whole canvas plus the controls hint.  The caller flushes.
    pub fn present<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        out.queue(terminal::Clear(terminal::ClearType::All))?;

        for row in 0..self.rows {
            out.queue(cursor::MoveTo(0, row))?;
            let start = row as usize * self.cols as usize;
            let mut current: Option<Color> = None;
            for cell in &self.cells[start..start + self.cols as usize] {
                match cell {
                    Some(cell) => {
                        if current != Some(cell.color) {
                            out.queue(style::SetForegroundColor(cell.color))?;
                            current = Some(cell.color);
                        }
                        out.queue(Print(cell.ch))?;
                    }
                    None => {
                        out.queue(Print(' '))?;
                    }
                }
            }
        }

        out.queue(cursor::MoveTo(1, self.rows))?;
        out.queue(style::SetForegroundColor(C_HINT))?;
        out.queue(Print(self.hint_line()))?;
        out.queue(style::ResetColor)?;
        Ok(())
    }
}

impl Surface for TerminalSurface {
    fn width(&self) -> f32 {
        self.width
    }

    fn height(&self) -> f32 {
        self.height
    }

    fn clear(&mut self) {
        self.cells.iter_mut().for_each(|c| *c = None);
    }

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32, paint: Paint) {
        let c0 = self.col_of(x).floor() as i32;
        let r0 = self.row_of(y).floor() as i32;
        // Every visible rectangle covers at least one cell.
        let c1 = self.col_of(x + width).ceil().max(c0 as f32 + 1.0) as i32;
        let r1 = self.row_of(y + height).ceil().max(r0 as f32 + 1.0) as i32;
        for row in r0..r1 {
            for col in c0..c1 {
                self.put(col, row, '█', paint);
            }
        }
    }

    fn stroke_arc(&mut self, cx: f32, cy: f32, radius: f32, paint: Paint) {
        const STEPS: usize = 48;
        for i in 0..STEPS {
            let a = i as f32 / STEPS as f32 * std::f32::consts::TAU;
            let col = self.col_of(cx + radius * a.cos()).floor() as i32;
            let row = self.row_of(cy + radius * a.sin()).floor() as i32;
            self.put(col, row, '·', paint);
        }
    }

    fn fill_text(&mut self, text: &str, x: f32, y: f32, paint: Paint) {
        let col = self.col_of(x).floor() as i32;
        // the glyphs sit just above the baseline
        let row = self.row_of(y - 1.0).floor() as i32;
        for (i, ch) in text.chars().enumerate() {
            self.put(col + i as i32, row, ch, paint);
        }
    }
}

// ── Overlays ──────────────────────────────────────────────────────────────────

fn centered<W: Write>(
    out: &mut W,
    cols: u16,
    row: u16,
    text: &str,
    color: Color,
) -> std::io::Result<()> {
    let col = (cols / 2).saturating_sub(text.chars().count() as u16 / 2);
    out.queue(cursor::MoveTo(col, row))?;
    out.queue(style::SetForegroundColor(color))?;
    out.queue(Print(text))?;
    Ok(())
}

/// Title screen with the name being typed.
pub fn draw_start_screen<W: Write>(out: &mut W, name: &str) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    let (cols, rows) = terminal::size()?;
    let cy = rows / 2;

    centered(out, cols, cy.saturating_sub(6), "★  SURVIVAL  MODE  ★", C_TITLE)?;
    centered(out, cols, cy.saturating_sub(4), "Survive the waves. Every 30s they get faster.", C_HINT)?;

    centered(out, cols, cy.saturating_sub(1), "Enter your name:", Color::White)?;
    let field = format!("[ {:<16} ]", format!("{name}_"));
    centered(out, cols, cy, &field, C_SCORE)?;

    let legend: &[(&str, Color)] = &[
        ("health  +20 health", Color::Yellow),
        ("shield  5s of shielding", Color::Cyan),
        ("speed   permanent speed boost", Color::Yellow),
        ("bullet  faster shots in flight", Color::Yellow),
    ];
    centered(out, cols, cy + 2, "Power-ups (walk over them):", C_HINT)?;
    for (i, (line, color)) in legend.iter().enumerate() {
        centered(out, cols, cy + 3 + i as u16, line, *color)?;
    }

    centered(out, cols, cy + 8, CONTROLS, C_HINT)?;
    centered(out, cols, cy + 9, "ENTER : Start   ESC : Quit", Color::White)?;

    out.queue(style::ResetColor)?;
    out.flush()?;
    Ok(())
}

pub fn draw_pause<W: Write>(out: &mut W, cols: u16, rows: u16) -> std::io::Result<()> {
    let row = (rows / 2).saturating_sub(1);
    centered(out, cols, row, "╔══════════════╗", C_OVERLAY)?;
    centered(out, cols, row + 1, "║    PAUSED    ║", C_OVERLAY)?;
    centered(out, cols, row + 2, "╚══════════════╝", C_OVERLAY)?;
    centered(out, cols, row + 3, "P - Resume", Color::White)?;
    out.queue(style::ResetColor)?;
    Ok(())
}

pub fn draw_game_over<W: Write>(
    out: &mut W,
    cols: u16,
    rows: u16,
    player: &str,
    score: u32,
) -> std::io::Result<()> {
    let lines: &[(&str, Color)] = &[
        ("╔════════════════════╗", C_GAME_OVER),
        ("║    GAME  OVER      ║", C_GAME_OVER),
        ("╚════════════════════╝", C_GAME_OVER),
    ];

    let total_rows = lines.len() as u16 + 3; // 3 box lines + name + score + hint
    let start_row = (rows / 2).saturating_sub(total_rows / 2);

    for (i, (msg, color)) in lines.iter().enumerate() {
        centered(out, cols, start_row + i as u16, msg, *color)?;
    }

    let name_row = start_row + lines.len() as u16;
    centered(out, cols, name_row, player, Color::White)?;
    centered(out, cols, name_row + 1, &format!("Final Score: {:>6}", score), C_SCORE)?;
    centered(
        out,
        cols,
        name_row + 2,
        "R - Play Again  M - Menu  Q - Quit",
        Color::White,
    )?;

    out.queue(style::ResetColor)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    // 80 × 25 terminal → 80 × 24 canvas cells, 10 × 25 pixels per cell.
    fn surface() -> TerminalSurface {
        TerminalSurface::new(800.0, 600.0, 80, 25)
    }

    #[test]
    fn fill_rect_maps_pixels_to_cells() {
        let mut s = surface();
        s.fill_rect(100.0, 50.0, 50.0, 50.0, Paint::Blue);
        assert_eq!(s.char_at(10, 2), Some('█'));
        assert_eq!(s.char_at(14, 3), Some('█'));
        assert_eq!(s.char_at(15, 2), None);
        assert_eq!(s.char_at(9, 2), None);
    }

    #[test]
    fn tiny_rect_still_covers_a_cell() {
        let mut s = surface();
        s.fill_rect(402.0, 300.0, 2.0, 2.0, Paint::Red);
        assert_eq!(s.char_at(40, 12), Some('█'));
    }

    #[test]
    fn offscreen_drawing_is_clipped() {
        let mut s = surface();
        s.fill_rect(-100.0, -100.0, 50.0, 50.0, Paint::Green);
        s.fill_text("far away", 5000.0, 5000.0, Paint::White);
        assert!(s.cells.iter().all(|c| c.is_none()));
    }

    #[test]
    fn text_is_written_left_to_right() {
        let mut s = surface();
        s.fill_text("Wave: 2", 10.0, 30.0, Paint::White);
        assert_eq!(s.char_at(1, 1), Some('W'));
        assert_eq!(s.char_at(7, 1), Some('2'));
    }

    #[test]
    fn hint_row_leads_with_player_name() {
        let mut s = surface();
        assert_eq!(s.hint_line(), CONTROLS);
        s.set_player_name("Ada");
        assert!(s.hint_line().starts_with("Ada :  WASD"));

        let mut out = Vec::new();
        s.present(&mut out).unwrap();
        assert!(String::from_utf8_lossy(&out).contains("Ada :  WASD"));
    }

    #[test]
    fn clear_empties_the_canvas() {
        let mut s = surface();
        s.fill_rect(0.0, 0.0, 800.0, 600.0, Paint::Yellow);
        s.clear();
        assert!(s.cells.iter().all(|c| c.is_none()));
    }
}
