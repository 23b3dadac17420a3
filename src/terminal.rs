//! Terminal presentation: a cell frame, half-block canvas blitting and a
//! diff-based renderer that only rewrites cells that changed.

use crate::graphics::{Canvas, Rgb};
use crossterm::{
    cursor,
    event::{DisableMouseCapture, EnableMouseCapture},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{
        self, BeginSynchronizedUpdate, DisableLineWrap, EnableLineWrap, EndSynchronizedUpdate,
        EnterAlternateScreen, LeaveAlternateScreen,
    },
};
use std::io::{self, Stdout, Write};

/// Upper half block: foreground paints the top pixel, background the bottom one
const HALF_BLOCK: char = '\u{2580}';

/// Stand-in for characters that would not occupy exactly one cell
const REPLACEMENT: char = '?';

/// Whether `c` prints as exactly one terminal cell.
///
/// Control characters, zero-width marks and the common East Asian wide and
/// emoji blocks are rejected.
pub fn is_narrow(c: char) -> bool {
    if c.is_control() {
        return false;
    }
    !matches!(
        c as u32,
        0x0300..=0x036F
            | 0x200B..=0x200F
            | 0xFE00..=0xFE0F
            | 0x1100..=0x115F
            | 0x2E80..=0x303E
            | 0x3041..=0xA4CF
            | 0xAC00..=0xD7A3
            | 0xF900..=0xFAFF
            | 0xFE30..=0xFE4F
            | 0xFF00..=0xFF60
            | 0xFFE0..=0xFFE6
            | 0x1F300..=0x1F64F
            | 0x1F900..=0x1F9FF
            | 0x20000..=0x3FFFD
    )
}

fn cell_char(c: char) -> char {
    if is_narrow(c) {
        c
    } else {
        REPLACEMENT
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub fg: Color,
    pub bg: Color,
}

impl Cell {
    pub fn new(ch: char, fg: Color, bg: Color) -> Self {
        Self { ch, fg, bg }
    }
}

/// Full screen of cells composed for one frame
pub struct Frame {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl Frame {
    pub fn new(width: usize, height: usize, background: Rgb) -> Self {
        let blank = Cell::new(' ', Color::Reset, background.to_color());
        Frame {
            width,
            height,
            cells: vec![blank; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cell(&self, x: usize, y: usize) -> Option<Cell> {
        (x < self.width && y < self.height).then(|| self.cells[y * self.width + x])
    }

    /// Copies the canvas into the frame starting at `top_row`, two pixels per cell
    pub fn blit_canvas(&mut self, canvas: &Canvas, top_row: usize) {
        let (pw, ph) = canvas.pixel_size();
        for row in 0..ph.div_ceil(2) {
            let y = top_row + row;
            if y >= self.height {
                break;
            }
            for x in 0..pw.min(self.width) {
                let top = canvas.pixel(x, row * 2).unwrap_or_default();
                let bottom = canvas.pixel(x, row * 2 + 1).unwrap_or(top);
                let cell = if top == bottom {
                    Cell::new(' ', top.to_color(), bottom.to_color())
                } else {
                    Cell::new(HALF_BLOCK, top.to_color(), bottom.to_color())
                };
                self.cells[y * self.width + x] = cell;
            }
        }
    }

    /// Writes `text` at (x, y) keeping the background underneath; clipped at the edge
    pub fn put_str(&mut self, x: usize, y: usize, text: &str, fg: Rgb) {
        if y >= self.height {
            return;
        }
        for (i, ch) in text.chars().enumerate() {
            let col = x + i;
            if col >= self.width {
                break;
            }
            let cell = &mut self.cells[y * self.width + col];
            // A half block's top colour would vanish behind text; keep the bottom one
            cell.ch = cell_char(ch);
            cell.fg = fg.to_color();
        }
    }

    /// Writes `text` on a solid background
    pub fn put_str_on(&mut self, x: usize, y: usize, text: &str, fg: Rgb, bg: Rgb) {
        if y >= self.height {
            return;
        }
        for (i, ch) in text.chars().enumerate() {
            let col = x + i;
            if col >= self.width {
                break;
            }
            self.cells[y * self.width + col] = Cell::new(cell_char(ch), fg.to_color(), bg.to_color());
        }
    }

    pub fn fill_row(&mut self, y: usize, bg: Rgb) {
        if y >= self.height {
            return;
        }
        let blank = Cell::new(' ', Color::Reset, bg.to_color());
        let start = y * self.width;
        self.cells[start..start + self.width].fill(blank);
    }
}

/// Raw mode + alternate screen for the lifetime of the guard
pub struct TerminalGuard {
    stdout: Stdout,
}

impl TerminalGuard {
    pub fn enter() -> io::Result<Self> {
        let mut stdout = io::stdout();
        terminal::enable_raw_mode()?;
        execute!(
            stdout,
            EnterAlternateScreen,
            DisableLineWrap,
            EnableMouseCapture,
            cursor::Hide
        )?;
        Ok(TerminalGuard { stdout })
    }

    pub fn stdout(&mut self) -> &mut Stdout {
        &mut self.stdout
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        // Best effort, the process is going away either way
        let _ = execute!(
            self.stdout,
            EndSynchronizedUpdate,
            DisableMouseCapture,
            ResetColor,
            cursor::Show,
            EnableLineWrap,
            LeaveAlternateScreen
        );
        let _ = terminal::disable_raw_mode();
    }
}

/// Diff-based, flicker-resistant presenter
pub struct Renderer {
    width: usize,
    height: usize,
    prev: Vec<Cell>,
}

impl Renderer {
    pub fn new(width: usize, height: usize) -> Self {
        let prev = vec![Cell::new('\0', Color::Reset, Color::Reset); width * height];
        Self {
            width,
            height,
            prev,
        }
    }

    /// Forgets what is on screen so the next draw rewrites every cell
    pub fn resize(&mut self, width: usize, height: usize) {
        *self = Renderer::new(width, height);
    }

    pub fn clear_all<W: Write>(&mut self, out: &mut W, background: Rgb) -> io::Result<()> {
        queue!(out, BeginSynchronizedUpdate)?;
        for y in 0..self.height as u16 {
            queue!(
                out,
                cursor::MoveTo(0, y),
                SetBackgroundColor(background.to_color()),
                Print(" ".repeat(self.width)),
                ResetColor
            )?;
        }
        queue!(out, EndSynchronizedUpdate)?;
        out.flush()?;
        for c in self.prev.iter_mut() {
            c.ch = '\0';
        }
        Ok(())
    }

    /// Emits the cells that differ from the last frame, grouped in same-colour runs.
    /// Returns the number of cells written.
    pub fn draw<W: Write>(&mut self, out: &mut W, frame: &Frame) -> io::Result<usize> {
        if frame.width() != self.width || frame.height() != self.height {
            self.resize(frame.width(), frame.height());
        }
        let cells = frame.cells();
        let w = self.width;
        let mut written = 0;

        queue!(out, BeginSynchronizedUpdate)?;
        for y in 0..self.height {
            let row_off = y * w;
            let mut x = 0usize;
            while x < w {
                let i = row_off + x;
                let cur = cells[i];
                if cur == self.prev[i] {
                    x += 1;
                    continue;
                }

                let mut end = x + 1;
                while end < w {
                    let cj = cells[row_off + end];
                    if cj == self.prev[row_off + end] || cj.fg != cur.fg || cj.bg != cur.bg {
                        break;
                    }
                    end += 1;
                }

                queue!(
                    out,
                    cursor::MoveTo(x as u16, y as u16),
                    SetForegroundColor(cur.fg),
                    SetBackgroundColor(cur.bg),
                )?;
                let run: String = cells[row_off + x..row_off + end].iter().map(|c| c.ch).collect();
                queue!(out, Print(run))?;
                self.prev[row_off + x..row_off + end].copy_from_slice(&cells[row_off + x..row_off + end]);
                written += end - x;
                x = end;
            }
        }
        queue!(out, ResetColor, EndSynchronizedUpdate)?;
        out.flush()?;
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BG: Rgb = Rgb::new(0, 0, 0);
    const WHITE: Rgb = Rgb::new(255, 255, 255);

    #[test]
    fn canvas_rows_pair_into_half_blocks() {
        let mut canvas = Canvas::new(4, 4, 1.0, BG);
        canvas.fill_circle([1.5, 0.5], 0.5, WHITE, 1.0);
        let mut frame = Frame::new(4, 3, BG);
        frame.blit_canvas(&canvas, 1);

        let cell = frame.cell(1, 1).expect("inside frame");
        assert_eq!(cell.ch, HALF_BLOCK);
        assert_eq!(cell.fg, WHITE.to_color());
        assert_eq!(cell.bg, BG.to_color());
        assert_eq!(frame.cell(0, 1).map(|c| c.ch), Some(' '));
        // Row 0 is left for the nav bar
        assert_eq!(frame.cell(1, 0).map(|c| c.bg), Some(BG.to_color()));
    }

    #[test]
    fn text_is_clipped_at_the_edge() {
        let mut frame = Frame::new(5, 1, BG);
        frame.put_str(3, 0, "hello", WHITE);
        assert_eq!(frame.cell(3, 0).map(|c| c.ch), Some('h'));
        assert_eq!(frame.cell(4, 0).map(|c| c.ch), Some('e'));
        frame.put_str(0, 7, "ignored", WHITE);
    }

    #[test]
    fn wide_characters_take_one_cell() {
        let mut frame = Frame::new(6, 1, BG);
        frame.put_str(0, 0, "a\u{6f22}b\u{1f600}c", WHITE);
        let row: String = (0..6).filter_map(|x| frame.cell(x, 0).map(|c| c.ch)).collect();
        assert_eq!(row, "a?b?c ");
        assert!(is_narrow('x') && is_narrow('\u{e9}'));
        assert!(!is_narrow('\t') && !is_narrow('\u{ff21}') && !is_narrow('\u{301}'));
    }

    #[test]
    fn unchanged_frame_writes_nothing() {
        let mut renderer = Renderer::new(6, 2);
        let mut frame = Frame::new(6, 2, BG);
        frame.put_str(0, 0, "scan", WHITE);
        let mut out = Vec::new();

        assert_eq!(renderer.draw(&mut out, &frame).expect("draw"), 12);
        assert_eq!(renderer.draw(&mut out, &frame).expect("draw"), 0);

        frame.put_str(0, 1, "x", WHITE);
        assert_eq!(renderer.draw(&mut out, &frame).expect("draw"), 1);
    }
}
