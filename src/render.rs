use anyhow::Context;
use crossterm::{
    cursor,
    event::{DisableFocusChange, EnableFocusChange},
    execute, queue,
    style::{
        Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor,
        SetForegroundColor,
    },
    terminal::{
        self, BeginSynchronizedUpdate, Clear, ClearType, DisableLineWrap, EnableLineWrap,
        EndSynchronizedUpdate, EnterAlternateScreen, LeaveAlternateScreen,
    },
};
use std::io::{self, Write};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Cell {
    pub(crate) ch: char,
    pub(crate) fg: Color,
    pub(crate) bg: Color,
    pub(crate) bold: bool,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            fg: Color::White,
            bg: Color::Reset,
            bold: false,
        }
    }
}

pub(crate) struct CellBuffer {
    pub(crate) w: u16,
    pub(crate) h: u16,
    pub(crate) cells: Vec<Cell>,
}

impl CellBuffer {
    pub(crate) fn new(w: u16, h: u16) -> Self {
        Self {
            w,
            h,
            cells: vec![Cell::default(); (w as usize) * (h as usize)],
        }
    }
    pub(crate) fn idx(&self, x: u16, y: u16) -> usize {
        (y as usize) * (self.w as usize) + (x as usize)
    }
    pub(crate) fn set(&mut self, x: u16, y: u16, c: Cell) {
        if x < self.w && y < self.h {
            let i = self.idx(x, y);
            self.cells[i] = c;
        }
    }
    pub(crate) fn get(&self, x: u16, y: u16) -> Option<Cell> {
        if x < self.w && y < self.h {
            Some(self.cells[self.idx(x, y)])
        } else {
            None
        }
    }
    pub(crate) fn clear(&mut self, bg: Color) {
        self.cells.fill(Cell {
            bg,
            ..Cell::default()
        });
    }
}

pub(crate) struct Terminal {
    pub(crate) out: io::Stdout,
    pub(crate) cols: u16,
    pub(crate) rows: u16,
    pub(crate) prev: CellBuffer,
    pub(crate) cur: CellBuffer,
}

impl Terminal {
    pub(crate) fn begin() -> anyhow::Result<Self> {
        let mut out = io::stdout();
        execute!(
            out,
            EnterAlternateScreen,
            EnableFocusChange,
            cursor::Hide,
            DisableLineWrap,
            terminal::Clear(ClearType::All)
        )
        .context("entering the alternate screen")?;
        terminal::enable_raw_mode().context("enabling raw mode")?;

        let (cols, rows) = terminal::size()?;
        Ok(Self {
            out,
            cols,
            rows,
            prev: CellBuffer::new(cols, rows),
            cur: CellBuffer::new(cols, rows),
        })
    }

    pub(crate) fn end(&mut self) -> anyhow::Result<()> {
        queue!(
            self.out,
            BeginSynchronizedUpdate,
            ResetColor,
            SetAttribute(Attribute::Reset),
            Clear(ClearType::All),
            cursor::Show,
            EnableLineWrap,
            DisableFocusChange,
            EndSynchronizedUpdate,
            LeaveAlternateScreen
        )?;
        self.out.flush()?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    pub(crate) fn resize_if_needed(&mut self) -> anyhow::Result<bool> {
        let (c, r) = terminal::size()?;
        if c == self.cols && r == self.rows {
            return Ok(false);
        }
        self.cols = c;
        self.rows = r;
        self.prev = CellBuffer::new(c, r);
        self.cur = CellBuffer::new(c, r);
        queue!(self.out, Clear(ClearType::All))?;
        Ok(true)
    }

    pub(crate) fn present(&mut self, diff_only: bool) -> anyhow::Result<()> {
        queue!(self.out, BeginSynchronizedUpdate)?;

        let mut last_fg = None;
        let mut last_bg = None;
        let mut last_bold = None;

        for y in 0..self.rows {
            for x in 0..self.cols {
                let i = self.cur.idx(x, y);
                let c = self.cur.cells[i];
                if diff_only && c == self.prev.cells[i] {
                    continue;
                }

                queue!(self.out, cursor::MoveTo(x, y))?;

                if last_bold != Some(c.bold) {
                    let attr = if c.bold {
                        Attribute::Bold
                    } else {
                        Attribute::NormalIntensity
                    };
                    queue!(self.out, SetAttribute(attr))?;
                    last_bold = Some(c.bold);
                }
                if last_fg != Some(c.fg) {
                    queue!(self.out, SetForegroundColor(c.fg))?;
                    last_fg = Some(c.fg);
                }
                if last_bg != Some(c.bg) {
                    queue!(self.out, SetBackgroundColor(c.bg))?;
                    last_bg = Some(c.bg);
                }

                queue!(self.out, Print(c.ch))?;
            }
        }

        queue!(
            self.out,
            ResetColor,
            SetAttribute(Attribute::Reset),
            EndSynchronizedUpdate
        )?;
        self.out.flush()?;
        self.prev.cells.copy_from_slice(&self.cur.cells);
        Ok(())
    }
}

pub(crate) fn draw_text(buf: &mut CellBuffer, x: u16, y: u16, s: &str, fg: Color, bg: Color) {
    let mut xx = x;
    for ch in s.chars() {
        if xx >= buf.w {
            break;
        }
        buf.set(
            xx,
            y,
            Cell {
                ch,
                fg,
                bg,
                bold: false,
            },
        );
        xx += 1;
    }
}

/* -----------------------------
   Clock face: 3×5 block digits
------------------------------ */

pub(crate) const DIGIT_W: u16 = 3;
pub(crate) const DIGIT_H: u16 = 5;
const DIGIT_GAP: u16 = 1;
const PAIR_GAP: u16 = 3;

// one row per entry, bit 2 = left column
const FONT: [[u8; 5]; 10] = [
    [0b111, 0b101, 0b101, 0b101, 0b111],
    [0b010, 0b110, 0b010, 0b010, 0b111],
    [0b111, 0b001, 0b111, 0b100, 0b111],
    [0b111, 0b001, 0b111, 0b001, 0b111],
    [0b101, 0b101, 0b111, 0b001, 0b001],
    [0b111, 0b100, 0b111, 0b001, 0b111],
    [0b111, 0b100, 0b111, 0b101, 0b111],
    [0b111, 0b001, 0b010, 0b010, 0b010],
    [0b111, 0b101, 0b111, 0b101, 0b111],
    [0b111, 0b101, 0b111, 0b001, 0b111],
];

/// Width of the six-digit face including the separators.
pub(crate) fn clock_width() -> u16 {
    6 * DIGIT_W + 3 * DIGIT_GAP + 2 * PAIR_GAP
}

pub(crate) fn draw_clock(buf: &mut CellBuffer, x0: u16, y0: u16, digits: &[char; 6], fg: Color) {
    let mut x = x0;
    for (i, ch) in digits.iter().enumerate() {
        let Some(d) = ch.to_digit(10) else { continue };
        for (row, bits) in FONT[d as usize].iter().enumerate() {
            for col in 0..DIGIT_W {
                if bits & (0b100 >> col) != 0 {
                    buf.set(
                        x + col,
                        y0 + row as u16,
                        Cell {
                            ch: '█',
                            fg,
                            bg: Color::Reset,
                            bold: true,
                        },
                    );
                }
            }
        }
        x += DIGIT_W;
        match i {
            1 | 3 => {
                let cx = x + PAIR_GAP / 2;
                for dy in [1, 3] {
                    buf.set(
                        cx,
                        y0 + dy,
                        Cell {
                            ch: '•',
                            fg,
                            bg: Color::Reset,
                            bold: false,
                        },
                    );
                }
                x += PAIR_GAP;
            }
            5 => {}
            _ => x += DIGIT_GAP,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_face_fits_its_width() {
        let w = clock_width();
        let mut buf = CellBuffer::new(w, DIGIT_H);
        draw_clock(&mut buf, 0, 0, &['8', '8', '8', '8', '8', '8'], Color::White);

        // last column of the last digit is lit, so nothing was clipped
        assert_eq!(buf.get(w - 1, 0).map(|c| c.ch), Some('█'));
        // colon between hours and minutes
        assert_eq!(buf.get(2 * DIGIT_W + DIGIT_GAP + 1, 1).map(|c| c.ch), Some('•'));
    }

    #[test]
    fn one_has_a_hollow_corner() {
        let mut buf = CellBuffer::new(clock_width(), DIGIT_H);
        draw_clock(&mut buf, 0, 0, &['1', '0', '0', '0', '0', '0'], Color::White);
        assert_eq!(buf.get(0, 0).map(|c| c.ch), Some(' '));
        assert_eq!(buf.get(1, 0).map(|c| c.ch), Some('█'));
    }

    #[test]
    fn text_is_clipped_at_the_edge() {
        let mut buf = CellBuffer::new(4, 1);
        draw_text(&mut buf, 2, 0, "abcdef", Color::White, Color::Reset);
        let row: String = buf.cells.iter().map(|c| c.ch).collect();
        assert_eq!(row, "  ab");
    }
}
