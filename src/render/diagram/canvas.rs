//! Character canvas backed by a flat row-major buffer.

use std::fmt;

pub const HORIZONTAL: char = '─';
pub const VERTICAL: char = '│';
pub const TOP_LEFT: char = '┌';
pub const TOP_RIGHT: char = '┐';
pub const BOTTOM_LEFT: char = '└';
pub const BOTTOM_RIGHT: char = '┘';
pub const TEE_RIGHT: char = '├';
pub const TEE_LEFT: char = '┤';
pub const ARROW_LEFT: char = '◄';

/// A fixed-size grid of characters. Writes outside the grid are ignored.
pub struct Canvas {
    width: usize,
    height: usize,
    cells: Vec<char>,
}

impl Canvas {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![' '; width * height],
        }
    }

    fn index(&self, x: usize, y: usize) -> Option<usize> {
        (x < self.width && y < self.height).then(|| y * self.width + x)
    }

    pub fn get(&self, x: usize, y: usize) -> char {
        self.index(x, y).map_or(' ', |i| self.cells[i])
    }

    /// Unconditional write
    pub fn set(&mut self, x: usize, y: usize, ch: char) {
        if let Some(i) = self.index(x, y) {
            self.cells[i] = ch;
        }
    }

    /// Write a string starting at `(x, y)`, one cell per char
    pub fn text(&mut self, x: usize, y: usize, s: &str) {
        for (offset, ch) in s.chars().enumerate() {
            self.set(x + offset, y, ch);
        }
    }

    /// Plain line segment: only fills blank cells
    pub fn line(&mut self, x: usize, y: usize, ch: char) {
        if self.get(x, y) == ' ' {
            self.set(x, y, ch);
        }
    }

    /// Corner or arrowhead: may replace blanks and plain line segments only
    pub fn glyph(&mut self, x: usize, y: usize, ch: char) {
        if matches!(self.get(x, y), ' ' | HORIZONTAL | VERTICAL) {
            self.set(x, y, ch);
        }
    }

    pub fn hline(&mut self, from_x: usize, to_x: usize, y: usize) {
        for x in from_x.min(to_x)..=from_x.max(to_x) {
            self.line(x, y, HORIZONTAL);
        }
    }

    pub fn vline(&mut self, x: usize, from_y: usize, to_y: usize) {
        for y in from_y.min(to_y)..=from_y.max(to_y) {
            self.line(x, y, VERTICAL);
        }
    }
}

impl fmt::Display for Canvas {
    /// Rows joined by newlines, trailing spaces trimmed
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (y, row) in self.cells.chunks(self.width.max(1)).enumerate() {
            if y > 0 {
                writeln!(f)?;
            }
            let line: String = row.iter().collect();
            write!(f, "{}", line.trim_end())?;
        }
        Ok(())
    }
}
