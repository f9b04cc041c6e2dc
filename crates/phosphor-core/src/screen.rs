const MAX_SCROLLBACK: usize = 5_000;

/// Fixed-size character surface owned by a captured app.
///
/// Apps redraw the whole grid on every change: `clear` then absolute
/// `put`s. Writes past the right or bottom edge are clipped.
#[derive(Debug, Clone)]
pub struct Grid {
    cols: u16,
    rows: u16,
    cells: Vec<char>,
}

impl Grid {
    pub fn new(cols: u16, rows: u16) -> Self {
        Self {
            cols,
            rows,
            cells: vec![' '; cols as usize * rows as usize],
        }
    }

    pub fn cols(&self) -> u16 {
        self.cols
    }

    pub fn rows(&self) -> u16 {
        self.rows
    }

    pub fn clear(&mut self) {
        self.cells.fill(' ');
    }

    pub fn resize(&mut self, cols: u16, rows: u16) {
        *self = Grid::new(cols, rows);
    }

    pub fn put(&mut self, col: u16, row: u16, text: &str) {
        if row >= self.rows {
            return;
        }
        let start = row as usize * self.cols as usize;
        for (i, c) in text.chars().enumerate() {
            let x = col as usize + i;
            if x >= self.cols as usize {
                break;
            }
            self.cells[start + x] = c;
        }
    }

    pub fn row_text(&self, row: u16) -> String {
        if row >= self.rows {
            return String::new();
        }
        let start = row as usize * self.cols as usize;
        self.cells[start..start + self.cols as usize].iter().collect()
    }

    pub fn lines(&self) -> Vec<String> {
        (0..self.rows).map(|r| self.row_text(r)).collect()
    }
}

/// Everything the shell shows: a scrollback of text lines whose last line is
/// the live one, plus the full-screen grid used while an app is captured.
#[derive(Debug, Clone)]
pub struct Screen {
    lines: Vec<String>,
    /// Lines scrolled back from the bottom.
    scroll: usize,
    grid: Grid,
    fullscreen: bool,
}

impl Screen {
    pub fn new(cols: u16, rows: u16) -> Self {
        Self {
            lines: vec![String::new()],
            scroll: 0,
            grid: Grid::new(cols, rows),
            fullscreen: false,
        }
    }

    pub fn write(&mut self, text: &str) {
        for c in text.chars() {
            if c == '\n' {
                self.lines.push(String::new());
            } else if let Some(live) = self.lines.last_mut() {
                live.push(c);
            }
        }
        if self.lines.len() > MAX_SCROLLBACK {
            let excess = self.lines.len() - MAX_SCROLLBACK;
            self.lines.drain(..excess);
        }
    }

    pub fn writeln(&mut self, text: &str) {
        self.write(text);
        self.write("\n");
    }

    /// Erase sequence: drop the last `n` characters of the live line.
    pub fn erase(&mut self, n: usize) {
        if let Some(live) = self.lines.last_mut() {
            for _ in 0..n {
                if live.pop().is_none() {
                    break;
                }
            }
        }
    }

    pub fn clear(&mut self) {
        self.lines = vec![String::new()];
        self.scroll = 0;
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn live_line(&self) -> &str {
        self.lines.last().map(String::as_str).unwrap_or("")
    }

    /// Whole scrollback joined with newlines.
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    pub fn scroll_by(&mut self, delta: i32) {
        let max = self.lines.len().saturating_sub(1) as i64;
        self.scroll = (self.scroll as i64 + delta as i64).clamp(0, max) as usize;
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll = 0;
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll
    }

    pub fn at_bottom(&self) -> bool {
        self.scroll == 0
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    pub fn enter_fullscreen(&mut self) {
        self.grid.clear();
        self.fullscreen = true;
    }

    pub fn leave_fullscreen(&mut self) {
        self.grid.clear();
        self.fullscreen = false;
    }

    pub fn resize(&mut self, cols: u16, rows: u16) {
        self.grid.resize(cols, rows);
    }
}

impl Default for Screen {
    fn default() -> Self {
        Self::new(80, 24)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_splits_on_newlines() {
        let mut s = Screen::new(80, 24);
        s.write("one\ntwo");
        assert_eq!(s.lines(), &["one".to_string(), "two".to_string()]);
        assert_eq!(s.live_line(), "two");
    }

    #[test]
    fn erase_stops_at_line_start() {
        let mut s = Screen::new(80, 24);
        s.write("ab\ncd");
        s.erase(5);
        assert_eq!(s.live_line(), "");
        assert_eq!(s.lines()[0], "ab");
    }

    #[test]
    fn scroll_is_clamped() {
        let mut s = Screen::new(80, 24);
        s.write("a\nb\nc");
        s.scroll_by(10);
        assert_eq!(s.scroll_offset(), 2);
        assert!(!s.at_bottom());
        s.scroll_by(-10);
        assert!(s.at_bottom());
    }

    #[test]
    fn scrollback_is_bounded() {
        let mut s = Screen::new(80, 24);
        for _ in 0..(MAX_SCROLLBACK + 10) {
            s.writeln("x");
        }
        assert_eq!(s.lines().len(), MAX_SCROLLBACK);
    }

    #[test]
    fn grid_put_clips_at_edges() {
        let mut g = Grid::new(4, 2);
        g.put(2, 0, "abcdef");
        g.put(0, 5, "ignored");
        assert_eq!(g.row_text(0), "  ab");
        assert_eq!(g.row_text(1), "    ");
    }

    #[test]
    fn leaving_fullscreen_clears_the_grid() {
        let mut s = Screen::new(10, 3);
        s.enter_fullscreen();
        s.grid_mut().put(0, 0, "vim");
        s.leave_fullscreen();
        assert!(!s.is_fullscreen());
        assert_eq!(s.grid().row_text(0).trim(), "");
    }
}
