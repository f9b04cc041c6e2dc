use crate::focus::{AppContext, Exit, Flow, ModalApp};
use crate::input::{Key, KeyEvent};
use crate::screen::Grid;

const EXIT_NOTE: &str = "The user exited the pager.";

/// `less`-style viewer. The last grid row is the status line.
#[derive(Debug)]
pub struct PagerApp {
    title: String,
    lines: Vec<String>,
    offset: usize,
}

impl PagerApp {
    pub fn new(title: impl Into<String>, text: &str) -> Self {
        Self {
            title: title.into(),
            lines: text.lines().map(str::to_string).collect(),
            offset: 0,
        }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Move by `delta` lines, keeping the offset in `[0, len - view]`.
    pub fn scroll(&mut self, delta: i64, view: usize) {
        let max = self.lines.len().saturating_sub(view) as i64;
        self.offset = (self.offset as i64 + delta).clamp(0, max) as usize;
    }
}

impl ModalApp for PagerApp {
    fn name(&self) -> &str {
        "less"
    }

    fn render(&self, grid: &mut Grid) {
        let view = grid.rows().saturating_sub(1) as usize;
        for (r, line) in self.lines.iter().skip(self.offset).take(view).enumerate() {
            grid.put(0, r as u16, line);
        }
        let last = (self.offset + view).min(self.lines.len());
        let status = if last >= self.lines.len() {
            format!("{} (END)", self.title)
        } else {
            format!(
                "{} lines {}-{} of {}",
                self.title,
                self.offset + 1,
                last,
                self.lines.len()
            )
        };
        grid.put(0, view as u16, &status);
    }

    fn handle_key(&mut self, event: &KeyEvent, cx: &mut AppContext<'_>) -> Flow {
        if !event.is_down() {
            return Flow::Continue;
        }
        let view = cx.rows.saturating_sub(1) as usize;
        let page = view.max(1) as i64;
        match event.key {
            Key::Char('q') | Key::Escape => return Flow::Release(Exit::new(EXIT_NOTE)),
            Key::Char('j') | Key::Down | Key::Enter => self.scroll(1, view),
            Key::Char('k') | Key::Up => self.scroll(-1, view),
            Key::Char(' ') | Key::Char('f') | Key::PageDown => self.scroll(page, view),
            Key::Char('b') | Key::PageUp => self.scroll(-page, view),
            Key::Char('g') | Key::Home => self.offset = 0,
            Key::Char('G') | Key::End => self.scroll(i64::MAX / 2, view),
            _ => {}
        }
        Flow::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::NullHost;
    use crate::store::SessionStore;

    fn text(n: usize) -> String {
        (1..=n).map(|i| format!("line {i}\n")).collect()
    }

    fn press(app: &mut PagerApp, key: Key, rows: u16) -> Flow {
        let mut host = NullHost;
        let mut store = SessionStore::new();
        let mut cx = AppContext {
            host: &mut host,
            store: &mut store,
            cols: 40,
            rows,
        };
        app.handle_key(&KeyEvent::down(key), &mut cx)
    }

    #[test]
    fn offset_stays_within_content() {
        let mut app = PagerApp::new("doc", &text(30));
        // 10 rows: 9 of text plus the status line
        press(&mut app, Key::Char('G'), 10);
        assert_eq!(app.offset(), 21);
        press(&mut app, Key::Char('j'), 10);
        assert_eq!(app.offset(), 21);
        press(&mut app, Key::Char('g'), 10);
        press(&mut app, Key::Char('k'), 10);
        assert_eq!(app.offset(), 0);
    }

    #[test]
    fn short_content_never_scrolls() {
        let mut app = PagerApp::new("doc", &text(3));
        press(&mut app, Key::Char(' '), 10);
        assert_eq!(app.offset(), 0);
    }

    #[test]
    fn paging_moves_a_screenful() {
        let mut app = PagerApp::new("doc", &text(30));
        press(&mut app, Key::PageDown, 10);
        assert_eq!(app.offset(), 9);
        press(&mut app, Key::Char('b'), 10);
        assert_eq!(app.offset(), 0);
    }

    #[test]
    fn q_releases() {
        let mut app = PagerApp::new("doc", &text(3));
        assert_eq!(press(&mut app, Key::Char('q'), 10), Flow::Release(Exit::new(EXIT_NOTE)));
    }

    #[test]
    fn render_shows_window_and_status() {
        let mut app = PagerApp::new("doc", &text(30));
        app.scroll(2, 4);
        let mut grid = Grid::new(30, 5);
        app.render(&mut grid);
        assert_eq!(grid.row_text(0).trim_end(), "line 3");
        assert_eq!(grid.row_text(4).trim_end(), "doc lines 3-6 of 30");

        app.scroll(100, 4);
        grid.clear();
        app.render(&mut grid);
        assert_eq!(grid.row_text(3).trim_end(), "line 30");
        assert_eq!(grid.row_text(4).trim_end(), "doc (END)");
    }
}
