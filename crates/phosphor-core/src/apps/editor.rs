use crate::focus::{AppContext, Exit, Flow, ModalApp};
use crate::input::{Key, KeyEvent};
use crate::screen::Grid;

const EXIT_NOTE: &str = "The user exited the vim editor.";
const NO_WRITE: &str = "E37: No write since last change (add ! to override)";
const HELP_HINT: &str = "hint: :wq saves and quits, :q! quits without saving";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Normal,
    Insert,
    CommandLine,
}

/// What the surrounding app must do after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    None,
    /// Copy the buffer into the process-wide slot.
    Persist,
    Exit {
        persist: bool,
        message: Option<String>,
    },
}

/// The editor's whole state. Columns count characters, not bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorState {
    pub mode: Mode,
    pub lines: Vec<String>,
    pub row: usize,
    pub col: usize,
    /// Pending `:` command text.
    pub command: String,
    pub dirty: bool,
    /// Message shown on the status line until the next `:`.
    pub status: Option<String>,
}

impl EditorState {
    pub fn with_buffer(lines: Vec<String>) -> Self {
        let lines = if lines.is_empty() {
            vec![String::new()]
        } else {
            lines
        };
        Self {
            mode: Mode::Normal,
            lines,
            row: 0,
            col: 0,
            command: String::new(),
            dirty: false,
            status: None,
        }
    }

    /// Apply one key. Pure: the returned effect is the only way the outside
    /// world hears about it.
    pub fn step(mut self, key: &Key) -> (Self, Effect) {
        let effect = match self.mode {
            Mode::Normal => {
                self.normal(key);
                Effect::None
            }
            Mode::Insert => {
                self.insert(key);
                Effect::None
            }
            Mode::CommandLine => self.command_line(key),
        };
        (self, effect)
    }

    fn row_len(&self) -> usize {
        self.lines[self.row].chars().count()
    }

    fn move_row(&mut self, delta: isize) {
        let last = self.lines.len() - 1;
        self.row = self.row.saturating_add_signed(delta).min(last);
        self.col = self.col.min(self.row_len());
    }

    fn move_cursor(&mut self, key: &Key) {
        match key {
            Key::Left => self.col = self.col.saturating_sub(1),
            Key::Right => self.col = (self.col + 1).min(self.row_len()),
            Key::Down => self.move_row(1),
            Key::Up => self.move_row(-1),
            _ => {}
        }
    }

    fn normal(&mut self, key: &Key) {
        match key {
            Key::Char('i') => self.mode = Mode::Insert,
            Key::Char('a') => {
                self.col = (self.col + 1).min(self.row_len());
                self.mode = Mode::Insert;
            }
            Key::Char('o') => {
                self.lines.insert(self.row + 1, String::new());
                self.row += 1;
                self.col = 0;
                self.dirty = true;
                self.mode = Mode::Insert;
            }
            Key::Char('O') => {
                self.lines.insert(self.row, String::new());
                self.col = 0;
                self.dirty = true;
                self.mode = Mode::Insert;
            }
            Key::Char('x') => {
                let len = self.row_len();
                if len > 0 {
                    let line = &mut self.lines[self.row];
                    let at = byte_index(line, self.col.min(len - 1));
                    line.remove(at);
                    self.dirty = true;
                }
                self.col = self.col.min(self.row_len().saturating_sub(1));
            }
            Key::Char('d') => {
                if self.lines.len() > 1 {
                    self.lines.remove(self.row);
                    self.row = self.row.min(self.lines.len() - 1);
                    self.col = self.col.min(self.row_len());
                    self.dirty = true;
                }
            }
            Key::Char('h') => self.move_cursor(&Key::Left),
            Key::Char('l') => self.move_cursor(&Key::Right),
            Key::Char('j') => self.move_cursor(&Key::Down),
            Key::Char('k') => self.move_cursor(&Key::Up),
            Key::Char(':') => {
                self.mode = Mode::CommandLine;
                self.command.clear();
                self.status = None;
            }
            other => self.move_cursor(other),
        }
    }

    fn insert(&mut self, key: &Key) {
        match key {
            Key::Escape => {
                self.mode = Mode::Normal;
                self.col = self.col.saturating_sub(1);
            }
            Key::Enter => {
                let line = &mut self.lines[self.row];
                let at = byte_index(line, self.col);
                let rest = line.split_off(at);
                self.lines.insert(self.row + 1, rest);
                self.row += 1;
                self.col = 0;
                self.dirty = true;
            }
            Key::Backspace => {
                if self.col > 0 {
                    let line = &mut self.lines[self.row];
                    let at = byte_index(line, self.col - 1);
                    line.remove(at);
                    self.col -= 1;
                    self.dirty = true;
                } else if self.row > 0 {
                    let current = self.lines.remove(self.row);
                    self.row -= 1;
                    self.col = self.row_len();
                    self.lines[self.row].push_str(&current);
                    self.dirty = true;
                }
            }
            Key::Char(c) if !c.is_control() => {
                let line = &mut self.lines[self.row];
                let at = byte_index(line, self.col);
                line.insert(at, *c);
                self.col += 1;
                self.dirty = true;
            }
            other => self.move_cursor(other),
        }
    }

    fn command_line(&mut self, key: &Key) -> Effect {
        match key {
            Key::Escape => {
                self.command.clear();
                self.mode = Mode::Normal;
                Effect::None
            }
            Key::Backspace => {
                if self.command.pop().is_none() {
                    self.mode = Mode::Normal;
                }
                Effect::None
            }
            Key::Enter => {
                let command = std::mem::take(&mut self.command);
                self.mode = Mode::Normal;
                self.execute(command.trim())
            }
            Key::Char(c) if !c.is_control() => {
                self.command.push(*c);
                Effect::None
            }
            _ => Effect::None,
        }
    }

    fn execute(&mut self, command: &str) -> Effect {
        match command {
            "" => Effect::None,
            "q" | "quit" if self.dirty => {
                self.status = Some(NO_WRITE.to_string());
                Effect::None
            }
            "q" | "quit" | "q!" | "quit!" => Effect::Exit {
                persist: false,
                message: None,
            },
            "w" | "write" => {
                self.dirty = false;
                self.status = Some(format!("\"buffer\" {}L written", self.lines.len()));
                Effect::Persist
            }
            "wq" | "wq!" | "x" | "x!" => {
                self.dirty = false;
                Effect::Exit {
                    persist: true,
                    message: None,
                }
            }
            "help" => Effect::Exit {
                persist: false,
                message: Some(HELP_HINT.to_string()),
            },
            other => {
                self.status = Some(format!("E492: Not an editor command: {other}"));
                Effect::None
            }
        }
    }

    /// First buffer row shown when `height` rows are visible.
    fn top(&self, height: usize) -> usize {
        (self.row + 1).saturating_sub(height.max(1))
    }
}

impl Default for EditorState {
    fn default() -> Self {
        Self::with_buffer(Vec::new())
    }
}

fn byte_index(s: &str, col: usize) -> usize {
    s.char_indices().nth(col).map(|(i, _)| i).unwrap_or(s.len())
}

/// The vim trap: a modal editor that only lets go through `:q` and friends.
pub struct EditorApp {
    state: EditorState,
}

impl EditorApp {
    pub fn new(buffer: Vec<String>) -> Self {
        Self {
            state: EditorState::with_buffer(buffer),
        }
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }
}

impl ModalApp for EditorApp {
    fn name(&self) -> &str {
        "vim"
    }

    fn render(&self, grid: &mut Grid) {
        let height = grid.rows().saturating_sub(1) as usize;
        let top = self.state.top(height);
        for r in 0..height {
            match self.state.lines.get(top + r) {
                Some(line) => grid.put(0, r as u16, line),
                None => grid.put(0, r as u16, "~"),
            }
        }

        let status_row = height as u16;
        match self.state.mode {
            Mode::CommandLine => grid.put(0, status_row, &format!(":{}", self.state.command)),
            Mode::Insert => grid.put(0, status_row, "-- INSERT --"),
            Mode::Normal => {
                if let Some(status) = &self.state.status {
                    grid.put(0, status_row, status);
                }
            }
        }
        let position = format!("{},{}", self.state.row + 1, self.state.col + 1);
        let x = grid.cols().saturating_sub(12);
        grid.put(x, status_row, &position);
    }

    fn handle_key(&mut self, event: &KeyEvent, cx: &mut AppContext<'_>) -> Flow {
        if !event.is_down() || event.ctrl {
            return Flow::Continue;
        }
        let (state, effect) = std::mem::take(&mut self.state).step(&event.key);
        self.state = state;

        match effect {
            Effect::None => Flow::Continue,
            Effect::Persist => {
                cx.store.persist_buffer(self.state.lines.clone());
                Flow::Continue
            }
            Effect::Exit { persist, message } => {
                if persist {
                    cx.store.persist_buffer(self.state.lines.clone());
                }
                let exit = Exit::new(EXIT_NOTE);
                Flow::Release(match message {
                    Some(m) => exit.with_message(m),
                    None => exit,
                })
            }
        }
    }

    fn cursor(&self, grid: &Grid) -> Option<(u16, u16)> {
        let height = grid.rows().saturating_sub(1) as usize;
        let last_col = grid.cols().saturating_sub(1) as usize;
        if self.state.mode == Mode::CommandLine {
            let x = (1 + self.state.command.chars().count()).min(last_col);
            return Some((x as u16, height as u16));
        }
        let y = self.state.row - self.state.top(height);
        Some((self.state.col.min(last_col) as u16, y as u16))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::NullHost;
    use crate::store::SessionStore;

    fn keys(s: &str) -> Vec<Key> {
        s.chars().map(Key::Char).collect()
    }

    fn run(mut state: EditorState, keys: &[Key]) -> (EditorState, Vec<Effect>) {
        let mut effects = Vec::new();
        for k in keys {
            let (next, effect) = state.step(k);
            state = next;
            if effect != Effect::None {
                effects.push(effect);
            }
        }
        (state, effects)
    }

    fn buffer(lines: &[&str]) -> EditorState {
        EditorState::with_buffer(lines.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn quit_is_refused_while_dirty() {
        let mut seq = keys("ix");
        seq.push(Key::Escape);
        seq.extend(keys(":q"));
        seq.push(Key::Enter);
        let (state, effects) = run(EditorState::default(), &seq);
        assert!(effects.is_empty());
        assert!(state.dirty);
        assert_eq!(state.mode, Mode::Normal);
        assert!(state.status.as_deref().unwrap_or_default().starts_with("E37"));

        let mut force = keys(":q!");
        force.push(Key::Enter);
        let (_, effects) = run(state, &force);
        assert_eq!(
            effects,
            vec![Effect::Exit {
                persist: false,
                message: None
            }]
        );
    }

    #[test]
    fn write_persists_and_clears_dirty() {
        let mut seq = keys("ihi");
        seq.push(Key::Escape);
        seq.extend(keys(":w"));
        seq.push(Key::Enter);
        let (state, effects) = run(EditorState::default(), &seq);
        assert_eq!(effects, vec![Effect::Persist]);
        assert!(!state.dirty);

        let mut quit = keys(":q");
        quit.push(Key::Enter);
        let (_, effects) = run(state, &quit);
        assert!(matches!(effects[0], Effect::Exit { persist: false, .. }));
    }

    #[test]
    fn write_quit_forms_persist_then_exit() {
        for form in ["wq", "wq!", "x", "x!"] {
            let mut seq = keys(&format!(":{form}"));
            seq.push(Key::Enter);
            let (_, effects) = run(buffer(&["a"]), &seq);
            assert!(
                matches!(effects.as_slice(), [Effect::Exit { persist: true, .. }]),
                "{form}"
            );
        }
    }

    #[test]
    fn help_exits_with_hint() {
        let mut seq = keys(":help");
        seq.push(Key::Enter);
        let (_, effects) = run(EditorState::default(), &seq);
        assert!(matches!(&effects[0], Effect::Exit { message: Some(m), .. } if m.contains(":q!")));
    }

    #[test]
    fn unknown_command_reports_and_returns_to_normal() {
        let mut seq = keys(":frobnicate");
        seq.push(Key::Enter);
        let (state, effects) = run(EditorState::default(), &seq);
        assert!(effects.is_empty());
        assert_eq!(state.mode, Mode::Normal);
        assert_eq!(
            state.status.as_deref(),
            Some("E492: Not an editor command: frobnicate")
        );
    }

    #[test]
    fn append_advances_clamped_to_line_end() {
        let (state, _) = run(buffer(&["ab"]), &keys("a"));
        assert_eq!((state.mode, state.col), (Mode::Insert, 1));
        let (state, _) = run(buffer(&[""]), &keys("a"));
        assert_eq!(state.col, 0);
    }

    #[test]
    fn open_line_below_and_above() {
        let (state, _) = run(buffer(&["one", "two"]), &keys("o"));
        assert_eq!(state.lines, vec!["one", "", "two"]);
        assert_eq!((state.row, state.col, state.dirty), (1, 0, true));

        let (state, _) = run(buffer(&["one", "two"]), &keys("jO"));
        assert_eq!(state.lines, vec!["one", "", "two"]);
        assert_eq!(state.row, 1);
    }

    #[test]
    fn x_deletes_under_cursor_and_clamps() {
        let (state, _) = run(buffer(&["abc"]), &keys("llx"));
        assert_eq!(state.lines[0], "ab");
        assert_eq!(state.col, 1);
        let (state, _) = run(buffer(&[""]), &keys("x"));
        assert!(!state.dirty);
    }

    #[test]
    fn d_keeps_the_last_row() {
        let (state, _) = run(buffer(&["a", "b"]), &keys("jd"));
        assert_eq!(state.lines, vec!["a"]);
        assert_eq!(state.row, 0);
        let (state, _) = run(state, &keys("d"));
        assert_eq!(state.lines, vec!["a"]);
    }

    #[test]
    fn vertical_movement_reclamps_column() {
        let (state, _) = run(buffer(&["long line", "ab"]), &keys("llllllj"));
        assert_eq!((state.row, state.col), (1, 2));
        let (state, _) = run(state, &[Key::Up]);
        assert_eq!(state.row, 0);
        let (state, _) = run(state, &keys("kkk"));
        assert_eq!(state.row, 0);
    }

    #[test]
    fn insert_enter_splits_and_backspace_joins() {
        let mut seq = keys("ll");
        seq.push(Key::Char('i'));
        seq.push(Key::Enter);
        let (state, _) = run(buffer(&["abcd"]), &seq);
        assert_eq!(state.lines, vec!["ab", "cd"]);
        assert_eq!((state.row, state.col), (1, 0));

        let (state, _) = run(state, &[Key::Backspace]);
        assert_eq!(state.lines, vec!["abcd"]);
        assert_eq!((state.row, state.col), (0, 2));
    }

    #[test]
    fn escape_steps_cursor_back() {
        let mut seq = keys("iab");
        seq.push(Key::Escape);
        let (state, _) = run(EditorState::default(), &seq);
        assert_eq!(state.lines[0], "ab");
        assert_eq!((state.mode, state.col), (Mode::Normal, 1));
    }

    #[test]
    fn command_line_backspace_on_empty_returns_to_normal() {
        let mut seq = keys(":w");
        seq.push(Key::Backspace);
        let (state, _) = run(EditorState::default(), &seq);
        assert_eq!(state.mode, Mode::CommandLine);
        let (state, _) = run(state, &[Key::Backspace]);
        assert_eq!(state.mode, Mode::Normal);
    }

    #[test]
    fn escape_discards_pending_command() {
        let mut seq = keys(":wq");
        seq.push(Key::Escape);
        let (state, effects) = run(EditorState::default(), &seq);
        assert!(effects.is_empty());
        assert_eq!(state.command, "");
        assert_eq!(state.mode, Mode::Normal);
    }

    #[test]
    fn multibyte_text_edits_by_character() {
        let mut seq = keys("ié");
        seq.push(Key::Char('e'));
        seq.push(Key::Backspace);
        let (state, _) = run(EditorState::default(), &seq);
        assert_eq!(state.lines[0], "é");
        assert_eq!(state.col, 1);
    }

    #[test]
    fn app_persists_on_write_and_releases_with_note() {
        let mut app = EditorApp::new(vec![String::new()]);
        let mut store = SessionStore::new();
        let mut host = NullHost;
        let mut cx = AppContext {
            host: &mut host,
            store: &mut store,
            cols: 40,
            rows: 10,
        };

        let mut flow = Flow::Continue;
        for c in "iok".chars() {
            app.handle_key(&KeyEvent::char(c), &mut cx);
        }
        app.handle_key(&KeyEvent::down(Key::Escape), &mut cx);
        for c in ":wq".chars() {
            flow = app.handle_key(&KeyEvent::char(c), &mut cx);
        }
        assert_eq!(flow, Flow::Continue);
        flow = app.handle_key(&KeyEvent::down(Key::Enter), &mut cx);

        assert_eq!(flow, Flow::Release(Exit::new(EXIT_NOTE)));
        assert_eq!(store.saved_buffer(), vec!["ok"]);
    }

    #[test]
    fn key_ups_are_ignored() {
        let mut app = EditorApp::new(Vec::new());
        let mut store = SessionStore::new();
        let mut host = NullHost;
        let mut cx = AppContext {
            host: &mut host,
            store: &mut store,
            cols: 40,
            rows: 10,
        };
        app.handle_key(&KeyEvent::up(Key::Char('i')), &mut cx);
        assert_eq!(app.state().mode, Mode::Normal);
    }

    #[test]
    fn render_fills_tildes_and_status() {
        let mut app = EditorApp::new(vec!["hello".into()]);
        app.state.status = Some("note".into());
        let mut grid = Grid::new(20, 4);
        app.render(&mut grid);
        assert_eq!(grid.row_text(0).trim_end(), "hello");
        assert_eq!(grid.row_text(1).trim_end(), "~");
        assert_eq!(grid.row_text(2).trim_end(), "~");
        assert!(grid.row_text(3).starts_with("note"));
        assert_eq!(app.cursor(&grid), Some((0, 0)));
    }

    #[test]
    fn cursor_follows_command_line() {
        let mut app = EditorApp::new(Vec::new());
        app.state.mode = Mode::CommandLine;
        app.state.command = "wq".into();
        let grid = Grid::new(20, 5);
        assert_eq!(app.cursor(&grid), Some((3, 4)));
    }

    #[test]
    fn cursor_stays_on_grid_for_wide_lines() {
        let mut app = EditorApp::new(vec!["x".repeat(30)]);
        app.state.col = 29;
        let grid = Grid::new(20, 5);
        assert_eq!(app.cursor(&grid), Some((19, 0)));

        app.state.mode = Mode::CommandLine;
        app.state.command = "y".repeat(40);
        assert_eq!(app.cursor(&grid), Some((19, 4)));
    }
}
