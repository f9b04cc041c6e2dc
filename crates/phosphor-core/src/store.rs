use crate::theme::THEMES;

/// Process-scoped state that outlives any single modal session: the editor's
/// saved buffer and the theme selection. Lives as long as the shell.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    saved_buffer: Option<Vec<String>>,
    committed_theme: usize,
    active_theme: usize,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The buffer left behind by the last write, or one empty line.
    pub fn saved_buffer(&self) -> Vec<String> {
        self.saved_buffer
            .clone()
            .unwrap_or_else(|| vec![String::new()])
    }

    pub fn persist_buffer(&mut self, lines: Vec<String>) {
        self.saved_buffer = Some(lines);
    }

    pub fn committed_theme(&self) -> usize {
        self.committed_theme
    }

    /// Theme currently on screen; differs from the committed one while a
    /// preview is showing.
    pub fn active_theme(&self) -> usize {
        self.active_theme
    }

    pub fn preview_theme(&mut self, index: usize) {
        self.active_theme = index % THEMES.len();
    }

    pub fn commit_theme(&mut self, index: usize) {
        self.committed_theme = index % THEMES.len();
        self.active_theme = self.committed_theme;
    }

    pub fn revert_theme(&mut self) {
        self.active_theme = self.committed_theme;
    }
}
