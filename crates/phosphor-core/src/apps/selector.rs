use crate::focus::{AppContext, Exit, Flow, ModalApp};
use crate::input::{Key, KeyEvent};
use crate::screen::Grid;
use crate::theme::THEMES;

const EXIT_NOTE: &str = "The user exited the theme selector.";

/// Theme picker. Previews apply immediately; cancelling puts the committed
/// theme back.
#[derive(Debug)]
pub struct SelectorApp {
    index: usize,
}

impl SelectorApp {
    pub fn new(committed: usize) -> Self {
        Self {
            index: committed % THEMES.len(),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

impl ModalApp for SelectorApp {
    fn name(&self) -> &str {
        "theme"
    }

    fn render(&self, grid: &mut Grid) {
        grid.put(2, 1, "SELECT THEME");
        for (i, theme) in THEMES.iter().enumerate() {
            let marker = if i == self.index { ">" } else { " " };
            grid.put(2, 3 + i as u16, &format!("{marker} {}", theme.name));
        }
        grid.put(
            2,
            grid.rows().saturating_sub(1),
            "up/down move  p preview  enter apply  esc cancel",
        );
    }

    fn handle_key(&mut self, event: &KeyEvent, cx: &mut AppContext<'_>) -> Flow {
        if !event.is_down() {
            return Flow::Continue;
        }
        let count = THEMES.len();
        match event.key {
            Key::Up | Key::Char('k') => self.index = (self.index + count - 1) % count,
            Key::Down | Key::Char('j') => self.index = (self.index + 1) % count,
            Key::Char('p') | Key::Char(' ') => {
                cx.store.preview_theme(self.index);
                THEMES[self.index].apply(cx.host);
            }
            Key::Enter => {
                cx.store.commit_theme(self.index);
                let theme = &THEMES[self.index];
                theme.apply(cx.host);
                return Flow::Release(
                    Exit::new(EXIT_NOTE).with_message(format!("theme set to {}", theme.name)),
                );
            }
            Key::Escape | Key::Char('q') => {
                cx.store.revert_theme();
                THEMES[cx.store.active_theme()].apply(cx.host);
                return Flow::Release(Exit::new(EXIT_NOTE));
            }
            _ => {}
        }
        Flow::Continue
    }
}
