use crate::host::Host;
use crate::input::KeyEvent;
use crate::screen::Grid;
use crate::store::SessionStore;
use tracing::{debug, warn};

/// What a captured app may touch while it handles a key.
pub struct AppContext<'a> {
    pub host: &'a mut dyn Host,
    pub store: &'a mut SessionStore,
    pub cols: u16,
    pub rows: u16,
}

/// A full-screen sub-application that owns the keyboard while captured.
///
/// The arbiter only ever sees this capability set; it has no idea which
/// concrete app is running.
pub trait ModalApp: Send {
    fn name(&self) -> &str;

    /// Draw the whole visible region. The grid is already cleared.
    fn render(&self, grid: &mut Grid);

    /// Handle one key event, down or up. Returning [`Flow::Release`] is the
    /// app's only way to give the keyboard back, and every exit path must
    /// take it.
    fn handle_key(&mut self, event: &KeyEvent, cx: &mut AppContext<'_>) -> Flow;

    /// Grid position where the app draws its cursor; `None` hides it.
    fn cursor(&self, _grid: &Grid) -> Option<(u16, u16)> {
        None
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Release(Exit),
}

/// How a captured app left.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exit {
    /// System note appended to the conversation so the assistant knows.
    pub note: String,
    /// Line printed to the shell once the screen is back.
    pub message: Option<String>,
}

impl Exit {
    pub fn new(note: impl Into<String>) -> Self {
        Self {
            note: note.into(),
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

enum Focus {
    Shell,
    Captured(Box<dyn ModalApp>),
}

/// Decides where each key goes: the line editor, or the one captured app.
pub struct FocusArbiter {
    focus: Focus,
    /// Set while an app has said whether it wants the cursor; beats the
    /// scroll-driven default.
    cursor_override: Option<bool>,
}

impl FocusArbiter {
    pub fn new() -> Self {
        Self {
            focus: Focus::Shell,
            cursor_override: None,
        }
    }

    /// Install `app` as the sole key recipient. Capturing while another app
    /// is captured replaces it; the old app receives nothing further.
    pub fn capture(&mut self, app: Box<dyn ModalApp>) {
        if let Focus::Captured(old) = &self.focus {
            warn!(old = old.name(), new = app.name(), "capture replaces active app");
        }
        debug!(app = app.name(), "focus captured");
        self.focus = Focus::Captured(app);
        self.cursor_override = None;
    }

    /// Give focus back to the shell. Only called when the captured app asks
    /// for it by returning [`Flow::Release`].
    pub fn release(&mut self) -> Option<Box<dyn ModalApp>> {
        self.cursor_override = None;
        match std::mem::replace(&mut self.focus, Focus::Shell) {
            Focus::Captured(app) => {
                debug!(app = app.name(), "focus released");
                Some(app)
            }
            Focus::Shell => None,
        }
    }

    pub fn is_captured(&self) -> bool {
        matches!(self.focus, Focus::Captured(_))
    }

    pub fn captured_name(&self) -> Option<&str> {
        match &self.focus {
            Focus::Captured(app) => Some(app.name()),
            Focus::Shell => None,
        }
    }

    /// Route a key to the captured app. `None` means the shell has focus.
    /// Auto-repeated key-downs are swallowed here.
    pub fn deliver(&mut self, event: &KeyEvent, cx: &mut AppContext<'_>) -> Option<Flow> {
        let Focus::Captured(app) = &mut self.focus else {
            return None;
        };
        if event.is_down() && event.repeat {
            return Some(Flow::Continue);
        }
        Some(app.handle_key(event, cx))
    }

    /// Full redraw of the captured app, then sync the cursor override with
    /// what the app asked for.
    pub fn redraw(&mut self, grid: &mut Grid) {
        let Focus::Captured(app) = &self.focus else {
            return;
        };
        grid.clear();
        app.render(grid);
        let wants_cursor = app.cursor(grid).is_some();
        self.cursor_override = Some(wants_cursor);
    }

    pub fn app_cursor(&self, grid: &Grid) -> Option<(u16, u16)> {
        match &self.focus {
            Focus::Captured(app) => app.cursor(grid),
            Focus::Shell => None,
        }
    }

    pub fn cursor_override(&self) -> Option<bool> {
        self.cursor_override
    }

    /// Per-frame cursor visibility. Without an override the cursor shows
    /// only when the scrollback is at the bottom.
    pub fn cursor_visible(&self, at_bottom: bool) -> bool {
        self.cursor_override.unwrap_or(at_bottom)
    }
}

impl Default for FocusArbiter {
    fn default() -> Self {
        Self::new()
    }
}
