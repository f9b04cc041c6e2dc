/// Logical key, independent of the terminal backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Enter,
    Backspace,
    Tab,
    Escape,
    Up,
    Down,
    Left,
    Right,
    PageUp,
    PageDown,
    Home,
    End,
    /// Anything the shell has no binding for (function keys, media keys, …).
    Other(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Down,
    Up,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub phase: Phase,
    pub ctrl: bool,
    /// Auto-repeat of a key that is being held down.
    pub repeat: bool,
}

impl KeyEvent {
    pub fn down(key: Key) -> Self {
        Self {
            key,
            phase: Phase::Down,
            ctrl: false,
            repeat: false,
        }
    }

    pub fn up(key: Key) -> Self {
        Self {
            key,
            phase: Phase::Up,
            ctrl: false,
            repeat: false,
        }
    }

    pub fn char(c: char) -> Self {
        Self::down(Key::Char(c))
    }

    pub fn ctrl(c: char) -> Self {
        Self {
            ctrl: true,
            ..Self::down(Key::Char(c))
        }
    }

    pub fn repeated(mut self) -> Self {
        self.repeat = true;
        self
    }

    pub fn is_down(&self) -> bool {
        self.phase == Phase::Down
    }

    /// The printable character this event types, if any.
    pub fn printable(&self) -> Option<char> {
        match self.key {
            Key::Char(c) if !self.ctrl && !c.is_control() => Some(c),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Key(KeyEvent),
    Paste(String),
    /// Mouse wheel, in lines; positive scrolls back into history.
    Scroll(i32),
    Resize { cols: u16, rows: u16 },
}

impl From<KeyEvent> for InputEvent {
    fn from(ev: KeyEvent) -> Self {
        InputEvent::Key(ev)
    }
}
