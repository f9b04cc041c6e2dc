use crossterm::event::{
    Event, KeyCode, KeyEvent as TermKey, KeyEventKind, KeyModifiers, MouseEventKind,
};
use phosphor_core::{InputEvent, Key, KeyEvent, Phase};

const WHEEL_LINES: i32 = 3;

fn key(code: KeyCode) -> Key {
    match code {
        KeyCode::Char(c) => Key::Char(c),
        KeyCode::Enter => Key::Enter,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Tab => Key::Tab,
        KeyCode::Esc => Key::Escape,
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::PageUp => Key::PageUp,
        KeyCode::PageDown => Key::PageDown,
        KeyCode::Home => Key::Home,
        KeyCode::End => Key::End,
        other => Key::Other(format!("{other:?}")),
    }
}

/// Translate one terminal event. When the terminal cannot report releases,
/// every press is followed by a synthesized release.
pub(super) fn translate(event: Event, releases: bool) -> Vec<InputEvent> {
    match event {
        Event::Key(k) => key_events(k, releases),
        Event::Paste(text) => vec![InputEvent::Paste(text)],
        Event::Mouse(m) => match m.kind {
            MouseEventKind::ScrollUp => vec![InputEvent::Scroll(WHEEL_LINES)],
            MouseEventKind::ScrollDown => vec![InputEvent::Scroll(-WHEEL_LINES)],
            _ => Vec::new(),
        },
        Event::Resize(cols, rows) => vec![InputEvent::Resize { cols, rows }],
        _ => Vec::new(),
    }
}

fn key_events(k: TermKey, releases: bool) -> Vec<InputEvent> {
    let down = KeyEvent {
        key: key(k.code),
        phase: Phase::Down,
        ctrl: k.modifiers.contains(KeyModifiers::CONTROL),
        repeat: false,
    };
    let up = KeyEvent {
        phase: Phase::Up,
        ..down.clone()
    };
    match k.kind {
        KeyEventKind::Press if releases => vec![down.into()],
        KeyEventKind::Press => vec![down.into(), up.into()],
        KeyEventKind::Repeat => vec![down.repeated().into()],
        KeyEventKind::Release => vec![up.into()],
    }
}
