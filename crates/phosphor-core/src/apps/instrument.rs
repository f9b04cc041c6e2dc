use crate::focus::{AppContext, Exit, Flow, ModalApp};
use crate::host::Cue;
use crate::input::{Key, KeyEvent, Phase};
use crate::screen::Grid;
use std::collections::BTreeSet;

const EXIT_NOTE: &str = "The user exited the piano.";

/// Home-row layout: white keys on `a s d f g h j k`, black keys above them.
const KEYMAP: [(char, u8); 13] = [
    ('a', 60),
    ('w', 61),
    ('s', 62),
    ('e', 63),
    ('d', 64),
    ('f', 65),
    ('t', 66),
    ('g', 67),
    ('y', 68),
    ('h', 69),
    ('u', 70),
    ('j', 71),
    ('k', 72),
];

const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

fn note_for(key: &Key) -> Option<u8> {
    let Key::Char(c) = key else {
        return None;
    };
    let c = c.to_ascii_lowercase();
    KEYMAP.iter().find(|(k, _)| *k == c).map(|(_, n)| *n)
}

pub fn note_name(note: u8) -> String {
    let octave = (note / 12) as i32 - 1;
    format!("{}{}", NOTE_NAMES[(note % 12) as usize], octave)
}

/// One tone per physical key, sounding from key-down until key-up.
#[derive(Debug, Default)]
pub struct InstrumentApp {
    held: BTreeSet<u8>,
}

impl InstrumentApp {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn held(&self) -> impl Iterator<Item = u8> + '_ {
        self.held.iter().copied()
    }
}

impl ModalApp for InstrumentApp {
    fn name(&self) -> &str {
        "piano"
    }

    fn render(&self, grid: &mut Grid) {
        grid.put(2, 1, "PIANO");
        grid.put(2, 3, " w e   t y u");
        grid.put(2, 4, "a s d f g h j k");
        let playing: Vec<String> = self.held.iter().map(|n| note_name(*n)).collect();
        grid.put(2, 6, &format!("playing: {}", playing.join(" ")));
        grid.put(2, grid.rows().saturating_sub(1), "esc to leave");
    }

    fn handle_key(&mut self, event: &KeyEvent, cx: &mut AppContext<'_>) -> Flow {
        if event.key == Key::Escape {
            if !event.is_down() {
                return Flow::Continue;
            }
            for note in std::mem::take(&mut self.held) {
                cx.host.play(Cue::NoteOff(note));
            }
            return Flow::Release(Exit::new(EXIT_NOTE));
        }

        let Some(note) = note_for(&event.key) else {
            return Flow::Continue;
        };
        match event.phase {
            Phase::Down => {
                if self.held.insert(note) {
                    cx.host.play(Cue::NoteOn(note));
                }
            }
            Phase::Up => {
                if self.held.remove(&note) {
                    cx.host.play(Cue::NoteOff(note));
                }
            }
        }
        Flow::Continue
    }
}
