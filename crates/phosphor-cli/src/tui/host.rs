use phosphor_core::{Cue, Host};
use std::io::{self, Write};
use tracing::debug;

/// Sinks for a plain terminal: no speaker, no shader. Cues are logged and an
/// error cue can ring the bell.
pub(super) struct TerminalHost {
    bell: bool,
}

impl TerminalHost {
    pub(super) fn new(bell: bool) -> Self {
        Self { bell }
    }
}

impl Host for TerminalHost {
    fn play(&mut self, cue: Cue) {
        match cue {
            Cue::Error if self.bell => {
                let mut out = io::stdout();
                let _ = out.write_all(b"\x07");
                let _ = out.flush();
            }
            Cue::NoteOn(note) | Cue::NoteOff(note) => debug!(?cue, note, "note"),
            _ => {}
        }
    }

    fn set_param(&mut self, name: &str, value: f32) {
        debug!(name, value, "display parameter");
    }
}
