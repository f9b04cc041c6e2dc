/// Fire-and-forget audio cue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    Key,
    Delete,
    Enter,
    /// One streamed character of an assistant reply.
    Type,
    Error,
    /// MIDI note number.
    NoteOn(u8),
    NoteOff(u8),
}

/// Collaborators the shell drives but never reads back from: audio playback
/// and the display renderer's tunable parameters.
pub trait Host {
    fn play(&mut self, _cue: Cue) {}
    fn set_param(&mut self, _name: &str, _value: f32) {}
}

/// Host that discards everything. Used for headless runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullHost;

impl Host for NullHost {}

#[cfg(test)]
pub(crate) mod testing {
    use super::{Cue, Host};
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Default)]
    pub(crate) struct Log {
        pub(crate) cues: Vec<Cue>,
        pub(crate) params: Vec<(String, f32)>,
    }

    /// Host that records every call into a shared log.
    #[derive(Debug, Default, Clone)]
    pub(crate) struct RecordingHost {
        pub(crate) log: Arc<Mutex<Log>>,
    }

    impl RecordingHost {
        pub(crate) fn cues(&self) -> Vec<Cue> {
            self.log.lock().unwrap().cues.clone()
        }

        pub(crate) fn params(&self) -> Vec<(String, f32)> {
            self.log.lock().unwrap().params.clone()
        }
    }

    impl Host for RecordingHost {
        fn play(&mut self, cue: Cue) {
            self.log.lock().unwrap().cues.push(cue);
        }

        fn set_param(&mut self, name: &str, value: f32) {
            self.log
                .lock()
                .unwrap()
                .params
                .push((name.to_string(), value));
        }
    }
}
