use super::command::Command;
use super::context::{CommandContext, Session};
use crate::host::Cue;
use crate::parser::tokenize;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, warn};

/// Outcome of dispatching one committed line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// Nothing but whitespace.
    Empty,
    /// A command ran to completion.
    Done { exit: bool },
    /// A command returned an error or panicked, already reported on screen.
    Failed,
    /// No command by that name; the trimmed line goes to the assistant.
    Forward(String),
}

/// Command table keyed by lowercase name.
pub struct CommandRegistry {
    commands: HashMap<String, Arc<dyn Command>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self {
            commands: HashMap::new(),
        }
    }

    /// Registering an existing name replaces the old handler.
    pub fn register(&mut self, name: &str, command: Arc<dyn Command>) {
        if self
            .commands
            .insert(name.to_lowercase(), command)
            .is_some()
        {
            debug!(name, "command re-registered");
        }
    }

    pub fn unregister(&mut self, name: &str) -> bool {
        self.commands.remove(&name.to_lowercase()).is_some()
    }

    pub fn has(&self, name: &str) -> bool {
        self.commands.contains_key(&name.to_lowercase())
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Command>> {
        self.commands.get(&name.to_lowercase()).cloned()
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.commands.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn catalog(&self) -> Vec<(String, String)> {
        let mut entries: Vec<(String, String)> = self
            .commands
            .iter()
            .map(|(name, c)| (name.clone(), c.description().to_string()))
            .collect();
        entries.sort();
        entries
    }

    pub fn dispatch(&self, line: &str, session: Session<'_>) -> Dispatch {
        let mut tokens = tokenize(line);
        if tokens.is_empty() {
            return Dispatch::Empty;
        }
        let name = tokens.remove(0).to_lowercase();
        let Some(command) = self.commands.get(&name).cloned() else {
            return Dispatch::Forward(line.trim().to_string());
        };

        debug!(command = %name, args = tokens.len(), "dispatching");
        let mut cx = CommandContext::new(name.clone(), tokens, self.catalog(), session);
        let outcome = match catch_unwind(AssertUnwindSafe(|| command.run(&mut cx))) {
            Ok(result) => result,
            Err(payload) => Err(anyhow::anyhow!("panicked: {}", panic_message(&*payload))),
        };
        match outcome {
            Ok(()) => Dispatch::Done {
                exit: cx.exit_requested(),
            },
            Err(e) => {
                warn!(command = %name, "command failed: {e:#}");
                cx.host.play(Cue::Error);
                cx.println(format!("error: {name}: command failed"));
                Dispatch::Failed
            }
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "unknown panic"
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}
