use crate::chat::Conversation;
use crate::config::ShellConfig;
use crate::focus::{FocusArbiter, ModalApp};
use crate::host::Host;
use crate::line_editor::HistoryLog;
use crate::screen::Screen;
use crate::store::SessionStore;

/// The slice of shell state a command may touch.
pub struct Session<'a> {
    pub screen: &'a mut Screen,
    pub focus: &'a mut FocusArbiter,
    pub conversation: &'a mut Conversation,
    pub store: &'a mut SessionStore,
    pub host: &'a mut dyn Host,
    pub history: &'a HistoryLog,
    pub config: &'a ShellConfig,
    /// Remaining assistant sends, as last reported by the endpoint.
    pub quota: Option<u32>,
}

pub struct CommandContext<'a> {
    /// Lowercased command name.
    pub command: String,
    pub args: Vec<String>,
    /// `(name, description)` for every registered command, sorted by name.
    pub catalog: Vec<(String, String)>,
    pub screen: &'a mut Screen,
    pub focus: &'a mut FocusArbiter,
    pub conversation: &'a mut Conversation,
    pub store: &'a mut SessionStore,
    pub host: &'a mut dyn Host,
    pub history: &'a HistoryLog,
    pub config: &'a ShellConfig,
    pub quota: Option<u32>,
    exit: bool,
}

impl<'a> CommandContext<'a> {
    pub fn new(
        command: String,
        args: Vec<String>,
        catalog: Vec<(String, String)>,
        session: Session<'a>,
    ) -> Self {
        Self {
            command,
            args,
            catalog,
            screen: session.screen,
            focus: session.focus,
            conversation: session.conversation,
            store: session.store,
            host: session.host,
            history: session.history,
            config: session.config,
            quota: session.quota,
            exit: false,
        }
    }

    pub fn println(&mut self, line: impl AsRef<str>) {
        self.screen.writeln(line.as_ref());
    }

    /// Hand the keyboard and the whole screen to `app`.
    pub fn open(&mut self, app: Box<dyn ModalApp>) {
        self.screen.enter_fullscreen();
        self.focus.capture(app);
        self.focus.redraw(self.screen.grid_mut());
    }

    pub fn request_exit(&mut self) {
        self.exit = true;
    }

    pub fn exit_requested(&self) -> bool {
        self.exit
    }
}
