use crate::chat::{ChatClient, ChatError, ChatTurn, Conversation, TurnEvent};
use crate::commands::{CommandRegistry, Dispatch, Session};
use crate::config::ShellConfig;
use crate::focus::{AppContext, Flow, FocusArbiter};
use crate::host::{Cue, Host};
use crate::input::{InputEvent, Key, KeyEvent};
use crate::line_editor::LineEditor;
use crate::screen::Screen;
use crate::store::SessionStore;
use crate::theme::{self, Theme, THEMES};
use tracing::{debug, info, warn};

const GREETING: &str = "phosphor terminal. type 'help' for commands; anything else reaches the assistant.";

/// What the host loop has to do after an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    None,
    /// Send this message to the assistant. The shell is busy until the
    /// turn finishes or fails.
    Chat(String),
    Exit,
}

/// The whole interactive runtime minus the terminal: every key, paste and
/// scroll goes through [`Shell::handle`].
pub struct Shell {
    registry: CommandRegistry,
    editor: LineEditor,
    focus: FocusArbiter,
    screen: Screen,
    conversation: Conversation,
    store: SessionStore,
    host: Box<dyn Host + Send>,
    config: ShellConfig,
    /// A command (in practice, a chat send) is still running.
    busy: bool,
    quota: Option<u32>,
}

impl Shell {
    pub fn new(config: ShellConfig, host: Box<dyn Host + Send>, cols: u16, rows: u16) -> Self {
        let mut shell = Self {
            registry: CommandRegistry::with_builtins(),
            editor: LineEditor::new(),
            focus: FocusArbiter::new(),
            screen: Screen::new(cols, rows),
            conversation: Conversation::new(),
            store: SessionStore::new(),
            host,
            config,
            busy: false,
            quota: None,
        };

        match theme::find(&shell.config.theme) {
            Some(index) => shell.store.commit_theme(index),
            None => warn!(theme = %shell.config.theme, "unknown theme in config, using default"),
        }
        THEMES[shell.store.active_theme()].apply(shell.host.as_mut());

        shell.screen.writeln(GREETING);
        shell.prompt();
        shell
    }

    pub fn registry_mut(&mut self) -> &mut CommandRegistry {
        &mut self.registry
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn focus(&self) -> &FocusArbiter {
        &self.focus
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn editor(&self) -> &LineEditor {
        &self.editor
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    pub fn theme(&self) -> &'static Theme {
        &THEMES[self.store.active_theme()]
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn quota(&self) -> Option<u32> {
        self.quota
    }

    /// Whether the renderer should draw a cursor this frame.
    pub fn cursor_visible(&self) -> bool {
        self.focus.cursor_visible(self.screen.at_bottom())
    }

    pub fn handle(&mut self, event: InputEvent) -> Action {
        match event {
            InputEvent::Key(key) => self.key(key),
            InputEvent::Paste(text) => {
                self.paste(&text);
                Action::None
            }
            InputEvent::Scroll(delta) => {
                if !self.focus.is_captured() {
                    self.screen.scroll_by(delta);
                }
                Action::None
            }
            InputEvent::Resize { cols, rows } => {
                self.screen.resize(cols, rows);
                self.focus.redraw(self.screen.grid_mut());
                Action::None
            }
        }
    }

    fn key(&mut self, event: KeyEvent) -> Action {
        if self.focus.is_captured() {
            self.deliver(&event);
            return Action::None;
        }
        if !event.is_down() || self.busy {
            return Action::None;
        }
        self.screen.scroll_to_bottom();

        if event.ctrl {
            return self.control(&event.key);
        }
        match &event.key {
            Key::Enter => {
                self.host.play(Cue::Enter);
                self.screen.write("\n");
                let line = self.editor.commit();
                return self.dispatch(&line);
            }
            Key::Backspace => self.editor.backspace(&mut self.screen, self.host.as_mut()),
            Key::Tab => {
                let names = self.registry.names();
                let prompt = self.config.prompt();
                self.editor.complete(&names, &mut self.screen, &prompt);
            }
            Key::Up => self.editor.history_up(&mut self.screen),
            Key::Down => self.editor.history_down(&mut self.screen),
            _ => {
                if let Some(c) = event.printable() {
                    self.editor.insert(c, &mut self.screen, self.host.as_mut());
                }
            }
        }
        Action::None
    }

    fn control(&mut self, key: &Key) -> Action {
        match key {
            Key::Char('c') => {
                self.screen.write("^C\n");
                self.editor.abandon();
                self.prompt();
            }
            Key::Char('l') => {
                self.screen.clear();
                self.prompt();
                let line = self.editor.line().to_string();
                self.screen.write(&line);
            }
            Key::Char('d') if self.editor.line().is_empty() => return Action::Exit,
            _ => {}
        }
        Action::None
    }

    fn paste(&mut self, text: &str) {
        if self.focus.is_captured() {
            for c in text.chars().filter(|c| !c.is_control()) {
                self.deliver(&KeyEvent::char(c));
                self.deliver(&KeyEvent::up(Key::Char(c)));
            }
            return;
        }
        if self.busy {
            return;
        }
        self.screen.scroll_to_bottom();
        for c in text.chars().filter(|c| !c.is_control()) {
            self.editor.insert(c, &mut self.screen, self.host.as_mut());
        }
    }

    fn deliver(&mut self, event: &KeyEvent) {
        let (cols, rows) = (self.screen.grid().cols(), self.screen.grid().rows());
        let mut cx = AppContext {
            host: self.host.as_mut(),
            store: &mut self.store,
            cols,
            rows,
        };
        match self.focus.deliver(event, &mut cx) {
            Some(Flow::Continue) => self.focus.redraw(self.screen.grid_mut()),
            Some(Flow::Release(exit)) => {
                let app = self.focus.release();
                self.screen.leave_fullscreen();
                debug!(app = app.as_ref().map(|a| a.name()), "app released focus");
                self.conversation.note(exit.note);
                if let Some(message) = exit.message {
                    self.screen.writeln(&message);
                }
                // the prompt was deferred when the app opened
                if !self.busy {
                    self.prompt();
                }
            }
            None => {}
        }
    }

    fn dispatch(&mut self, line: &str) -> Action {
        let session = Session {
            screen: &mut self.screen,
            focus: &mut self.focus,
            conversation: &mut self.conversation,
            store: &mut self.store,
            host: self.host.as_mut(),
            history: self.editor.history(),
            config: &self.config,
            quota: self.quota,
        };
        match self.registry.dispatch(line, session) {
            Dispatch::Forward(message) => return Action::Chat(message),
            Dispatch::Done { exit: true } => return Action::Exit,
            Dispatch::Empty | Dispatch::Done { exit: false } | Dispatch::Failed => {}
        }
        if !self.focus.is_captured() {
            self.prompt();
        }
        Action::None
    }

    fn prompt(&mut self) {
        if !self.screen.live_line().is_empty() {
            self.screen.write("\n");
        }
        let prompt = self.config.prompt();
        self.screen.write(&prompt);
    }

    // ── chat ────────────────────────────────────────────────────────────

    /// Mark a send as in flight; line editing stays off until it ends.
    pub fn begin_chat(&mut self) {
        self.busy = true;
    }

    /// Echo one streamed character of the reply.
    pub fn chat_unit(&mut self, c: char) {
        let mut buf = [0u8; 4];
        self.screen.write(c.encode_utf8(&mut buf));
        if !c.is_whitespace() {
            self.host.play(Cue::Type);
        }
    }

    /// The reply completed: only now does the exchange enter the history.
    pub fn finish_chat(&mut self, message: &str, reply: String, remaining: Option<u32>) {
        info!(chars = reply.chars().count(), ?remaining, "assistant replied");
        self.conversation.record_exchange(message, reply);
        if remaining.is_some() {
            self.quota = remaining;
        }
        self.end_chat();
    }

    /// The send failed; history is left as it was.
    pub fn fail_chat(&mut self, error: &ChatError) {
        warn!("chat failed: {error}");
        if matches!(error, ChatError::RateLimited | ChatError::QuotaExceeded) {
            self.quota = Some(0);
        }
        self.host.play(Cue::Error);
        if !self.screen.live_line().is_empty() {
            self.screen.write("\n");
        }
        for line in error.lines(&self.config.contact) {
            self.screen.writeln(&line);
        }
        self.end_chat();
    }

    pub fn apply_turn_event(&mut self, message: &str, event: TurnEvent) {
        match event {
            TurnEvent::Unit(c) => self.chat_unit(c),
            TurnEvent::Finished { reply, remaining } => self.finish_chat(message, reply, remaining),
            TurnEvent::Failed(e) => self.fail_chat(&e),
        }
    }

    fn end_chat(&mut self) {
        self.busy = false;
        if !self.focus.is_captured() {
            self.prompt();
        }
    }

    /// Start a send for `message` with the current history.
    pub fn start_turn(&mut self, client: &ChatClient, message: String) -> ChatTurn {
        self.begin_chat();
        ChatTurn::start(client.clone(), message, self.conversation.turns().to_vec())
    }

    /// Drive a whole exchange to completion.
    pub async fn converse(&mut self, client: &ChatClient, message: String) {
        let mut turn = self.start_turn(client, message.clone());
        while let Some(event) = turn.next().await {
            self.apply_turn_event(&message, event);
        }
    }

    /// Type `line` at the prompt and press Enter, running any chat it
    /// triggers to completion.
    pub async fn submit(&mut self, client: &ChatClient, line: &str) -> Action {
        self.paste(line);
        match self.handle(KeyEvent::down(Key::Enter).into()) {
            Action::Chat(message) => {
                self.converse(client, message).await;
                Action::None
            }
            other => other,
        }
    }
}
