pub mod apps;
pub mod chat;
pub mod commands;
pub mod config;
pub mod focus;
pub mod host;
pub mod input;
pub mod line_editor;
pub mod parser;
pub mod screen;
pub mod shell;
pub mod store;
pub mod theme;

pub use apps::{EditorApp, InstrumentApp, PagerApp, SelectorApp};
pub use chat::{ChatClient, ChatError, ChatRequest, ChatTurn, Conversation, Role, Turn, TurnEvent};
pub use commands::{Command, CommandContext, CommandRegistry, Dispatch, Session};
pub use config::ShellConfig;
pub use focus::{AppContext, Exit, FocusArbiter, Flow, ModalApp};
pub use host::{Cue, Host, NullHost};
pub use input::{InputEvent, Key, KeyEvent, Phase};
pub use line_editor::{Completion, HistoryLog, LineEditor};
pub use parser::tokenize;
pub use screen::{Grid, Screen};
pub use shell::{Action, Shell};
pub use store::SessionStore;
pub use theme::{Theme, THEMES};
