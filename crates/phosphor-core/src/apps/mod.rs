pub mod editor;
pub mod instrument;
pub mod pager;
pub mod selector;

pub use editor::{EditorApp, EditorState, Effect, Mode};
pub use instrument::InstrumentApp;
pub use pager::PagerApp;
pub use selector::SelectorApp;
