pub mod builtin;
pub mod command;
pub mod context;
pub mod registry;

pub use command::Command;
pub use context::{CommandContext, Session};
pub use registry::{CommandRegistry, Dispatch};
