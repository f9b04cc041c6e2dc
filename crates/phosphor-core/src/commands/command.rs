use super::context::CommandContext;
use anyhow::Result;

/// A shell built-in. Handlers run to completion on the event loop; an `Err`
/// is reported by the dispatcher and never reaches the shell.
pub trait Command: Send + Sync {
    fn description(&self) -> &str;
    fn run(&self, cx: &mut CommandContext<'_>) -> Result<()>;
}
