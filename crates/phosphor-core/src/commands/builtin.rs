use super::command::Command;
use super::context::CommandContext;
use super::registry::CommandRegistry;
use crate::apps::{EditorApp, InstrumentApp, PagerApp, SelectorApp};
use crate::theme::{self, THEMES};
use anyhow::{Context, Result};
use std::sync::Arc;

const RESUME: &str = include_str!("../../assets/resume.txt");

impl CommandRegistry {
    /// Registry preloaded with every shell built-in.
    pub fn with_builtins() -> Self {
        let mut reg = Self::new();
        reg.register("help", Arc::new(Help));
        reg.register("clear", Arc::new(Clear));
        reg.register("echo", Arc::new(Echo));
        reg.register("history", Arc::new(History));
        reg.register("whoami", Arc::new(Whoami));
        reg.register("theme", Arc::new(ThemeCmd));
        let editor: Arc<dyn Command> = Arc::new(Vim);
        for alias in ["vim", "vi", "nvim"] {
            reg.register(alias, editor.clone());
        }
        reg.register("piano", Arc::new(Piano));
        reg.register("less", Arc::new(Less));
        reg.register("resume", Arc::new(Resume));
        reg.register("download", Arc::new(Download));
        reg.register("quota", Arc::new(Quota));
        reg.register("reset", Arc::new(Reset));
        reg.register("exit", Arc::new(ExitCmd));
        reg
    }
}

struct Help;

impl Command for Help {
    fn description(&self) -> &str {
        "list available commands"
    }

    fn run(&self, cx: &mut CommandContext<'_>) -> Result<()> {
        cx.println("available commands:");
        let width = cx.catalog.iter().map(|(n, _)| n.len()).max().unwrap_or(0);
        let rows: Vec<String> = cx
            .catalog
            .iter()
            .map(|(name, desc)| format!("  {name:<width$}  {desc}"))
            .collect();
        for row in rows {
            cx.println(row);
        }
        cx.println("anything else is sent to the assistant.");
        Ok(())
    }
}

struct Clear;

impl Command for Clear {
    fn description(&self) -> &str {
        "clear the screen"
    }

    fn run(&self, cx: &mut CommandContext<'_>) -> Result<()> {
        cx.screen.clear();
        Ok(())
    }
}

struct Echo;

impl Command for Echo {
    fn description(&self) -> &str {
        "print the arguments"
    }

    fn run(&self, cx: &mut CommandContext<'_>) -> Result<()> {
        let line = cx.args.join(" ");
        cx.println(line);
        Ok(())
    }
}

struct History;

impl Command for History {
    fn description(&self) -> &str {
        "show previously entered lines"
    }

    fn run(&self, cx: &mut CommandContext<'_>) -> Result<()> {
        let history = cx.history;
        for (i, entry) in history.entries().iter().enumerate() {
            cx.println(format!("{:>4}  {entry}", i + 1));
        }
        Ok(())
    }
}

struct Whoami;

impl Command for Whoami {
    fn description(&self) -> &str {
        "print the current user"
    }

    fn run(&self, cx: &mut CommandContext<'_>) -> Result<()> {
        let user = cx.config.user.clone();
        cx.println(user);
        Ok(())
    }
}

struct ThemeCmd;

impl Command for ThemeCmd {
    fn description(&self) -> &str {
        "pick a display theme, or `theme <name>`"
    }

    fn run(&self, cx: &mut CommandContext<'_>) -> Result<()> {
        let Some(name) = cx.args.first().cloned() else {
            let app = SelectorApp::new(cx.store.committed_theme());
            cx.open(Box::new(app));
            return Ok(());
        };
        match theme::find(&name) {
            Some(index) => {
                cx.store.commit_theme(index);
                THEMES[index].apply(cx.host);
                cx.println(format!("theme set to {}", THEMES[index].name));
            }
            None => {
                let names: Vec<&str> = THEMES.iter().map(|t| t.name).collect();
                cx.println(format!(
                    "theme: unknown theme '{name}' (try: {})",
                    names.join(", ")
                ));
            }
        }
        Ok(())
    }
}

struct Vim;

impl Command for Vim {
    fn description(&self) -> &str {
        "open the text editor"
    }

    fn run(&self, cx: &mut CommandContext<'_>) -> Result<()> {
        let app = EditorApp::new(cx.store.saved_buffer());
        cx.open(Box::new(app));
        Ok(())
    }
}

struct Piano;

impl Command for Piano {
    fn description(&self) -> &str {
        "play the keyboard instrument"
    }

    fn run(&self, cx: &mut CommandContext<'_>) -> Result<()> {
        cx.open(Box::new(InstrumentApp::new()));
        Ok(())
    }
}

struct Less;

impl Command for Less {
    fn description(&self) -> &str {
        "page through a file"
    }

    fn run(&self, cx: &mut CommandContext<'_>) -> Result<()> {
        let Some(path) = cx.args.first().cloned() else {
            cx.println("usage: less <file>");
            return Ok(());
        };
        let text = std::fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
        cx.open(Box::new(PagerApp::new(path, &text)));
        Ok(())
    }
}

struct Resume;

impl Command for Resume {
    fn description(&self) -> &str {
        "read the operator's resume"
    }

    fn run(&self, cx: &mut CommandContext<'_>) -> Result<()> {
        cx.open(Box::new(PagerApp::new("resume", RESUME)));
        Ok(())
    }
}

struct Download;

impl Command for Download {
    fn description(&self) -> &str {
        "get the printable resume"
    }

    fn run(&self, cx: &mut CommandContext<'_>) -> Result<()> {
        let path = cx.config.document_path.clone();
        cx.println(format!("download: {path}"));
        Ok(())
    }
}

struct Quota;

impl Command for Quota {
    fn description(&self) -> &str {
        "show remaining assistant messages"
    }

    fn run(&self, cx: &mut CommandContext<'_>) -> Result<()> {
        match cx.quota {
            Some(n) => cx.println(format!("{n} transmissions left today")),
            None => cx.println("quota unknown until the first transmission"),
        }
        Ok(())
    }
}

struct Reset;

impl Command for Reset {
    fn description(&self) -> &str {
        "forget the conversation so far"
    }

    fn run(&self, cx: &mut CommandContext<'_>) -> Result<()> {
        cx.conversation.clear();
        cx.println("conversation forgotten");
        Ok(())
    }
}

struct ExitCmd;

impl Command for ExitCmd {
    fn description(&self) -> &str {
        "leave the terminal"
    }

    fn run(&self, cx: &mut CommandContext<'_>) -> Result<()> {
        cx.request_exit();
        Ok(())
    }
}
