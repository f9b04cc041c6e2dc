use anyhow::Result;
use phosphor_core::ShellConfig;
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Log to `~/.phosphor/phosphor.log` when `PHOSPHOR_LOG` holds a filter
/// directive. The terminal itself is never written to.
pub fn init() -> Result<()> {
    let Ok(directive) = std::env::var("PHOSPHOR_LOG") else {
        return Ok(());
    };
    let path = ShellConfig::resolve_path("phosphor.log");
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&directive)?)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    tracing::info!(path = %path.display(), "logging started");
    Ok(())
}
