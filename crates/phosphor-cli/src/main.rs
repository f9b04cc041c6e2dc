mod logging;
mod tui;

use anyhow::Result;
use clap::Parser;
use phosphor_core::{ChatClient, NullHost, Shell, ShellConfig};

#[derive(Parser, Debug)]
#[command(name = "phosphor", version, about = "A green-screen shell with an assistant on the line")]
struct Args {
    /// Run one line through the shell, print what it wrote and exit.
    #[arg(long, value_name = "LINE")]
    once: Option<String>,

    /// Assistant endpoint, overriding the config file.
    #[arg(long)]
    endpoint: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    logging::init()?;

    let mut config = ShellConfig::load()?;
    if let Some(endpoint) = args.endpoint {
        config.endpoint = endpoint;
    }

    match args.once {
        Some(line) => once(config, &line).await,
        None => tui::run(config).await,
    }
}

async fn once(mut config: ShellConfig, line: &str) -> Result<()> {
    config.pacing_ms = 0;
    let client = ChatClient::from_config(&config);
    let mut shell = Shell::new(config, Box::new(NullHost), 80, 24);
    let start = shell.screen().lines().len() - 1;

    shell.submit(&client, line).await;
    if let Some(app) = shell.focus().captured_name() {
        eprintln!("{app} is interactive; run phosphor without --once");
        return Ok(());
    }

    // everything from the submitted line up to, not including, the next prompt
    let lines = shell.screen().lines();
    let end = lines.len().saturating_sub(1).max(start);
    for line in &lines[start..end] {
        println!("{line}");
    }
    Ok(())
}
