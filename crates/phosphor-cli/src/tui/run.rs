use std::io;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    cursor::Show,
    event::{
        self, DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
        Event, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags,
        PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use phosphor_core::{Action, ChatClient, ChatTurn, Shell, ShellConfig, TurnEvent};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;
use tracing::{info, warn};

use super::host::TerminalHost;
use super::keys::translate;
use super::render::render;

// ── async helper: next reply event or park ──────────────────────────────────

async fn next_turn_event(turn: &mut Option<ChatTurn>) -> Option<TurnEvent> {
    match turn {
        Some(t) => t.next().await,
        None => std::future::pending().await,
    }
}

fn restore_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), PopKeyboardEnhancementFlags);
    let _ = execute!(
        io::stdout(),
        DisableMouseCapture,
        DisableBracketedPaste,
        LeaveAlternateScreen,
        Show
    );
}

// ── main entry ──────────────────────────────────────────────────────────────

pub async fn run(config: ShellConfig) -> Result<()> {
    let client = ChatClient::from_config(&config);
    let host = TerminalHost::new(config.bell);

    // Always give the terminal back, even on panic.
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        restore_terminal();
        original_hook(info);
    }));

    enable_raw_mode()?;
    execute!(
        io::stdout(),
        EnterAlternateScreen,
        EnableBracketedPaste,
        EnableMouseCapture
    )?;
    let releases = supports_keyboard_enhancement().unwrap_or(false);
    if releases {
        execute!(
            io::stdout(),
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        )?;
    } else {
        warn!("terminal cannot report key releases, synthesizing them");
    }

    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;
    terminal.clear()?;
    let size = terminal.size()?;
    let mut shell = Shell::new(config, Box::new(host), size.width, size.height);
    info!(cols = size.width, rows = size.height, releases, "terminal ready");

    // Keyboard reader thread
    let (key_tx, mut key_rx) = mpsc::channel::<Event>(64);
    tokio::task::spawn_blocking(move || loop {
        if key_tx.is_closed() {
            break;
        }
        if event::poll(Duration::from_millis(100)).unwrap_or(false) {
            if let Ok(ev) = event::read() {
                if key_tx.blocking_send(ev).is_err() {
                    break;
                }
            }
        }
    });

    let mut turn: Option<ChatTurn> = None;

    let result: Result<()> = 'main: loop {
        if let Err(e) = terminal.draw(|f| render(&shell, f)) {
            break Err(e.into());
        }

        tokio::select! {
            // ── keyboard, paste, mouse, resize ──
            ev = key_rx.recv() => {
                let Some(ev) = ev else { break 'main Ok(()) };
                for input in translate(ev, releases) {
                    match shell.handle(input) {
                        Action::None => {}
                        Action::Chat(message) => {
                            info!(chars = message.chars().count(), "sending to assistant");
                            turn = Some(shell.start_turn(&client, message));
                        }
                        Action::Exit => break 'main Ok(()),
                    }
                }
            }

            // ── streamed reply ──
            event = next_turn_event(&mut turn) => {
                match (event, turn.as_ref()) {
                    (Some(event), Some(t)) => {
                        let message = t.message().to_string();
                        shell.apply_turn_event(&message, event);
                    }
                    _ => turn = None,
                }
            }
        }
    };

    drop(key_rx);
    restore_terminal();
    info!("terminal closed");
    result
}
