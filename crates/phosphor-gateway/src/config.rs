use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_PERSONA: &str = "You are the assistant living inside a retro terminal on a personal \
site. Answer questions about the site's owner and their work briefly, in plain text, without \
markdown. If the user mentions something they just did in the terminal, play along.";

/// Gateway settings, read from flags or the environment.
#[derive(Debug, Clone, Parser)]
#[command(name = "phosphor-gateway", version, about = "Rate-limited assistant gateway")]
pub struct GatewayConfig {
    #[arg(long, env = "PHOSPHOR_BIND", default_value = "127.0.0.1:8787")]
    pub bind: SocketAddr,

    /// Base URL of an OpenAI-compatible API.
    #[arg(long, env = "PHOSPHOR_UPSTREAM_URL", default_value = "https://api.openai.com/v1")]
    pub upstream_url: String,

    #[arg(long, env = "PHOSPHOR_API_KEY", default_value = "", hide_env_values = true)]
    pub api_key: String,

    #[arg(long, env = "PHOSPHOR_MODEL", default_value = "gpt-4o-mini")]
    pub model: String,

    /// Requests allowed per identity per window.
    #[arg(long, env = "PHOSPHOR_LIMIT", default_value_t = 50)]
    pub limit: u32,

    #[arg(long, env = "PHOSPHOR_WINDOW_SECS", default_value_t = 86_400)]
    pub window_secs: u64,

    /// File holding the system prompt.
    #[arg(long, env = "PHOSPHOR_PERSONA")]
    pub persona: Option<PathBuf>,
}

impl GatewayConfig {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }

    pub fn persona_prompt(&self) -> Result<String> {
        match &self.persona {
            Some(path) => std::fs::read_to_string(path)
                .map(|s| s.trim().to_string())
                .with_context(|| format!("reading persona {}", path.display())),
            None => Ok(DEFAULT_PERSONA.to_string()),
        }
    }
}
