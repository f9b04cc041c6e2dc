use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Shell settings.
///
/// Loaded from `~/.phosphor/config.json`, then overridden key-by-key by a
/// project-local `.phosphor.json`:
/// ```json
/// {
///   "endpoint": "http://127.0.0.1:8787/api/chat",
///   "pacing_ms": 12,
///   "theme": "amber"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShellConfig {
    /// Remote assistant endpoint that receives `{message, history}`.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Delay between streamed reply characters, in milliseconds.
    #[serde(default = "default_pacing_ms")]
    pub pacing_ms: u64,
    #[serde(default = "default_user")]
    pub user: String,
    #[serde(default = "default_host")]
    pub host: String,
    /// Theme applied at startup, by name.
    #[serde(default = "default_theme")]
    pub theme: String,
    /// Ring the terminal bell on error cues.
    #[serde(default)]
    pub bell: bool,
    /// Static path the `download` command points at.
    #[serde(default = "default_document_path")]
    pub document_path: String,
    /// Out-of-band contact shown when the assistant quota is spent.
    #[serde(default = "default_contact")]
    pub contact: String,
}

fn default_endpoint() -> String {
    std::env::var("PHOSPHOR_ENDPOINT").unwrap_or_else(|_| "http://127.0.0.1:8787/api/chat".to_string())
}

fn default_pacing_ms() -> u64 {
    12
}

fn default_user() -> String {
    "guest".to_string()
}

fn default_host() -> String {
    "phosphor".to_string()
}

fn default_theme() -> String {
    "green".to_string()
}

fn default_document_path() -> String {
    "/resume.pdf".to_string()
}

fn default_contact() -> String {
    "operator@phosphor.invalid".to_string()
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            pacing_ms: default_pacing_ms(),
            user: default_user(),
            host: default_host(),
            theme: default_theme(),
            bell: false,
            document_path: default_document_path(),
            contact: default_contact(),
        }
    }
}

impl ShellConfig {
    pub fn load() -> Result<Self> {
        let config_path = Self::resolve_path("config.json");

        let mut config = if config_path.exists() {
            let data = std::fs::read_to_string(&config_path)?;
            serde_json::from_str::<ShellConfig>(&data)?
        } else {
            ShellConfig::default()
        };

        let local_path = std::env::current_dir()
            .ok()
            .map(|d| d.join(".phosphor.json"))
            .filter(|p| p.exists());

        if let Some(local) = local_path {
            let data = std::fs::read_to_string(local)?;
            let override_val: serde_json::Value = serde_json::from_str(&data)?;
            config = config.merged(override_val)?;
        }

        Ok(config)
    }

    /// Overlay the top-level keys of `overrides` onto this config.
    pub fn merged(&self, overrides: serde_json::Value) -> Result<Self> {
        let mut base = serde_json::to_value(self)?;
        if let (Some(base_obj), Some(over_obj)) = (base.as_object_mut(), overrides.as_object()) {
            for (k, v) in over_obj {
                base_obj.insert(k.clone(), v.clone());
            }
        }
        Ok(serde_json::from_value(base)?)
    }

    pub fn prompt(&self) -> String {
        format!("{}@{}:~$ ", self.user, self.host)
    }

    pub fn pacing(&self) -> Duration {
        Duration::from_millis(self.pacing_ms)
    }

    pub fn resolve_path(relative: &str) -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".phosphor")
            .join(relative)
    }
}
