use thiserror::Error;

/// Why a single send failed. Every variant is terminal for that send; the
/// client never retries.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("rate limited")]
    RateLimited,
    #[error("quota exceeded")]
    QuotaExceeded,
    #[error("endpoint returned status {0}")]
    Status(u16),
    #[error("response stream is broken")]
    StreamBroken,
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl ChatError {
    /// What the user sees, in character.
    pub fn lines(&self, contact: &str) -> Vec<String> {
        match self {
            ChatError::RateLimited => vec![
                "The signal is fading. Too many transmissions today; come back later.".into(),
            ],
            ChatError::QuotaExceeded => vec![
                "I am silenced. Whatever spoke through this terminal has gone quiet.".into(),
                format!("(reach the operator directly: {contact})"),
            ],
            ChatError::Status(_) => vec!["Connection lost. The line went dead.".into()],
            ChatError::StreamBroken => {
                vec!["The stream is broken. Only fragments came through.".into()]
            }
            ChatError::Transport(_) => {
                vec!["...nothing but static and noise on the line.".into()]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quota_lines_include_contact() {
        let lines = ChatError::QuotaExceeded.lines("ops@example.com");
        assert_eq!(lines.len(), 2);
        assert!(lines[1].contains("ops@example.com"));
    }

    #[test]
    fn each_kind_has_a_distinct_message() {
        let kinds = [
            ChatError::RateLimited,
            ChatError::QuotaExceeded,
            ChatError::Status(500),
            ChatError::StreamBroken,
        ];
        let firsts: Vec<String> = kinds.iter().map(|k| k.lines("x")[0].clone()).collect();
        for (i, a) in firsts.iter().enumerate() {
            for b in &firsts[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
