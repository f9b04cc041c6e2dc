use super::conversation::Turn;
use super::error::ChatError;
use crate::config::ShellConfig;
use futures_util::stream::BoxStream;
use futures_util::StreamExt;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;
use tracing::{debug, warn};

/// Response header carrying the sender's remaining sends in this window.
pub const REMAINING_HEADER: &str = "x-ratelimit-remaining";

/// Body of a send: the new message plus everything said before it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub history: Vec<Turn>,
}

#[derive(Clone)]
pub struct ChatClient {
    client: Client,
    endpoint: String,
    pacing: Duration,
}

impl ChatClient {
    pub fn new(endpoint: impl Into<String>, pacing: Duration) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            pacing,
        }
    }

    pub fn from_config(config: &ShellConfig) -> Self {
        Self::new(&config.endpoint, config.pacing())
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Send `message` with the prior `history` and hand back the reply as a
    /// lazily-read stream. Failures are classified by status code alone.
    pub async fn open(&self, message: &str, history: &[Turn]) -> Result<ReplyStream, ChatError> {
        let body = ChatRequest {
            message: message.to_string(),
            history: history.to_vec(),
        };
        let resp = self.client.post(&self.endpoint).json(&body).send().await?;

        let status = resp.status();
        let remaining = resp
            .headers()
            .get(REMAINING_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u32>().ok());
        debug!(status = status.as_u16(), ?remaining, "chat endpoint answered");

        match status {
            StatusCode::TOO_MANY_REQUESTS => Err(ChatError::RateLimited),
            StatusCode::PAYMENT_REQUIRED => Err(ChatError::QuotaExceeded),
            s if !s.is_success() => Err(ChatError::Status(s.as_u16())),
            StatusCode::NO_CONTENT => Err(ChatError::StreamBroken),
            _ => {
                let body = resp
                    .bytes_stream()
                    .map(|chunk| {
                        chunk.map(|b| b.to_vec()).map_err(|e| {
                            warn!("reply stream failed: {e}");
                            ChatError::StreamBroken
                        })
                    })
                    .boxed();
                Ok(ReplyStream::new(body, self.pacing, remaining))
            }
        }
    }
}

/// A reply being read off the wire, one character at a time.
///
/// Finite and not restartable. Each character is held back by the pacing
/// delay so the text appears typed. Dropping a pending `next()` loses nothing.
pub struct ReplyStream {
    body: BoxStream<'static, Result<Vec<u8>, ChatError>>,
    /// Bytes of a character split across chunks.
    carry: Vec<u8>,
    pending: VecDeque<char>,
    text: String,
    pacing: Duration,
    remaining: Option<u32>,
    ended: bool,
}

impl ReplyStream {
    pub fn new(
        body: BoxStream<'static, Result<Vec<u8>, ChatError>>,
        pacing: Duration,
        remaining: Option<u32>,
    ) -> Self {
        Self {
            body,
            carry: Vec::new(),
            pending: VecDeque::new(),
            text: String::new(),
            pacing,
            remaining,
            ended: false,
        }
    }

    /// Stream over in-memory chunks.
    pub fn from_chunks(chunks: Vec<Vec<u8>>, pacing: Duration) -> Self {
        let body = futures_util::stream::iter(chunks.into_iter().map(Ok)).boxed();
        Self::new(body, pacing, None)
    }

    pub fn remaining(&self) -> Option<u32> {
        self.remaining
    }

    /// Text yielded so far.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn take_text(&mut self) -> String {
        std::mem::take(&mut self.text)
    }

    pub async fn next(&mut self) -> Option<Result<char, ChatError>> {
        loop {
            if !self.pending.is_empty() {
                if !self.pacing.is_zero() {
                    tokio::time::sleep(self.pacing).await;
                }
                let c = self.pending.pop_front()?;
                self.text.push(c);
                return Some(Ok(c));
            }
            if self.ended {
                return None;
            }
            match self.body.next().await {
                Some(Ok(bytes)) => decode_utf8(&mut self.carry, &bytes, &mut self.pending),
                Some(Err(e)) => {
                    self.ended = true;
                    return Some(Err(e));
                }
                None => {
                    self.ended = true;
                    if !self.carry.is_empty() {
                        self.carry.clear();
                        self.pending.push_back(char::REPLACEMENT_CHARACTER);
                    }
                }
            }
        }
    }
}

/// Decode as much of `carry + bytes` as forms whole characters. An
/// incomplete trailing sequence stays in `carry` for the next chunk.
fn decode_utf8(carry: &mut Vec<u8>, bytes: &[u8], out: &mut VecDeque<char>) {
    carry.extend_from_slice(bytes);
    let mut start = 0;
    while start < carry.len() {
        match std::str::from_utf8(&carry[start..]) {
            Ok(s) => {
                out.extend(s.chars());
                start = carry.len();
            }
            Err(e) => {
                let valid = e.valid_up_to();
                if let Ok(s) = std::str::from_utf8(&carry[start..start + valid]) {
                    out.extend(s.chars());
                }
                match e.error_len() {
                    Some(bad) => {
                        out.push_back(char::REPLACEMENT_CHARACTER);
                        start += valid + bad;
                    }
                    None => {
                        start += valid;
                        break;
                    }
                }
            }
        }
    }
    carry.drain(..start);
}
