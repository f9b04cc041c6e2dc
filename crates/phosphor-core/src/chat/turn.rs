use super::client::{ChatClient, ReplyStream};
use super::conversation::Turn;
use super::error::ChatError;
use futures_util::future::BoxFuture;
use futures_util::FutureExt;

/// One step of an in-flight reply.
#[derive(Debug)]
pub enum TurnEvent {
    Unit(char),
    Failed(ChatError),
    Finished {
        reply: String,
        remaining: Option<u32>,
    },
}

enum TurnState {
    Opening(BoxFuture<'static, Result<ReplyStream, ChatError>>),
    Streaming(ReplyStream),
    Done,
}

/// A single send, from request to last character, driven from an event loop.
///
/// `next` is safe to drop mid-await, so it can sit in a `select!` arm next
/// to keyboard input.
pub struct ChatTurn {
    message: String,
    state: TurnState,
}

impl ChatTurn {
    pub fn start(client: ChatClient, message: impl Into<String>, history: Vec<Turn>) -> Self {
        let message = message.into();
        let outgoing = message.clone();
        let opening = async move { client.open(&outgoing, &history).await }.boxed();
        Self {
            message,
            state: TurnState::Opening(opening),
        }
    }

    /// Turn over an already-open reply.
    pub fn from_stream(message: impl Into<String>, stream: ReplyStream) -> Self {
        Self {
            message: message.into(),
            state: TurnState::Streaming(stream),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_done(&self) -> bool {
        matches!(self.state, TurnState::Done)
    }

    /// Next event, or `None` once the turn has finished or failed.
    pub async fn next(&mut self) -> Option<TurnEvent> {
        loop {
            match &mut self.state {
                TurnState::Opening(opening) => match opening.await {
                    Ok(stream) => self.state = TurnState::Streaming(stream),
                    Err(e) => {
                        self.state = TurnState::Done;
                        return Some(TurnEvent::Failed(e));
                    }
                },
                TurnState::Streaming(stream) => match stream.next().await {
                    Some(Ok(c)) => return Some(TurnEvent::Unit(c)),
                    Some(Err(e)) => {
                        self.state = TurnState::Done;
                        return Some(TurnEvent::Failed(e));
                    }
                    None => {
                        let reply = stream.take_text();
                        let remaining = stream.remaining();
                        self.state = TurnState::Done;
                        return Some(TurnEvent::Finished { reply, remaining });
                    }
                },
                TurnState::Done => return None,
            }
        }
    }
}
