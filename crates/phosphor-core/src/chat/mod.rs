pub mod client;
pub mod conversation;
pub mod error;
pub mod turn;

pub use client::{ChatClient, ChatRequest, ReplyStream, REMAINING_HEADER};
pub use conversation::{Conversation, Role, Turn};
pub use error::ChatError;
pub use turn::{ChatTurn, TurnEvent};
